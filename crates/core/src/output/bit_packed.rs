//! ws281x strips driven through a PWM/DMA driver.
//!
//! The driver keeps one `u32` per LED in its native layout:
//!
//! ```text
//! bits 31-24  unused (0)
//! bits 23-16  green
//! bits 15-8   red
//! bits 7-0    blue
//! ```
//!
//! Note green sits above red. Values are gamma corrected before packing.

use log::trace;

use super::backend::{acquire, check_len, OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;
use crate::pixel::gamma::correct_rgb;
use crate::transport::{TransportError, WordStrip};

/// Pack an already corrected pixel into the driver word.
#[inline]
pub fn pack_word([r, g, b]: [u8; 3]) -> u32 {
    (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b)
}

pub struct BitPackedBusEncoder<T> {
    strip: T,
    n_pixels: usize,
}

impl<T: WordStrip> BitPackedBusEncoder<T> {
    pub const NAME: &'static str = "pwm";

    /// Wrap a driver whose LED buffer holds exactly `n_pixels` words.
    pub fn new(n_pixels: usize, mut strip: T) -> Result<Self, OutputError> {
        check_len(n_pixels, strip.led_data_mut().len())?;
        Ok(Self { strip, n_pixels })
    }

    pub fn open(
        n_pixels: usize,
        open: impl FnOnce() -> Result<T, TransportError>,
    ) -> Result<Self, OutputError> {
        let strip = acquire(Self::NAME, open)?;
        Self::new(n_pixels, strip)
    }

    pub fn strip(&self) -> &T {
        &self.strip
    }

    pub fn into_strip(self) -> T {
        self.strip
    }
}

impl<T: WordStrip> OutputBackend for BitPackedBusEncoder<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pixel_count(&self) -> usize {
        self.n_pixels
    }

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        check_len(self.n_pixels, frame.len())?;

        let words = self.strip.led_data_mut();
        for (word, rgb) in words.iter_mut().zip(frame.clipped(u8::MAX)) {
            *word = pack_word(correct_rgb(rgb));
        }

        trace!("Flushing {} packed words", self.n_pixels);
        self.strip.show()?;
        Ok(())
    }
}
