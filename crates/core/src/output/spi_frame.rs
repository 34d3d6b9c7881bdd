//! APA102 strips: 4-byte LED frames with a transport-owned header.
//!
//! The encoder only ever writes the blue, green and red bytes of each row.
//! The header (global brightness) is set up by the transport and left alone.
//! No gamma correction at this layer.

use std::path::Path;

use log::trace;

use super::backend::{acquire, check_len, OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;
use crate::transport::{RowStrip, SpidevStrip, TransportError};

pub struct SpiFrameEncoder<T = SpidevStrip> {
    strip: T,
    n_pixels: usize,
}

impl SpiFrameEncoder<SpidevStrip> {
    pub fn spidev(
        path: impl AsRef<Path>,
        n_pixels: usize,
        brightness: u8,
    ) -> Result<Self, OutputError> {
        Self::open(n_pixels, || SpidevStrip::open(path, n_pixels, brightness))
    }
}

impl<T: RowStrip> SpiFrameEncoder<T> {
    pub const NAME: &'static str = "spi";

    pub fn new(n_pixels: usize, strip: T) -> Result<Self, OutputError> {
        check_len(n_pixels, strip.rows().len())?;
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

impl<T: RowStrip> OutputBackend for SpiFrameEncoder<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pixel_count(&self) -> usize {
        self.n_pixels
    }

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        check_len(self.n_pixels, frame.len())?;

        for (row, [r, g, b]) in self.strip.rows_mut().iter_mut().zip(frame.clipped(u8::MAX)) {
            row.set_bgr(b, g, r);
        }

        trace!("Flushing {} APA102 rows", self.n_pixels);
        self.strip.show()?;
        Ok(())
    }
}
