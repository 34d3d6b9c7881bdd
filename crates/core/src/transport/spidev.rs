//! APA102 ("DotStar") strips on a Linux spidev character device.
//!
//! Wire format for `n` LEDs:
//! - start frame: 4 bytes of `0x00`
//! - one LED frame per pixel: `0b111x_xxxx` brightness header, blue, green, red
//! - end frame: `(n + 15) / 16` bytes of `0x00`, enough extra clock edges to
//!   push data through to the last LED
//!
//! A plain `write(2)` on a spidev node is a single SPI transfer at the
//! device's configured speed, so no ioctl is needed.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use log::info;

use super::{LedRow, RowStrip, TransportError};

/// Fixed top three bits of every LED frame header.
pub const APA102_HEADER_MARKER: u8 = 0b1110_0000;

const MAX_BRIGHTNESS: u8 = 0b0001_1111;
const START_FRAME: [u8; 4] = [0x00; 4];

/// spidev's default `bufsiz`; larger writes are rejected by the kernel.
const SPIDEV_CHUNK: usize = 4096;

/// Serialize rows into a complete APA102 transfer.
pub fn encode_apa102_frame(rows: &[LedRow]) -> Vec<u8> {
    let end_frame_len = (rows.len() + 15) / 16;
    let mut frame = Vec::with_capacity(START_FRAME.len() + rows.len() * 4 + end_frame_len);

    frame.extend_from_slice(&START_FRAME);
    for row in rows {
        frame.extend_from_slice(&row.to_bytes());
    }
    frame.resize(frame.len() + end_frame_len, 0x00);
    frame
}

/// An APA102 strip whose frame buffer is owned here and flushed to `W`.
pub struct SpidevStrip<W = File> {
    device: W,
    rows: Vec<LedRow>,
}

impl SpidevStrip<File> {
    /// Open a spidev node, e.g. `/dev/spidev0.0`.
    ///
    /// `brightness` is the 5-bit global brightness (0-31) written into every
    /// row header.
    pub fn open(
        path: impl AsRef<Path>,
        n_pixels: usize,
        brightness: u8,
    ) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let device = OpenOptions::new().write(true).open(path)?;
        info!(
            "Opened APA102 strip on {} ({} pixels, brightness {})",
            path.display(),
            n_pixels,
            brightness.min(MAX_BRIGHTNESS)
        );
        Ok(Self::from_writer(device, n_pixels, brightness))
    }
}

impl<W: Write> SpidevStrip<W> {
    pub fn from_writer(device: W, n_pixels: usize, brightness: u8) -> Self {
        let header = APA102_HEADER_MARKER | (brightness & MAX_BRIGHTNESS);
        Self {
            device,
            rows: vec![LedRow::with_header(header); n_pixels],
        }
    }

    pub fn device(&self) -> &W {
        &self.device
    }
}

impl<W: Write> RowStrip for SpidevStrip<W> {
    fn rows(&self) -> &[LedRow] {
        &self.rows
    }

    fn rows_mut(&mut self) -> &mut [LedRow] {
        &mut self.rows
    }

    fn show(&mut self) -> Result<(), TransportError> {
        let frame = encode_apa102_frame(&self.rows);
        for chunk in frame.chunks(SPIDEV_CHUNK) {
            self.device.write_all(chunk)?;
        }
        self.device.flush()?;
        Ok(())
    }
}
