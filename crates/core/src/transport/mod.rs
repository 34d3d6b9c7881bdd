//! Transport seams between encoders and devices.
//!
//! Each encoder is generic over one of the traits below, so the device
//! encoding rules stay independent from how a handle is opened. The
//! submodules hold the host-side implementations that ship with this crate;
//! anything else (a ws281x DMA driver, for instance) is supplied by the caller.

use thiserror::Error;

mod blinkstick;
mod opc;
mod spidev;
mod udp;

pub use blinkstick::{
    build_led_report, report_for_led_count, BlinkStick, BLINKSTICK_PRODUCT_ID, BLINKSTICK_VENDOR_ID,
};
pub use opc::{encode_set_pixels, OpcClient, DEFAULT_OPC_SERVER};
pub use spidev::{encode_apa102_frame, SpidevStrip, APA102_HEADER_MARKER};
pub use udp::UdpTransport;

/// Errors raised by a transport while opening or writing.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("USB error: {0}")]
    Usb(#[from] rusb::Error),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("payload rejected: {0}")]
    Payload(String),

    #[error("driver error: {0}")]
    Driver(String),
}

/// A connectionless sink that sends one datagram per call.
pub trait DatagramTransport {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// A driver-owned buffer of packed 32-bit pixel words, flushed by `show`.
///
/// This is the shape of the ws281x PWM/DMA drivers.
pub trait WordStrip {
    fn led_data_mut(&mut self) -> &mut [u32];

    fn show(&mut self) -> Result<(), TransportError>;
}

/// One 4-byte APA102 LED frame.
///
/// The header carries the global brightness and is owned by the transport
/// that created the row; encoders can only replace the color bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedRow {
    header: u8,
    pub blue: u8,
    pub green: u8,
    pub red: u8,
}

impl LedRow {
    pub const fn with_header(header: u8) -> Self {
        Self {
            header,
            blue: 0,
            green: 0,
            red: 0,
        }
    }

    pub fn header(&self) -> u8 {
        self.header
    }

    pub fn set_bgr(&mut self, blue: u8, green: u8, red: u8) {
        self.blue = blue;
        self.green = green;
        self.red = red;
    }

    /// Wire order: header, blue, green, red.
    pub fn to_bytes(self) -> [u8; 4] {
        [self.header, self.blue, self.green, self.red]
    }
}

/// A driver-owned buffer of [`LedRow`]s for a clocked serial bus.
pub trait RowStrip {
    fn rows(&self) -> &[LedRow];

    fn rows_mut(&mut self) -> &mut [LedRow];

    fn show(&mut self) -> Result<(), TransportError>;
}

/// A device that accepts a flat run of LED bytes on a channel.
pub trait LedDataTransport {
    fn set_led_data(&mut self, channel: u8, data: &[u8]) -> Result<(), TransportError>;
}

/// A client for a separate LED server process.
pub trait PixelClient {
    fn put_pixels(&mut self, pixels: &[[u8; 3]]) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_led_row_keeps_header() {
        let mut row = LedRow::with_header(0xFF);
        row.set_bgr(1, 2, 3);
        assert_eq!(row.header(), 0xFF);
        assert_eq!(row.to_bytes(), [0xFF, 1, 2, 3]);
    }
}
