//! USB-HID strips (BlinkStick) that take a flat GRB byte run.

use log::trace;

use super::backend::{acquire, check_len, OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;
use crate::pixel::gamma::correct_rgb;
use crate::transport::{BlinkStick, LedDataTransport, TransportError};

/// Clip, gamma correct and serialize a frame as `g, r, b` per pixel.
pub fn encode_grb(frame: &PixelFrame, data: &mut Vec<u8>) {
    data.clear();
    data.reserve(frame.len() * 3);
    for rgb in frame.clipped(u8::MAX) {
        let [r, g, b] = correct_rgb(rgb);
        data.extend_from_slice(&[g, r, b]);
    }
}

pub struct SerialTripletEncoder<T = BlinkStick> {
    device: T,
    n_pixels: usize,
    channel: u8,
    data: Vec<u8>,
}

impl SerialTripletEncoder<BlinkStick> {
    /// Open the first BlinkStick on the bus.
    pub fn blinkstick(n_pixels: usize) -> Result<Self, OutputError> {
        Self::open(n_pixels, BlinkStick::find_first)
    }
}

impl<T: LedDataTransport> SerialTripletEncoder<T> {
    pub const NAME: &'static str = "hid";

    pub fn new(n_pixels: usize, device: T) -> Self {
        Self {
            device,
            n_pixels,
            channel: 0,
            data: Vec::with_capacity(n_pixels * 3),
        }
    }

    pub fn open(
        n_pixels: usize,
        open: impl FnOnce() -> Result<T, TransportError>,
    ) -> Result<Self, OutputError> {
        let device = acquire(Self::NAME, open)?;
        Ok(Self::new(n_pixels, device))
    }

    /// Write to another output channel of multi-channel controllers.
    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn device(&self) -> &T {
        &self.device
    }

    pub fn into_device(self) -> T {
        self.device
    }
}

impl<T: LedDataTransport> OutputBackend for SerialTripletEncoder<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pixel_count(&self) -> usize {
        self.n_pixels
    }

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        check_len(self.n_pixels, frame.len())?;
        encode_grb(frame, &mut self.data);
        trace!("Writing {} GRB bytes to channel {}", self.data.len(), self.channel);
        self.device.set_led_data(self.channel, &self.data)?;
        Ok(())
    }
}
