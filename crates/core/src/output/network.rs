//! Raw RGB over UDP, for ESP8266-class network strips.
//!
//! Packet layout is the plain pixel run with nothing else around it:
//!
//! ```text
//! | r0 | g0 | b0 | r1 | g1 | b1 | ... |
//! ```
//!
//! There is no per-pixel index byte, header or checksum. The firmware maps
//! byte offset `3 * i` to LED `i`, so a datagram always carries the whole strip.

use std::net::SocketAddr;

use log::trace;

use super::backend::{acquire, check_len, OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;
use crate::transport::{DatagramTransport, UdpTransport};

/// Serialize a frame, clipping every channel to `[0, max_brightness]`.
pub fn encode_packet(frame: &PixelFrame, max_brightness: u8, packet: &mut Vec<u8>) {
    packet.clear();
    packet.reserve(frame.len() * 3);
    for rgb in frame.clipped(max_brightness) {
        packet.extend_from_slice(&rgb);
    }
}

pub struct NetworkPacketEncoder<T = UdpTransport> {
    transport: T,
    n_pixels: usize,
    max_brightness: u8,
    packet: Vec<u8>,
}

impl NetworkPacketEncoder<UdpTransport> {
    /// Bind a UDP socket and target `destination`.
    pub fn udp(
        n_pixels: usize,
        max_brightness: u8,
        destination: SocketAddr,
    ) -> Result<Self, OutputError> {
        Self::open(n_pixels, max_brightness, || UdpTransport::new(destination))
    }
}

impl<T: DatagramTransport> NetworkPacketEncoder<T> {
    pub const NAME: &'static str = "network";

    pub fn new(n_pixels: usize, max_brightness: u8, transport: T) -> Self {
        Self {
            transport,
            n_pixels,
            max_brightness,
            packet: Vec::with_capacity(n_pixels * 3),
        }
    }

    pub fn open(
        n_pixels: usize,
        max_brightness: u8,
        open: impl FnOnce() -> Result<T, crate::transport::TransportError>,
    ) -> Result<Self, OutputError> {
        let transport = acquire(Self::NAME, open)?;
        Ok(Self::new(n_pixels, max_brightness, transport))
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: DatagramTransport> OutputBackend for NetworkPacketEncoder<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pixel_count(&self) -> usize {
        self.n_pixels
    }

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        check_len(self.n_pixels, frame.len())?;
        encode_packet(frame, self.max_brightness, &mut self.packet);
        trace!("Sending {} byte pixel datagram", self.packet.len());
        self.transport.send(&self.packet)?;
        Ok(())
    }
}
