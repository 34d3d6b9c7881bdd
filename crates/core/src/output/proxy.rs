//! Forwarding pixels to an LED server process (FadeCandy and friends).

use log::trace;

use super::backend::{acquire, check_len, OutputBackend, OutputError};
use crate::pixel::frame::PixelFrame;
use crate::transport::{OpcClient, PixelClient, TransportError};

pub struct ProxyProtocolEncoder<T = OpcClient> {
    client: T,
    n_pixels: usize,
    pixels: Vec<[u8; 3]>,
}

impl ProxyProtocolEncoder<OpcClient> {
    /// Talk OPC to `server` (`host:port`).
    pub fn opc(n_pixels: usize, server: &str) -> Result<Self, OutputError> {
        Self::open(n_pixels, || Ok(OpcClient::new(server)))
    }
}

impl<T: PixelClient> ProxyProtocolEncoder<T> {
    pub const NAME: &'static str = "proxy";

    pub fn new(n_pixels: usize, client: T) -> Self {
        Self {
            client,
            n_pixels,
            pixels: Vec::with_capacity(n_pixels),
        }
    }

    pub fn open(
        n_pixels: usize,
        open: impl FnOnce() -> Result<T, TransportError>,
    ) -> Result<Self, OutputError> {
        let client = acquire(Self::NAME, open)?;
        Ok(Self::new(n_pixels, client))
    }

    pub fn client(&self) -> &T {
        &self.client
    }

    pub fn into_client(self) -> T {
        self.client
    }
}

impl<T: PixelClient> OutputBackend for ProxyProtocolEncoder<T> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn pixel_count(&self) -> usize {
        self.n_pixels
    }

    fn show(&mut self, frame: &PixelFrame) -> Result<(), OutputError> {
        check_len(self.n_pixels, frame.len())?;

        self.pixels.clear();
        self.pixels.extend(frame.clipped(u8::MAX));

        trace!("Forwarding {} pixels to proxy", self.pixels.len());
        self.client.put_pixels(&self.pixels)?;
        Ok(())
    }
}
