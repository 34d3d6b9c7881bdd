//! Open Pixel Control client.
//!
//! OPC is the protocol spoken by the FadeCandy server (`fcserver`). Every
//! message is a 4-byte header followed by the payload:
//!
//! | byte | meaning |
//! |------|---------|
//! | 0 | channel (0 = all) |
//! | 1 | command (0 = set pixel colors) |
//! | 2-3 | payload length, big endian |
//!
//! The set-pixel-colors payload is one `r, g, b` triple per pixel.

use std::io::Write;
use std::net::TcpStream;

use log::{debug, info, warn};

use super::{PixelClient, TransportError};

pub const DEFAULT_OPC_SERVER: &str = "localhost:7890";

/// Channel 0 addresses every strip on the server.
const BROADCAST_CHANNEL: u8 = 0;
const CMD_SET_PIXEL_COLORS: u8 = 0;

/// Encode an OPC set-pixel-colors message.
pub fn encode_set_pixels(channel: u8, pixels: &[[u8; 3]]) -> Result<Vec<u8>, TransportError> {
    let len = u16::try_from(pixels.len() * 3).map_err(|_| {
        TransportError::Payload(format!(
            "{} pixels exceed the OPC message size limit",
            pixels.len()
        ))
    })?;

    let mut message = Vec::with_capacity(4 + len as usize);
    message.push(channel);
    message.push(CMD_SET_PIXEL_COLORS);
    message.extend_from_slice(&len.to_be_bytes());
    for pixel in pixels {
        message.extend_from_slice(pixel);
    }
    Ok(message)
}

/// TCP client for an OPC server.
///
/// The connection is opened lazily and re-opened on the next send after a
/// write failure.
pub struct OpcClient {
    server: String,
    stream: Option<TcpStream>,
}

impl OpcClient {
    /// Create a client and probe the server once.
    ///
    /// An unreachable server is not an error here: the probe only logs, and
    /// the first `put_pixels` reports the failure.
    pub fn new(server: impl Into<String>) -> Self {
        let mut client = Self {
            server: server.into(),
            stream: None,
        };

        if client.can_connect() {
            info!("Successfully connected to OPC server at {}", client.server);
        } else {
            warn!(
                "Could not connect to OPC server at {}. Ensure that fcserver is running.",
                client.server
            );
        }

        client
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Try to open the connection if it is not already open.
    pub fn can_connect(&mut self) -> bool {
        self.ensure_connected().is_ok()
    }

    fn ensure_connected(&mut self) -> Result<&mut TcpStream, TransportError> {
        if self.stream.is_none() {
            debug!("Connecting to OPC server {}", self.server);
            let stream = TcpStream::connect(self.server.as_str())?;
            stream.set_nodelay(true)?;
            self.stream = Some(stream);
        }

        self.stream
            .as_mut()
            .ok_or_else(|| TransportError::Driver("OPC stream missing after connect".to_string()))
    }
}

impl PixelClient for OpcClient {
    fn put_pixels(&mut self, pixels: &[[u8; 3]]) -> Result<(), TransportError> {
        let message = encode_set_pixels(BROADCAST_CHANNEL, pixels)?;
        let stream = self.ensure_connected()?;

        if let Err(err) = stream.write_all(&message) {
            self.stream = None;
            return Err(err.into());
        }
        Ok(())
    }
}
