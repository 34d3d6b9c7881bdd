//! Output backends.
//!
//! Every backend takes the same [`PixelFrame`](crate::PixelFrame) and encodes
//! it for one device family:
//!
//! | Backend | Bytes/pixel | Gamma | Channel order |
//! |---|---|---|---|
//! | [`NetworkPacketEncoder`] | 3 | no | R, G, B |
//! | [`BitPackedBusEncoder`] | 4 (1 unused) | yes | `G << 16 \| R << 8 \| B` |
//! | [`SpiFrameEncoder`] | 4 (1 preserved) | no | header, B, G, R |
//! | [`SerialTripletEncoder`] | 3 | yes | G, R, B |
//! | [`ProxyProtocolEncoder`] | 3 | no | R, G, B |

mod backend;
mod bit_packed;
mod network;
mod proxy;
mod serial_triplet;
mod spi_frame;

pub use backend::{acquire, OutputBackend, OutputError};
pub use bit_packed::{pack_word, BitPackedBusEncoder};
pub use network::{encode_packet, NetworkPacketEncoder};
pub use proxy::ProxyProtocolEncoder;
pub use serial_triplet::{encode_grb, SerialTripletEncoder};
pub use spi_frame::SpiFrameEncoder;
