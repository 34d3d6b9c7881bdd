pub use builder::{network_destination, open_backend, BuildError, DynBackend};
pub use config::{ConfigError, ConfigFile, ConfigManager, ConfigOption, ConfigSchema};
pub use diagnostics::{run_self_test, scroll_frame, SelfTestOptions};
pub use discovery::{discover, discover_default, DiscoveryError, DiscoveryOptions, MacAddress};
pub use output::{
    BitPackedBusEncoder, NetworkPacketEncoder, OutputBackend, OutputError, ProxyProtocolEncoder,
    SerialTripletEncoder, SpiFrameEncoder,
};
pub use pixel::frame::{PixelFrame, Rgb};
pub use pixel::gamma::GAMMA_TABLE;
pub use settings::{BackendKind, Settings};
pub use transport::TransportError;

mod builder;
mod config;
pub mod diagnostics;
pub mod discovery;
pub mod output;
pub mod pixel;
pub mod settings;
pub mod transport;
