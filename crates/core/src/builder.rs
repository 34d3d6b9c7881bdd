//! Turning [`Settings`] into a live backend.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::AtomicBool;

use log::info;
use thiserror::Error;

use crate::config::{ConfigError, ConfigManager};
use crate::discovery::{discover_default, DiscoveryError, DiscoveryOptions, MacAddress};
use crate::output::{
    BitPackedBusEncoder, NetworkPacketEncoder, OutputBackend, OutputError, ProxyProtocolEncoder,
    SerialTripletEncoder, SpiFrameEncoder,
};
use crate::settings::{BackendKind, NetworkSettings, Settings};
use crate::transport::TransportError;

pub type DynBackend = Box<dyn OutputBackend + Send>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Build the backend named by `settings.backend`.
///
/// Settings are validated first. With `network.auto_detect` set, the strip's
/// address is resolved from its MAC before the socket is opened; `stop`
/// cancels that search.
pub fn open_backend(settings: &Settings, stop: &AtomicBool) -> Result<DynBackend, BuildError> {
    ConfigManager::validate_settings(settings).map_err(ConfigError::ValidationError)?;

    let n_pixels = settings.n_pixels;
    info!("Opening {} backend for {} pixels", settings.backend, n_pixels);

    let backend: DynBackend = match settings.backend {
        BackendKind::Network => {
            let destination = network_destination(&settings.network, stop)?;
            Box::new(NetworkPacketEncoder::udp(
                n_pixels,
                settings.max_brightness,
                destination,
            )?)
        }
        BackendKind::Pwm => {
            // ws281x drivers are supplied by the embedding application
            return Err(OutputError::DriverUnavailable {
                backend: BitPackedBusEncoder::<NoPwmDriver>::NAME,
                source: TransportError::Driver(format!(
                    "no ws281x driver built in (pin {}, dma {}); wrap one in a WordStrip",
                    settings.pwm.pin, settings.pwm.dma
                )),
            }
            .into());
        }
        BackendKind::Spi => Box::new(SpiFrameEncoder::spidev(
            &settings.spi.device,
            n_pixels,
            settings.spi.brightness,
        )?),
        BackendKind::Hid => Box::new(
            SerialTripletEncoder::blinkstick(n_pixels)?.with_channel(settings.hid.channel),
        ),
        BackendKind::Proxy => Box::new(ProxyProtocolEncoder::opc(
            n_pixels,
            &settings.proxy.server,
        )?),
    };

    Ok(backend)
}

/// Where the network strip lives, either configured or discovered.
pub fn network_destination(
    network: &NetworkSettings,
    stop: &AtomicBool,
) -> Result<SocketAddr, BuildError> {
    let ip = if network.auto_detect {
        let mac: MacAddress = network.mac_addr.parse()?;
        let options = DiscoveryOptions {
            max_attempts: network.discovery_attempts,
            ..DiscoveryOptions::default()
        };
        discover_default(mac, options, stop)?
    } else {
        network.ip.parse::<Ipv4Addr>().map_err(|_| {
            ConfigError::ValidationError(vec![format!(
                "network.ip '{}' is not an IPv4 address",
                network.ip
            )])
        })?
    };

    Ok(SocketAddr::new(IpAddr::V4(ip), network.port))
}

/// Names the pwm encoder type without a driver.
struct NoPwmDriver;

impl crate::transport::WordStrip for NoPwmDriver {
    fn led_data_mut(&mut self) -> &mut [u32] {
        &mut []
    }

    fn show(&mut self) -> Result<(), TransportError> {
        Err(TransportError::Driver("no ws281x driver".to_string()))
    }
}
