use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which output device to drive. Always chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Raw RGB datagrams to an ESP8266-class strip
    Network,
    /// ws281x strip on a PWM/DMA driver
    Pwm,
    /// APA102 strip on a spidev node
    Spi,
    /// BlinkStick over USB-HID
    Hid,
    /// FadeCandy (or any OPC server)
    Proxy,
}

impl BackendKind {
    pub const ALL: [BackendKind; 5] = [
        BackendKind::Network,
        BackendKind::Pwm,
        BackendKind::Spi,
        BackendKind::Hid,
        BackendKind::Proxy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Network => "network",
            BackendKind::Pwm => "pwm",
            BackendKind::Spi => "spi",
            BackendKind::Hid => "hid",
            BackendKind::Proxy => "proxy",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown backend '{}', expected one of: network, pwm, spi, hid, proxy",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkSettings {
    pub ip: String,
    pub port: u16,
    pub mac_addr: String,
    /// Resolve `ip` from `mac_addr` through the ARP table at startup
    pub auto_detect: bool,
    /// Give up auto-detection after this many polls; `None` waits forever
    pub discovery_attempts: Option<u32>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            ip: "192.168.0.150".to_string(),
            port: 7778,
            mac_addr: "aa-bb-cc-dd-ee-ff".to_string(),
            auto_detect: false,
            discovery_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxySettings {
    pub server: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            server: crate::transport::DEFAULT_OPC_SERVER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpiSettings {
    pub device: String,
    /// APA102 global brightness, 0-31
    pub brightness: u8,
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self {
            device: "/dev/spidev0.0".to_string(),
            brightness: 31,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HidSettings {
    pub channel: u8,
}

/// Parameters handed to an external ws281x driver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PwmSettings {
    pub pin: u8,
    pub freq_hz: u32,
    pub dma: u8,
    pub invert_logic: bool,
}

impl Default for PwmSettings {
    fn default() -> Self {
        Self {
            pin: 18,
            freq_hz: 800_000,
            dma: 5,
            invert_logic: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelfTestSettings {
    pub delay_ms: u64,
}

impl Default for SelfTestSettings {
    fn default() -> Self {
        Self { delay_ms: 200 }
    }
}

/// Settings configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    // Strip
    pub backend: BackendKind,
    pub n_pixels: usize,
    /// Channel ceiling for the network backend
    pub max_brightness: u8,

    // Per-backend sections
    pub network: NetworkSettings,
    pub proxy: ProxySettings,
    pub spi: SpiSettings,
    pub hid: HidSettings,
    pub pwm: PwmSettings,

    // Diagnostics
    pub self_test: SelfTestSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Network,
            n_pixels: 60,
            max_brightness: 255,
            network: NetworkSettings::default(),
            proxy: ProxySettings::default(),
            spi: SpiSettings::default(),
            hid: HidSettings::default(),
            pwm: PwmSettings::default(),
            self_test: SelfTestSettings::default(),
        }
    }
}
