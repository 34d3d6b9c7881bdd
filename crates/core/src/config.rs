use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::discovery::MacAddress;
use crate::settings::{BackendKind, Settings};

/// Configuration manager for strip settings
/// Keeps the schema (valid ranges and choices) separate from the persisted values.
/// Configuration is stored in strand.json in the working directory by default
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
    created_at: Option<String>,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub strip: StripConfigSchema,
    pub network: NetworkConfigSchema,
    pub spi: SpiConfigSchema,
    pub hid: HidConfigSchema,
    pub pwm: PwmConfigSchema,
    pub self_test: SelfTestConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripConfigSchema {
    pub backend: ConfigOption<BackendKind>,
    pub n_pixels: ConfigOption<usize>,
    pub max_brightness: ConfigOption<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfigSchema {
    pub ip: ConfigOption<String>,
    pub port: ConfigOption<u16>,
    pub mac_addr: ConfigOption<String>,
    pub auto_detect: ConfigOption<bool>,
    pub discovery_attempts: ConfigOption<Option<u32>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiConfigSchema {
    pub device: ConfigOption<String>,
    pub brightness: ConfigOption<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HidConfigSchema {
    pub channel: ConfigOption<u8>,
    pub n_pixels: ConfigOption<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwmConfigSchema {
    pub pin: ConfigOption<u8>,
    pub freq_hz: ConfigOption<u32>,
    pub dma: ConfigOption<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfTestConfigSchema {
    pub delay_ms: ConfigOption<u64>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
}

impl<T: PartialOrd + Copy> ConfigOption<T> {
    fn in_range(&self, value: T) -> bool {
        self.valid_range
            .map_or(true, |(min, max)| value >= min && value <= max)
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'strand.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("strand.json"));

        Self {
            config_path,
            settings: Settings::default(),
            created_at: None,
        }
    }

    /// Load settings from configuration file
    /// Writes a default file first if none exists
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            warn!(
                "Config file version {} doesn't match library version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        self.settings = config_file.settings;
        self.created_at = Some(config_file.created_at);
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: self.created_at.clone().unwrap_or_else(|| now.clone()),
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Validate, then update settings and save to file
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        let defaults = Settings::default();

        ConfigSchema {
            strip: StripConfigSchema {
                backend: ConfigOption {
                    default: defaults.backend,
                    valid_range: None,
                    valid_choices: Some(BackendKind::ALL.to_vec()),
                    description: "Output device family".to_string(),
                },
                n_pixels: ConfigOption {
                    default: defaults.n_pixels,
                    valid_range: Some((1, 4096)),
                    valid_choices: None,
                    description: "Number of LEDs on the strip".to_string(),
                },
                max_brightness: ConfigOption {
                    default: defaults.max_brightness,
                    valid_range: None,
                    valid_choices: None,
                    description: "Channel ceiling applied by the network backend".to_string(),
                },
            },
            network: NetworkConfigSchema {
                ip: ConfigOption {
                    default: defaults.network.ip,
                    valid_range: None,
                    valid_choices: None,
                    description: "IPv4 address of the network strip".to_string(),
                },
                port: ConfigOption {
                    default: defaults.network.port,
                    valid_range: Some((1, 65535)),
                    valid_choices: None,
                    description: "UDP port the strip firmware listens on".to_string(),
                },
                mac_addr: ConfigOption {
                    default: defaults.network.mac_addr,
                    valid_range: None,
                    valid_choices: None,
                    description: "Hardware address used for auto-detection".to_string(),
                },
                auto_detect: ConfigOption {
                    default: defaults.network.auto_detect,
                    valid_range: None,
                    valid_choices: None,
                    description: "Find the strip's IP from its MAC address at startup".to_string(),
                },
                discovery_attempts: ConfigOption {
                    default: defaults.network.discovery_attempts,
                    valid_range: None,
                    valid_choices: None,
                    description: "ARP table polls before auto-detection gives up; unset polls forever"
                        .to_string(),
                },
            },
            spi: SpiConfigSchema {
                device: ConfigOption {
                    default: defaults.spi.device,
                    valid_range: None,
                    valid_choices: None,
                    description: "spidev node the APA102 strip is wired to".to_string(),
                },
                brightness: ConfigOption {
                    default: defaults.spi.brightness,
                    valid_range: Some((0, 31)),
                    valid_choices: None,
                    description: "APA102 global brightness".to_string(),
                },
            },
            hid: HidConfigSchema {
                channel: ConfigOption {
                    default: defaults.hid.channel,
                    valid_range: None,
                    valid_choices: Some(vec![0, 1, 2]),
                    description: "BlinkStick output channel".to_string(),
                },
                n_pixels: ConfigOption {
                    default: defaults.n_pixels,
                    valid_range: Some((1, 64)),
                    valid_choices: None,
                    description: "LEDs a BlinkStick can drive per channel".to_string(),
                },
            },
            pwm: PwmConfigSchema {
                pin: ConfigOption {
                    default: defaults.pwm.pin,
                    valid_range: None,
                    valid_choices: Some(vec![12, 18, 13, 19]),
                    description: "GPIO pin with PWM output".to_string(),
                },
                freq_hz: ConfigOption {
                    default: defaults.pwm.freq_hz,
                    valid_range: None,
                    valid_choices: Some(vec![400_000, 800_000]),
                    description: "LED protocol frequency".to_string(),
                },
                dma: ConfigOption {
                    default: defaults.pwm.dma,
                    valid_range: Some((0, 14)),
                    valid_choices: None,
                    description: "DMA channel used for the PWM signal".to_string(),
                },
            },
            self_test: SelfTestConfigSchema {
                delay_ms: ConfigOption {
                    default: defaults.self_test.delay_ms,
                    valid_range: Some((1, 10_000)),
                    valid_choices: None,
                    description: "Delay between self-test frames".to_string(),
                },
            },
        }
    }

    /// Validate settings against schema
    /// Backend sections are only checked when that backend is selected.
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if !schema.strip.n_pixels.in_range(settings.n_pixels) {
            errors.push(range_error("n_pixels", &schema.strip.n_pixels));
        }

        match settings.backend {
            BackendKind::Network => Self::validate_network(settings, &schema, &mut errors),
            BackendKind::Spi => {
                if !schema.spi.brightness.in_range(settings.spi.brightness) {
                    errors.push(range_error("spi.brightness", &schema.spi.brightness));
                }
            }
            BackendKind::Hid => {
                if let Some(choices) = &schema.hid.channel.valid_choices {
                    if !choices.contains(&settings.hid.channel) {
                        errors.push(format!("hid.channel must be one of: {:?}", choices));
                    }
                }
                if !schema.hid.n_pixels.in_range(settings.n_pixels) {
                    errors.push(range_error("n_pixels (hid backend)", &schema.hid.n_pixels));
                }
            }
            BackendKind::Pwm => {
                if let Some(choices) = &schema.pwm.pin.valid_choices {
                    if !choices.contains(&settings.pwm.pin) {
                        errors.push(format!("pwm.pin must be one of: {:?}", choices));
                    }
                }
                if let Some(choices) = &schema.pwm.freq_hz.valid_choices {
                    if !choices.contains(&settings.pwm.freq_hz) {
                        errors.push(format!("pwm.freq_hz must be one of: {:?}", choices));
                    }
                }
                if !schema.pwm.dma.in_range(settings.pwm.dma) {
                    errors.push(range_error("pwm.dma", &schema.pwm.dma));
                }
            }
            BackendKind::Proxy => {
                if settings.proxy.server.trim().is_empty() {
                    errors.push("proxy.server must not be empty".to_string());
                }
            }
        }

        if !schema.self_test.delay_ms.in_range(settings.self_test.delay_ms) {
            errors.push(range_error("self_test.delay_ms", &schema.self_test.delay_ms));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_network(settings: &Settings, schema: &ConfigSchema, errors: &mut Vec<String>) {
        let network = &settings.network;

        if !schema.network.port.in_range(network.port) {
            errors.push(range_error("network.port", &schema.network.port));
        }

        if network.auto_detect {
            // Discovery replaces `ip` with the address found in the ARP table
            if network.mac_addr.parse::<MacAddress>().is_err() {
                errors.push(format!(
                    "network.mac_addr '{}' is not a MAC address",
                    network.mac_addr
                ));
            }
            if network.discovery_attempts == Some(0) {
                errors.push(
                    "network.discovery_attempts must be at least 1 (omit it to poll forever)"
                        .to_string(),
                );
            }
        } else if network.ip.parse::<Ipv4Addr>().is_err() {
            // Strip firmware only speaks IPv4, and the transport binds an IPv4 socket
            errors.push(format!(
                "network.ip '{}' is not an IPv4 address",
                network.ip
            ));
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

fn range_error<T: std::fmt::Display>(name: &str, option: &ConfigOption<T>) -> String {
    match &option.valid_range {
        Some((min, max)) => format!("{} must be between {} and {}", name, min, max),
        None => format!("{} is out of range", name),
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
