use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;
use strand_core::{
    discover_default, open_backend, run_self_test, BackendKind, ConfigManager, DiscoveryError,
    DiscoveryOptions, MacAddress, SelfTestOptions, Settings,
};

/// Drive and test addressable LED strips.
#[derive(Parser, Debug)]
#[command(name = "strand")]
#[command(about = "LED strip output backends")]
struct Args {
    /// Path to the JSON config file
    #[arg(long, default_value = "strand.json")]
    config: PathBuf,

    /// Override the configured backend (network, pwm, spi, hid, proxy)
    #[arg(long, value_parser = parse_backend)]
    backend: Option<BackendKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scroll a red, green and blue pixel along the strip
    Test {
        /// Stop after this many frames (runs until killed if omitted)
        #[arg(long)]
        frames: Option<u64>,

        /// Delay between frames, defaults to the configured value
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Find a network strip's IP address from its MAC address
    Discover {
        /// Hardware address, e.g. aa-bb-cc-dd-ee-ff
        #[arg(long, value_parser = parse_mac)]
        mac: MacAddress,

        /// Give up after this many polls (polls forever if omitted)
        #[arg(long)]
        attempts: Option<u32>,

        /// Delay between polls
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Write a config file with default settings
    Init,
    /// Print the current config file
    Show,
    /// Check the config file against the schema
    Validate,
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse()
}

fn parse_mac(s: &str) -> Result<MacAddress, String> {
    s.parse().map_err(|e: DiscoveryError| e.to_string())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = ConfigManager::new(Some(args.config.clone()));

    match args.command {
        Command::Test { frames, delay_ms } => {
            let mut settings = load_settings(&mut config)?;
            if let Some(kind) = args.backend {
                settings.backend = kind;
            }

            // Never set: the test ends at the frame limit or when the process is killed
            let stop = AtomicBool::new(false);

            let mut backend = open_backend(&settings, &stop)
                .with_context(|| format!("Failed to open {} backend", settings.backend))?;

            let options = SelfTestOptions {
                delay: Duration::from_millis(delay_ms.unwrap_or(settings.self_test.delay_ms)),
                max_frames: frames,
            };
            let shown = run_self_test(backend.as_mut(), options, &stop)
                .context("LED strip test failed")?;
            println!("Showed {} frames on {} pixels", shown, settings.n_pixels);
        }
        Command::Discover {
            mac,
            attempts,
            interval_ms,
        } => {
            let options = DiscoveryOptions {
                interval: Duration::from_millis(interval_ms),
                max_attempts: attempts,
            };
            let ip = discover_default(mac, options, &AtomicBool::new(false))
                .with_context(|| format!("Failed to discover {}", mac))?;
            println!("{}", ip);
        }
        Command::Config { action } => match action {
            ConfigAction::Init => {
                config
                    .reset_to_defaults()
                    .context("Failed to write default config")?;
                println!("Wrote default config to {}", config.config_path().display());
            }
            ConfigAction::Show => {
                load_settings(&mut config)?;
                let content = std::fs::read_to_string(config.config_path())
                    .with_context(|| format!("Failed to read {}", config.config_path().display()))?;
                println!("{}", content);
            }
            ConfigAction::Validate => {
                let settings = load_settings(&mut config)?;
                if let Err(errors) = ConfigManager::validate_settings(&settings) {
                    for error in &errors {
                        eprintln!("  {}", error);
                    }
                    bail!(
                        "{} has {} invalid setting(s)",
                        config.config_path().display(),
                        errors.len()
                    );
                }
                println!("{} is valid", config.config_path().display());
            }
        },
    }

    Ok(())
}

fn load_settings(config: &mut ConfigManager) -> anyhow::Result<Settings> {
    let settings = config
        .load()
        .with_context(|| format!("Failed to load {}", config.config_path().display()))?;
    info!(
        "Loaded config from {} ({} backend, {} pixels)",
        config.config_path().display(),
        settings.backend,
        settings.n_pixels
    );
    Ok(settings)
}
