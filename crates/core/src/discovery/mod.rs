//! Finding a network strip's IP address from its MAC address.
//!
//! Hotspots such as the Windows mobile hotspot hand out a fresh address every
//! time they restart, so the strip firmware cannot be given a fixed IP. The
//! device is found instead by polling the local address-resolution table until
//! its hardware address shows up.

mod arp;

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info};
use thiserror::Error;

pub use arp::{parse_arp_table, ArpCommand, ArpEntry, ArpTable, MacAddress, ProcNetArp};

/// Longest single sleep between stop-flag checks.
const CANCEL_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("device {mac} not found after {attempts} attempts")]
    NotFound { mac: MacAddress, attempts: u32 },

    #[error("discovery cancelled")]
    Cancelled,

    #[error("failed to read address table: {0}")]
    Table(#[from] std::io::Error),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

/// How hard to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Delay between table polls.
    pub interval: Duration,
    /// Give up after this many polls. `None` polls until cancelled.
    pub max_attempts: Option<u32>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// Poll `table` until `mac` appears, returning its IPv4 address.
///
/// `stop` is checked before every poll and while sleeping between polls.
/// A failing table read is returned immediately; a missing entry is retried.
/// `max_attempts: Some(0)` reports `NotFound` without reading the table.
pub fn discover(
    table: &mut dyn ArpTable,
    mac: MacAddress,
    options: DiscoveryOptions,
    stop: &AtomicBool,
) -> Result<Ipv4Addr, DiscoveryError> {
    let mut attempts = 0u32;

    loop {
        if stop.load(Ordering::Relaxed) {
            return Err(DiscoveryError::Cancelled);
        }
        if options.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(DiscoveryError::NotFound { mac, attempts });
        }

        attempts += 1;
        if let Some(entry) = table.entries()?.into_iter().find(|entry| entry.mac == mac) {
            info!("Found device {}, with IP address {}", mac, entry.ip);
            return Ok(entry.ip);
        }

        if options.max_attempts.is_some_and(|max| attempts >= max) {
            return Err(DiscoveryError::NotFound { mac, attempts });
        }

        info!(
            "Device not found at physical address {}, retrying in {:?}",
            mac, options.interval
        );
        sleep_unless_stopped(options.interval, stop);
    }
}

fn sleep_unless_stopped(duration: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= deadline || stop.load(Ordering::Relaxed) {
            return;
        }
        std::thread::sleep((deadline - now).min(CANCEL_POLL));
    }
}

/// Discover with the platform's usual table source.
pub fn discover_default(
    mac: MacAddress,
    options: DiscoveryOptions,
    stop: &AtomicBool,
) -> Result<Ipv4Addr, DiscoveryError> {
    if cfg!(target_os = "linux") {
        debug!("Polling /proc/net/arp for {}", mac);
        discover(&mut ProcNetArp::new(), mac, options, stop)
    } else {
        debug!("Polling `arp -a` for {}", mac);
        discover(&mut ArpCommand, mac, options, stop)
    }
}
