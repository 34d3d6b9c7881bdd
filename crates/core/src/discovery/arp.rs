use std::fmt;
use std::fs;
use std::io;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::DiscoveryError;

/// A 48-bit hardware address.
///
/// Parses both `aa-bb-cc-dd-ee-ff` (Windows) and `aa:bb:cc:dd:ee:ff`
/// (everything else), any case, with or without leading zeros per octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl FromStr for MacAddress {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DiscoveryError::InvalidMac(s.to_string());

        let mut octets = [0u8; 6];
        let mut parts = s.trim().split(|c| c == ':' || c == '-');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || part.len() > 2 {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = DiscoveryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.to_string()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            a, b, c, d, e, g
        )
    }
}

/// One resolved neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpEntry {
    pub ip: Ipv4Addr,
    pub mac: MacAddress,
}

/// A snapshot source for the local address-resolution table.
pub trait ArpTable {
    fn entries(&mut self) -> io::Result<Vec<ArpEntry>>;
}

/// Pull every `(ip, mac)` pair out of free-form table text.
///
/// Handles `arp -a` on Windows (`192.168.137.4   aa-bb-cc-dd-ee-ff   dynamic`),
/// Linux/BSD `arp -a` (`? (192.168.0.4) at aa:bb:cc:dd:ee:ff [ether] on wlan0`)
/// and `/proc/net/arp`. Lines without both an IPv4 and a non-zero MAC are
/// skipped, which drops headers and incomplete entries.
pub fn parse_arp_table(text: &str) -> Vec<ArpEntry> {
    text.lines()
        .filter_map(|line| {
            let mut ip = None;
            let mut mac = None;
            for token in line.split_whitespace() {
                let token = token.trim_matches(|c| c == '(' || c == ')');
                if ip.is_none() {
                    if let Ok(addr) = token.parse::<Ipv4Addr>() {
                        ip = Some(addr);
                        continue;
                    }
                }
                if mac.is_none() {
                    if let Ok(addr) = token.parse::<MacAddress>() {
                        mac = Some(addr);
                    }
                }
            }
            match (ip, mac) {
                (Some(ip), Some(mac)) if !mac.is_zero() => Some(ArpEntry { ip, mac }),
                _ => None,
            }
        })
        .collect()
}

/// Runs `arp -a`.
#[derive(Debug, Default)]
pub struct ArpCommand;

impl ArpTable for ArpCommand {
    fn entries(&mut self) -> io::Result<Vec<ArpEntry>> {
        let output = Command::new("arp").arg("-a").output()?;
        if !output.status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("arp -a exited with {}", output.status),
            ));
        }
        Ok(parse_arp_table(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Reads the Linux kernel neighbour table.
#[derive(Debug)]
pub struct ProcNetArp {
    path: PathBuf,
}

impl ProcNetArp {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/proc/net/arp"),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNetArp {
    fn default() -> Self {
        Self::new()
    }
}

impl ArpTable for ProcNetArp {
    fn entries(&mut self) -> io::Result<Vec<ArpEntry>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(parse_arp_table(&text))
    }
}
