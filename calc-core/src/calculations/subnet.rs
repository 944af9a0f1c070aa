//! IPv4 subnet arithmetic.
//!
//! `/31` networks are treated as point-to-point links with two usable
//! addresses and `/32` as a single host; every other prefix reserves the
//! network and broadcast addresses.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubnetError {
    #[error("expected CIDR notation like 192.168.0.1/24, got '{0}'")]
    MissingPrefix(String),

    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),

    #[error("prefix length must be at most 32, got {0}")]
    PrefixOutOfRange(u8),

    #[error("subnet mask {0} is not contiguous")]
    NonContiguousMask(Ipv4Addr),
}

/// Classful network class of an address, by its first octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressClass {
    A,
    B,
    C,
    /// Multicast.
    D,
    /// Reserved.
    E,
}

impl AddressClass {
    pub fn of(address: Ipv4Addr) -> Self {
        match address.octets()[0] {
            0..=127 => Self::A,
            128..=191 => Self::B,
            192..=223 => Self::C,
            224..=239 => Self::D,
            _ => Self::E,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
    pub netmask: Ipv4Addr,
    pub wildcard: Ipv4Addr,
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub first_host: Ipv4Addr,
    pub last_host: Ipv4Addr,
    pub total_addresses: u64,
    pub usable_hosts: u64,
    pub class: AddressClass,
}

impl SubnetInfo {
    /// Parses `a.b.c.d/p`.
    ///
    /// # Errors
    ///
    /// Returns [`SubnetError`] if the prefix is missing, the address or the
    /// prefix does not parse, or the prefix exceeds 32.
    pub fn from_cidr(cidr: &str) -> Result<Self, SubnetError> {
        let (address, prefix) = cidr
            .trim()
            .split_once('/')
            .ok_or_else(|| SubnetError::MissingPrefix(cidr.to_string()))?;

        let address = parse_address(address)?;
        let prefix_len: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| SubnetError::InvalidPrefix(prefix.to_string()))?;

        Self::new(address, prefix_len)
    }

    /// Builds subnet details from an address and a dotted netmask.
    ///
    /// # Errors
    ///
    /// Returns [`SubnetError::NonContiguousMask`] if the mask's one bits are
    /// not all leading.
    pub fn from_address_and_mask(
        address: Ipv4Addr,
        netmask: Ipv4Addr,
    ) -> Result<Self, SubnetError> {
        let inverted = !u32::from(netmask);
        // A contiguous mask inverts to 2^k - 1.
        if inverted & inverted.wrapping_add(1) != 0 {
            return Err(SubnetError::NonContiguousMask(netmask));
        }
        Self::new(address, u32::from(netmask).count_ones() as u8)
    }

    /// # Errors
    ///
    /// Returns [`SubnetError::PrefixOutOfRange`] if `prefix_len > 32`.
    pub fn new(
        address: Ipv4Addr,
        prefix_len: u8,
    ) -> Result<Self, SubnetError> {
        if prefix_len > 32 {
            return Err(SubnetError::PrefixOutOfRange(prefix_len));
        }

        let mask = mask_bits(prefix_len);
        let network = u32::from(address) & mask;
        let broadcast = network | !mask;
        let total_addresses = 1u64 << (32 - u32::from(prefix_len));

        let (first_host, last_host, usable_hosts) = match prefix_len {
            32 => (network, network, 1),
            31 => (network, broadcast, 2),
            _ => (network + 1, broadcast - 1, total_addresses - 2),
        };

        Ok(Self {
            address,
            prefix_len,
            netmask: Ipv4Addr::from(mask),
            wildcard: Ipv4Addr::from(!mask),
            network: Ipv4Addr::from(network),
            broadcast: Ipv4Addr::from(broadcast),
            first_host: Ipv4Addr::from(first_host),
            last_host: Ipv4Addr::from(last_host),
            total_addresses,
            usable_hosts,
            class: AddressClass::of(address),
        })
    }

    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, self.prefix_len)
    }
}

fn parse_address(s: &str) -> Result<Ipv4Addr, SubnetError> {
    s.trim()
        .parse()
        .map_err(|_| SubnetError::InvalidAddress(s.to_string()))
}

fn mask_bits(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}
