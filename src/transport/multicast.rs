//! Multicast group derivation.
//!
//! sACN maps each universe to one multicast group per IP family. The sender consumes
//! the mapping through [`MulticastAddressProvider`] so tests and unusual deployments
//! can substitute their own.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::core::packet::{is_valid_universe, DISCOVERY_UNIVERSE};
use crate::error::{Result, SacnError};

/// IP family selector for multicast sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IpFamily {
    #[default]
    V4,
    V6,
}

impl IpFamily {
    /// Family of an address
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// `true` selects IPv6
    pub fn from_ipv6_flag(ipv6: bool) -> Self {
        if ipv6 {
            IpFamily::V6
        } else {
            IpFamily::V4
        }
    }
}

/// Maps a universe number to its multicast group.
///
/// Implementations must be deterministic and free of side effects visible to the
/// sender.
pub trait MulticastAddressProvider: Send + Sync {
    fn multicast_address(&self, universe: u16) -> Result<IpAddr>;
}

fn check_universe(universe: u16) -> Result<()> {
    if is_valid_universe(universe) || universe == DISCOVERY_UNIVERSE {
        Ok(())
    } else {
        Err(SacnError::Resolution { universe })
    }
}

/// `239.255.{hi}.{lo}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ipv4MulticastProvider;

impl MulticastAddressProvider for Ipv4MulticastProvider {
    fn multicast_address(&self, universe: u16) -> Result<IpAddr> {
        check_universe(universe)?;
        let [hi, lo] = universe.to_be_bytes();
        Ok(IpAddr::V4(Ipv4Addr::new(239, 255, hi, lo)))
    }
}

/// `ff18::8300:{universe}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Ipv6MulticastProvider;

impl MulticastAddressProvider for Ipv6MulticastProvider {
    fn multicast_address(&self, universe: u16) -> Result<IpAddr> {
        check_universe(universe)?;
        Ok(IpAddr::V6(Ipv6Addr::new(
            0xFF18, 0, 0, 0, 0, 0, 0x8300, universe,
        )))
    }
}
