//! # Transport Layer
//!
//! UDP delivery of sACN packets.
//!
//! ## Components
//! - **SacnSender**: owns the IPv4/IPv6 socket pair and exposes unicast and multicast sends
//! - **SendOperation**: the per-call serialize, bind and send unit
//! - **Multicast**: universe to multicast group derivation per IP family
//!
//! Every send is one datagram whose payload is exactly the packet's serialized bytes.
//! Nothing is retried; a failed send surfaces to the caller.

pub mod multicast;
mod send;
pub mod sender;

pub use multicast::{
    IpFamily, Ipv4MulticastProvider, Ipv6MulticastProvider, MulticastAddressProvider,
};
pub use sender::SacnSender;
