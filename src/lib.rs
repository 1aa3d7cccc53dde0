//! # sacn-transport
//!
//! Async UDP transport for sACN (ANSI E1.31) lighting-control packets.
//!
//! A [`SacnSender`](transport::SacnSender) holds one IPv4 and one IPv6 socket for its
//! whole lifetime and sends data, synchronization and universe discovery packets either
//! to a single host or to the multicast group derived from the packet's universe.
//!
//! ## Modules
//! - [`core`]: the [`Packet`](core::Packet) capability and the three E1.31 packet kinds
//! - [`transport`]: the sender, the send primitive, multicast group derivation
//! - [`config`]: TOML / environment configuration with validation
//! - [`error`]: the [`SacnError`](error::SacnError) taxonomy
//! - [`utils`]: buffer pool, logging setup, metrics
//!
//! ## Example
//! ```rust,no_run
//! use sacn_transport::core::{Cid, DataPacket, SynchronizationPacket};
//! use sacn_transport::transport::{IpFamily, SacnSender};
//!
//! # async fn run() -> sacn_transport::error::Result<()> {
//! let sender = SacnSender::new().await?;
//! let cid = Cid::random();
//!
//! let frame = DataPacket::new(cid, "console", 1, vec![0; 512]).with_sync_address(7000);
//! sender.send_multicast(&frame, IpFamily::V4).await?;
//! sender
//!     .send_multicast(&SynchronizationPacket::new(cid, 7000), IpFamily::V4)
//!     .await?;
//!
//! sender.dispose();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod transport;
pub mod utils;

pub use crate::core::{
    Cid, DataPacket, Packet, PacketKind, SynchronizationPacket, UniverseDiscoveryPacket,
};
pub use crate::error::{Result, SacnError};
pub use crate::transport::{IpFamily, SacnSender};
