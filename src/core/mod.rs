//! # Core Packet Components
//!
//! The packet capability consumed by the sender, and the three E1.31 packet kinds.
//!
//! The sender only needs a packet's declared length, a way to serialize it into a
//! caller-provided buffer, and its multicast resolution key. Everything else about the
//! wire layout lives here.
//!
//! ## Components
//! - **Packet**: the trait the sender consumes, plus the shared root layer
//! - **DataPacket**: DMX512 slot data for one universe
//! - **SynchronizationPacket**: triggers synchronized output on a sync universe
//! - **UniverseDiscoveryPacket**: one page of the universes a source transmits
//!
//! ## Wire Format
//! ```text
//! [Root(38)] [Framing(N)] [DMP | Discovery layer (M)]
//! ```
//!
//! All multi-byte fields are big-endian.

pub mod data;
pub mod discovery;
pub mod packet;
pub mod sync;

pub use data::DataPacket;
pub use discovery::UniverseDiscoveryPacket;
pub use packet::{Cid, Packet, PacketKind};
pub use sync::SynchronizationPacket;
