use std::fmt;

use bytes::BufMut;

use crate::error::{constants, Result, SacnError};

/// UDP port every sACN receiver listens on
pub const SACN_PORT: u16 = 5568;

/// Lowest universe number that may carry data
pub const MIN_UNIVERSE: u16 = 1;

/// Highest universe number that may carry data
pub const MAX_UNIVERSE: u16 = 63999;

/// Universe reserved for universe discovery packets
pub const DISCOVERY_UNIVERSE: u16 = 64214;

/// Length of the root layer shared by every packet
pub const ROOT_LAYER_LENGTH: usize = 38;

/// Fixed, NUL-padded source name field length
pub const SOURCE_NAME_LENGTH: usize = 64;

/// ACN packet identifier carried in every root layer
pub const ACN_PACKET_IDENTIFIER: [u8; 12] = *b"ASC-E1.17\0\0\0";

pub(crate) const PREAMBLE_SIZE: u16 = 0x0010;
pub(crate) const POSTAMBLE_SIZE: u16 = 0x0000;

pub(crate) const VECTOR_ROOT_E131_DATA: u32 = 0x0000_0004;
pub(crate) const VECTOR_ROOT_E131_EXTENDED: u32 = 0x0000_0008;

/// Which of the three packet kinds a [`Packet`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Data,
    Discovery,
    Synchronization,
}

impl PacketKind {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            PacketKind::Data => "data",
            PacketKind::Discovery => "discovery",
            PacketKind::Synchronization => "synchronization",
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A packet the sender can put on the wire.
///
/// Implementations must report their serialized length before encoding and must write
/// exactly that many bytes. The sender rejects a packet whose `write_to` returns any
/// other count.
pub trait Packet: Send + Sync {
    /// Which kind of packet this is.
    fn kind(&self) -> PacketKind;

    /// Serialized length in bytes.
    fn length(&self) -> usize;

    /// Serialize into `buf`, returning the number of bytes written.
    ///
    /// `buf` is at least `length()` bytes long.
    fn write_to(&self, buf: &mut [u8]) -> Result<usize>;

    /// Universe number used to derive the multicast group for this packet.
    fn multicast_key(&self) -> u16;
}

/// Component identifier: a 16 byte UUID naming the sending component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cid(pub [u8; 16]);

impl Cid {
    /// Generate a random CID
    pub fn random() -> Self {
        Self(rand::random::<[u8; 16]>())
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Cid {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Whether `universe` may carry data or synchronization traffic
pub fn is_valid_universe(universe: u16) -> bool {
    (MIN_UNIVERSE..=MAX_UNIVERSE).contains(&universe)
}

/// Encode a PDU flags-and-length field for a PDU of `len` bytes
pub(crate) fn flags_and_length(len: usize) -> u16 {
    0x7000 | (len as u16 & 0x0FFF)
}

/// Check that `buf` can hold `len` bytes and return the exact-size window into it
pub(crate) fn window(buf: &mut [u8], len: usize) -> Result<&mut [u8]> {
    if buf.len() < len {
        return Err(SacnError::invalid_packet(constants::ERR_BUFFER_TOO_SMALL));
    }
    Ok(&mut buf[..len])
}

pub(crate) fn check_source_name(name: &str) -> Result<()> {
    if name.len() >= SOURCE_NAME_LENGTH {
        return Err(SacnError::invalid_packet(
            constants::ERR_SOURCE_NAME_TOO_LONG,
        ));
    }
    Ok(())
}

/// Write the root layer for a packet of `total_len` bytes
pub(crate) fn put_root_layer(out: &mut impl BufMut, total_len: usize, vector: u32, cid: &Cid) {
    out.put_u16(PREAMBLE_SIZE);
    out.put_u16(POSTAMBLE_SIZE);
    out.put_slice(&ACN_PACKET_IDENTIFIER);
    // Root PDU spans everything after the identifier
    out.put_u16(flags_and_length(total_len - 16));
    out.put_u32(vector);
    out.put_slice(cid.as_bytes());
}

/// Write a source name padded with NULs to 64 bytes
pub(crate) fn put_source_name(out: &mut impl BufMut, name: &str) {
    let bytes = name.as_bytes();
    out.put_slice(bytes);
    out.put_bytes(0, SOURCE_NAME_LENGTH - bytes.len());
}
