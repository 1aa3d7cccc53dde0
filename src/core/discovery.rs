//! Universe discovery packets.
//!
//! A source periodically lists the universes it transmits on the reserved discovery
//! universe. Long lists are split into pages of at most 512 universes; `page` and
//! `last_page` let receivers tell when they have seen the whole list.

use bytes::BufMut;

use super::packet::{
    check_source_name, flags_and_length, is_valid_universe, put_root_layer, put_source_name,
    window, Cid, Packet, PacketKind, DISCOVERY_UNIVERSE, ROOT_LAYER_LENGTH,
    SOURCE_NAME_LENGTH, VECTOR_ROOT_E131_EXTENDED,
};
use crate::error::{constants, Result, SacnError};

/// Maximum universes listed on one discovery page
pub const UNIVERSES_PER_PAGE: usize = 512;

const VECTOR_E131_EXTENDED_DISCOVERY: u32 = 0x0000_0002;
const VECTOR_UNIVERSE_DISCOVERY_UNIVERSE_LIST: u32 = 0x0000_0001;

// flags(2) + vector(4) + source name + reserved(4)
const FRAMING_LAYER_LENGTH: usize = 2 + 4 + SOURCE_NAME_LENGTH + 4;
// flags(2) + vector(4) + page(1) + last page(1)
const DISCOVERY_HEADER_LENGTH: usize = 2 + 4 + 1 + 1;

/// One page of a source's universe list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseDiscoveryPacket {
    pub cid: Cid,
    pub source_name: String,
    pub page: u8,
    pub last_page: u8,
    /// Strictly ascending
    pub universes: Vec<u16>,
}

impl UniverseDiscoveryPacket {
    /// Create a single-page discovery packet
    pub fn new(cid: Cid, source_name: impl Into<String>, universes: Vec<u16>) -> Self {
        Self {
            cid,
            source_name: source_name.into(),
            page: 0,
            last_page: 0,
            universes,
        }
    }

    /// Split a universe list into as many pages as it needs.
    ///
    /// The list is sorted and deduplicated first. An empty list still yields one page.
    pub fn paginate(cid: Cid, source_name: &str, mut universes: Vec<u16>) -> Vec<Self> {
        universes.sort_unstable();
        universes.dedup();

        if universes.is_empty() {
            return vec![Self::new(cid, source_name, universes)];
        }

        let pages: Vec<&[u16]> = universes.chunks(UNIVERSES_PER_PAGE).collect();
        let last_page = (pages.len() - 1) as u8;
        pages
            .into_iter()
            .enumerate()
            .map(|(page, chunk)| Self {
                cid,
                source_name: source_name.to_string(),
                page: page as u8,
                last_page,
                universes: chunk.to_vec(),
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.universes.len() > UNIVERSES_PER_PAGE {
            return Err(SacnError::invalid_packet(
                constants::ERR_TOO_MANY_UNIVERSES,
            ));
        }
        if !self.universes.iter().all(|u| is_valid_universe(*u)) {
            return Err(SacnError::invalid_packet(constants::ERR_UNIVERSE_RANGE));
        }
        if self.universes.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(SacnError::invalid_packet(
                constants::ERR_UNSORTED_UNIVERSES,
            ));
        }
        if self.page > self.last_page {
            return Err(SacnError::invalid_packet(constants::ERR_PAGE_RANGE));
        }
        check_source_name(&self.source_name)
    }
}

impl Packet for UniverseDiscoveryPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::Discovery
    }

    fn length(&self) -> usize {
        ROOT_LAYER_LENGTH
            + FRAMING_LAYER_LENGTH
            + DISCOVERY_HEADER_LENGTH
            + 2 * self.universes.len()
    }

    fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.validate()?;
        let total = self.length();
        let mut out = window(buf, total)?;

        put_root_layer(&mut out, total, VECTOR_ROOT_E131_EXTENDED, &self.cid);

        out.put_u16(flags_and_length(total - ROOT_LAYER_LENGTH));
        out.put_u32(VECTOR_E131_EXTENDED_DISCOVERY);
        put_source_name(&mut out, &self.source_name);
        out.put_u32(0);

        out.put_u16(flags_and_length(
            total - ROOT_LAYER_LENGTH - FRAMING_LAYER_LENGTH,
        ));
        out.put_u32(VECTOR_UNIVERSE_DISCOVERY_UNIVERSE_LIST);
        out.put_u8(self.page);
        out.put_u8(self.last_page);
        for universe in &self.universes {
            out.put_u16(*universe);
        }

        Ok(total - out.len())
    }

    /// Always the reserved discovery universe, whatever the packet lists.
    fn multicast_key(&self) -> u16 {
        DISCOVERY_UNIVERSE
    }
}
