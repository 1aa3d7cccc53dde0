use bytes::BufMut;

use super::packet::{
    flags_and_length, is_valid_universe, put_root_layer, window, Cid, Packet, PacketKind,
    ROOT_LAYER_LENGTH, VECTOR_ROOT_E131_EXTENDED,
};
use crate::error::{constants, Result, SacnError};

const VECTOR_E131_EXTENDED_SYNCHRONIZATION: u32 = 0x0000_0001;

/// Total length of a synchronization packet
pub const SYNCHRONIZATION_PACKET_LENGTH: usize = ROOT_LAYER_LENGTH + 11;

/// Tells receivers to act on data they have buffered for `sync_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynchronizationPacket {
    pub cid: Cid,
    pub sequence: u8,
    pub sync_address: u16,
}

impl SynchronizationPacket {
    pub fn new(cid: Cid, sync_address: u16) -> Self {
        Self {
            cid,
            sequence: 0,
            sync_address,
        }
    }

    pub fn with_sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_universe(self.sync_address) {
            return Err(SacnError::invalid_packet(
                constants::ERR_SYNC_ADDRESS_RANGE,
            ));
        }
        Ok(())
    }
}

impl Packet for SynchronizationPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::Synchronization
    }

    fn length(&self) -> usize {
        SYNCHRONIZATION_PACKET_LENGTH
    }

    fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.validate()?;
        let total = self.length();
        let mut out = window(buf, total)?;

        put_root_layer(&mut out, total, VECTOR_ROOT_E131_EXTENDED, &self.cid);
        out.put_u16(flags_and_length(total - ROOT_LAYER_LENGTH));
        out.put_u32(VECTOR_E131_EXTENDED_SYNCHRONIZATION);
        out.put_u8(self.sequence);
        out.put_u16(self.sync_address);
        // reserved
        out.put_u16(0);

        Ok(total - out.len())
    }

    fn multicast_key(&self) -> u16 {
        self.sync_address
    }
}
