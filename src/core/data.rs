//! E1.31 data packet carrying DMX512 slot values for one universe.

use bytes::BufMut;

use super::packet::{
    check_source_name, flags_and_length, is_valid_universe, put_root_layer, put_source_name,
    window, Cid, Packet, PacketKind, ROOT_LAYER_LENGTH, SOURCE_NAME_LENGTH,
    VECTOR_ROOT_E131_DATA,
};
use crate::error::{constants, Result, SacnError};

/// Maximum number of slot values after the start code
pub const MAX_SLOTS: usize = 512;

/// Default source priority
pub const DEFAULT_PRIORITY: u8 = 100;

/// Highest valid source priority
pub const MAX_PRIORITY: u8 = 200;

/// Start code for plain dimmer data
pub const NULL_START_CODE: u8 = 0x00;

const VECTOR_E131_DATA_PACKET: u32 = 0x0000_0002;
const VECTOR_DMP_SET_PROPERTY: u8 = 0x02;
const DMP_ADDRESS_TYPE: u8 = 0xA1;

const OPTION_PREVIEW: u8 = 0x80;
const OPTION_STREAM_TERMINATED: u8 = 0x40;
const OPTION_FORCE_SYNCHRONIZATION: u8 = 0x20;

// vector(4) + source name + priority(1) + sync address(2) + sequence(1) + options(1) + universe(2)
const FRAMING_LAYER_LENGTH: usize = 2 + 4 + SOURCE_NAME_LENGTH + 1 + 2 + 1 + 1 + 2;
// flags(2) + vector(1) + address type(1) + first address(2) + increment(2) + count(2) + start code(1)
const DMP_HEADER_LENGTH: usize = 2 + 1 + 1 + 2 + 2 + 2 + 1;

/// A data packet: DMX512 levels for a single universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub cid: Cid,
    pub source_name: String,
    pub priority: u8,
    /// Universe this data waits on before output; 0 means unsynchronized
    pub sync_address: u16,
    pub sequence: u8,
    pub preview: bool,
    pub stream_terminated: bool,
    pub force_synchronization: bool,
    pub universe: u16,
    pub start_code: u8,
    pub values: Vec<u8>,
}

impl DataPacket {
    /// Create a data packet at default priority with a null start code
    pub fn new(
        cid: Cid,
        source_name: impl Into<String>,
        universe: u16,
        values: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            cid,
            source_name: source_name.into(),
            priority: DEFAULT_PRIORITY,
            sync_address: 0,
            sequence: 0,
            preview: false,
            stream_terminated: false,
            force_synchronization: false,
            universe,
            start_code: NULL_START_CODE,
            values: values.into(),
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_sync_address(mut self, sync_address: u16) -> Self {
        self.sync_address = sync_address;
        self
    }

    pub fn with_start_code(mut self, start_code: u8) -> Self {
        self.start_code = start_code;
        self
    }

    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn with_stream_terminated(mut self, terminated: bool) -> Self {
        self.stream_terminated = terminated;
        self
    }

    pub fn with_force_synchronization(mut self, force: bool) -> Self {
        self.force_synchronization = force;
        self
    }

    /// Options byte as it appears on the wire
    pub fn options(&self) -> u8 {
        let mut options = 0;
        if self.preview {
            options |= OPTION_PREVIEW;
        }
        if self.stream_terminated {
            options |= OPTION_STREAM_TERMINATED;
        }
        if self.force_synchronization {
            options |= OPTION_FORCE_SYNCHRONIZATION;
        }
        options
    }

    /// Check every field against the E1.31 ranges
    pub fn validate(&self) -> Result<()> {
        if !is_valid_universe(self.universe) {
            return Err(SacnError::invalid_packet(constants::ERR_UNIVERSE_RANGE));
        }
        if self.sync_address != 0 && !is_valid_universe(self.sync_address) {
            return Err(SacnError::invalid_packet(
                constants::ERR_SYNC_ADDRESS_RANGE,
            ));
        }
        if self.priority > MAX_PRIORITY {
            return Err(SacnError::invalid_packet(constants::ERR_PRIORITY_RANGE));
        }
        if self.values.len() > MAX_SLOTS {
            return Err(SacnError::invalid_packet(constants::ERR_TOO_MANY_SLOTS));
        }
        check_source_name(&self.source_name)
    }
}

impl Packet for DataPacket {
    fn kind(&self) -> PacketKind {
        PacketKind::Data
    }

    fn length(&self) -> usize {
        ROOT_LAYER_LENGTH + FRAMING_LAYER_LENGTH + DMP_HEADER_LENGTH + self.values.len()
    }

    fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
        self.validate()?;
        let total = self.length();
        let mut out = window(buf, total)?;

        put_root_layer(&mut out, total, VECTOR_ROOT_E131_DATA, &self.cid);

        out.put_u16(flags_and_length(total - ROOT_LAYER_LENGTH));
        out.put_u32(VECTOR_E131_DATA_PACKET);
        put_source_name(&mut out, &self.source_name);
        out.put_u8(self.priority);
        out.put_u16(self.sync_address);
        out.put_u8(self.sequence);
        out.put_u8(self.options());
        out.put_u16(self.universe);

        out.put_u16(flags_and_length(
            total - ROOT_LAYER_LENGTH - FRAMING_LAYER_LENGTH,
        ));
        out.put_u8(VECTOR_DMP_SET_PROPERTY);
        out.put_u8(DMP_ADDRESS_TYPE);
        out.put_u16(0x0000);
        out.put_u16(0x0001);
        // property count includes the start code
        out.put_u16(self.values.len() as u16 + 1);
        out.put_u8(self.start_code);
        out.put_slice(&self.values);

        Ok(total - out.len())
    }

    fn multicast_key(&self) -> u16 {
        self.universe
    }
}
