//! Extension packet decoding.
//!
//! The extension packet extends the event timestamps: it carries the number
//! of packets sent since the last reset and the coarse-counter value, in the
//! top 48 bits of a single control-frame payload.

use serde::{Deserialize, Serialize};

use crate::aurora::Frame;

use super::error::{DecodeError, DecodeResult};

mod constants {
    pub const PACKET_COUNT_SHIFT: u32 = 41;
    pub const PACKET_COUNT_MASK: u64 = 0x7F_FFFF;
    pub const COARSE_COUNTER_SHIFT: u32 = 17;
    pub const COARSE_COUNTER_MASK: u64 = 0xFF_FFFF;
    pub const RESET_SHIFT: u32 = 16;
}

/// Coarse-counter extension data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionPacket {
    /// Packets transmitted since the last reset, 23 bits
    packet_count: u32,
    /// Coarse-counter timestamp, 24 bits
    coarse_counter: u32,
    /// The coarse counter was reset after the previous packet
    reset: bool,
}

impl ExtensionPacket {
    /// Build a packet from already-decoded values.
    pub fn new(packet_count: u32, coarse_counter: u32, reset: bool) -> Self {
        Self {
            packet_count,
            coarse_counter,
            reset,
        }
    }

    /// Slice the fields out of a control-frame payload.
    pub fn from_payload(payload: u64) -> Self {
        use constants::*;

        Self {
            packet_count: ((payload >> PACKET_COUNT_SHIFT) & PACKET_COUNT_MASK) as u32,
            coarse_counter: ((payload >> COARSE_COUNTER_SHIFT) & COARSE_COUNTER_MASK) as u32,
            reset: (payload >> RESET_SHIFT) & 1 == 1,
        }
    }

    pub fn packet_count(&self) -> u32 {
        self.packet_count
    }

    pub fn coarse_counter(&self) -> u32 {
        self.coarse_counter
    }

    pub fn was_reset(&self) -> bool {
        self.reset
    }
}

impl TryFrom<&Frame> for ExtensionPacket {
    type Error = DecodeError;

    fn try_from(frame: &Frame) -> DecodeResult<Self> {
        match *frame {
            Frame::Control { payload, .. } => Ok(Self::from_payload(payload)),
            _ => Err(DecodeError::NotAControlFrame),
        }
    }
}
