//! Event packet decoding.
//!
//! An event packet rides in one data frame. The FastIC+ sends its fields
//! MSB first, so they occupy the top 48 bits of the 64-bit payload; the low
//! 16 bits are unused. Every field carries an even-parity bit, and a
//! combined bit covers the four per-field parities.
//!
//! # Payload layout (bit 63 = first bit on the bus)
//!
//! | Bits    | Field                     |
//! |---------|---------------------------|
//! | 63..60  | channel                   |
//! | 59..58  | type (channel mode)       |
//! | 57..36  | timestamp (ToA)           |
//! | 35..22  | pulse width (ToT)         |
//! | 21      | debug flag                |
//! | 20..17  | per-field parity bits     |
//! | 16      | combined parity           |

use serde::{Deserialize, Serialize};

use crate::aurora::Frame;

use super::error::{DecodeError, DecodeResult};

mod constants {
    pub const CHANNEL_SHIFT: u32 = 60;
    pub const CHANNEL_MASK: u64 = 0xF;
    pub const TYPE_SHIFT: u32 = 58;
    pub const TYPE_MASK: u64 = 0x3;
    pub const TIMESTAMP_SHIFT: u32 = 36;
    pub const TIMESTAMP_MASK: u64 = 0x3F_FFFF;
    pub const PULSE_WIDTH_SHIFT: u32 = 22;
    pub const PULSE_WIDTH_MASK: u64 = 0x3FFF;
    pub const DEBUG_SHIFT: u32 = 21;
    pub const CHANNEL_PARITY_SHIFT: u32 = 20;
    pub const TYPE_PARITY_SHIFT: u32 = 19;
    pub const TIMESTAMP_PARITY_SHIFT: u32 = 18;
    pub const PULSE_WIDTH_PARITY_SHIFT: u32 = 17;
    pub const COMBINED_PARITY_SHIFT: u32 = 16;
}

/// Detection channel: eight SiPM inputs plus the trigger input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Ch0 = 0b0000,
    Ch1 = 0b0001,
    Ch2 = 0b0010,
    Ch3 = 0b0011,
    Ch4 = 0b0100,
    Ch5 = 0b0101,
    Ch6 = 0b0110,
    Ch7 = 0b0111,
    Trigger = 0b1000,
}

impl Channel {
    /// Decode the 4-bit channel field. Patterns above TRIGGER are invalid.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b0000 => Some(Channel::Ch0),
            0b0001 => Some(Channel::Ch1),
            0b0010 => Some(Channel::Ch2),
            0b0011 => Some(Channel::Ch3),
            0b0100 => Some(Channel::Ch4),
            0b0101 => Some(Channel::Ch5),
            0b0110 => Some(Channel::Ch6),
            0b0111 => Some(Channel::Ch7),
            0b1000 => Some(Channel::Trigger),
            _ => None,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Channel acquisition mode carried in the type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// ToA + non-linear ToT (high speed)
    ToaAndNonlinearTot = 0b00,
    /// ToA only
    ToaOnly = 0b01,
    /// Linear ToT only (hybrid)
    LinearTotOnly = 0b10,
    /// ToA + linear ToT (high energy resolution)
    ToaAndLinearTot = 0b11,
}

impl EventKind {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => EventKind::ToaAndNonlinearTot,
            0b01 => EventKind::ToaOnly,
            0b10 => EventKind::LinearTotOnly,
            _ => EventKind::ToaAndLinearTot,
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// A field value together with the outcome of its parity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checked<T> {
    pub value: T,
    pub parity_ok: bool,
}

/// Even parity of a field: 1 when the popcount is odd.
fn parity(value: u64) -> bool {
    value.count_ones() % 2 == 1
}

/// One decoded event packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPacket {
    raw: u64,
    channel: Channel,
}

impl EventPacket {
    /// Assemble an event packet from field values, computing all parity bits.
    ///
    /// Field values wider than their slot are truncated to it.
    pub fn new(
        channel: Channel,
        kind: EventKind,
        timestamp: u32,
        pulse_width: u16,
        debug: bool,
    ) -> Self {
        use constants::*;

        let channel_bits = channel.bits() as u64 & CHANNEL_MASK;
        let kind_bits = kind.bits() as u64 & TYPE_MASK;
        let timestamp = timestamp as u64 & TIMESTAMP_MASK;
        let pulse_width = pulse_width as u64 & PULSE_WIDTH_MASK;

        let channel_parity = parity(channel_bits);
        let kind_parity = parity(kind_bits);
        let timestamp_parity = parity(timestamp);
        let pulse_width_parity = parity(pulse_width);
        let combined = channel_parity ^ kind_parity ^ timestamp_parity ^ pulse_width_parity;

        let raw = channel_bits << CHANNEL_SHIFT
            | kind_bits << TYPE_SHIFT
            | timestamp << TIMESTAMP_SHIFT
            | pulse_width << PULSE_WIDTH_SHIFT
            | (debug as u64) << DEBUG_SHIFT
            | (channel_parity as u64) << CHANNEL_PARITY_SHIFT
            | (kind_parity as u64) << TYPE_PARITY_SHIFT
            | (timestamp_parity as u64) << TIMESTAMP_PARITY_SHIFT
            | (pulse_width_parity as u64) << PULSE_WIDTH_PARITY_SHIFT
            | (combined as u64) << COMBINED_PARITY_SHIFT;

        Self { raw, channel }
    }

    /// Decode an event packet from a descrambled data-frame payload.
    pub fn from_payload(raw: u64) -> DecodeResult<Self> {
        let bits = ((raw >> constants::CHANNEL_SHIFT) & constants::CHANNEL_MASK) as u8;
        let channel = Channel::from_bits(bits).ok_or(DecodeError::InvalidChannel { bits })?;
        Ok(Self { raw, channel })
    }

    /// The full 64-bit payload.
    pub fn raw(&self) -> u64 {
        self.raw
    }

    fn stored_bit(&self, shift: u32) -> bool {
        (self.raw >> shift) & 1 == 1
    }

    /// Channel the event was detected on.
    pub fn channel(&self) -> Checked<Channel> {
        Checked {
            value: self.channel,
            parity_ok: parity(self.channel.bits() as u64)
                == self.stored_bit(constants::CHANNEL_PARITY_SHIFT),
        }
    }

    /// Acquisition mode of the channel.
    pub fn kind(&self) -> Checked<EventKind> {
        let bits = ((self.raw >> constants::TYPE_SHIFT) & constants::TYPE_MASK) as u8;
        Checked {
            value: EventKind::from_bits(bits),
            parity_ok: parity(bits as u64) == self.stored_bit(constants::TYPE_PARITY_SHIFT),
        }
    }

    /// Time of arrival, 22 bits.
    pub fn timestamp(&self) -> Checked<u32> {
        let value = (self.raw >> constants::TIMESTAMP_SHIFT) & constants::TIMESTAMP_MASK;
        Checked {
            value: value as u32,
            parity_ok: parity(value) == self.stored_bit(constants::TIMESTAMP_PARITY_SHIFT),
        }
    }

    /// Time over threshold, 14 bits.
    pub fn pulse_width(&self) -> Checked<u16> {
        let value = (self.raw >> constants::PULSE_WIDTH_SHIFT) & constants::PULSE_WIDTH_MASK;
        Checked {
            value: value as u16,
            parity_ok: parity(value) == self.stored_bit(constants::PULSE_WIDTH_PARITY_SHIFT),
        }
    }

    /// Debug flag.
    pub fn debug(&self) -> bool {
        self.stored_bit(constants::DEBUG_SHIFT)
    }

    /// Check the combined parity: the XOR of the four per-field parity bits
    /// must equal the combined bit.
    pub fn has_valid_parity(&self) -> bool {
        let fields = self.stored_bit(constants::CHANNEL_PARITY_SHIFT)
            ^ self.stored_bit(constants::TYPE_PARITY_SHIFT)
            ^ self.stored_bit(constants::TIMESTAMP_PARITY_SHIFT)
            ^ self.stored_bit(constants::PULSE_WIDTH_PARITY_SHIFT);
        fields == self.stored_bit(constants::COMBINED_PARITY_SHIFT)
    }
}

impl TryFrom<&Frame> for EventPacket {
    type Error = DecodeError;

    fn try_from(frame: &Frame) -> DecodeResult<Self> {
        match *frame {
            Frame::Data(payload) => Self::from_payload(payload),
            _ => Err(DecodeError::NotADataFrame),
        }
    }
}
