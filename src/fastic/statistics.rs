//! Statistics packet decoding.
//!
//! The FastIC+ reports its drop counters in a statistics packet spread over
//! two consecutive control frames. The two 64-bit payloads are concatenated
//! (first frame high) and the counters sit MSB first in the top 96 bits of
//! the 128-bit word.

use serde::{Deserialize, Serialize};

use crate::aurora::Frame;

use super::error::{DecodeError, DecodeResult};

mod constants {
    pub const FIFO_DROP_SHIFT: u32 = 108;
    pub const FIFO_DROP_MASK: u128 = 0xF_FFFF;
    pub const PULSE_WIDTH_DROP_SHIFT: u32 = 88;
    pub const PULSE_WIDTH_DROP_MASK: u128 = 0xF_FFFF;
    pub const DARK_COUNT_DROP_SHIFT: u32 = 68;
    pub const DARK_COUNT_DROP_MASK: u128 = 0xF_FFFF;
    pub const TRIGGER_DROP_SHIFT: u32 = 48;
    pub const TRIGGER_DROP_MASK: u128 = 0xF_FFFF;
    pub const PULSE_ERROR_SHIFT: u32 = 32;
    pub const PULSE_ERROR_MASK: u128 = 0xFFFF;
}

/// Drop and error counters reported by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsPacket {
    /// Packets dropped from the FIFO
    fifo_drop: u32,
    /// Packets dropped for an out-of-range pulse width
    pulse_width_drop: u32,
    /// Dark-count drops (high-energy-resolution mode only)
    dark_count_drop: u32,
    /// Packets dropped for a malformed trigger pulse
    trigger_drop: u32,
    /// Malformed pulses seen (too many edges per clock period)
    pulse_error: u16,
}

impl StatisticsPacket {
    /// Build a packet from already-decoded counter values.
    pub fn new(
        fifo_drop: u32,
        pulse_width_drop: u32,
        dark_count_drop: u32,
        trigger_drop: u32,
        pulse_error: u16,
    ) -> Self {
        Self {
            fifo_drop,
            pulse_width_drop,
            dark_count_drop,
            trigger_drop,
            pulse_error,
        }
    }

    /// Slice the counters out of two consecutive control-frame payloads.
    pub fn from_payloads(first: u64, second: u64) -> Self {
        use constants::*;

        let joined = (first as u128) << 64 | second as u128;
        Self {
            fifo_drop: ((joined >> FIFO_DROP_SHIFT) & FIFO_DROP_MASK) as u32,
            pulse_width_drop: ((joined >> PULSE_WIDTH_DROP_SHIFT) & PULSE_WIDTH_DROP_MASK) as u32,
            dark_count_drop: ((joined >> DARK_COUNT_DROP_SHIFT) & DARK_COUNT_DROP_MASK) as u32,
            trigger_drop: ((joined >> TRIGGER_DROP_SHIFT) & TRIGGER_DROP_MASK) as u32,
            pulse_error: ((joined >> PULSE_ERROR_SHIFT) & PULSE_ERROR_MASK) as u16,
        }
    }

    /// Decode from two consecutive control frames.
    pub fn from_frames(first: &Frame, second: &Frame) -> DecodeResult<Self> {
        match (first, second) {
            (
                Frame::Control {
                    payload: first_payload,
                    ..
                },
                Frame::Control {
                    payload: second_payload,
                    ..
                },
            ) => Ok(Self::from_payloads(*first_payload, *second_payload)),
            _ => Err(DecodeError::NotAControlFrame),
        }
    }

    pub fn fifo_drop(&self) -> u32 {
        self.fifo_drop
    }

    pub fn pulse_width_drop(&self) -> u32 {
        self.pulse_width_drop
    }

    pub fn dark_count_drop(&self) -> u32 {
        self.dark_count_drop
    }

    pub fn trigger_drop(&self) -> u32 {
        self.trigger_drop
    }

    pub fn pulse_error(&self) -> u16 {
        self.pulse_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_slicing() {
        // Five distinct counters packed MSB first: 20+20+20+20+16 bits
        let joined: u128 = (0x12345u128 << 108)
            | (0x6789Au128 << 88)
            | (0xBCDEFu128 << 68)
            | (0x13579u128 << 48)
            | (0x2468u128 << 32);
        let first = (joined >> 64) as u64;
        let second = joined as u64;

        let packet = StatisticsPacket::from_payloads(first, second);
        assert_eq!(packet.fifo_drop(), 0x12345);
        assert_eq!(packet.pulse_width_drop(), 0x6789A);
        assert_eq!(packet.dark_count_drop(), 0xBCDEF);
        assert_eq!(packet.trigger_drop(), 0x13579);
        assert_eq!(packet.pulse_error(), 0x2468);
        assert_eq!(
            packet,
            StatisticsPacket::new(0x12345, 0x6789A, 0xBCDEF, 0x13579, 0x2468)
        );
    }

    #[test]
    fn test_all_ones_counters() {
        let packet = StatisticsPacket::from_payloads(u64::MAX, u64::MAX);
        assert_eq!(packet.fifo_drop(), 0xF_FFFF);
        assert_eq!(packet.pulse_width_drop(), 0xF_FFFF);
        assert_eq!(packet.dark_count_drop(), 0xF_FFFF);
        assert_eq!(packet.trigger_drop(), 0xF_FFFF);
        assert_eq!(packet.pulse_error(), 0xFFFF);
    }

    #[test]
    fn test_from_frames_requires_control() {
        let control = Frame::Control {
            btf: 0xD2,
            payload: 0,
        };
        assert!(StatisticsPacket::from_frames(&control, &control).is_ok());
        assert_eq!(
            StatisticsPacket::from_frames(&Frame::Data(0), &control),
            Err(DecodeError::NotAControlFrame)
        );
        assert_eq!(
            StatisticsPacket::from_frames(&control, &Frame::Error),
            Err(DecodeError::NotAControlFrame)
        );
    }
}
