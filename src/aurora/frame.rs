//! Frame model: sync-header classification and control block types.

use serde::{Deserialize, Serialize};

/// Sync header values
mod constants {
    pub const SYNC_DATA: u8 = 0b01;
    pub const SYNC_CONTROL: u8 = 0b10;

    /// The Block Type Field occupies payload bits [63:56] of a control frame.
    pub const BTF_SHIFT: u32 = 56;
}

/// One decoded 66-bit frame.
///
/// The payload carried here is the descrambled 64-bit body; frames with an
/// invalid sync header (`00` or `11`) carry nothing and only contribute to
/// the receiver's error statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// Data frame (`01` header): one application word.
    Data(u64),
    /// Control frame (`10` header): BTF tag byte plus the full payload.
    Control { btf: u8, payload: u64 },
    /// Invalid sync header.
    Error,
}

impl Frame {
    /// Classify a frame from its sync bits and descrambled payload.
    pub fn from_parts(sync_bits: u8, payload: u64) -> Self {
        match sync_bits {
            constants::SYNC_DATA => Frame::Data(payload),
            constants::SYNC_CONTROL => Frame::Control {
                btf: (payload >> constants::BTF_SHIFT) as u8,
                payload,
            },
            _ => Frame::Error,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Frame::Data(_))
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Frame::Control { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error)
    }

    /// The 64-bit payload, if the header was valid.
    pub fn payload(&self) -> Option<u64> {
        match *self {
            Frame::Data(payload) => Some(payload),
            Frame::Control { payload, .. } => Some(payload),
            Frame::Error => None,
        }
    }
}

/// Block Type Field of a control frame.
///
/// The nine user K-blocks collapse into [`Btf::KBlock`]; anything outside
/// the table is reported as `None` by [`Btf::from_byte`] without affecting
/// frame classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Btf {
    /// Idle, not-ready or clock compensation
    Idle,
    /// Native Flow Control
    Nfc,
    /// User Flow Control
    Ufc,
    /// Separator
    Sep,
    /// Separator-7
    Sep7,
    /// User K-block 0..=8
    KBlock(u8),
    /// Reserved
    Reserved,
}

impl Btf {
    const K_BYTES: [u8; 9] = [0xD2, 0x99, 0x55, 0xB4, 0xCC, 0x66, 0x33, 0x4B, 0x87];

    /// Interpret a BTF byte. Returns `None` for bytes outside the table.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x78 => Some(Btf::Idle),
            0xAA => Some(Btf::Nfc),
            0x2D => Some(Btf::Ufc),
            0x1E => Some(Btf::Sep),
            0xE1 => Some(Btf::Sep7),
            0xFF => Some(Btf::Reserved),
            _ => Self::K_BYTES
                .iter()
                .position(|&k| k == byte)
                .map(|n| Btf::KBlock(n as u8)),
        }
    }

    /// The on-the-wire byte for this block type.
    pub fn byte(self) -> u8 {
        match self {
            Btf::Idle => 0x78,
            Btf::Nfc => 0xAA,
            Btf::Ufc => 0x2D,
            Btf::Sep => 0x1E,
            Btf::Sep7 => 0xE1,
            Btf::KBlock(n) => Self::K_BYTES[n as usize],
            Btf::Reserved => 0xFF,
        }
    }
}
