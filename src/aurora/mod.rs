//! Aurora 64b/66b line layer.
//!
//! Each 66-bit frame carries a 2-bit sync header (`01` data, `10` control)
//! followed by 64 payload bits scrambled with the self-synchronous
//! polynomial x^58 + x^39 + 1. The raw capture is a buffer of 32-bit words,
//! MSB first, with the frame grid offset from the word grid by an unknown
//! bitslip in `0..64`.
//!
//! [`Receiver`] recovers the bitslip, walks the frame grid, descrambles and
//! classifies each frame. The lower-level pieces ([`extract`],
//! [`scrambler`], [`Frame`]) are exposed for callers that drive the grid
//! themselves.

pub mod extract;
pub mod frame;
pub mod receiver;
pub mod scrambler;

pub use extract::{frame_capacity, FRAME_BITS, PAYLOAD_BITS, WORD_BITS};
pub use frame::{Btf, Frame};
pub use receiver::{FrameIter, Receiver, ReceiverConfig};
pub use scrambler::{descramble, scramble};
