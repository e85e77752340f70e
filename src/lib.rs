//! FASTIC-RS: Aurora 64b/66b receiver and packet decoder for the FastIC+ ASIC
//!
//! This crate recovers application packets from the raw bitstream produced by
//! a FastIC+ front-end over an Aurora 64b/66b serial link. The capture
//! hardware delivers 32-bit words; the 66-bit frame grid is generally not
//! aligned to the word grid, so decoding proceeds in two layers:
//!
//! - [`aurora`] - the line layer: word alignment (bitslip) search, frame
//!   extraction, self-synchronous descrambling and frame classification.
//! - [`fastic`] - the application layer: event, statistics and extension
//!   packet decoding with per-field parity checks.

pub mod aurora;
pub mod fastic;
