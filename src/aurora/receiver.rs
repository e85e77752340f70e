//! Aurora 64b/66b receiver: alignment search, frame iteration, facade.
//!
//! The receiver borrows a caller-owned buffer of 32-bit words and recovers
//! the 66-bit frame grid from it. [`Receiver::synchronize`] searches the 64
//! candidate bitslips for one whose sync headers pass an acceptance
//! threshold; [`Receiver::process`] then walks the grid, descrambles every
//! payload and collects typed [`Frame`]s.
//!
//! The buffer must not change while a receiver operation runs; the borrow
//! makes that a compile-time guarantee.

use tracing::{debug, warn};

use super::extract::{frame_capacity, payload, sync_bits};
use super::frame::Frame;
use super::scrambler::descramble;

/// Frames that must carry a valid header before a bitslip candidate is
/// worth counting over the whole sample window.
const PRUNE_FRAMES: usize = 5;

/// Alignment-search acceptance parameters.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverConfig {
    /// Percentage of sampled frames that must carry a valid sync header for
    /// a bitslip candidate to be accepted. Values above 100 are clamped.
    pub threshold_pct: u8,
    /// Number of frames inspected per candidate. Clamped to the buffer's
    /// word count at construction.
    pub sample_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            threshold_pct: 90,
            sample_size: 64,
        }
    }
}

/// Aurora 64b/66b receiver over a borrowed word buffer.
pub struct Receiver<'a> {
    words: &'a [u32],
    config: ReceiverConfig,
    sample_size: usize,
    threshold: usize,
    bitslip: u8,
    synced: bool,
    packets: Vec<Frame>,
    ber_percent: u8,
}

impl<'a> Receiver<'a> {
    /// Create a receiver over `words` with the given acceptance parameters.
    pub fn new(words: &'a [u32], config: ReceiverConfig) -> Self {
        let mut receiver = Self {
            words,
            config,
            sample_size: 0,
            threshold: 0,
            bitslip: 0,
            synced: false,
            packets: Vec::new(),
            ber_percent: 0,
        };
        receiver.recompute_window();
        receiver
    }

    /// Create a receiver with the default acceptance parameters.
    pub fn with_defaults(words: &'a [u32]) -> Self {
        Self::new(words, ReceiverConfig::default())
    }

    /// Re-point the receiver at a new buffer.
    ///
    /// The sample window is re-clamped to the new buffer; bitslip and sync
    /// state are kept as-is.
    pub fn set_buffer(&mut self, words: &'a [u32]) {
        self.words = words;
        self.recompute_window();
    }

    fn recompute_window(&mut self) {
        let pct = self.config.threshold_pct.min(100) as usize;
        self.sample_size = self.config.sample_size.min(self.words.len());
        self.threshold = self.sample_size * pct / 100;
    }

    /// Force a bitslip without running the alignment search. The value
    /// persists until the next [`Receiver::synchronize`] call.
    ///
    /// # Panics
    ///
    /// Panics if `bitslip` is not in `0..64`.
    pub fn force_bitslip(&mut self, bitslip: u8) {
        assert!(bitslip < 64, "bitslip {bitslip} out of range 0..64");
        self.bitslip = bitslip;
    }

    /// Current bitslip.
    pub fn bitslip(&self) -> u8 {
        self.bitslip
    }

    /// Whether the last alignment search succeeded.
    pub fn is_synchronized(&self) -> bool {
        self.synced
    }

    /// Header-error rate of the last [`Receiver::process`] pass, as an
    /// integer percentage of the frames walked.
    pub fn ber_percent(&self) -> u8 {
        self.ber_percent
    }

    /// Frames collected by the last [`Receiver::process`] pass.
    pub fn packet_buffer(&self) -> &[Frame] {
        &self.packets
    }

    fn has_valid_sync(&self, frame: usize) -> bool {
        matches!(sync_bits(self.words, self.bitslip, frame), 0b01 | 0b10)
    }

    /// Search the 64 candidate bitslips for frame alignment.
    ///
    /// Candidates are tried in ascending order; the first whose sync headers
    /// pass the acceptance threshold wins. A candidate must first show five
    /// valid headers in a row, which rejects most false grids cheaply. On
    /// failure the previous bitslip and sync flag are left untouched.
    pub fn synchronize(&mut self) -> bool {
        let previous_slip = self.bitslip;

        for slip in 0..64u8 {
            self.bitslip = slip;

            let capacity = frame_capacity(self.words.len(), slip);
            if capacity < PRUNE_FRAMES {
                continue;
            }
            if !(0..PRUNE_FRAMES).all(|k| self.has_valid_sync(k)) {
                continue;
            }

            let window = self.sample_size.min(capacity);
            let mut valid = PRUNE_FRAMES;
            if valid >= self.threshold {
                return self.accept_slip(slip, valid);
            }
            for frame in PRUNE_FRAMES..window {
                if self.has_valid_sync(frame) {
                    valid += 1;
                    if valid >= self.threshold {
                        return self.accept_slip(slip, valid);
                    }
                }
            }
        }

        self.bitslip = previous_slip;
        warn!(
            sample_size = self.sample_size,
            threshold = self.threshold,
            "alignment search failed, no bitslip candidate met the threshold"
        );
        false
    }

    fn accept_slip(&mut self, slip: u8, valid: usize) -> bool {
        debug!(bitslip = slip, valid, "alignment acquired");
        self.synced = true;
        true
    }

    /// Read and classify frame `index` on the current grid.
    ///
    /// Frame 0 has no predecessor to seed the descrambler, so it is returned
    /// with its raw, still-scrambled payload; its only use is to carry the
    /// register for frame 1.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the frame capacity of the buffer.
    pub fn frame(&self, index: usize) -> Frame {
        let sync = sync_bits(self.words, self.bitslip, index);
        let raw = payload(self.words, self.bitslip, index);
        let data = if index == 0 {
            raw
        } else {
            descramble(raw, payload(self.words, self.bitslip, index - 1))
        };
        Frame::from_parts(sync, data)
    }

    /// Iterate over every readable frame on the current grid.
    ///
    /// The first item is the seed frame (see [`Receiver::frame`]).
    pub fn frames(&self) -> FrameIter<'a> {
        FrameIter::new(self.words, self.bitslip)
    }

    /// Walk the whole buffer, collecting frames and the header-error rate.
    ///
    /// The seed frame counts toward the error statistic but is not stored.
    /// Control frames are dropped when `discard_control` is set. Any
    /// previously collected frames are discarded.
    pub fn process(&mut self, discard_control: bool) {
        self.packets.clear();

        let max_frames = frame_capacity(self.words.len(), self.bitslip);
        let mut errors = 0usize;

        for (index, frame) in FrameIter::new(self.words, self.bitslip).enumerate() {
            if frame.is_error() {
                errors += 1;
            }
            if index == 0 || (discard_control && frame.is_control()) {
                continue;
            }
            self.packets.push(frame);
        }

        self.ber_percent = (errors * 100 / (max_frames + 1)) as u8;
        debug!(
            frames = max_frames,
            collected = self.packets.len(),
            ber_percent = self.ber_percent,
            "processed receiver buffer"
        );
    }
}

/// Streaming frame reader; carries the descrambler register between frames.
pub struct FrameIter<'a> {
    words: &'a [u32],
    bitslip: u8,
    index: usize,
    capacity: usize,
    register: u64,
}

impl<'a> FrameIter<'a> {
    fn new(words: &'a [u32], bitslip: u8) -> Self {
        Self {
            words,
            bitslip,
            index: 0,
            capacity: frame_capacity(words.len(), bitslip),
            register: 0,
        }
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.index >= self.capacity {
            return None;
        }

        let sync = sync_bits(self.words, self.bitslip, self.index);
        let raw = payload(self.words, self.bitslip, self.index);
        let data = if self.index == 0 {
            raw
        } else {
            descramble(raw, self.register)
        };
        self.register = raw;
        self.index += 1;

        Some(Frame::from_parts(sync, data))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.capacity - self.index;
        (left, Some(left))
    }
}
