//! Sliding input window.
//!
//! The compressor keeps a 64 KiB buffer: the lower half is history matches
//! may reference, the upper half is lookahead still being tokenized. Three
//! cursors track progress: `wp` (bytes written into the buffer), `rp`
//! (bytes consumed by the match finder), and `fp` (bytes already emitted in
//! finished blocks). When the read cursor nears the end of the buffer, the
//! upper 32 KiB are copied down and all cursors drop by 32 KiB.

use crate::token::{MAX_MATCH, MIN_MATCH};

/// History half of the buffer; the largest distance a match may span.
pub(crate) const HISTORY_SIZE: usize = 32768;

/// Total buffer size: history plus lookahead.
const BUFFER_LEN: usize = 2 * HISTORY_SIZE;

/// Lookahead required before tokenizing without a pending flush. Keeping a
/// full maximum match plus a minimum match ahead of `rp` means a match never
/// runs past `wp`.
const MIN_LOOKAHEAD: usize = MIN_MATCH + MAX_MATCH;

/// Read positions at or beyond this require a slide before more input.
const MAX_RP: usize = BUFFER_LEN - MIN_LOOKAHEAD;

/// The sliding window buffer with write/read/flush cursors.
#[derive(Debug)]
pub(crate) struct SlidingWindow {
    buffer: Vec<u8>,
    /// Write position: bytes below are valid input.
    wp: usize,
    /// Read position: bytes below are tokenized.
    rp: usize,
    /// Flush position: bytes below are in finished blocks. Negative after a
    /// slide drops part of the current block's raw bytes.
    fp: isize,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self {
            buffer: vec![0; BUFFER_LEN],
            wp: 0,
            rp: 0,
            fp: 0,
        }
    }

    /// Free buffer space for new input. Empty when the window must slide
    /// first.
    pub fn writable(&mut self) -> &mut [u8] {
        if self.rp >= MAX_RP {
            return &mut self.buffer[0..0];
        }
        &mut self.buffer[self.wp..]
    }

    /// Record that `n` bytes of [`writable`](Self::writable) were filled.
    pub fn written(&mut self, n: usize) {
        debug_assert!(self.wp + n <= BUFFER_LEN);
        self.wp += n;
    }

    /// Current read position.
    pub fn pos(&self) -> usize {
        self.rp
    }

    /// Byte at an absolute buffer position below `wp`.
    pub fn byte_at(&self, pos: usize) -> u8 {
        self.buffer[pos]
    }

    /// Untokenized bytes starting at `pos`, used to seed the hash chain.
    pub fn suffix(&self, pos: usize) -> &[u8] {
        &self.buffer[pos..self.wp]
    }

    /// The unread lookahead, if long enough to tokenize.
    ///
    /// Without a pending flush at least [`MIN_LOOKAHEAD`] bytes are required
    /// so a maximal match cannot overrun the input; with one, any non-empty
    /// lookahead is returned.
    pub fn active_lookahead(&self, flushing: bool) -> Option<&[u8]> {
        let min = if flushing { 0 } else { MIN_LOOKAHEAD };
        let lh = &self.buffer[self.rp..self.wp];
        (lh.len() > min).then_some(lh)
    }

    /// Advance the read position past tokenized bytes.
    pub fn advance(&mut self, n: usize) {
        debug_assert!(self.rp + n <= self.wp);
        self.rp += n;
    }

    /// Length of the common prefix of the data at `prev_pos` and `curr_pos`.
    ///
    /// Returns 0 unless the match reaches [`MIN_MATCH`]. With `min_len > 0`
    /// a candidate that cannot beat an existing match of that length is
    /// rejected with a single byte compare.
    pub fn match_len(&self, prev_pos: usize, curr_pos: usize, min_len: usize) -> usize {
        debug_assert!(prev_pos < curr_pos && curr_pos < self.wp);
        let max_len = (self.wp - curr_pos).min(MAX_MATCH);

        if min_len > 0 {
            if min_len >= max_len {
                return 0;
            }
            if self.buffer[prev_pos + min_len] != self.buffer[curr_pos + min_len] {
                return 0;
            }
        }

        let prev = &self.buffer[prev_pos..prev_pos + max_len];
        let curr = &self.buffer[curr_pos..curr_pos + max_len];
        let len = prev
            .iter()
            .zip(curr)
            .take_while(|(a, b)| a == b)
            .count();

        if len >= MIN_MATCH {
            len
        } else {
            0
        }
    }

    /// Drop the oldest 32 KiB of history: copy the upper half down and pull
    /// every cursor back by [`HISTORY_SIZE`]. Returns the slide amount for
    /// the hash chain.
    pub fn slide(&mut self) -> usize {
        debug_assert!(self.rp >= MAX_RP && self.wp >= self.rp);
        self.buffer.copy_within(HISTORY_SIZE..self.wp, 0);
        self.wp -= HISTORY_SIZE;
        self.rp -= HISTORY_SIZE;
        self.fp -= HISTORY_SIZE as isize;
        HISTORY_SIZE
    }

    /// Raw bytes of the block being built (`fp..rp`), or `None` if a slide
    /// discarded part of them since the last flush.
    pub fn tokens_buffer(&self) -> Option<&[u8]> {
        debug_assert!(self.fp <= self.rp as isize);
        if self.fp < 0 {
            return None;
        }
        Some(&self.buffer[self.fp as usize..self.rp])
    }

    /// Note that all tokens up to the read position were flushed.
    pub fn mark_flushed(&mut self) {
        self.fp = self.rp as isize;
    }
}
