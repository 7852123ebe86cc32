//! Length-limited canonical Huffman codes.
//!
//! [`HuffmanEncoder`] turns a symbol frequency vector into canonical codes
//! whose lengths never exceed a requested limit, minimizing the total
//! encoded bit count. The construction is a package-merge variant run as an
//! iterative ladder of per-length levels rather than an explicit tree;
//! each level consumes the cheaper of "next unused symbol" and "next pair
//! from the level below" until the top level has taken `2n − 4` items.
//!
//! Codes are stored bit-reversed: DEFLATE transmits Huffman codes most
//! significant code bit first inside an LSB-first bit stream, so reversing
//! once at assignment keeps emission to a single `write_bits`.

use crate::tables::{fixed_distance_lengths, fixed_litlen_lengths};
use std::sync::OnceLock;

/// Longest permitted code, and the ladder height bound.
const MAX_BITS_LIMIT: usize = 16;

/// A canonical Huffman code, pre-reversed for LSB-first emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCode {
    /// Code bits, reversed to width `len`.
    pub code: u16,
    /// Code length in bits; 0 for absent symbols.
    pub len: u8,
}

/// A symbol paired with its frequency, for sorting.
#[derive(Debug, Clone, Copy)]
struct LitNode {
    literal: u16,
    freq: u32,
}

/// Per-length state in the package-merge ladder.
#[derive(Debug, Clone, Copy, Default)]
struct LevelInfo {
    /// Frequency of the last item taken at this level.
    last_freq: u32,
    /// Frequency of the next unused symbol.
    next_char_freq: u32,
    /// Frequency of the next pair formed by the level below.
    next_pair_freq: u32,
    /// Items this level still has to produce.
    needed: i32,
}

/// Builds length-limited canonical Huffman codes from frequencies.
///
/// Scratch buffers are retained across calls so per-block regeneration does
/// not allocate.
#[derive(Debug)]
pub struct HuffmanEncoder {
    codes: Vec<HuffmanCode>,
    freq_cache: Vec<LitNode>,
    bit_count: [u32; MAX_BITS_LIMIT],
}

impl HuffmanEncoder {
    /// Create an encoder for an alphabet of `size` symbols.
    pub fn new(size: usize) -> Self {
        Self {
            codes: vec![HuffmanCode::default(); size],
            freq_cache: Vec::with_capacity(size + 1),
            bit_count: [0; MAX_BITS_LIMIT],
        }
    }

    /// Build an encoder directly from canonical code lengths.
    ///
    /// Used for the fixed RFC 1951 tables, where the lengths are prescribed
    /// rather than derived from frequencies.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let mut bl_count = [0u16; MAX_BITS_LIMIT];
        for &len in lengths {
            if len > 0 {
                bl_count[usize::from(len)] += 1;
            }
        }

        let mut next_code = [0u16; MAX_BITS_LIMIT];
        let mut code = 0u16;
        for bits in 1..MAX_BITS_LIMIT {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let mut codes = vec![HuffmanCode::default(); lengths.len()];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len > 0 {
                codes[symbol] = HuffmanCode {
                    code: reverse_bits(next_code[usize::from(len)], len),
                    len,
                };
                next_code[usize::from(len)] += 1;
            }
        }

        Self {
            codes,
            freq_cache: Vec::new(),
            bit_count: [0; MAX_BITS_LIMIT],
        }
    }

    /// The code assigned to `symbol`.
    #[inline]
    pub fn code(&self, symbol: usize) -> HuffmanCode {
        self.codes[symbol]
    }

    /// All codes, indexed by symbol.
    pub fn codes(&self) -> &[HuffmanCode] {
        &self.codes
    }

    /// Total bits needed to encode `freq` with the current codes.
    pub fn bit_length(&self, freq: &[u32]) -> usize {
        let mut total = 0;
        for (i, &f) in freq.iter().enumerate() {
            if f != 0 {
                total += f as usize * usize::from(self.codes[i].len);
            }
        }
        total
    }

    /// Generate codes for `freq` with lengths capped at `max_bits`.
    ///
    /// Zero-frequency symbols receive no code. With two or fewer symbols
    /// present, each simply gets a one-bit code.
    pub fn generate(&mut self, freq: &[u32], max_bits: usize) {
        debug_assert!(freq.len() <= self.codes.len());
        debug_assert!(max_bits < MAX_BITS_LIMIT);

        self.freq_cache.clear();
        for (i, &f) in freq.iter().enumerate() {
            if f != 0 {
                self.freq_cache.push(LitNode {
                    literal: i as u16,
                    freq: f,
                });
            } else {
                self.codes[i] = HuffmanCode::default();
            }
        }

        let count = self.freq_cache.len();
        if count <= 2 {
            for (i, node) in self.freq_cache.iter().enumerate() {
                self.codes[usize::from(node.literal)] = HuffmanCode {
                    code: i as u16,
                    len: 1,
                };
            }
            return;
        }

        self.freq_cache.sort_unstable_by_key(|n| (n.freq, n.literal));

        // A code cannot be longer than a degenerate left-leaning tree.
        let max_bits = max_bits.min(count - 1);

        // Sentinel so "next unused symbol" reads past the end stay cheap.
        self.freq_cache.push(LitNode {
            literal: u16::MAX,
            freq: u32::MAX,
        });
        self.bit_counts(max_bits);
        self.freq_cache.pop();

        self.assign(max_bits);
    }

    /// Run the package-merge ladder over the sorted symbol list (which
    /// carries a trailing sentinel), filling `self.bit_count[b]` with the
    /// number of symbols that get length `b`.
    fn bit_counts(&mut self, max_bits: usize) {
        let list = &self.freq_cache;
        let n = list.len() - 1;

        // One row per code length; +1 so the top level can signal upward.
        let mut levels = [LevelInfo::default(); MAX_BITS_LIMIT + 1];
        // leaf_counts[l][b]: symbols consumed as leaves at length >= b,
        // tracked by the level currently working at length l.
        let mut leaf_counts = [[0u32; MAX_BITS_LIMIT]; MAX_BITS_LIMIT];

        for level in 1..=max_bits {
            levels[level] = LevelInfo {
                last_freq: list[1].freq,
                next_char_freq: list[2].freq,
                next_pair_freq: list[0].freq + list[1].freq,
                needed: 0,
            };
            leaf_counts[level][level] = 2;
            if level == 1 {
                // Length-1 codes can only be leaves.
                levels[level].next_pair_freq = u32::MAX;
            }
        }
        levels[max_bits].needed = 2 * n as i32 - 4;

        let mut level = max_bits;
        loop {
            if levels[level].next_char_freq == u32::MAX
                && levels[level].next_pair_freq == u32::MAX
            {
                // Level exhausted; disable pair production for the level
                // above and hand control back to it.
                debug_assert!(level < max_bits);
                levels[level].needed = 0;
                levels[level + 1].next_pair_freq = u32::MAX;
                level += 1;
                continue;
            }

            let prev_freq = levels[level].last_freq;
            if levels[level].next_char_freq < levels[level].next_pair_freq {
                // Take a leaf.
                let leaves = leaf_counts[level][level] + 1;
                levels[level].last_freq = levels[level].next_char_freq;
                leaf_counts[level][level] = leaves;
                levels[level].next_char_freq = list[leaves as usize].freq;
            } else {
                // Take a pair from the level below; adopt its leaf counts
                // and require it to produce one more pair.
                levels[level].last_freq = levels[level].next_pair_freq;
                let (below, at) = leaf_counts.split_at_mut(level);
                at[0][..level].copy_from_slice(&below[level - 1][..level]);
                levels[level - 1].needed = 2;
            }

            levels[level].needed -= 1;
            if levels[level].needed == 0 {
                if level == max_bits {
                    break;
                }
                levels[level + 1].next_pair_freq = prev_freq + levels[level].last_freq;
                level += 1;
            } else {
                // Replenish any lower level we just made demands of.
                while level > 1 && levels[level - 1].needed > 0 {
                    level -= 1;
                }
            }
        }

        debug_assert_eq!(leaf_counts[max_bits][max_bits] as usize, n);

        self.bit_count = [0; MAX_BITS_LIMIT];
        let mut bits = 1;
        for level in (1..=max_bits).rev() {
            self.bit_count[bits] =
                leaf_counts[max_bits][level] - leaf_counts[max_bits][level - 1];
            bits += 1;
        }
    }

    /// Assign canonical codes from `bit_count`, shortest lengths to the
    /// most frequent symbols. Within one length, codes go to smaller symbol
    /// indices first.
    fn assign(&mut self, max_bits: usize) {
        let mut code = 0u16;
        let mut end = self.freq_cache.len();
        for bits in 0..=max_bits {
            code <<= 1;
            let count = self.bit_count[bits] as usize;
            if bits == 0 || count == 0 {
                continue;
            }
            // The most frequent remaining symbols sit at the tail of the
            // frequency-sorted list and receive the current (shortest
            // unassigned) length.
            let chunk = &mut self.freq_cache[end - count..end];
            chunk.sort_unstable_by_key(|n| n.literal);
            for node in chunk.iter() {
                self.codes[usize::from(node.literal)] = HuffmanCode {
                    code: reverse_bits(code, bits as u8),
                    len: bits as u8,
                };
                code += 1;
            }
            end -= count;
        }
    }
}

/// Reverse the low `len` bits of `value`.
#[inline]
fn reverse_bits(value: u16, len: u8) -> u16 {
    debug_assert!((1..=15).contains(&len));
    value.reverse_bits() >> (16 - len)
}

/// The fixed literal/length encoding (RFC 1951 section 3.2.6).
pub fn fixed_literal_encoding() -> &'static HuffmanEncoder {
    static ENC: OnceLock<HuffmanEncoder> = OnceLock::new();
    ENC.get_or_init(|| HuffmanEncoder::from_lengths(&fixed_litlen_lengths()))
}

/// The fixed distance encoding: 30 five-bit codes.
pub fn fixed_distance_encoding() -> &'static HuffmanEncoder {
    static ENC: OnceLock<HuffmanEncoder> = OnceLock::new();
    ENC.get_or_init(|| HuffmanEncoder::from_lengths(&fixed_distance_lengths()))
}

/// Distance encoding for blocks that carry no matches: a single one-bit
/// code for distance symbol 0, enough to transmit a well-formed distance
/// tree.
pub fn huff_distance_encoding() -> &'static HuffmanEncoder {
    static ENC: OnceLock<HuffmanEncoder> = OnceLock::new();
    ENC.get_or_init(|| {
        let mut freq = [0u32; 30];
        freq[0] = 1;
        let mut enc = HuffmanEncoder::new(30);
        enc.generate(&freq, 15);
        enc
    })
}
