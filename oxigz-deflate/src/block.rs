//! DEFLATE block emission.
//!
//! [`BlockWriter`] receives a batch of tokens plus (when still available)
//! the raw bytes they were produced from, prices the block as stored, fixed
//! Huffman, and dynamic Huffman, and emits the cheapest form. Dynamic
//! blocks additionally carry their two code tables, run-length encoded over
//! the 19-symbol code-length alphabet and compressed with a third Huffman
//! code.

use crate::huffman::{
    fixed_distance_encoding, fixed_literal_encoding, huff_distance_encoding, HuffmanCode,
    HuffmanEncoder,
};
use crate::tables::{CODE_LENGTH_ORDER, DISTANCE_EXTRA_BITS, LENGTH_EXTRA_BITS};
use crate::token::{Token, TokenKind, END_BLOCK};
use oxigz_core::bitstream::BitWriter;
use oxigz_core::error::Result;
use std::io::Write;

/// Literal/length alphabet size.
const NUM_LITERALS: usize = 286;

/// Distance alphabet size.
const NUM_DISTANCES: usize = 30;

/// Code-length alphabet size.
const NUM_CODEGENS: usize = 19;

/// Largest payload of a single stored block.
const MAX_STORED_LEN: usize = 65535;

/// Terminator in the codegen scratch buffer; not a valid code length.
const END_CODEGEN: u8 = 255;

/// Encodes token batches as DEFLATE blocks into a bit stream.
///
/// All frequency tables and the codegen scratch buffer are owned and
/// reused; writing a block never allocates.
#[derive(Debug)]
pub(crate) struct BlockWriter<W: Write> {
    bits: BitWriter<W>,
    literal_freq: [u32; NUM_LITERALS],
    distance_freq: [u32; NUM_DISTANCES],
    codegen_freq: [u32; NUM_CODEGENS],
    /// RLE-encoded concatenation of both code-length vectors, interleaved
    /// with repeat counts and terminated by [`END_CODEGEN`].
    codegen: [u8; NUM_LITERALS + NUM_DISTANCES + 1],
    literal_encoding: HuffmanEncoder,
    distance_encoding: HuffmanEncoder,
    codegen_encoding: HuffmanEncoder,
}

impl<W: Write> BlockWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            bits: BitWriter::new(writer),
            literal_freq: [0; NUM_LITERALS],
            distance_freq: [0; NUM_DISTANCES],
            codegen_freq: [0; NUM_CODEGENS],
            codegen: [0; NUM_LITERALS + NUM_DISTANCES + 1],
            literal_encoding: HuffmanEncoder::new(NUM_LITERALS),
            distance_encoding: HuffmanEncoder::new(NUM_DISTANCES),
            codegen_encoding: HuffmanEncoder::new(NUM_CODEGENS),
        }
    }

    /// Direct access to the byte sink. Valid once the bit stream is
    /// flushed; used for container headers written before any block and
    /// trailers written after the last.
    pub fn writer_mut(&mut self) -> &mut W {
        self.bits.get_mut()
    }

    /// Byte-align and drain the bit stream.
    pub fn flush_bits(&mut self) -> Result<()> {
        self.bits.flush()
    }

    /// Consume the block writer and recover the byte sink, flushing any
    /// pending bits.
    pub fn into_writer(self) -> Result<W> {
        self.bits.into_inner()
    }

    /// Encode one block. `input` is the raw bytes covered by `tokens`, if
    /// the window still holds them; it enables the stored fallback.
    pub fn write(&mut self, tokens: &[Token], eof: bool, input: Option<&[u8]>) -> Result<()> {
        let (num_literals, num_distances) = self.index_tokens(tokens);
        let extra_bits = self.extra_bit_size();

        // Price the dynamic representation of this block.
        generate_codegen(
            &mut self.codegen,
            &mut self.codegen_freq,
            num_literals,
            num_distances,
            &self.literal_encoding,
            &self.distance_encoding,
        );
        self.codegen_encoding.generate(&self.codegen_freq, 7);
        let (dynamic_size, num_codegens) =
            self.dynamic_size(&self.literal_encoding, &self.distance_encoding, extra_bits);
        let fixed_size = self.fixed_size(extra_bits);

        let use_dynamic = dynamic_size < fixed_size;
        let size = if use_dynamic { dynamic_size } else { fixed_size };

        // Raw bytes win only when strictly smaller than the best Huffman
        // form.
        if let Some(raw) = input {
            if raw.len() <= MAX_STORED_LEN && (raw.len() + 5) * 8 < size {
                return self.stored_block(raw, eof);
            }
        }

        if use_dynamic {
            self.write_dynamic_header(num_literals, num_distances, num_codegens, eof)?;
            write_tokens(
                &mut self.bits,
                tokens,
                &self.literal_encoding,
                &self.distance_encoding,
            )
        } else {
            self.bits.write_bits(if eof { 3 } else { 2 }, 3)?;
            write_tokens(
                &mut self.bits,
                tokens,
                fixed_literal_encoding(),
                fixed_distance_encoding(),
            )
        }
    }

    /// Emit a stored block. An empty payload yields the 5-byte block used
    /// for sync flush alignment.
    pub fn stored_block(&mut self, input: &[u8], eof: bool) -> Result<()> {
        debug_assert!(input.len() <= MAX_STORED_LEN);
        self.bits.write_bits(u32::from(eof), 3)?;
        self.bits.flush()?;
        let len = input.len() as u32;
        self.bits.write_bits(len, 16)?;
        self.bits.write_bits(!len, 16)?;
        self.bits.write_bytes(input)
    }

    /// Emit a dynamic block of bare literals, no matches.
    ///
    /// Used when raw bytes should be entropy-coded without running the
    /// match finder. The distance tree degenerates to a single one-bit
    /// code that is transmitted but never used. Falls back to a stored
    /// block when that is smaller than the Huffman size plus a 1/16 margin.
    pub fn write_block_huff(&mut self, eof: bool, input: &[u8]) -> Result<()> {
        self.literal_freq.fill(0);
        for &byte in input {
            self.literal_freq[usize::from(byte)] += 1;
        }
        self.literal_freq[END_BLOCK] = 1;
        let num_literals = END_BLOCK + 1;

        self.distance_freq.fill(0);
        self.distance_freq[0] = 1;
        let num_distances = 1;

        self.literal_encoding.generate(&self.literal_freq, 15);
        generate_codegen(
            &mut self.codegen,
            &mut self.codegen_freq,
            num_literals,
            num_distances,
            &self.literal_encoding,
            huff_distance_encoding(),
        );
        self.codegen_encoding.generate(&self.codegen_freq, 7);
        let (size, num_codegens) =
            self.dynamic_size(&self.literal_encoding, huff_distance_encoding(), 0);

        if input.len() <= MAX_STORED_LEN && (input.len() + 5) * 8 < size + size / 16 {
            return self.stored_block(input, eof);
        }

        self.write_dynamic_header(num_literals, num_distances, num_codegens, eof)?;
        for &byte in input {
            let c = self.literal_encoding.code(usize::from(byte));
            self.bits.write_bits(u32::from(c.code), u32::from(c.len))?;
        }
        let c = self.literal_encoding.code(END_BLOCK);
        self.bits.write_bits(u32::from(c.code), u32::from(c.len))
    }

    /// Tally token frequencies and build the dynamic encodings.
    ///
    /// Returns the transmitted alphabet sizes: literals trimmed of trailing
    /// zeros but at least 257 (end-of-block always has frequency >= 1),
    /// distances at least 1 (a dummy distance keeps the tree encodable for
    /// match-free blocks).
    fn index_tokens(&mut self, tokens: &[Token]) -> (usize, usize) {
        self.literal_freq.fill(0);
        self.distance_freq.fill(0);

        for t in tokens {
            match t.kind() {
                TokenKind::Literal => {
                    self.literal_freq[usize::from(t.literal_byte())] += 1;
                }
                TokenKind::Match => {
                    self.literal_freq[usize::from(t.length_encoding().code)] += 1;
                    self.distance_freq[usize::from(t.distance_encoding().code)] += 1;
                }
            }
        }
        self.literal_freq[END_BLOCK] += 1;

        let mut num_literals = NUM_LITERALS;
        while self.literal_freq[num_literals - 1] == 0 {
            num_literals -= 1;
        }
        let mut num_distances = NUM_DISTANCES;
        while num_distances > 0 && self.distance_freq[num_distances - 1] == 0 {
            num_distances -= 1;
        }
        if num_distances == 0 {
            self.distance_freq[0] = 1;
            num_distances = 1;
        }

        self.literal_encoding.generate(&self.literal_freq, 15);
        self.distance_encoding.generate(&self.distance_freq, 15);

        (num_literals, num_distances)
    }

    /// Extra bits carried by match symbols, identical under fixed and
    /// dynamic coding.
    fn extra_bit_size(&self) -> usize {
        let mut total = 0;
        for (i, &f) in self.literal_freq[257..].iter().enumerate() {
            total += f as usize * usize::from(LENGTH_EXTRA_BITS[i]);
        }
        for (i, &f) in self.distance_freq.iter().enumerate() {
            total += f as usize * usize::from(DISTANCE_EXTRA_BITS[i]);
        }
        total
    }

    /// Bit size of the block body under the fixed tables, excluding the
    /// 3-bit block header.
    fn fixed_size(&self, extra_bits: usize) -> usize {
        fixed_literal_encoding().bit_length(&self.literal_freq)
            + fixed_distance_encoding().bit_length(&self.distance_freq)
            + extra_bits
    }

    /// Bit size of the dynamic representation (header fields, code-length
    /// table, body), excluding the 3-bit block header, plus the number of
    /// code-length-code lengths that must be transmitted.
    fn dynamic_size(
        &self,
        lit_enc: &HuffmanEncoder,
        dist_enc: &HuffmanEncoder,
        extra_bits: usize,
    ) -> (usize, usize) {
        let mut num_codegens = NUM_CODEGENS;
        while num_codegens > 4 && self.codegen_freq[CODE_LENGTH_ORDER[num_codegens - 1]] == 0 {
            num_codegens -= 1;
        }
        let header = 5 + 5 + 4
            + 3 * num_codegens
            + self.codegen_encoding.bit_length(&self.codegen_freq)
            + self.codegen_freq[16] as usize * 2
            + self.codegen_freq[17] as usize * 3
            + self.codegen_freq[18] as usize * 7;
        let size = header
            + lit_enc.bit_length(&self.literal_freq)
            + dist_enc.bit_length(&self.distance_freq)
            + extra_bits;
        (size, num_codegens)
    }

    /// Emit the dynamic block header: HLIT/HDIST/HCLEN, the permuted
    /// code-length-code lengths, then the RLE-coded code-length sequence.
    fn write_dynamic_header(
        &mut self,
        num_literals: usize,
        num_distances: usize,
        num_codegens: usize,
        eof: bool,
    ) -> Result<()> {
        self.bits.write_bits(if eof { 5 } else { 4 }, 3)?;
        self.bits.write_bits((num_literals - 257) as u32, 5)?;
        self.bits.write_bits((num_distances - 1) as u32, 5)?;
        self.bits.write_bits((num_codegens - 4) as u32, 4)?;

        for &sym in CODE_LENGTH_ORDER.iter().take(num_codegens) {
            let len = self.codegen_encoding.code(sym).len;
            self.bits.write_bits(u32::from(len), 3)?;
        }

        let mut i = 0;
        loop {
            let code = self.codegen[i];
            i += 1;
            if code == END_CODEGEN {
                break;
            }
            let c = self.codegen_encoding.code(usize::from(code));
            self.bits.write_bits(u32::from(c.code), u32::from(c.len))?;
            let repeat_bits = match code {
                16 => 2,
                17 => 3,
                18 => 7,
                _ => continue,
            };
            self.bits
                .write_bits(u32::from(self.codegen[i]), repeat_bits)?;
            i += 1;
        }
        Ok(())
    }
}

/// Emit every token through the given encodings, then the end-of-block
/// code.
fn write_tokens<W: Write>(
    bits: &mut BitWriter<W>,
    tokens: &[Token],
    lit_enc: &HuffmanEncoder,
    dist_enc: &HuffmanEncoder,
) -> Result<()> {
    for t in tokens {
        match t.kind() {
            TokenKind::Literal => {
                write_code(bits, lit_enc.code(usize::from(t.literal_byte())))?;
            }
            TokenKind::Match => {
                let le = t.length_encoding();
                write_code(bits, lit_enc.code(usize::from(le.code)))?;
                if le.extra_bits > 0 {
                    bits.write_bits(u32::from(le.extra_length), u32::from(le.extra_bits))?;
                }
                let de = t.distance_encoding();
                write_code(bits, dist_enc.code(usize::from(de.code)))?;
                if de.extra_bits > 0 {
                    bits.write_bits(u32::from(de.extra_distance), u32::from(de.extra_bits))?;
                }
            }
        }
    }
    write_code(bits, lit_enc.code(END_BLOCK))
}

#[inline]
fn write_code<W: Write>(bits: &mut BitWriter<W>, code: HuffmanCode) -> Result<()> {
    bits.write_bits(u32::from(code.code), u32::from(code.len))
}

/// Concatenate both code-length vectors and RLE-encode them over the
/// 19-symbol code-length alphabet, tallying symbol frequencies.
///
/// Runs of a non-zero length emit the length once, then code 16 ("repeat
/// previous 3-6 times") while at least three repeats remain. Zero runs use
/// code 18 (11-138 zeros) and code 17 (3-10 zeros); shorter zero runs are
/// emitted verbatim. The scratch buffer is terminated with
/// [`END_CODEGEN`].
fn generate_codegen(
    codegen: &mut [u8],
    codegen_freq: &mut [u32; NUM_CODEGENS],
    num_literals: usize,
    num_distances: usize,
    lit_enc: &HuffmanEncoder,
    dist_enc: &HuffmanEncoder,
) {
    codegen_freq.fill(0);

    // Lay out the raw lengths back to back; the RLE pass rewrites the
    // buffer in place, never getting ahead of its read cursor.
    for i in 0..num_literals {
        codegen[i] = lit_enc.code(i).len;
    }
    for i in 0..num_distances {
        codegen[num_literals + i] = dist_enc.code(i).len;
    }
    codegen[num_literals + num_distances] = END_CODEGEN;

    let mut size = codegen[0];
    let mut count: i32 = 1;
    let mut out = 0;
    let mut i = 1;
    while size != END_CODEGEN {
        let next_size = codegen[i];
        i += 1;
        if next_size == size {
            count += 1;
            continue;
        }

        if size != 0 {
            codegen[out] = size;
            out += 1;
            codegen_freq[usize::from(size)] += 1;
            count -= 1;
            while count >= 3 {
                let n = count.min(6);
                codegen[out] = 16;
                codegen[out + 1] = (n - 3) as u8;
                out += 2;
                codegen_freq[16] += 1;
                count -= n;
            }
        } else {
            while count >= 11 {
                let n = count.min(138);
                codegen[out] = 18;
                codegen[out + 1] = (n - 11) as u8;
                out += 2;
                codegen_freq[18] += 1;
                count -= n;
            }
            if count >= 3 {
                codegen[out] = 17;
                codegen[out + 1] = (count - 3) as u8;
                out += 2;
                codegen_freq[17] += 1;
                count = 0;
            }
        }

        count -= 1;
        while count >= 0 {
            codegen[out] = size;
            out += 1;
            codegen_freq[usize::from(size)] += 1;
            count -= 1;
        }

        size = next_size;
        count = 1;
    }
    codegen[out] = END_CODEGEN;
}
