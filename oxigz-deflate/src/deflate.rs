//! The DEFLATE compressor driver.
//!
//! [`Compressor`] wires the pieces together: input bytes stream into the
//! [`SlidingWindow`], the hash-chained match finder turns them into tokens
//! with one-step lazy matching, and full batches go to the
//! [`BlockWriter`]. The container header is written at construction and the
//! footer by [`finish`](Compressor::finish).
//!
//! [`SimpleCompressor`] covers the two degenerate modes that skip the match
//! finder entirely: stored blocks and Huffman-only blocks.

use crate::block::BlockWriter;
use crate::container::{Container, Hasher};
use crate::hash_chain::HashChain;
use crate::token::{Token, MAX_DISTANCE};
use crate::window::SlidingWindow;
use oxigz_core::error::Result;
use std::io::{self, Read, Write};

/// Tokens per block batch; a full batch forces a block flush.
const MAX_TOKENS: usize = 32768;

/// Compression level, clamped to the supported range 4..=9.
///
/// Higher levels search longer hash chains and defer matches more
/// aggressively; see [`Compressor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Fastest compression (level 4).
    pub const FAST: Self = Self(4);
    /// Balanced default (level 6).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (level 9).
    pub const BEST: Self = Self(9);

    /// Create a level, clamping into 4..=9.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(4, 9))
    }

    /// The numeric level.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

/// Match-finder tuning derived from the compression level.
#[derive(Debug, Clone, Copy)]
struct LevelParams {
    /// Best length at which the chain budget is halved.
    good: usize,
    /// Match length taken immediately instead of deferring one step.
    lazy: usize,
    /// Match length that stops the chain walk outright.
    nice: usize,
    /// Maximum chain positions examined per search.
    chain: usize,
}

impl LevelParams {
    fn new(level: CompressionLevel) -> Self {
        let (good, lazy, nice, chain) = match level.level() {
            4 => (4, 4, 16, 16),
            5 => (8, 16, 32, 32),
            6 => (8, 16, 128, 128),
            7 => (8, 32, 128, 256),
            8 => (32, 128, 258, 1024),
            _ => (32, 258, 258, 4096),
        };
        Self {
            good,
            lazy,
            nice,
            chain,
        }
    }
}

/// How far a tokenize pass must drain the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flush {
    /// Keep a full lookahead; stop early.
    None,
    /// Drain everything, close the block, realign with an empty stored
    /// block.
    Sync,
    /// Drain everything and mark the block final.
    Final,
}

/// A single-stream DEFLATE compressor over any byte sink.
///
/// All buffers are allocated once at construction (roughly 400 KiB total)
/// and reused for the lifetime of the stream; the hot path does not
/// allocate. One instance handles exactly one stream: the container header
/// is emitted by [`new`](Self::new) and the footer by
/// [`finish`](Self::finish).
///
/// # Example
///
/// ```
/// use oxigz_deflate::{Compressor, Container, CompressionLevel};
///
/// let mut compressor = Compressor::new(
///     Container::Gzip,
///     Vec::new(),
///     CompressionLevel::DEFAULT,
/// ).unwrap();
/// compressor.write(b"Hello, World!").unwrap();
/// compressor.finish().unwrap();
/// let gzip_bytes = compressor.into_inner().unwrap();
/// assert_eq!(&gzip_bytes[..2], &[0x1F, 0x8B]);
/// ```
#[derive(Debug)]
pub struct Compressor<W: Write> {
    block: BlockWriter<W>,
    win: SlidingWindow,
    lookup: HashChain,
    tokens: Vec<Token>,
    level: LevelParams,
    container: Container,
    hasher: Hasher,
    /// Literal held back while a deferred match is pending.
    prev_literal: Option<u8>,
    /// Match deferred by one position for lazy evaluation.
    prev_match: Option<Token>,
}

impl<W: Write> Compressor<W> {
    /// Create a compressor and write the container header.
    pub fn new(container: Container, mut writer: W, level: CompressionLevel) -> Result<Self> {
        container.write_header(&mut writer)?;
        Ok(Self {
            block: BlockWriter::new(writer),
            win: SlidingWindow::new(),
            lookup: HashChain::new(),
            tokens: Vec::with_capacity(MAX_TOKENS),
            level: LevelParams::new(level),
            container,
            hasher: Hasher::new(container),
            prev_literal: None,
            prev_match: None,
        })
    }

    /// Compress all bytes from `reader` until it reports end of stream.
    ///
    /// May be called repeatedly and mixed with [`write`](Self::write);
    /// call [`finish`](Self::finish) to complete the stream.
    pub fn compress<R: Read>(&mut self, mut reader: R) -> Result<()> {
        loop {
            if self.win.writable().is_empty() {
                self.tokenize(Flush::None)?;
                self.slide();
                continue;
            }
            let buf = self.win.writable();
            let mut n = 0;
            loop {
                match reader.read(&mut buf[n..]) {
                    Ok(0) => break,
                    Ok(read) => {
                        n += read;
                        if n == buf.len() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            }
            let at_eof = n < buf.len();
            self.hasher.update(&buf[..n]);
            self.win.written(n);
            self.tokenize(Flush::None)?;
            if at_eof {
                return Ok(());
            }
        }
    }

    /// Compress a slice of input bytes.
    pub fn write(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            if self.win.writable().is_empty() {
                self.tokenize(Flush::None)?;
                self.slide();
                continue;
            }
            let buf = self.win.writable();
            let n = data.len().min(buf.len());
            buf[..n].copy_from_slice(&data[..n]);
            self.win.written(n);
            self.hasher.update(&data[..n]);
            data = &data[n..];
            self.tokenize(Flush::None)?;
        }
        Ok(())
    }

    /// Close the current block and byte-align the output with an empty
    /// stored block, so everything written so far is decompressible.
    pub fn flush(&mut self) -> Result<()> {
        self.tokenize(Flush::Sync)?;
        self.block.writer_mut().flush()?;
        Ok(())
    }

    /// Emit the final block and the container footer.
    pub fn finish(&mut self) -> Result<()> {
        self.tokenize(Flush::Final)?;
        self.container
            .write_footer(self.block.writer_mut(), &self.hasher)?;
        self.block.writer_mut().flush()?;
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.block.into_writer()
    }

    /// Turn window bytes into tokens until the lookahead runs short (or,
    /// when flushing, runs out), then close the block as requested.
    fn tokenize(&mut self, flush: Flush) -> Result<()> {
        let flushing = flush != Flush::None;
        while self.win.active_lookahead(flushing).is_some() {
            let pos = self.win.pos();
            let literal = self.win.byte_at(pos);
            let min_len = self.prev_match.map_or(0, |m| usize::from(m.length()));

            let step;
            if let Some(found) = self.find_match(pos, min_len) {
                // Strictly better than any pending match: the pending
                // literal goes out, the pending match is superseded.
                self.emit_prev_literal()?;
                if usize::from(found.length()) >= self.level.lazy {
                    step = self.emit_match(found)?;
                } else {
                    // Defer one step: the next position may hide a longer
                    // match starting there.
                    self.prev_literal = Some(literal);
                    self.prev_match = Some(found);
                    step = 1;
                }
            } else if let Some(pending) = self.prev_match.take() {
                // Nothing better one step later; commit the deferred
                // match. We already advanced one position past its start.
                step = self.emit_match(pending)? - 1;
            } else {
                self.emit_prev_literal()?;
                self.prev_literal = Some(literal);
                step = 1;
            }

            if step > 1 {
                // Index the positions the match jumps over; `pos` itself
                // was added during the search.
                self.lookup
                    .bulk_add(self.win.suffix(pos + 1), step - 1, (pos + 1) as u16);
            }
            self.win.advance(step);
        }

        if flushing {
            debug_assert!(self.prev_match.is_none());
            self.emit_prev_literal()?;
            self.flush_tokens(flush)?;
        }
        Ok(())
    }

    /// Walk the hash chain at `pos` for a match longer than `min_len`.
    fn find_match(&mut self, pos: usize, min_len: usize) -> Option<Token> {
        let mut len = min_len;
        let mut prev_pos = usize::from(self.lookup.add(self.win.suffix(pos), pos as u16));
        let mut best = None;

        let mut chain = self.level.chain;
        if len >= self.level.good {
            // The pending match is already good; spend half the effort on
            // beating it.
            chain >>= 1;
        }

        while prev_pos > 0 && chain > 0 {
            let distance = pos - prev_pos;
            if distance > MAX_DISTANCE {
                break;
            }
            let new_len = self.win.match_len(prev_pos, pos, len);
            if new_len > len {
                best = Some(Token::new_match(distance as u16, new_len as u16));
                if new_len >= self.level.nice {
                    return best;
                }
                len = new_len;
            }
            prev_pos = usize::from(self.lookup.prev(prev_pos as u16));
            chain -= 1;
        }
        best
    }

    fn emit_prev_literal(&mut self) -> Result<()> {
        if let Some(byte) = self.prev_literal.take() {
            self.add_token(Token::literal(byte))?;
        }
        Ok(())
    }

    /// Add a match token, dropping any deferred state it supersedes.
    /// Returns the match length as the advance step.
    fn emit_match(&mut self, m: Token) -> Result<usize> {
        self.add_token(m)?;
        self.prev_literal = None;
        self.prev_match = None;
        Ok(usize::from(m.length()))
    }

    fn add_token(&mut self, token: Token) -> Result<()> {
        self.tokens.push(token);
        if self.tokens.len() >= MAX_TOKENS {
            self.flush_tokens(Flush::None)?;
        }
        Ok(())
    }

    /// Hand the batch to the block writer, realign for sync flushes, and
    /// reset per-block state.
    fn flush_tokens(&mut self, flush: Flush) -> Result<()> {
        let eof = flush == Flush::Final;
        self.block
            .write(&self.tokens, eof, self.win.tokens_buffer())?;
        if flush == Flush::Sync {
            self.block.stored_block(&[], false)?;
        }
        if flush != Flush::None {
            self.block.flush_bits()?;
        }
        self.tokens.clear();
        self.win.mark_flushed();
        Ok(())
    }

    fn slide(&mut self) {
        let n = self.win.slide();
        self.lookup.slide(n as u16);
    }
}

/// Block strategy for [`SimpleCompressor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleStrategy {
    /// Copy input into stored blocks, no compression.
    Stored,
    /// Entropy-code literals only, no match finding.
    HuffmanOnly,
}

/// A compressor that never searches for matches.
///
/// Stored mode passes bytes through with 5 bytes of framing per 64 KiB;
/// Huffman-only mode entropy-codes each chunk's literals. Both produce
/// streams any DEFLATE decompressor accepts, under any container.
#[derive(Debug)]
pub struct SimpleCompressor<W: Write> {
    strategy: SimpleStrategy,
    block: BlockWriter<W>,
    container: Container,
    hasher: Hasher,
    buffer: Vec<u8>,
}

/// Per-block chunk size: the stored-block payload limit.
const SIMPLE_CHUNK: usize = 65535;

impl<W: Write> SimpleCompressor<W> {
    /// Create a compressor and write the container header.
    pub fn new(strategy: SimpleStrategy, container: Container, mut writer: W) -> Result<Self> {
        container.write_header(&mut writer)?;
        Ok(Self {
            strategy,
            block: BlockWriter::new(writer),
            container,
            hasher: Hasher::new(container),
            buffer: Vec::with_capacity(SIMPLE_CHUNK),
        })
    }

    /// Feed input bytes, emitting a block per full chunk.
    pub fn write(&mut self, mut data: &[u8]) -> Result<()> {
        self.hasher.update(data);
        while !data.is_empty() {
            let room = SIMPLE_CHUNK - self.buffer.len();
            let n = data.len().min(room);
            self.buffer.extend_from_slice(&data[..n]);
            data = &data[n..];
            if self.buffer.len() == SIMPLE_CHUNK {
                self.emit_block(false)?;
            }
        }
        Ok(())
    }

    /// Compress all bytes from `reader` until end of stream.
    pub fn compress<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut chunk = vec![0u8; 16384];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => self.write(&chunk[..n])?,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Emit the final block and the container footer.
    pub fn finish(&mut self) -> Result<()> {
        self.emit_block(true)?;
        self.block.flush_bits()?;
        self.container
            .write_footer(self.block.writer_mut(), &self.hasher)?;
        self.block.writer_mut().flush()?;
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.block.into_writer()
    }

    fn emit_block(&mut self, eof: bool) -> Result<()> {
        match self.strategy {
            SimpleStrategy::Stored => self.block.stored_block(&self.buffer, eof)?,
            SimpleStrategy::HuffmanOnly => self.block.write_block_huff(eof, &self.buffer)?,
        }
        self.buffer.clear();
        Ok(())
    }
}

/// Compress `data` into a freshly allocated buffer under `container`.
pub fn compress(
    container: Container,
    data: &[u8],
    level: impl Into<CompressionLevel>,
) -> Result<Vec<u8>> {
    let mut compressor = Compressor::new(container, Vec::new(), level.into())?;
    compressor.write(data)?;
    compressor.finish()?;
    compressor.into_inner()
}

/// Compress `data` as a raw DEFLATE stream.
pub fn deflate(data: &[u8], level: impl Into<CompressionLevel>) -> Result<Vec<u8>> {
    compress(Container::Raw, data, level)
}

/// Compress `data` into a zlib stream (RFC 1950).
pub fn zlib_compress(data: &[u8], level: impl Into<CompressionLevel>) -> Result<Vec<u8>> {
    compress(Container::Zlib, data, level)
}

/// Compress `data` into a gzip stream (RFC 1952).
pub fn gzip_compress(data: &[u8], level: impl Into<CompressionLevel>) -> Result<Vec<u8>> {
    compress(Container::Gzip, data, level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    fn inflate_raw(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        flate2::read::DeflateDecoder::new(data)
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_level_clamping() {
        assert_eq!(CompressionLevel::new(0).level(), 4);
        assert_eq!(CompressionLevel::new(6).level(), 6);
        assert_eq!(CompressionLevel::new(200).level(), 9);
        assert_eq!(CompressionLevel::default().level(), 6);
        assert_eq!(CompressionLevel::from(9), CompressionLevel::BEST);
    }

    #[test]
    fn test_roundtrip_simple() {
        let input = b"Hello, World! Hello, World! Hello, World!";
        let compressed = deflate(input, 6).unwrap();
        assert_eq!(inflate_raw(&compressed), input);
    }

    #[test]
    fn test_hello_world_gzip_stream() {
        let input = b"Hello, World!";
        let out = gzip_compress(input, CompressionLevel::DEFAULT).unwrap();

        assert_eq!(
            &out[..10],
            &[0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03]
        );
        assert!(out.len() <= 40, "expected <= 40 bytes, got {}", out.len());
        assert_eq!(gunzip(&out), input);

        // Footer: CRC-32 of the input, then ISIZE.
        let footer = &out[out.len() - 8..];
        let crc = u32::from_le_bytes(footer[..4].try_into().unwrap());
        let isize = u32::from_le_bytes(footer[4..].try_into().unwrap());
        assert_eq!(crc, oxigz_core::crc::Crc32::compute(input));
        assert_eq!(isize, 13);
    }

    #[test]
    fn test_empty_gzip_is_twenty_bytes() {
        let out = gzip_compress(b"", 6).unwrap();
        assert_eq!(out.len(), 20);
        // ISIZE = 0 and CRC = 0 in the footer.
        assert_eq!(&out[12..], &[0u8; 8]);
        assert_eq!(gunzip(&out), b"");
    }

    #[test]
    fn test_streaming_write_matches_one_shot() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 151) as u8).collect();
        let one_shot = gzip_compress(&data, 6).unwrap();

        let mut c = Compressor::new(Container::Gzip, Vec::new(), CompressionLevel::DEFAULT)
            .unwrap();
        for chunk in data.chunks(777) {
            c.write(chunk).unwrap();
        }
        c.finish().unwrap();
        let streamed = c.into_inner().unwrap();

        assert_eq!(one_shot, streamed);
    }

    #[test]
    fn test_compress_from_reader() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 63) as u8).collect();
        let mut c = Compressor::new(Container::Raw, Vec::new(), CompressionLevel::BEST).unwrap();
        c.compress(&data[..]).unwrap();
        c.finish().unwrap();
        let out = c.into_inner().unwrap();
        assert_eq!(inflate_raw(&out), data);
    }

    #[test]
    fn test_sync_flush_keeps_stream_valid() {
        let mut c = Compressor::new(Container::Raw, Vec::new(), CompressionLevel::DEFAULT)
            .unwrap();
        c.write(b"first part, first part, ").unwrap();
        c.flush().unwrap();
        c.write(b"second part, second part").unwrap();
        c.finish().unwrap();
        let out = c.into_inner().unwrap();
        assert_eq!(
            inflate_raw(&out),
            b"first part, first part, second part, second part"
        );
    }

    #[test]
    fn test_sync_flush_emits_empty_stored_block() {
        let mut c = Compressor::new(Container::Raw, Vec::new(), CompressionLevel::DEFAULT)
            .unwrap();
        c.write(b"abcabcabc").unwrap();
        c.flush().unwrap();
        let len_after_flush = {
            let out = c.block.writer_mut();
            out.len()
        };
        c.finish().unwrap();
        let out = c.into_inner().unwrap();
        // The flushed prefix ends with the 5-byte empty stored block.
        assert_eq!(&out[len_after_flush - 5..len_after_flush], &[0, 0, 0, 0xFF, 0xFF]);
        assert_eq!(inflate_raw(&out), b"abcabcabc");
    }

    #[test]
    fn test_repeated_input_compresses_hard() {
        let input = vec![b'x'; 100_000];
        let out = gzip_compress(&input, 6).unwrap();
        assert!(out.len() <= 200, "got {} bytes", out.len());
        assert_eq!(gunzip(&out), input);
    }

    #[test]
    fn test_all_levels_roundtrip() {
        let data: Vec<u8> = b"the quick brown fox jumps over the lazy dog. "
            .iter()
            .cycle()
            .take(20_000)
            .copied()
            .collect();
        for level in 4..=9u8 {
            let out = gzip_compress(&data, level).unwrap();
            assert_eq!(gunzip(&out), data, "level {}", level);
            assert!(out.len() < data.len() / 4, "level {}", level);
        }
    }

    #[test]
    fn test_simple_stored_roundtrip() {
        let data: Vec<u8> = (0..100_000u32)
            .map(|i| (i.wrapping_mul(2654435761)) as u8)
            .collect();
        let mut c =
            SimpleCompressor::new(SimpleStrategy::Stored, Container::Gzip, Vec::new()).unwrap();
        c.write(&data).unwrap();
        c.finish().unwrap();
        let out = c.into_inner().unwrap();
        // One full 65,535-byte chunk plus the final partial one, 5 bytes of
        // framing each, plus 18 bytes of gzip framing.
        assert_eq!(out.len(), data.len() + 2 * 5 + 18);
        assert_eq!(gunzip(&out), data);
    }

    #[test]
    fn test_simple_huffman_roundtrip() {
        let data: Vec<u8> = (0..80_000u32).map(|i| (i % 11) as u8 + b'a').collect();
        let mut c = SimpleCompressor::new(SimpleStrategy::HuffmanOnly, Container::Zlib, Vec::new())
            .unwrap();
        c.compress(&data[..]).unwrap();
        c.finish().unwrap();
        let out = c.into_inner().unwrap();
        assert!(out.len() < data.len());

        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(&out[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, data);
    }
}
