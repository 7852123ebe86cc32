//! Stream framing: gzip, zlib, or none.
//!
//! All three containers carry the same DEFLATE payload. Gzip (RFC 1952)
//! adds a 10-byte header and a CRC-32 + length trailer; zlib (RFC 1950)
//! adds a 2-byte header and a big-endian Adler-32 trailer; raw streams add
//! nothing.

use oxigz_core::adler::Adler32;
use oxigz_core::crc::Crc32;
use oxigz_core::error::Result;
use std::io::Write;

/// Fixed gzip header: magic, method 8 (deflate), no flags, mtime 0,
/// no extra flags, OS 3 (Unix).
const GZIP_HEADER: [u8; 10] = [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03];

/// Fixed zlib header: CMF 0x78 (deflate, 32 KiB window), FLG 0x9C
/// (default compression level, no dictionary, check bits making
/// `CMF * 256 + FLG` divisible by 31).
const ZLIB_HEADER: [u8; 2] = [0x78, 0x9C];

/// Which framing wraps the DEFLATE stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Bare DEFLATE, no header, footer, or checksum.
    Raw,
    /// Gzip framing with CRC-32 and length trailer (RFC 1952).
    Gzip,
    /// Zlib framing with Adler-32 trailer (RFC 1950).
    Zlib,
}

impl Container {
    /// Write the stream header.
    pub(crate) fn write_header<W: Write>(self, writer: &mut W) -> Result<()> {
        match self {
            Container::Raw => {}
            Container::Gzip => writer.write_all(&GZIP_HEADER)?,
            Container::Zlib => writer.write_all(&ZLIB_HEADER)?,
        }
        Ok(())
    }

    /// Write the stream footer from the finished checksum state.
    pub(crate) fn write_footer<W: Write>(self, writer: &mut W, hasher: &Hasher) -> Result<()> {
        match self {
            Container::Raw => {}
            Container::Gzip => {
                writer.write_all(&hasher.crc.value().to_le_bytes())?;
                writer.write_all(&hasher.isize().to_le_bytes())?;
            }
            Container::Zlib => {
                writer.write_all(&hasher.adler.finish().to_be_bytes())?;
            }
        }
        Ok(())
    }
}

/// Running checksum over the uncompressed input, matching the container's
/// trailer requirements.
#[derive(Debug)]
pub(crate) struct Hasher {
    container: Container,
    crc: Crc32,
    adler: Adler32,
    count: u64,
}

impl Hasher {
    pub fn new(container: Container) -> Self {
        Self {
            container,
            crc: Crc32::new(),
            adler: Adler32::new(),
            count: 0,
        }
    }

    /// Fold more input bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        match self.container {
            Container::Raw => {}
            Container::Gzip => {
                self.crc.update(data);
                self.count += data.len() as u64;
            }
            Container::Zlib => self.adler.update(data),
        }
    }

    /// Uncompressed length modulo 2^32 (the gzip ISIZE field).
    fn isize(&self) -> u32 {
        self.count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_header_bytes() {
        let mut out = Vec::new();
        Container::Gzip.write_header(&mut out).unwrap();
        assert_eq!(
            out,
            [0x1F, 0x8B, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03]
        );
    }

    #[test]
    fn test_zlib_header_check_bits() {
        let mut out = Vec::new();
        Container::Zlib.write_header(&mut out).unwrap();
        assert_eq!(out, [0x78, 0x9C]);
        let check = u32::from(out[0]) * 256 + u32::from(out[1]);
        assert_eq!(check % 31, 0);
    }

    #[test]
    fn test_raw_has_no_framing() {
        let mut out = Vec::new();
        Container::Raw.write_header(&mut out).unwrap();
        let hasher = Hasher::new(Container::Raw);
        Container::Raw.write_footer(&mut out, &hasher).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_gzip_footer_layout() {
        let mut hasher = Hasher::new(Container::Gzip);
        hasher.update(b"Hello, World!");

        let mut out = Vec::new();
        Container::Gzip.write_footer(&mut out, &hasher).unwrap();
        assert_eq!(out.len(), 8);
        assert_eq!(&out[..4], &0xEC4AC3D0u32.to_le_bytes());
        assert_eq!(&out[4..], &13u32.to_le_bytes());
    }

    #[test]
    fn test_gzip_isize_wraps_mod_2_32() {
        let mut hasher = Hasher::new(Container::Gzip);
        hasher.count = (1u64 << 32) + 42;
        assert_eq!(hasher.isize(), 42);
    }

    #[test]
    fn test_zlib_footer_is_big_endian_adler() {
        let mut hasher = Hasher::new(Container::Zlib);
        hasher.update(b"Hello");

        let mut out = Vec::new();
        Container::Zlib.write_footer(&mut out, &hasher).unwrap();
        assert_eq!(out, 0x058C01F5u32.to_be_bytes());
    }

    #[test]
    fn test_hasher_incremental_matches_one_shot() {
        let mut split = Hasher::new(Container::Gzip);
        split.update(b"Hello, ");
        split.update(b"World!");

        let mut whole = Hasher::new(Container::Gzip);
        whole.update(b"Hello, World!");

        assert_eq!(split.crc.value(), whole.crc.value());
        assert_eq!(split.count, whole.count);
    }
}
