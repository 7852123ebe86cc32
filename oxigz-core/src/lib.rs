//! # OxiGz Core
//!
//! Core components for the OxiGz compression library.
//!
//! This crate provides the fundamental building blocks shared by the
//! encoder crates:
//!
//! - [`bitstream`]: Bit-level output for variable-length codes (Huffman)
//! - [`crc`]: CRC-32 checksum (gzip trailer)
//! - [`adler`]: Adler-32 checksum (zlib trailer)
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiGz is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Container                                           │
//! │     gzip / zlib / raw framing with running checksums    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE (LZ77 match finder + Huffman block coder)   │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitWriter, CRC-32, Adler-32                         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigz_core::bitstream::BitWriter;
//! use oxigz_core::crc::Crc32;
//!
//! let mut out = Vec::new();
//! let mut writer = BitWriter::new(&mut out);
//! writer.write_bits(0b101, 3).unwrap();
//! writer.flush().unwrap();
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adler;
pub mod bitstream;
pub mod crc;
pub mod error;

// Re-exports for convenience
pub use adler::Adler32;
pub use bitstream::BitWriter;
pub use crc::Crc32;
pub use error::{OxiGzError, Result};
