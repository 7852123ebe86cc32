//! # OxiGz Deflate
//!
//! Pure Rust DEFLATE compressor (RFC 1951) with gzip (RFC 1952), zlib
//! (RFC 1950), and raw stream framing.
//!
//! The encoder runs a hash-chained LZ77 match finder with one-step lazy
//! matching over a 32 KiB sliding window, builds optimal length-limited
//! Huffman codes per block, and picks the cheapest of stored, fixed, and
//! dynamic block encodings bit for bit.
//!
//! ## Example
//!
//! ```rust
//! use oxigz_deflate::gzip_compress;
//!
//! let data = b"Hello, World! Hello, World!";
//! let compressed = gzip_compress(data, 6).unwrap();
//! assert_eq!(&compressed[..2], &[0x1F, 0x8B]);
//! ```
//!
//! ## Streaming
//!
//! ```rust
//! use oxigz_deflate::{Compressor, Container, CompressionLevel};
//!
//! let mut compressor = Compressor::new(
//!     Container::Zlib,
//!     Vec::new(),
//!     CompressionLevel::BEST,
//! ).unwrap();
//! compressor.write(b"some ").unwrap();
//! compressor.write(b"more data").unwrap();
//! compressor.finish().unwrap();
//! let zlib_bytes = compressor.into_inner().unwrap();
//! assert_eq!(zlib_bytes[0], 0x78);
//! ```
//!
//! ## Compression Levels
//!
//! Levels 4-9 trade speed for ratio by tuning the match finder's chain
//! depth and lazy-matching thresholds. [`CompressionLevel::FAST`] (4),
//! [`CompressionLevel::DEFAULT`] (6), and [`CompressionLevel::BEST`] (9)
//! name the usual choices. [`SimpleCompressor`] additionally offers
//! stored-only and Huffman-only strategies that skip match finding.
//!
//! Decompression is out of scope; any RFC 1951 decoder reads the output.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod block;
pub mod container;
pub mod deflate;
mod hash_chain;
pub mod huffman;
pub mod tables;
pub mod token;
mod window;

// Re-exports
pub use container::Container;
pub use deflate::{
    compress, deflate, gzip_compress, zlib_compress, CompressionLevel, Compressor,
    SimpleCompressor, SimpleStrategy,
};
pub use huffman::{HuffmanCode, HuffmanEncoder};
pub use token::Token;
