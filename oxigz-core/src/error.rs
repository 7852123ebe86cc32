//! Error types for OxiGz operations.
//!
//! The encoder can fail in two ways: the underlying reader or writer
//! reports an I/O error, or a caller violates the bit-stream alignment
//! contract. Clean end of input is *not* an error; it is signalled by
//! `Read::read` returning zero bytes.

use std::io;
use thiserror::Error;

/// The main error type for OxiGz operations.
#[derive(Debug, Error)]
pub enum OxiGzError {
    /// I/O error from the underlying reader/writer.
    ///
    /// Covers failed reads from the byte source and refused or short
    /// writes to the byte sink (`write_all` reports a short write as
    /// `ErrorKind::WriteZero`).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A byte-aligned write was requested while the bit register still
    /// holds a partial byte. Indicates a caller bug in block emission.
    #[error("byte write with {nbits} unflushed bits in the register")]
    UnfinishedBits {
        /// Number of bits pending in the register.
        nbits: u32,
    },
}

/// Result type alias for OxiGz operations.
pub type Result<T> = std::result::Result<T, OxiGzError>;

impl OxiGzError {
    /// Create an unfinished-bits error.
    pub fn unfinished_bits(nbits: u32) -> Self {
        Self::UnfinishedBits { nbits }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OxiGzError::unfinished_bits(5);
        assert!(err.to_string().contains("5 unflushed bits"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::WriteZero, "sink refused bytes");
        let err: OxiGzError = io_err.into();
        assert!(matches!(err, OxiGzError::Io(_)));
    }
}
