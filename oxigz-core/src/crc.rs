//! CRC-32 (ISO 3309) checksum.
//!
//! This is the CRC used by the gzip trailer (and by ZIP and PNG). The
//! implementation uses the "slicing-by-8" technique for runs of 16 bytes
//! or more, processing 8 input bytes per step against 8 pre-computed
//! tables; shorter inputs take a single-table byte loop.
//!
//! Note that the x86_64 SSE4.2 `crc32` instruction uses the Castagnoli
//! polynomial, not the ISO 3309 polynomial gzip requires, so a software
//! implementation is used unconditionally.

/// CRC-32 lookup table (polynomial 0xEDB88320, reflected).
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB88320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Slicing-by-8 tables; table 0 is [`CRC32_TABLE`], each further table
/// advances the CRC one more byte.
const CRC32_TABLE_SLICE: [[u32; 256]; 8] = {
    let mut tables = [[0u32; 256]; 8];
    tables[0] = CRC32_TABLE;
    let mut t = 1;
    while t < 8 {
        let mut i = 0usize;
        while i < 256 {
            let prev = tables[t - 1][i];
            tables[t][i] = tables[0][(prev & 0xFF) as usize] ^ (prev >> 8);
            i += 1;
        }
        t += 1;
    }
    tables
};

/// CRC-32 calculator (ISO 3309).
///
/// - Polynomial: 0x04C11DB7 (reflected: 0xEDB88320)
/// - Initial value: 0xFFFFFFFF
/// - Final XOR: 0xFFFFFFFF
/// - Reflected input and output
///
/// # Example
///
/// ```
/// use oxigz_core::crc::Crc32;
///
/// let mut crc = Crc32::new();
/// crc.update(b"Hello, World!");
/// assert_eq!(crc.finalize(), 0xEC4AC3D0);
/// ```
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    /// Create a new CRC-32 calculator.
    pub fn new() -> Self {
        Self { crc: 0xFFFFFFFF }
    }

    /// Update the CRC with more data.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        if data.len() >= 16 {
            self.crc = crc32_slice8(self.crc, data);
        } else {
            self.crc = crc32_bytewise(self.crc, data);
        }
    }

    /// Get the current CRC value without finalizing.
    ///
    /// Used when the accumulator must stay live after the value is read,
    /// as when a stream trailer is emitted from a borrowed checksum state.
    #[inline(always)]
    pub fn value(&self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Finalize and return the CRC value.
    #[inline(always)]
    pub fn finalize(self) -> u32 {
        self.crc ^ 0xFFFFFFFF
    }

    /// Compute CRC-32 for a slice in one call.
    #[inline]
    pub fn compute(data: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-table byte-at-a-time CRC. Best for short inputs.
#[inline]
fn crc32_bytewise(mut crc: u32, data: &[u8]) -> u32 {
    for &byte in data {
        crc = CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8);
    }
    crc
}

/// Slicing-by-8: consume 8 bytes per step through 8 staggered tables.
#[inline]
fn crc32_slice8(mut crc: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        let lo = crc ^ u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        crc = CRC32_TABLE_SLICE[7][(lo & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[6][((lo >> 8) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[5][((lo >> 16) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[4][((lo >> 24) & 0xFF) as usize]
            ^ CRC32_TABLE_SLICE[3][chunk[4] as usize]
            ^ CRC32_TABLE_SLICE[2][chunk[5] as usize]
            ^ CRC32_TABLE_SLICE[1][chunk[6] as usize]
            ^ CRC32_TABLE_SLICE[0][chunk[7] as usize];
    }
    crc32_bytewise(crc, chunks.remainder())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_empty() {
        assert_eq!(Crc32::compute(b""), 0x00000000);
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard CRC-32 check value for "123456789"
        assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn test_crc32_hello_world() {
        assert_eq!(Crc32::compute(b"Hello, World!"), 0xEC4AC3D0);
    }

    #[test]
    fn test_crc32_incremental() {
        let mut crc = Crc32::new();
        crc.update(b"Hello");
        crc.update(b", ");
        crc.update(b"World!");
        assert_eq!(crc.finalize(), 0xEC4AC3D0);
    }

    #[test]
    fn test_crc32_value_peek_keeps_state_live() {
        let mut crc = Crc32::new();
        crc.update(b"Hello");
        assert_eq!(crc.value(), Crc32::compute(b"Hello"));
        // Peeking must not disturb the accumulator.
        crc.update(b", World!");
        assert_eq!(crc.value(), 0xEC4AC3D0);
        assert_eq!(crc.finalize(), 0xEC4AC3D0);
    }

    #[test]
    fn test_crc32_table_entries() {
        assert_eq!(CRC32_TABLE[0], 0x00000000);
        assert_eq!(CRC32_TABLE[1], 0x77073096);
        assert_eq!(CRC32_TABLE[255], 0x2D02EF8D);
    }

    #[test]
    fn test_crc32_slice_tables_derived() {
        assert_eq!(CRC32_TABLE_SLICE[0][37], CRC32_TABLE[37]);
        for t in 1..8 {
            for i in 0..256 {
                let prev = CRC32_TABLE_SLICE[t - 1][i];
                let expected = CRC32_TABLE[(prev & 0xFF) as usize] ^ (prev >> 8);
                assert_eq!(CRC32_TABLE_SLICE[t][i], expected);
            }
        }
    }

    #[test]
    fn test_crc32_slice8_matches_bytewise() {
        // Sizes straddling the slicing threshold and the 8-byte stride.
        for size in [1, 7, 8, 15, 16, 17, 31, 32, 63, 64, 127, 255, 1024] {
            let data: Vec<u8> = (0..size).map(|i| (i * 31 + 7) as u8).collect();
            let fast = Crc32::compute(&data);

            let mut slow = Crc32::new();
            for &b in &data {
                slow.update(&[b]);
            }
            assert_eq!(fast, slow.finalize(), "mismatch for size {}", size);
        }
    }

    #[test]
    fn test_crc32_chunked_updates() {
        let data = vec![0x42u8; 1000];
        let whole = Crc32::compute(&data);

        let mut crc = Crc32::new();
        for chunk in data.chunks(17) {
            crc.update(chunk);
        }
        assert_eq!(whole, crc.finalize());
    }
}
