//! Adler-32 checksum (RFC 1950).
//!
//! The zlib trailer carries an Adler-32 of the uncompressed data. The
//! checksum keeps two 16-bit running sums; the modulo reduction is deferred
//! for up to [`NMAX`] bytes, the largest run for which the sums cannot
//! overflow a `u32`.

/// Largest prime smaller than 65536.
const MOD_ADLER: u32 = 65521;

/// Number of bytes that can be summed before a reduction is required.
const NMAX: usize = 5552;

/// Adler-32 checksum calculator.
///
/// # Example
///
/// ```
/// use oxigz_core::adler::Adler32;
///
/// let mut adler = Adler32::new();
/// adler.update(b"Hello");
/// assert_eq!(adler.finish(), 0x058C01F5);
/// ```
#[derive(Debug, Clone)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        // Both sums stay below u32::MAX for NMAX bytes of 0xFF, so one
        // reduction per chunk suffices.
        for chunk in data.chunks(NMAX) {
            let (a, b) = chunk.iter().fold((self.a, self.b), |(a, b), &byte| {
                let a = a + u32::from(byte);
                (a, b + a)
            });
            self.a = a % MOD_ADLER;
            self.b = b % MOD_ADLER;
        }
    }

    /// Return the current checksum.
    pub fn finish(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute the Adler-32 of a slice in one call.
    pub fn compute(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.finish()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}
