//! Symbol tables for DEFLATE (RFC 1951).
//!
//! DEFLATE maps match lengths 3..=258 onto length codes 257..=285 and match
//! distances 1..=32768 onto distance codes 0..=29, each code carrying a base
//! value plus a fixed number of extra bits. The reverse mappings are
//! precomputed here as lookup tables so the encoder never searches ranges on
//! the hot path.

/// Base length values for length codes 257-285 (RFC 1951 section 3.2.5).
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Base distance values for distance codes 0-29 (RFC 1951 section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Length code index (0-28, add 257 for the symbol) for each match length,
/// indexed by `length - 3`.
pub const LENGTH_CODES: [u8; 256] = {
    let mut codes = [0u8; 256];
    let mut c = 0;
    while c < 29 {
        let base = LENGTH_BASE[c] as usize;
        let span = 1usize << LENGTH_EXTRA_BITS[c];
        let mut i = 0;
        while i < span {
            let len = base + i;
            if len <= 258 {
                codes[len - 3] = c as u8;
            }
            i += 1;
        }
        c += 1;
    }
    // Length 258 has its own zero-extra-bit code, not 284 + 31.
    codes[258 - 3] = 28;
    codes
};

/// Distance code for biased distances (distance − 1) below 256. Larger
/// distances index this table with `d >> 7` (+14) or `d >> 14` (+28).
const DISTANCE_CODES: [u8; 256] = {
    let mut codes = [0u8; 256];
    let mut c = 0;
    while c < 30 {
        let base = DISTANCE_BASE[c] as usize;
        let span = 1usize << DISTANCE_EXTRA_BITS[c];
        let mut i = 0;
        while i < span {
            let dist = base + i;
            if dist <= 256 {
                codes[dist - 1] = c as u8;
            }
            i += 1;
        }
        c += 1;
    }
    codes
};

/// Map a biased distance (`distance − 1`, 0..=32767) to its distance code.
#[inline]
pub fn distance_code(dist: u16) -> u8 {
    let d = dist as usize;
    if d < 256 {
        DISTANCE_CODES[d]
    } else if (d >> 7) < 256 {
        DISTANCE_CODES[d >> 7] + 14
    } else {
        DISTANCE_CODES[d >> 14] + 28
    }
}

/// Order in which code-length-code lengths are transmitted in a dynamic
/// block header (RFC 1951 section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Fixed literal/length code lengths (RFC 1951 section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; 288] {
    let mut lengths = [8u8; 288];
    for len in lengths.iter_mut().take(256).skip(144) {
        *len = 9;
    }
    for len in lengths.iter_mut().take(280).skip(256) {
        *len = 7;
    }
    lengths
}

/// Fixed distance code lengths: all 30 codes use 5 bits.
pub fn fixed_distance_lengths() -> [u8; 30] {
    [5u8; 30]
}
