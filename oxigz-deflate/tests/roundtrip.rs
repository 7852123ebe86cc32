//! Container round-trip tests against the flate2 reference decoders.

use oxigz_deflate::{
    compress, gzip_compress, zlib_compress, CompressionLevel, Compressor, Container,
};
use std::io::Read;

fn gunzip(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::GzDecoder::new(data)
        .read_to_end(&mut out)
        .expect("gzip stream rejected");
    out
}

fn unzlib(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .expect("zlib stream rejected");
    out
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    flate2::read::DeflateDecoder::new(data)
        .read_to_end(&mut out)
        .expect("deflate stream rejected");
    out
}

fn corpus() -> Vec<Vec<u8>> {
    vec![
        Vec::new(),
        b"A".to_vec(),
        b"Hello, World!".to_vec(),
        b"The quick brown fox jumps over the lazy dog".to_vec(),
        vec![0u8; 1000],
        (0..=255u8).collect(),
        b"abcabcabcabcabcabc".to_vec(),
        (0..100_000u32).map(|i| (i % 97) as u8).collect(),
    ]
}

#[test]
fn test_all_containers_roundtrip() {
    for input in corpus() {
        for level in [4u8, 6, 9] {
            let raw = compress(Container::Raw, &input, level).unwrap();
            assert_eq!(inflate(&raw), input, "raw, level {}", level);

            let gz = compress(Container::Gzip, &input, level).unwrap();
            assert_eq!(gunzip(&gz), input, "gzip, level {}", level);

            let zl = compress(Container::Zlib, &input, level).unwrap();
            assert_eq!(unzlib(&zl), input, "zlib, level {}", level);
        }
    }
}

#[test]
fn test_gzip_trailer_matches_input() {
    for input in corpus() {
        let out = gzip_compress(&input, 6).unwrap();
        let footer = &out[out.len() - 8..];
        let crc = u32::from_le_bytes(footer[..4].try_into().unwrap());
        let isize = u32::from_le_bytes(footer[4..].try_into().unwrap());
        assert_eq!(crc, oxigz_core::crc::Crc32::compute(&input));
        assert_eq!(isize, input.len() as u32);
    }
}

#[test]
fn test_zlib_trailer_matches_input() {
    for input in corpus() {
        let out = zlib_compress(&input, 6).unwrap();
        let adler = u32::from_be_bytes(out[out.len() - 4..].try_into().unwrap());
        assert_eq!(adler, oxigz_core::adler::Adler32::compute(&input));
    }
}

#[test]
fn test_zlib_header_and_empty_size() {
    let out = zlib_compress(b"", 6).unwrap();
    // 2-byte header, 2-byte fixed empty block, 4-byte Adler trailer.
    assert_eq!(out.len(), 8);
    assert_eq!(out[0], 0x78);
    assert_eq!(out[1], 0x9C);
    assert_eq!(unzlib(&out), b"");
}

#[test]
fn test_idempotent_recompression() {
    // Re-compressing a decompressed stream must still decompress to the
    // original.
    let input: Vec<u8> = b"compress me twice, shame on me. "
        .iter()
        .cycle()
        .take(10_000)
        .copied()
        .collect();
    let first = gzip_compress(&input, 6).unwrap();
    let decoded = gunzip(&first);
    let second = gzip_compress(&decoded, 6).unwrap();
    assert_eq!(gunzip(&second), input);
}

#[test]
fn test_multiple_sync_flushes() {
    let mut c = Compressor::new(Container::Gzip, Vec::new(), CompressionLevel::DEFAULT).unwrap();
    let mut expected = Vec::new();
    for i in 0..10u32 {
        let part = format!("part {} of the stream; ", i);
        expected.extend_from_slice(part.as_bytes());
        c.write(part.as_bytes()).unwrap();
        c.flush().unwrap();
    }
    c.finish().unwrap();
    let out = c.into_inner().unwrap();
    assert_eq!(gunzip(&out), expected);
}

#[test]
fn test_cross_block_stream() {
    // More than 65,535 bytes of incompressible data forces several stored
    // blocks inside one stream.
    let mut seed = 1u32;
    let input: Vec<u8> = (0..150_000)
        .map(|_| {
            seed = seed.wrapping_mul(48271);
            (seed >> 13) as u8
        })
        .collect();
    for container in [Container::Raw, Container::Gzip, Container::Zlib] {
        let out = compress(container, &input, 6).unwrap();
        let decoded = match container {
            Container::Raw => inflate(&out),
            Container::Gzip => gunzip(&out),
            Container::Zlib => unzlib(&out),
        };
        assert_eq!(decoded, input, "{:?}", container);
    }
}

#[test]
fn test_gzip_interop_with_flate2_encoder() {
    // Sanity check in the other direction: our corpus compressed by flate2
    // and by us both decode to the same bytes.
    let input: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();

    let ours = gzip_compress(&input, 6).unwrap();

    let mut theirs_out = Vec::new();
    {
        use flate2::write::GzEncoder;
        use std::io::Write as _;
        let mut enc = GzEncoder::new(&mut theirs_out, flate2::Compression::new(6));
        enc.write_all(&input).unwrap();
        enc.finish().unwrap();
    }

    assert_eq!(gunzip(&ours), gunzip(&theirs_out));
}
