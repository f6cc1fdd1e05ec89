#![allow(dead_code)]

use pngaudit_core::{CheckConfig, Diagnostic, Severity, StreamKind, StreamReport, Validator};

/// zlib stream holding one stored block: a 1x1 8-bit gray row (filter 0, pixel 0).
pub const GRAY_PIXEL_ZLIB: [u8; 13] = [
    0x78, 0x01, 0x01, 0x02, 0x00, 0xFD, 0xFF, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01,
];

pub fn make_chunk(name: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = (data.len() as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(name);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
    out
}

pub fn ihdr(width: u32, height: u32, depth: u8, color_type: u8, interlace: u8) -> Vec<u8> {
    let mut data = width.to_be_bytes().to_vec();
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&[depth, color_type, 0, 0, interlace]);
    make_chunk(b"IHDR", &data)
}

pub fn idat() -> Vec<u8> {
    make_chunk(b"IDAT", &GRAY_PIXEL_ZLIB)
}

pub fn iend() -> Vec<u8> {
    make_chunk(b"IEND", &[])
}

pub fn stream(kind: StreamKind, chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut out = kind.signature().to_vec();
    for chunk in chunks {
        out.extend_from_slice(chunk);
    }
    out
}

pub fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
    stream(StreamKind::Png, chunks)
}

/// Smallest clean PNG: 1x1 8-bit grayscale.
pub fn minimal_png() -> Vec<u8> {
    png(&[ihdr(1, 1, 8, 0, 0), idat(), iend()])
}

pub fn mhdr(width: u32, height: u32, profile: u32) -> Vec<u8> {
    let mut data = Vec::new();
    for field in [width, height, 1, 0, 0, 0, profile] {
        data.extend_from_slice(&field.to_be_bytes());
    }
    make_chunk(b"MHDR", &data)
}

pub fn mend() -> Vec<u8> {
    make_chunk(b"MEND", &[])
}

/// 1x1 8-bit grayscale JNG header without alpha.
pub fn jhdr() -> Vec<u8> {
    let mut data = 1u32.to_be_bytes().to_vec();
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(&[8, 8, 8, 0, 0, 0, 0, 0]);
    make_chunk(b"JHDR", &data)
}

pub fn jdat() -> Vec<u8> {
    make_chunk(b"JDAT", &[0xFF, 0xD8, 0xFF, 0xD9])
}

pub fn check(config: &CheckConfig, bytes: &[u8]) -> (StreamReport, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let report = Validator::new(config).check_stream(bytes, &mut diagnostics);
    (report, diagnostics)
}

pub fn problems(diagnostics: &[Diagnostic]) -> Vec<(Severity, String)> {
    diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Problem { severity, message } => Some((*severity, message.clone())),
            _ => None,
        })
        .collect()
}

pub fn details(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Detail(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

pub fn notes(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Note(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}
