//! Big-endian field access for chunk payloads.
//!
//! Handlers check the payload length before decoding, so these readers only
//! guard against misuse; an out-of-range read yields zero.

#[inline]
pub(crate) fn be_u16(data: &[u8], at: usize) -> u16 {
    data.get(at..at + 2)
        .map_or(0, |b| u16::from_be_bytes([b[0], b[1]]))
}

#[inline]
pub(crate) fn be_u32(data: &[u8], at: usize) -> u32 {
    data.get(at..at + 4)
        .map_or(0, |b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

#[inline]
pub(crate) fn be_i32(data: &[u8], at: usize) -> i32 {
    be_u32(data, at) as i32
}

#[inline]
pub(crate) fn byte(data: &[u8], at: usize) -> u8 {
    data.get(at).copied().unwrap_or(0)
}

/// Splits at the first NUL, dropping the separator.
pub(crate) fn split_nul(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let at = memchr::memchr(0, data)?;
    Some((&data[..at], &data[at + 1..]))
}

/// Parses the ASCII floating-point syntax used by sCAL and pCAL.
pub(crate) fn parse_ascii_float(bytes: &[u8]) -> Option<f64> {
    if bytes.is_empty()
        || !bytes
            .iter()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub(crate) fn month_name(month: u8) -> &'static str {
    usize::from(month)
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i))
        .copied()
        .unwrap_or("???")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers() {
        let data = [0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFE];
        assert_eq!(be_u16(&data, 0), 1);
        assert_eq!(be_u32(&data, 2), 0xFFFF_FFFE);
        assert_eq!(be_i32(&data, 2), -2);
        assert_eq!(be_u32(&data, 4), 0);
        assert_eq!(byte(&data, 9), 0);
    }

    #[test]
    fn test_split_nul() {
        assert_eq!(split_nul(b"Title\0text"), Some((&b"Title"[..], &b"text"[..])));
        assert_eq!(split_nul(b"\0"), Some((&b""[..], &b""[..])));
        assert_eq!(split_nul(b"none"), None);
    }

    #[test]
    fn test_parse_ascii_float() {
        assert_eq!(parse_ascii_float(b"1.5"), Some(1.5));
        assert_eq!(parse_ascii_float(b"2e-3"), Some(0.002));
        assert_eq!(parse_ascii_float(b"-4"), Some(-4.0));
        assert_eq!(parse_ascii_float(b"inf"), None);
        assert_eq!(parse_ascii_float(b""), None);
        assert_eq!(parse_ascii_float(b"1.2.3"), None);
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "Jan");
        assert_eq!(month_name(12), "Dec");
        assert_eq!(month_name(0), "???");
        assert_eq!(month_name(13), "???");
    }
}
