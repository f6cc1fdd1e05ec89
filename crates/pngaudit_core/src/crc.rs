//! CRC-32 as used by the PNG family (reflected polynomial 0xEDB88320).

const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Byte-at-a-time lookup table, built at compile time.
static TABLE: [u32; 256] = build_table();

/// Entry `n` is the remainder of byte `n` after eight shift-and-xor rounds.
const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut byte = 0;
    while byte < table.len() {
        let mut rem = byte as u32;
        let mut round = 0;
        while round < 8 {
            rem = if rem & 1 == 1 { POLYNOMIAL ^ (rem >> 1) } else { rem >> 1 };
            round += 1;
        }
        table[byte] = rem;
        byte += 1;
    }
    table
}

/// Running CRC accumulator, fed across several reads of one chunk.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        let mut crc = self.state;
        for &byte in data {
            let index = ((crc ^ byte as u32) & 0xFF) as usize;
            crc = TABLE[index] ^ (crc >> 8);
        }
        self.state = crc;
    }

    /// The value as stored in a chunk's trailing CRC field.
    #[inline]
    #[must_use]
    pub const fn finish(&self) -> u32 {
        !self.state
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(data);
    crc.finish()
}

#[inline]
pub fn chunk_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update(chunk_type);
    crc.update(data);
    crc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_crc32_known_value() {
        assert_eq!(crc32(b"123456789"), 0xCBF43926);
        assert_eq!(crc32(&[]), 0);
    }

    #[test]
    fn test_chunk_crc_iend() {
        // Every well-formed PNG ends with this CRC.
        assert_eq!(chunk_crc(b"IEND", &[]), 0xAE426082);
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data = b"IDATsome bytes spread over reads";
        let mut crc = Crc32::new();
        for piece in data.chunks(5) {
            crc.update(piece);
        }
        assert_eq!(crc.finish(), crc32(data));
    }

    proptest! {
        #[test]
        fn test_matches_reference(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(crc32(&data), crc32fast::hash(&data));
        }

        #[test]
        fn test_stored_field_roundtrip(tag in any::<[u8; 4]>(), data in proptest::collection::vec(any::<u8>(), 0..256)) {
            let stored = chunk_crc(&tag, &data).to_be_bytes();
            let mut crc = Crc32::new();
            crc.update(&tag);
            crc.update(&data);
            prop_assert_eq!(u32::from_be_bytes(stored), crc.finish());
        }
    }
}
