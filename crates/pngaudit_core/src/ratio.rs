use std::fmt;

/// Space saved by compression, in tenths of a percent.
///
/// Negative when the file is larger than the raw pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionRatio {
    permille: i64,
}

impl CompressionRatio {
    /// Large inputs are pre-divided so the products stay small; halves round up.
    #[must_use]
    pub fn new(uncompressed: u64, compressed: u64) -> Self {
        if uncompressed == 0 {
            return Self { permille: 0 };
        }
        let negative = compressed > uncompressed;
        let diff = uncompressed.abs_diff(compressed);
        let value = if uncompressed > 2_000_000 {
            let denom = uncompressed / 1000;
            diff.saturating_add(denom / 2) / denom
        } else {
            diff.saturating_mul(1000).saturating_add(uncompressed / 2) / uncompressed
        };
        let value = i64::try_from(value).unwrap_or(i64::MAX);
        Self {
            permille: if negative { -value } else { value },
        }
    }

    #[must_use]
    pub const fn permille(&self) -> i64 {
        self.permille
    }
}

impl fmt::Display for CompressionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.permille < 0 { "-" } else { "" };
        let abs = self.permille.unsigned_abs();
        write!(f, "{sign}{}.{}%", abs / 10, abs % 10)
    }
}

/// Size of the unfiltered pixel data, without per-row filter bytes.
#[must_use]
pub fn raw_image_size(width: u32, height: u32, bits_per_pixel: u32) -> u64 {
    let row = (u64::from(width) * u64::from(bits_per_pixel) + 7) >> 3;
    u64::from(height) * row
}
