use crate::chunk::ChunkName;
use crate::context::{ImageHeader, JngHeader, MngHeader};
use crate::ratio::{CompressionRatio, raw_image_size};
use crate::severity::Severity;
use crate::types::StreamKind;
use std::fmt;

/// One piece of validator output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Opens a chunk in verbose listings. `offset` points at the type field.
    Chunk {
        name: ChunkName,
        offset: u64,
        length: u32,
    },
    /// Decoded field values, verbose only.
    Detail(String),
    /// Text or palette contents the caller asked for.
    Listing(String),
    /// Worth telling the user, but not an error.
    Note(String),
    Problem { severity: Severity, message: String },
}

impl Diagnostic {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Problem { severity, .. } => *severity,
            _ => Severity::Clean,
        }
    }

    #[must_use]
    pub fn is_problem(&self) -> bool {
        matches!(self, Self::Problem { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chunk {
                name,
                offset,
                length,
            } => write!(f, "chunk {name} at offset 0x{offset:05x}, length {length}"),
            Self::Detail(text) | Self::Listing(text) | Self::Note(text) => f.write_str(text),
            Self::Problem { message, .. } => f.write_str(message),
        }
    }
}

/// What the stream turned out to contain, for the verdict line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSummary {
    Png(ImageHeader),
    Jng(JngHeader),
    Mng(MngHeader),
}

/// Final outcome of checking one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamReport {
    pub kind: Option<StreamKind>,
    pub severity: Severity,
    pub summary: Option<ImageSummary>,
    pub chunks: u32,
    /// Bytes consumed, signature included.
    pub bytes: u64,
    /// Whether the IEND/MEND terminator was reached.
    pub terminated: bool,
}

impl StreamReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.severity == Severity::Clean
    }

    /// Savings of the file against its raw pixel data. PNG only.
    #[must_use]
    pub fn compression(&self) -> Option<CompressionRatio> {
        match self.summary {
            Some(ImageSummary::Png(header)) => {
                let raw = raw_image_size(header.width, header.height, header.bits_per_pixel());
                Some(CompressionRatio::new(raw, self.bytes))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_line() {
        let d = Diagnostic::Chunk {
            name: ChunkName(*b"IHDR"),
            offset: 12,
            length: 13,
        };
        assert_eq!(d.to_string(), "chunk IHDR at offset 0x0000c, length 13");
        assert_eq!(d.severity(), Severity::Clean);
    }

    #[test]
    fn test_compression_png_only() {
        let header = ImageHeader {
            width: 100,
            height: 100,
            bit_depth: 8,
            color_type: 0,
            interlaced: false,
        };
        let report = StreamReport {
            kind: Some(StreamKind::Png),
            severity: Severity::Clean,
            summary: Some(ImageSummary::Png(header)),
            chunks: 3,
            bytes: 2500,
            terminated: true,
        };
        assert_eq!(report.compression().map(|r| r.permille()), Some(750));

        let mng = StreamReport {
            summary: None,
            ..report
        };
        assert!(mng.compression().is_none());
    }
}
