/// The three members of the PNG family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Png,
    Mng,
    Jng,
}

impl StreamKind {
    pub const ALL: [StreamKind; 3] = [Self::Png, Self::Mng, Self::Jng];

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Mng => "mng",
            Self::Jng => "jng",
        }
    }

    #[must_use]
    pub const fn signature(&self) -> &'static [u8; 8] {
        match self {
            Self::Png => &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            Self::Mng => &[0x8A, 0x4D, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            Self::Jng => &[0x8B, 0x4A, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
        }
    }

    /// Chunk that must open the stream.
    #[must_use]
    pub const fn header_chunk(&self) -> &'static str {
        match self {
            Self::Png => "IHDR",
            Self::Mng => "MHDR",
            Self::Jng => "JHDR",
        }
    }

    /// Chunk that must close the stream.
    #[must_use]
    pub const fn terminator_chunk(&self) -> &'static str {
        match self {
            Self::Png | Self::Jng => "IEND",
            Self::Mng => "MEND",
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Mng => "MNG",
            Self::Jng => "JNG",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(StreamKind::Png.extension(), "png");
        assert_eq!(StreamKind::Mng.extension(), "mng");
        assert_eq!(StreamKind::Jng.extension(), "jng");
    }

    #[test]
    fn test_signature_discriminators() {
        assert_eq!(&StreamKind::Png.signature()[1..4], b"PNG");
        assert_eq!(&StreamKind::Mng.signature()[1..4], b"MNG");
        assert_eq!(&StreamKind::Jng.signature()[1..4], b"JNG");
        for kind in StreamKind::ALL {
            assert_eq!(&kind.signature()[4..], b"\r\n\x1a\n");
        }
    }

    #[test]
    fn test_header_and_terminator() {
        assert_eq!(StreamKind::Mng.header_chunk(), "MHDR");
        assert_eq!(StreamKind::Jng.terminator_chunk(), "IEND");
        assert_eq!(StreamKind::Mng.terminator_chunk(), "MEND");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", StreamKind::Jng), "JNG");
    }
}
