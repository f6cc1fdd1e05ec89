//! Classification of the 8-byte stream signature.
//!
//! Bytes 1..4 ("PNG", "MNG", "JNG") pick the candidate format. Damage to the
//! remaining bytes is almost always the work of a text-mode transfer, so the
//! tail is matched against the usual line-ending rewrites to say which one.

use crate::types::StreamKind;

pub const SIGNATURE_LEN: usize = 8;

/// Length of a MacBinary header that may precede the signature.
pub const MACBINARY_HEADER_LEN: usize = 128;

/// Known tail rewrites, checked in order. First match wins.
const TAIL_DIAGNOSES: &[(&[u8], &str)] = &[
    (b"\n\x1a", "It seems to have suffered DOS->Unix conversion"),
    (b"\r\x1a", "It seems to have suffered DOS->Mac conversion"),
    (b"\r\r\x1a", "It seems to have suffered Unix->Mac conversion"),
    (b"\n\n\x1a", "It seems to have suffered Mac->Unix conversion"),
    (b"\n\n", "It seems to have suffered DOS->Unix conversion"),
    (b"\r\r\n\x1a", "It seems to have suffered Unix->DOS conversion"),
    (b"\r\n\x1a\r", "It seems to have suffered Unix->DOS conversion"),
    (b"\r\n\n", "It seems to have suffered DOS EOF conversion"),
];

const GOOD_TAIL: &[u8; 4] = b"\r\n\x1a\n";

/// 0x89 with bit 7 stripped.
const SEVEN_BIT_PNG_LEAD: u8 = 0x09;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid(StreamKind),
    /// The format is recognisable but the bytes were mangled in transit.
    Corrupted {
        kind: StreamKind,
        diagnoses: Vec<&'static str>,
    },
    /// Not a member of the PNG family at all.
    Unrecognized,
}

impl SignatureCheck {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub fn kind(&self) -> Option<StreamKind> {
        match self {
            Self::Valid(kind) | Self::Corrupted { kind, .. } => Some(*kind),
            Self::Unrecognized => None,
        }
    }
}

#[must_use]
pub fn classify(magic: &[u8; SIGNATURE_LEN]) -> SignatureCheck {
    let Some(kind) = StreamKind::ALL
        .into_iter()
        .find(|kind| magic[1..4] == kind.signature()[1..4])
    else {
        return SignatureCheck::Unrecognized;
    };

    let good = kind.signature();
    if magic == good {
        return SignatureCheck::Valid(kind);
    }

    let mut diagnoses = Vec::new();
    let tail = &magic[4..];
    if let Some((_, text)) = TAIL_DIAGNOSES
        .iter()
        .find(|(pattern, _)| tail.starts_with(pattern))
    {
        diagnoses.push(*text);
    } else if tail != GOOD_TAIL {
        diagnoses.push("It seems to have suffered EOL conversion");
    }

    if magic[0] == SEVEN_BIT_PNG_LEAD {
        diagnoses.push("It was probably transmitted through a 7-bit channel");
    } else if magic[0] != good[0] {
        diagnoses.push("It was probably transmitted in text mode");
    }

    SignatureCheck::Corrupted { kind, diagnoses }
}

/// A MacBinary header starts with a zero byte, a filename length of 1..=64
/// and a non-zero first filename byte.
#[must_use]
pub fn looks_like_macbinary(magic: &[u8; SIGNATURE_LEN]) -> bool {
    magic[0] == 0 && (1..=64).contains(&magic[1]) && magic[2] != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_signatures() {
        for kind in StreamKind::ALL {
            assert_eq!(classify(kind.signature()), SignatureCheck::Valid(kind));
        }
    }

    #[test]
    fn test_unix_to_mac_conversion() {
        let mut magic = *StreamKind::Png.signature();
        magic[5] = 0x0D;
        match classify(&magic) {
            SignatureCheck::Corrupted { kind, diagnoses } => {
                assert_eq!(kind, StreamKind::Png);
                assert_eq!(diagnoses, vec!["It seems to have suffered Unix->Mac conversion"]);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_seven_bit_channel() {
        let mut magic = *StreamKind::Png.signature();
        magic[0] = 0x09;
        match classify(&magic) {
            SignatureCheck::Corrupted { diagnoses, .. } => {
                assert_eq!(
                    diagnoses,
                    vec!["It was probably transmitted through a 7-bit channel"]
                );
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_seven_bit_lead_byte_is_fixed() {
        let mut magic = *StreamKind::Mng.signature();
        magic[0] = 0x09;
        match classify(&magic) {
            SignatureCheck::Corrupted { kind, diagnoses } => {
                assert_eq!(kind, StreamKind::Mng);
                assert_eq!(
                    diagnoses,
                    vec!["It was probably transmitted through a 7-bit channel"]
                );
            }
            other => panic!("unexpected classification: {other:?}"),
        }

        magic[0] = 0x0A;
        match classify(&magic) {
            SignatureCheck::Corrupted { diagnoses, .. } => {
                assert_eq!(diagnoses, vec!["It was probably transmitted in text mode"]);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_dos_to_unix_with_text_mode() {
        let magic = [0x3F, b'P', b'N', b'G', b'\n', 0x1A, b'\n', 0x00];
        match classify(&magic) {
            SignatureCheck::Corrupted { diagnoses, .. } => {
                assert_eq!(diagnoses.len(), 2);
                assert!(diagnoses[0].contains("DOS->Unix"));
                assert!(diagnoses[1].contains("text mode"));
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify(b"GIF89a\0\0"), SignatureCheck::Unrecognized);
        assert_eq!(classify(&[0u8; 8]), SignatureCheck::Unrecognized);
    }

    #[test]
    fn test_macbinary_detection() {
        assert!(looks_like_macbinary(&[0, 12, b'i', b'm', b'a', b'g', b'e', 0]));
        assert!(!looks_like_macbinary(&[0, 0, b'i', 0, 0, 0, 0, 0]));
        assert!(!looks_like_macbinary(&[0, 65, b'i', 0, 0, 0, 0, 0]));
        assert!(!looks_like_macbinary(StreamKind::Png.signature()));
    }

    proptest! {
        #[test]
        fn test_single_byte_mutation_never_valid(
            which in 0usize..3,
            pos in 0usize..8,
            value in any::<u8>(),
        ) {
            let kind = StreamKind::ALL[which];
            let mut magic = *kind.signature();
            prop_assume!(magic[pos] != value);
            magic[pos] = value;

            let check = classify(&magic);
            prop_assert!(!check.is_valid());
            if let SignatureCheck::Corrupted { diagnoses, .. } = check {
                prop_assert!(!diagnoses.is_empty());
            }
        }
    }
}
