mod common;

use common::*;
use pngaudit_core::{CheckConfig, Diagnostic, Severity, StreamKind, Verbosity};
use proptest::prelude::*;

const NAMES: &[&[u8; 4]] = &[
    b"IHDR", b"PLTE", b"IDAT", b"IEND", b"bKGD", b"cHRM", b"gAMA", b"hIST", b"iCCP", b"iTXt",
    b"oFFs", b"pCAL", b"pHYs", b"sBIT", b"sCAL", b"sPLT", b"sRGB", b"sTER", b"tEXt", b"tIME",
    b"tRNS", b"zTXt", b"gIFg", b"gIFx", b"JHDR", b"JDAT", b"JDAA", b"JSEP", b"MHDR", b"MEND",
    b"DHDR", b"FRAM", b"SAVE", b"SEEK", b"nEED", b"DEFI", b"BACK", b"MOVE", b"CLON", b"SHOW",
    b"CLIP", b"LOOP", b"ENDL", b"TERM", b"PROM", b"fPRI", b"eXPI", b"BASI", b"IPNG", b"PPLT",
    b"mkBF", b"prVW", b"quIT", b"IDAt",
];

fn worst(diagnostics: &[Diagnostic]) -> Severity {
    diagnostics
        .iter()
        .map(Diagnostic::severity)
        .max()
        .unwrap_or(Severity::Clean)
}

fn chunk_strategy() -> impl Strategy<Value = Vec<u8>> {
    (
        prop::sample::select(NAMES),
        prop::collection::vec(any::<u8>(), 0..48),
    )
        .prop_map(|(name, data)| make_chunk(name, &data))
}

fn kind_strategy() -> impl Strategy<Value = StreamKind> {
    prop::sample::select(StreamKind::ALL.to_vec())
}

proptest! {
    #[test]
    fn test_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let config = CheckConfig::new().with_verbosity(Verbosity::VeryVerbose);
        let (report, diagnostics) = check(&config, &bytes);
        prop_assert_eq!(report.severity, worst(&diagnostics));
        prop_assert!(report.bytes <= bytes.len() as u64);
    }

    #[test]
    fn test_arbitrary_chunks_never_panic(
        kind in kind_strategy(),
        chunks in prop::collection::vec(chunk_strategy(), 0..16),
        force in any::<bool>(),
    ) {
        let config = CheckConfig::new()
            .with_verbosity(Verbosity::VeryVerbose)
            .with_force(force)
            .with_print_text(true)
            .with_print_palette(true);
        let bytes = stream(kind, &chunks);
        let (report, diagnostics) = check(&config, &bytes);
        prop_assert_eq!(report.kind, Some(kind));
        prop_assert_eq!(report.severity, worst(&diagnostics));
        prop_assert!(report.chunks as usize <= chunks.len());
    }

    #[test]
    fn test_checks_are_deterministic(chunks in prop::collection::vec(chunk_strategy(), 0..8)) {
        let config = CheckConfig::new().with_verbosity(Verbosity::Verbose).with_force(true);
        let bytes = png(&chunks);
        prop_assert_eq!(check(&config, &bytes), check(&config, &bytes));
    }
}
