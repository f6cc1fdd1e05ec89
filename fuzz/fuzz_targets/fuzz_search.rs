#![no_main]

use libfuzzer_sys::fuzz_target;
use pngaudit_core::{CheckConfig, ChunkSink, Diagnostic, SignatureSearch, Validator};

fuzz_target!(|data: &[u8]| {
    let config = CheckConfig::new().with_force(data.first().is_some_and(|b| b & 1 != 0));
    let validator = Validator::new(&config);
    let mut search = SignatureSearch::new(data);
    let mut last = None;
    while let Ok(Some((kind, offset))) = search.next_signature() {
        assert!(last.is_none_or(|prev| offset > prev));
        last = Some(offset);
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut extracted: Vec<u8> = Vec::new();
        validator.check_embedded(
            &mut search,
            kind,
            offset,
            &mut diagnostics,
            Some(&mut extracted as &mut dyn ChunkSink),
        );
        assert!(extracted.starts_with(kind.signature()));
    }
});
