#![no_main]

use libfuzzer_sys::fuzz_target;
use pngaudit_core::{CheckConfig, Diagnostic, Validator, Verbosity};

fuzz_target!(|data: &[u8]| {
    let Some((&flags, stream)) = data.split_first() else {
        return;
    };
    let verbosity = match flags & 3 {
        0 => Verbosity::Plain,
        1 => Verbosity::Verbose,
        _ => Verbosity::VeryVerbose,
    };
    let config = CheckConfig::new()
        .with_verbosity(verbosity)
        .with_force(flags & 4 != 0)
        .with_print_text(flags & 8 != 0)
        .with_seven_bit(flags & 16 != 0)
        .with_print_palette(flags & 32 != 0);

    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let report = Validator::new(&config).check_stream(stream, &mut diagnostics);
    let worst = diagnostics.iter().map(Diagnostic::severity).max().unwrap_or_default();
    assert_eq!(report.severity, worst);
});
