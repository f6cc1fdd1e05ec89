//! Text rendering of validator output.
//!
//! Each checked stream gets its own [`Report`], which buffers every line so
//! output from files checked in parallel never interleaves.

use pngaudit_core::{CheckConfig, Diagnostic, DiagnosticSink, ImageSummary, StreamReport};

pub struct Report<'a> {
    name: String,
    config: &'a CheckConfig,
    out: String,
}

impl<'a> Report<'a> {
    pub fn new(name: impl Into<String>, config: &'a CheckConfig) -> Self {
        Self {
            name: name.into(),
            config,
            out: String::new(),
        }
    }

    /// Opening line of a verbose listing.
    pub fn header(&mut self, size: Option<u64>) {
        if !self.config.verbose() {
            return;
        }
        let line = match size {
            Some(size) => format!("File: {} ({size} bytes)", self.name),
            None => format!("File: {}", self.name),
        };
        self.line(&line);
    }

    /// Free-form line from the driver, suppressed in quiet mode.
    pub fn message(&mut self, text: &str) {
        if self.config.quiet {
            return;
        }
        if self.config.verbose() {
            self.line(&format!("    {text}"));
        } else {
            let line = format!("{}  {text}", self.name);
            self.line(&line);
        }
    }

    /// Closing line for one stream.
    pub fn verdict(&mut self, report: &StreamReport) {
        if !report.is_clean() {
            let line = format!("ERROR: {}", self.name);
            self.line(&line);
            return;
        }
        if self.config.quiet {
            return;
        }
        let verbose = self.config.verbose();
        let summary = describe(report, verbose)
            .map(|s| format!(" ({s})"))
            .unwrap_or_default();
        let line = if verbose {
            format!("No errors detected in {}{summary}.", self.name)
        } else {
            format!("OK: {}{summary}.", self.name)
        };
        self.line(&line);
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl DiagnosticSink for Report<'_> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let verbose = self.config.verbose();
        match &diagnostic {
            Diagnostic::Chunk { .. } => self.line(&format!("  {diagnostic}")),
            Diagnostic::Detail(text) => self.line(&format!("    {text}")),
            Diagnostic::Listing(text) => self.line(&format!("    {text}")),
            Diagnostic::Note(text) => self.message(text),
            Diagnostic::Problem { message, .. } => {
                if verbose {
                    self.line(&format!("    {message}"));
                } else {
                    let line = format!("{}  {message}", self.name);
                    self.line(&line);
                }
            }
        }
    }
}

/// Parenthesised summary for a clean verdict.
fn describe(report: &StreamReport, verbose: bool) -> Option<String> {
    let text = match report.summary? {
        ImageSummary::Png(header) => {
            let size = if verbose {
                format!("{} x {}", header.width, header.height)
            } else {
                format!("{}x{}", header.width, header.height)
            };
            let mut text = format!(
                "{size}, {}-bit {}, {}interlaced",
                header.bits_per_pixel(),
                header.color_name(),
                if header.interlaced { "" } else { "non-" }
            );
            if let Some(ratio) = report.compression() {
                text.push_str(&format!(", {ratio}"));
                if verbose {
                    text.push_str(" compression");
                }
            }
            text
        }
        ImageSummary::Jng(header) => format!(
            "{}x{}, {}-bit {}, JNG",
            header.width,
            header.height,
            header.sample_depth,
            header.color_name()
        ),
        ImageSummary::Mng(header) => format!(
            "{}x{}, MNG, {} chunks",
            header.frame_width, header.frame_height, report.chunks
        ),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pngaudit_core::{ChunkName, ImageHeader, MngHeader, Severity, StreamKind, Verbosity};

    fn png_report(severity: Severity) -> StreamReport {
        StreamReport {
            kind: Some(StreamKind::Png),
            severity,
            summary: Some(ImageSummary::Png(ImageHeader {
                width: 100,
                height: 100,
                bit_depth: 8,
                color_type: 2,
                interlaced: false,
            })),
            chunks: 3,
            bytes: 7500,
            terminated: true,
        }
    }

    #[test]
    fn test_plain_verdict() {
        let config = CheckConfig::new();
        let mut report = Report::new("a.png", &config);
        report.verdict(&png_report(Severity::Clean));
        assert_eq!(
            report.into_string(),
            "OK: a.png (100x100, 24-bit RGB, non-interlaced, 75.0%).\n"
        );
    }

    #[test]
    fn test_verbose_verdict() {
        let config = CheckConfig::new().with_verbosity(Verbosity::Verbose);
        let mut report = Report::new("a.png", &config);
        report.verdict(&png_report(Severity::Clean));
        assert_eq!(
            report.into_string(),
            "No errors detected in a.png (100 x 100, 24-bit RGB, non-interlaced, 75.0% compression).\n"
        );
    }

    #[test]
    fn test_error_verdict_survives_quiet() {
        let config = CheckConfig::new().with_quiet(true);
        let mut report = Report::new("a.png", &config);
        report.verdict(&png_report(Severity::Clean));
        report.verdict(&png_report(Severity::Minor));
        assert_eq!(report.into_string(), "ERROR: a.png\n");
    }

    #[test]
    fn test_mng_verdict() {
        let config = CheckConfig::new();
        let mut report = Report::new("a.mng", &config);
        let stream = StreamReport {
            kind: Some(StreamKind::Mng),
            summary: Some(ImageSummary::Mng(MngHeader {
                frame_width: 64,
                frame_height: 48,
                ..MngHeader::default()
            })),
            chunks: 12,
            ..png_report(Severity::Clean)
        };
        report.verdict(&stream);
        assert_eq!(report.into_string(), "OK: a.mng (64x48, MNG, 12 chunks).\n");
    }

    #[test]
    fn test_problem_layout() {
        let problem = Diagnostic::Problem {
            severity: Severity::Minor,
            message: "PLTE must precede IDAT".to_string(),
        };

        let config = CheckConfig::new();
        let mut plain = Report::new("a.png", &config);
        plain.emit(problem.clone());
        assert_eq!(plain.into_string(), "a.png  PLTE must precede IDAT\n");

        let config = CheckConfig::new().with_verbosity(Verbosity::Verbose);
        let mut verbose = Report::new("a.png", &config);
        verbose.header(Some(70));
        verbose.emit(Diagnostic::Chunk {
            name: ChunkName(*b"PLTE"),
            offset: 50,
            length: 3,
        });
        verbose.emit(problem);
        assert_eq!(
            verbose.into_string(),
            "File: a.png (70 bytes)\n  chunk PLTE at offset 0x00032, length 3\n    PLTE must precede IDAT\n"
        );
    }

    #[test]
    fn test_quiet_drops_notes() {
        let config = CheckConfig::new().with_quiet(true);
        let mut report = Report::new("a.png", &config);
        report.emit(Diagnostic::Note("not enough IDAT data".to_string()));
        assert!(report.into_string().is_empty());
    }
}
