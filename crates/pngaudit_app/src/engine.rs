//! Per-file checking and the parallel run over all inputs.

use crate::extract::{FileExtractor, output_path};
use crate::render::Report;
use anyhow::{Context, Result};
use pngaudit_core::{CheckConfig, ChunkSink, Severity, SignatureSearch, Validator};
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Files checked in parallel before their output is flushed, per worker.
const BATCH_PER_THREAD: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn from_arg(arg: PathBuf) -> Self {
        if arg.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(arg)
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Stdin => "stdin".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }

    /// Base path for extracted files.
    fn extract_base(&self) -> &Path {
        match self {
            Self::Stdin => Path::new("stdin"),
            Self::File(path) => path,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub config: CheckConfig,
    /// Look for embedded streams instead of expecting a signature at offset 0.
    pub search: bool,
    /// Write each embedded stream to its own file. Implies `search`.
    pub extract: bool,
}

/// Buffered output and worst severity for one input.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub severity: Severity,
}

/// Checks every input, printing results in input order. Returns the worst severity.
pub fn run(inputs: &[Input], options: &Options) -> Result<Severity> {
    let batch = rayon::current_num_threads().max(1) * BATCH_PER_THREAD;
    let stdout = io::stdout();
    let mut worst = Severity::Clean;

    for group in inputs.chunks(batch) {
        let outcomes: Vec<Result<Outcome>> = group
            .par_iter()
            .map(|input| check_input(input, options))
            .collect();

        let mut out = stdout.lock();
        for (input, outcome) in group.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) => {
                    out.write_all(outcome.output.as_bytes())
                        .context("failed to write report")?;
                    worst = worst.max(outcome.severity);
                }
                Err(err) => {
                    eprintln!("{}: {err:#}", input.name());
                    worst = worst.max(Severity::Major);
                }
            }
        }
        out.flush().context("failed to write report")?;
    }
    Ok(worst)
}

/// Checks one input. Only failing to open it is an error; everything
/// found inside it is reported in the outcome.
pub fn check_input(input: &Input, options: &Options) -> Result<Outcome> {
    let name = input.name();
    debug!(input = %name, search = options.search, "checking");
    match input {
        Input::Stdin => {
            let stdin = io::stdin().lock();
            Ok(check_reader(stdin, input, None, options))
        }
        Input::File(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            let size = file.metadata().ok().map(|m| m.len());
            Ok(check_reader(BufReader::new(file), input, size, options))
        }
    }
}

fn check_reader<R: Read>(reader: R, input: &Input, size: Option<u64>, options: &Options) -> Outcome {
    if options.search || options.extract {
        search_reader(reader, input, options)
    } else {
        check_whole(reader, input, size, &options.config)
    }
}

fn check_whole<R: Read>(reader: R, input: &Input, size: Option<u64>, config: &CheckConfig) -> Outcome {
    let mut report = Report::new(input.name(), config);
    report.header(size);
    let result = Validator::new(config).check_stream(reader, &mut report);
    report.verdict(&result);
    Outcome {
        output: report.into_string(),
        severity: result.severity,
    }
}

fn search_reader<R: Read>(reader: R, input: &Input, options: &Options) -> Outcome {
    let config = &options.config;
    let name = input.name();
    let validator = Validator::new(config);
    let mut search = SignatureSearch::new(reader);
    let mut output = String::new();
    let mut worst = Severity::Clean;
    let mut found = 0usize;

    loop {
        let (kind, offset) = match search.next_signature() {
            Ok(Some(hit)) => hit,
            Ok(None) => break,
            Err(err) => {
                output.push_str(&format!("{name}  I/O error: {err}\n"));
                worst = Severity::Fatal;
                break;
            }
        };
        found += 1;
        debug!(input = %name, %kind, offset, "found embedded stream");

        let mut report = Report::new(format!("{name} ({kind} at offset 0x{offset:x})"), config);
        report.header(None);
        let mut extractor = options
            .extract
            .then(|| FileExtractor::new(output_path(input.extract_base(), found, kind)));
        let result = validator.check_embedded(
            &mut search,
            kind,
            offset,
            &mut report,
            extractor.as_mut().map(|e| e as &mut dyn ChunkSink),
        );
        if let Some(extractor) = extractor {
            finish_extract(extractor, &mut report);
        }
        report.verdict(&result);
        worst = worst.max(result.severity);
        output.push_str(&report.into_string());
    }

    if found == 0 && !config.quiet {
        output.push_str(&format!("{name}  no PNG, MNG or JNG signature found\n"));
    }
    Outcome {
        output,
        severity: worst,
    }
}

fn finish_extract(extractor: FileExtractor, report: &mut Report<'_>) {
    let path = extractor.path().display().to_string();
    match extractor.finish() {
        Ok(true) => report.message(&format!("extracted to {path}")),
        Ok(false) => {}
        Err(err) => {
            warn!(path = %path, error = %err, "could not finish extraction file");
            report.message(&format!("could not write {path} ({err})"));
        }
    }
}
