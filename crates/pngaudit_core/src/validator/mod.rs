//! The chunk loop and per-chunk dispatch.
//!
//! [`Validator`] reads a stream chunk by chunk, hands each payload to the
//! handler for its type and applies the severity policy between chunks.
//! Handlers live in the sibling modules, grouped by the format that defines
//! them, and all share the helpers on [`ChunkChecker`].

mod fields;
mod jng_chunks;
mod mng_chunks;
mod other_chunks;
mod png_chunks;
mod text_chunks;

use crate::chunk::{ChunkFamily, ChunkName, ChunkType};
use crate::config::CheckConfig;
use crate::context::ValidationContext;
use crate::crc::Crc32;
use crate::io::ChunkReader;
use crate::report::{Diagnostic, ImageSummary, StreamReport};
use crate::sanitize::TextSanitizer;
use crate::severity::{Severity, Status};
use crate::signature::{
    MACBINARY_HEADER_LEN, SIGNATURE_LEN, SignatureCheck, classify, looks_like_macbinary,
};
use crate::types::StreamKind;
use crate::{ChunkSink, CoreError, DiagnosticSink};
use std::io::Read;
use tracing::{debug, warn};

#[cfg(feature = "inspect")]
use crate::inflate::ScanlineCursor;
#[cfg(feature = "inspect")]
use crate::io::BUFFER_CAP;

/// Chunk lengths are limited to 2^31-1.
const MAX_CHUNK_LENGTH: u32 = 0x7FFF_FFFF;

#[cfg(feature = "inspect")]
const FILTERS_PER_LINE: usize = 25;

/// Entry point for checking streams with one configuration.
pub struct Validator<'c> {
    config: &'c CheckConfig,
}

impl<'c> Validator<'c> {
    pub fn new(config: &'c CheckConfig) -> Self {
        Self { config }
    }

    /// Checks a complete stream, starting at its signature.
    pub fn check_stream<R: Read>(&self, reader: R, sink: &mut dyn DiagnosticSink) -> StreamReport {
        let mut reader = ChunkReader::new(reader);
        let mut checker = ChunkChecker::new(self.config, sink, None, StreamKind::Png);
        let (kind, proceed) = checker.read_signature(&mut reader);
        if let Some(kind) = kind {
            checker.ctx.kind = kind;
        }
        if proceed {
            checker.run(&mut reader, false);
        }
        let bytes = reader.offset();
        checker.into_report(kind, bytes)
    }

    /// Checks a stream whose signature a search has already consumed.
    ///
    /// `offset` is where the signature started. The stream ends at its
    /// terminator, leaving the reader positioned right after it.
    pub fn check_embedded<'s, R: Read>(
        &self,
        reader: R,
        kind: StreamKind,
        offset: u64,
        sink: &'s mut dyn DiagnosticSink,
        extract: Option<&'s mut dyn ChunkSink>,
    ) -> StreamReport
    where
        'c: 's,
    {
        let mut reader = ChunkReader::with_offset(reader, offset + SIGNATURE_LEN as u64);
        let mut checker = ChunkChecker::new(self.config, sink, extract, kind);
        checker.begin_extract(kind);
        checker.run(&mut reader, true);
        let bytes = reader.offset() - offset;
        checker.into_report(Some(kind), bytes)
    }
}

/// Per-stream working state shared by all chunk handlers.
pub(crate) struct ChunkChecker<'a> {
    config: &'a CheckConfig,
    sink: &'a mut dyn DiagnosticSink,
    extract: Option<&'a mut dyn ChunkSink>,
    ctx: ValidationContext,
    status: Status,
    current: ChunkName,
    #[cfg(feature = "inspect")]
    cursor: Option<ScanlineCursor>,
    #[cfg(feature = "inspect")]
    bad_filter_reported: bool,
}

impl<'a> ChunkChecker<'a> {
    fn new(
        config: &'a CheckConfig,
        sink: &'a mut dyn DiagnosticSink,
        extract: Option<&'a mut dyn ChunkSink>,
        kind: StreamKind,
    ) -> Self {
        Self {
            config,
            sink,
            extract,
            ctx: ValidationContext::new(kind),
            status: Status::new(config.force),
            current: ChunkName(*b"    "),
            #[cfg(feature = "inspect")]
            cursor: None,
            #[cfg(feature = "inspect")]
            bad_filter_reported: false,
        }
    }

    /// Returns the detected format, if any, and whether chunk checking may start.
    fn read_signature<R: Read>(
        &mut self,
        reader: &mut ChunkReader<R>,
    ) -> (Option<StreamKind>, bool) {
        let mut magic = [0u8; SIGNATURE_LEN];
        if let Err(e) = reader.read_exact(&mut magic, "signature") {
            self.read_failed(e);
            return (None, false);
        }

        if looks_like_macbinary(&magic) {
            let mut rest = [0u8; MACBINARY_HEADER_LEN - SIGNATURE_LEN];
            let skipped = reader
                .read_exact(&mut rest, "MacBinary header")
                .and_then(|()| reader.read_exact(&mut magic, "signature"));
            if let Err(e) = skipped {
                self.read_failed(e);
                return (None, false);
            }
            self.note("skipped MacBinary header");
        }

        match classify(&magic) {
            SignatureCheck::Valid(kind) => (Some(kind), true),
            SignatureCheck::Corrupted { kind, diagnoses } => {
                self.problem(Severity::Minor, "file is CORRUPTED by text conversion");
                for diagnosis in diagnoses {
                    self.note(diagnosis);
                }
                (Some(kind), self.config.force)
            }
            SignatureCheck::Unrecognized => {
                self.problem(
                    Severity::Major,
                    "this is neither a PNG or JNG image nor a MNG stream",
                );
                (None, false)
            }
        }
    }

    fn begin_extract(&mut self, kind: StreamKind) {
        let result = match self.extract.as_mut() {
            Some(out) => out.begin(kind),
            None => return,
        };
        if let Err(e) = result {
            self.extract_failed(e);
        }
    }

    fn run<R: Read>(&mut self, reader: &mut ChunkReader<R>, embedded: bool) {
        let mut trailing_reported = false;
        loop {
            if self.ctx.terminated && embedded {
                return;
            }
            match reader.at_eof() {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => {
                    self.read_failed(e);
                    return;
                }
            }
            if self.ctx.terminated && !trailing_reported {
                trailing_reported = true;
                let message = format!(
                    "additional data after {} chunk",
                    self.ctx.kind.terminator_chunk()
                );
                self.problem(Severity::Minor, message);
                if !self.config.force {
                    return;
                }
            }
            if !self.read_chunk(reader) {
                return;
            }
        }

        if !self.ctx.terminated {
            let message = match self.ctx.kind {
                StreamKind::Mng => "file doesn't end with a MEND chunk",
                StreamKind::Png | StreamKind::Jng => "file doesn't end with an IEND chunk",
            };
            self.problem(Severity::Minor, message);
        }
    }

    /// Reads and checks one chunk. Returns false once the stream must stop.
    fn read_chunk<R: Read>(&mut self, reader: &mut ChunkReader<R>) -> bool {
        let length = match reader.read_u32_be("chunk length") {
            Ok(length) => length,
            Err(e) => {
                self.read_failed(e);
                return false;
            }
        };
        let offset = reader.offset();
        let tag = match reader.read_tag("chunk type") {
            Ok(tag) => tag,
            Err(e) => {
                self.read_failed(e);
                return false;
            }
        };

        let name = ChunkName(tag);
        self.current = name;
        self.status.begin_chunk();
        debug!(chunk = %name, offset, length, "chunk");
        if self.config.verbose() {
            self.sink.emit(Diagnostic::Chunk {
                name,
                offset,
                length,
            });
        }

        if !name.is_well_formed() {
            let message = format!("chunk name {} doesn't comply to naming rules", name.hex());
            self.problem(Severity::Major, message);
        }
        if length > MAX_CHUNK_LENGTH {
            self.problem(
                Severity::Major,
                format!("invalid chunk length ({length}) exceeds 2^31-1"),
            );
        }
        if self.status.should_abort() {
            return false;
        }

        let header = self.ctx.kind.header_chunk();
        if self.ctx.chunks == 0 && name.0.as_slice() != header.as_bytes() {
            self.problem(Severity::Minor, format!("first chunk must be {header}"));
        }

        let mut crc = Crc32::new();
        crc.update(&tag);
        let data = match reader.read_data(length, &mut crc) {
            Ok(data) => data,
            Err(e) => {
                self.read_failed(e);
                return false;
            }
        };

        let chunk_type = ChunkType::from_bytes(&tag);
        self.dispatch(chunk_type, &data);
        self.ctx.chunks += 1;
        if self.status.should_abort() {
            return false;
        }

        let stored = match reader.read_u32_be("crc value") {
            Ok(stored) => stored,
            Err(e) => {
                self.read_failed(e);
                return false;
            }
        };
        let computed = crc.finish();
        if stored != computed {
            self.problem(
                Severity::Minor,
                format!("CRC error in chunk {name} (computed {computed:08x}, expected {stored:08x})"),
            );
        }

        self.ctx.last_chunk = Some(chunk_type);
        self.copy_out(name, &data, computed);
        !self.status.should_abort()
    }

    fn dispatch(&mut self, chunk_type: ChunkType, data: &[u8]) {
        let kind = self.ctx.kind;
        let foreign = match chunk_type.family() {
            ChunkFamily::Mng => kind != StreamKind::Mng,
            ChunkFamily::Jng => kind == StreamKind::Png,
            ChunkFamily::Png | ChunkFamily::Private | ChunkFamily::Unknown => false,
        };
        if foreign {
            self.minor(format!("{chunk_type} not defined in {kind}"));
            return;
        }

        match chunk_type {
            ChunkType::Ihdr => self.check_ihdr(data),
            ChunkType::Plte => self.check_plte(data),
            ChunkType::Idat => self.check_idat(data),
            ChunkType::Iend => self.check_iend(data),
            ChunkType::Bkgd => self.check_bkgd(data),
            ChunkType::Chrm => self.check_chrm(data),
            ChunkType::Gama => self.check_gama(data),
            ChunkType::Hist => self.check_hist(data),
            ChunkType::Iccp => self.check_iccp(data),
            ChunkType::Itxt => self.check_itxt(data),
            ChunkType::Offs => self.check_offs(data),
            ChunkType::Pcal => self.check_pcal(data),
            ChunkType::Phys => self.check_phys(data),
            ChunkType::Sbit => self.check_sbit(data),
            ChunkType::Scal => self.check_scal(data),
            ChunkType::Splt => self.check_splt(data),
            ChunkType::Srgb => self.check_srgb(data),
            ChunkType::Ster => self.check_ster(data),
            ChunkType::Text => self.check_text(data),
            ChunkType::Time => self.check_time(data),
            ChunkType::Trns => self.check_trns(data),
            ChunkType::Ztxt => self.check_ztxt(data),
            ChunkType::Gifg => self.check_gifg(data),
            ChunkType::Gifx => self.check_gifx(data),
            ChunkType::Jhdr => self.check_jhdr(data),
            ChunkType::Jdat => self.check_jdat(data),
            ChunkType::Jdaa => self.check_jdaa(data),
            ChunkType::Jsep => self.check_jsep(data),
            ChunkType::Mhdr => self.check_mhdr(data),
            ChunkType::Mend => self.check_mend(data),
            ChunkType::Dhdr => self.check_dhdr(data),
            ChunkType::Fram => self.check_fram(data),
            ChunkType::Save => self.check_save(data),
            ChunkType::Seek => self.check_seek(data),
            ChunkType::Need => self.check_need(data),
            ChunkType::Defi => self.check_defi(data),
            ChunkType::Back => self.check_back(data),
            ChunkType::Move => self.check_move(data),
            ChunkType::Clon => self.check_clon(data),
            ChunkType::Show => self.check_show(data),
            ChunkType::Clip => self.check_clip(data),
            ChunkType::Loop => self.check_loop(data),
            ChunkType::Endl => self.check_endl(data),
            ChunkType::Term => self.check_term(data),
            ChunkType::Prom => self.check_prom(data),
            ChunkType::Fpri => self.check_fpri(data),
            ChunkType::Expi => self.check_expi(data),
            ChunkType::Basi => self.check_basi(data),
            ChunkType::Ipng => self.check_ipng(data),
            ChunkType::Pplt => self.check_pplt(data),
            ChunkType::MkBf | ChunkType::MkBs | ChunkType::MkBt | ChunkType::MkTs => {
                self.check_fireworks(data)
            }
            ChunkType::PrVw => self.check_preview(data),
            ChunkType::Other(_) => self.check_unknown(),
        }
    }

    fn copy_out(&mut self, name: ChunkName, data: &[u8], crc: u32) {
        if !self.status.chunk_copyable() {
            return;
        }
        let result = match self.extract.as_mut() {
            Some(out) => out.chunk(name, data, crc),
            None => return,
        };
        if let Err(e) = result {
            self.extract_failed(e);
        }
    }

    fn extract_failed(&mut self, err: std::io::Error) {
        warn!(error = %err, "extraction output failed");
        self.note(format!("could not write output ({err}), extraction stopped"));
        self.extract = None;
    }

    fn read_failed(&mut self, err: CoreError) {
        let message = match err {
            CoreError::UnexpectedEof { field } => format!("EOF while reading {field}"),
            other => other.to_string(),
        };
        self.problem(Severity::Fatal, message);
    }

    fn into_report(self, kind: Option<StreamKind>, bytes: u64) -> StreamReport {
        let ctx = self.ctx;
        let summary = match kind {
            Some(StreamKind::Png) => ctx.image.header.or(ctx.last_header).map(ImageSummary::Png),
            Some(StreamKind::Jng) => ctx.image.jng.or(ctx.last_jng).map(ImageSummary::Jng),
            Some(StreamKind::Mng) => ctx.mng.map(ImageSummary::Mng),
            None => None,
        };
        StreamReport {
            kind,
            severity: self.status.worst(),
            summary,
            chunks: ctx.chunks,
            bytes,
            terminated: ctx.terminated,
        }
    }

    fn problem(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        debug!(%severity, chunk = %self.current, %message, "problem");
        self.status.raise(severity);
        self.sink.emit(Diagnostic::Problem { severity, message });
    }

    fn minor(&mut self, message: impl Into<String>) {
        self.problem(Severity::Minor, message);
    }

    fn major(&mut self, message: impl Into<String>) {
        self.problem(Severity::Major, message);
    }

    fn detail(&mut self, text: impl Into<String>) {
        if self.config.verbose() {
            self.sink.emit(Diagnostic::Detail(text.into()));
        }
    }

    fn listing(&mut self, text: impl Into<String>) {
        self.sink.emit(Diagnostic::Listing(text.into()));
    }

    fn note(&mut self, text: impl Into<String>) {
        self.sink.emit(Diagnostic::Note(text.into()));
    }

    /// Records a chunk that may occur once per image. MNG tolerates repeats.
    fn once(&mut self, chunk_type: ChunkType) {
        if !self.ctx.image.mark(chunk_type) && !self.ctx.is_mng() {
            self.minor(format!("multiple {chunk_type} not allowed"));
        }
    }

    fn must_precede(&mut self, chunk_type: ChunkType, later: ChunkType) {
        if self.ctx.image.seen(later) {
            self.minor(format!("{chunk_type} must precede {later}"));
        }
    }

    fn must_follow(&mut self, chunk_type: ChunkType, earlier: ChunkType) {
        if !self.ctx.image.seen(earlier) {
            self.minor(format!("{chunk_type} must follow {earlier}"));
        }
    }

    /// Ancillary chunks that describe the pixels come before the image data.
    fn before_image_data(&mut self, chunk_type: ChunkType) {
        self.must_precede(chunk_type, ChunkType::Idat);
        if self.ctx.image.jng.is_some() {
            self.must_precede(chunk_type, ChunkType::Jdat);
        }
    }

    /// Reports a wrong payload length. Decoding stops when this fails.
    fn expect_length(&mut self, chunk_type: ChunkType, ok: bool) -> bool {
        if !ok {
            self.major(format!("invalid {chunk_type} length"));
        }
        ok
    }

    /// Printable form of a name or label, without raising findings.
    fn printable(&self, bytes: &[u8]) -> String {
        TextSanitizer::new(self.config.seven_bit).escape(bytes)
    }

    /// Raises the sanitizer's findings for the current chunk.
    fn sanitizer_findings(&mut self, sanitizer: TextSanitizer) {
        let chunk = self.current.to_string();
        for finding in sanitizer.finish(&chunk) {
            self.minor(finding);
        }
    }

    #[cfg(feature = "inspect")]
    fn start_filter_cursor(&mut self, width: u32, height: u32, bits_per_pixel: u32, interlaced: bool) {
        self.cursor = None;
        self.bad_filter_reported = false;
        if self.config.inspect_filters() && width > 0 && height > 0 && bits_per_pixel > 0 {
            self.cursor = Some(ScanlineCursor::new(width, height, bits_per_pixel, interlaced));
        }
    }

    #[cfg(not(feature = "inspect"))]
    fn start_filter_cursor(&mut self, _width: u32, _height: u32, _bits: u32, _interlaced: bool) {}

    #[cfg(feature = "inspect")]
    fn feed_filter_cursor(&mut self, data: &[u8]) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        let first = cursor.seen() == 0;
        let mut filters = Vec::new();
        let mut failure = None;
        for segment in data.chunks(BUFFER_CAP) {
            match cursor.feed(segment) {
                Ok(found) => filters.extend(found),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        let (seen, expected) = (cursor.seen(), cursor.expected());

        if first && !filters.is_empty() {
            self.detail("zlib: row filters (0 none, 1 sub, 2 up, 3 avg, 4 paeth):");
        }
        for line in filters.chunks(FILTERS_PER_LINE) {
            let row: Vec<String> = line.iter().map(u8::to_string).collect();
            self.detail(format!("  {}", row.join(" ")));
        }
        if let Some(&bad) = filters.iter().find(|&&f| f > 4) {
            if !self.bad_filter_reported {
                self.bad_filter_reported = true;
                self.minor(format!("invalid row filter type ({bad})"));
            }
        }
        if !filters.is_empty() {
            self.detail(format!("  ({seen} out of {expected})"));
        }
        // Row filters are abandoned but the chunk structure is still checked.
        if let Some(e) = failure {
            self.cursor = None;
            self.note(format!("zlib: {e}"));
        }
    }

    #[cfg(not(feature = "inspect"))]
    fn feed_filter_cursor(&mut self, _data: &[u8]) {}

    #[cfg(feature = "inspect")]
    fn stop_filter_cursor(&mut self) {
        self.cursor = None;
    }

    #[cfg(not(feature = "inspect"))]
    fn stop_filter_cursor(&mut self) {}
}
