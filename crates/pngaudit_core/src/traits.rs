//! Seams between the validator and whoever consumes its output.
//!
//! The validator never prints. It hands structured [`Diagnostic`]s to a
//! [`DiagnosticSink`] and, when extracting, hands accepted chunks to a
//! [`ChunkSink`]. Rendering and file output belong to the caller.

use crate::chunk::ChunkName;
use crate::report::Diagnostic;
use crate::types::StreamKind;

/// Receiver for everything the validator has to say about a stream.
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// impl DiagnosticSink for Printer {
///     fn emit(&mut self, diagnostic: Diagnostic) {
///         println!("{diagnostic}");
///     }
/// }
/// ```
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Destination for a verbatim copy of an embedded stream.
///
/// `begin` is called once with the stream's format before any chunk; each
/// accepted chunk is then passed with its data and freshly computed CRC.
pub trait ChunkSink {
    fn begin(&mut self, kind: StreamKind) -> std::io::Result<()>;

    fn chunk(&mut self, name: ChunkName, data: &[u8], crc: u32) -> std::io::Result<()>;
}

impl ChunkSink for Vec<u8> {
    fn begin(&mut self, kind: StreamKind) -> std::io::Result<()> {
        self.extend_from_slice(kind.signature());
        Ok(())
    }

    fn chunk(&mut self, name: ChunkName, data: &[u8], crc: u32) -> std::io::Result<()> {
        let len = u32::try_from(data.len()).map_err(std::io::Error::other)?;
        self.extend_from_slice(&len.to_be_bytes());
        self.extend_from_slice(&name.0);
        self.extend_from_slice(data);
        self.extend_from_slice(&crc.to_be_bytes());
        Ok(())
    }
}
