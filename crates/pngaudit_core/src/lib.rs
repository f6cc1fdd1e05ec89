pub mod chunk;
mod config;
pub mod context;
pub mod crc;
mod error;
#[cfg(feature = "inspect")]
pub mod inflate;
pub mod io;
pub mod ratio;
mod report;
pub mod sanitize;
pub mod search;
mod severity;
pub mod signature;
mod traits;
mod types;
mod validator;

pub use chunk::{ChunkFamily, ChunkName, ChunkType};
pub use config::{CheckConfig, Verbosity};
pub use context::{ImageHeader, JngHeader, MngHeader};
pub use error::{CoreError, Result};
pub use ratio::CompressionRatio;
pub use report::{Diagnostic, ImageSummary, StreamReport};
pub use search::SignatureSearch;
pub use severity::{Severity, Status};
pub use signature::SignatureCheck;
pub use traits::{ChunkSink, DiagnosticSink};
pub use types::StreamKind;
pub use validator::Validator;
