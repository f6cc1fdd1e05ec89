use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("EOF while reading {field}")]
    UnexpectedEof { field: &'static str },

    #[error("inflate error: {0}")]
    Inflate(String),
}

impl CoreError {
    /// Maps a short read onto the field that was being read.
    pub(crate) fn from_read(err: std::io::Error, field: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof { field }
        } else {
            Self::Io(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
