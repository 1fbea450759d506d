use std::path::PathBuf;

/// Error kinds shared by every layer of the browsing core.
///
/// Navigation and cache-lookup code matches on these variants rather than
/// propagating opaque strings; only the CLI edge turns them into text.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {format}: {reason}")]
    Decode { format: String, reason: String },

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ErrorKind>;

impl ErrorKind {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
