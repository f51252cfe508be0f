use thiserror::Error;

#[derive(Error, Debug)]
pub enum Json2StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Decoded payload is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("State not found: {0}")]
    StateNotFound(String),

    #[error("Object is a channel, not a state: {0}")]
    NotAState(String),

    #[error("Store rejected operation on {path}: {reason}")]
    Rejected { path: String, reason: String },

    #[error("Invalid file magic")]
    InvalidFileMagic,

    #[error("Unsupported format version: {0}")]
    UnsupportedFormatVersion(u32),

    #[error("Snapshot state hash mismatch")]
    StateHashMismatch,
}
