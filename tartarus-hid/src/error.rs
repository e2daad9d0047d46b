use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O failure on {device}: {source}")]
    Io {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error("short transfer: expected {expected} bytes, got {actual}")]
    ShortTransfer { expected: usize, actual: usize },

    #[error("checksum mismatch on device reply")]
    ChecksumMismatch,
}
