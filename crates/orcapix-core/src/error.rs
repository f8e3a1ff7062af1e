use thiserror::Error;

pub type OrcapixResult<T> = Result<T, OrcapixError>;

#[derive(Debug, Error)]
pub enum OrcapixError {
    #[error("invalid Pix key: {0}")]
    InvalidPixKey(String),

    #[error("malformed TLV: {0}")]
    Tlv(String),

    #[error("CRC mismatch: payload carries {expected}, computed {computed}")]
    CrcMismatch { expected: String, computed: String },

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OrcapixError {
    /// True for failures caused by the caller's Pix key rather than by a
    /// malformed payload or the environment.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, OrcapixError::InvalidPixKey(_))
    }
}
