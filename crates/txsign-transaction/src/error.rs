/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// Wire-format decoding failed (bad hex, truncation, trailing bytes).
    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("input index {index} out of range (tx has {count} inputs)")]
    InputIndexOutOfRange { index: usize, count: usize },

    /// The input carries no source output, so it cannot be hashed or verified.
    #[error("input {0} has no source output")]
    MissingSourceOutput(usize),

    #[error("unsupported sighash flag 0x{0:02x}")]
    UnsupportedSighash(u32),

    #[error("signing error: {0}")]
    SigningError(String),

    /// An input's unlocking script does not satisfy its locking script.
    #[error("input {index} failed verification: {reason}")]
    VerificationFailed { index: usize, reason: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("fee calculation error: {0}")]
    FeeError(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("script error: {0}")]
    Script(#[from] txsign_script::ScriptError),

    #[error("primitives error: {0}")]
    Primitives(#[from] txsign_primitives::PrimitivesError),
}
