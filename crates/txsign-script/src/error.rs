/// Error types for script operations.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// An ASM token that is neither a known opcode nor hex data.
    #[error("invalid asm token '{0}'")]
    InvalidAsmToken(String),

    /// Push opcodes must go through `append_push_data`.
    #[error("use append_push_data for push opcodes: {0}")]
    InvalidOpcodeType(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("script is empty")]
    EmptyScript,

    #[error("not a P2PKH script")]
    NotP2PKH,

    /// A push runs past the end of the script.
    #[error("not enough data")]
    DataTooSmall,

    #[error("data too big")]
    DataTooBig,

    #[error(transparent)]
    Primitives(#[from] txsign_primitives::PrimitivesError),
}
