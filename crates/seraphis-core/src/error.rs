use thiserror::Error;

/// Crate-wide error umbrella: every subsystem's local error type converts into this
/// one via a hand-written `From` impl in that subsystem's crate, so a caller that only
/// links against `seraphis-core` can still propagate a failure from any layer with `?`.
#[derive(Debug, Error)]
pub enum SeraphisError {
    #[error("scalar inversion of zero")]
    ScalarInversion,

    #[error("malformed keys: {0}")]
    MalformedKeys(String),

    #[error("grootle proof malformed: {0}")]
    GrootleMalformed(String),

    #[error("composition proof malformed: {0}")]
    CompositionMalformed(String),

    #[error("invalid scan chunk: {0}")]
    InvalidChunk(String),

    #[error("scan exceeded max partial-scan retries")]
    ScanMaxRetries,

    #[error("insufficient funds: need {need}, have {have}")]
    InsufficientFunds { need: u64, have: u64 },

    #[error("input selector exhausted")]
    SelectorExhausted,

    #[error("curve-cycle operation failed: {0}")]
    CurveOp(String),

    #[error("{0}")]
    Other(String),
}
