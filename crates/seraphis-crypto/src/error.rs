use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrootleError {
    #[error("scalar inversion of zero")]
    ScalarInversion,
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("grootle proof malformed: {0}")]
    Malformed(String),
    #[error("batch verification failed")]
    BatchFailed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("malformed keys: {0}")]
    MalformedKeys(String),
    #[error("rederived challenge did not match")]
    BadChallenge,
    #[error("multisig aggregation mismatch: {0}")]
    AggregationMismatch(String),
    #[error("multisig proposal already consumed")]
    ProposalAlreadyUsed,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    #[error("curve-cycle operation failed: {0}")]
    Op(String),
}

impl From<GrootleError> for seraphis_core::SeraphisError {
    fn from(e: GrootleError) -> Self {
        match e {
            GrootleError::ScalarInversion => seraphis_core::SeraphisError::ScalarInversion,
            other => seraphis_core::SeraphisError::GrootleMalformed(other.to_string()),
        }
    }
}

impl From<CompositionError> for seraphis_core::SeraphisError {
    fn from(e: CompositionError) -> Self {
        match e {
            CompositionError::MalformedKeys(msg) => seraphis_core::SeraphisError::MalformedKeys(msg),
            other => seraphis_core::SeraphisError::CompositionMalformed(other.to_string()),
        }
    }
}

impl From<CurveError> for seraphis_core::SeraphisError {
    fn from(e: CurveError) -> Self {
        match e {
            CurveError::Op(msg) => seraphis_core::SeraphisError::CurveOp(msg),
        }
    }
}
