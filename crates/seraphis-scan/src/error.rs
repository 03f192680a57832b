use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("scan aborted by caller")]
    Aborted,
    #[error("exceeded max partial-scan retry attempts")]
    MaxRetries,
    #[error("chunk failed semantic validation: {0}")]
    InvalidChunk(String),
}

impl From<ScanError> for seraphis_core::SeraphisError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::Aborted => seraphis_core::SeraphisError::Other("scan aborted".into()),
            ScanError::MaxRetries => seraphis_core::SeraphisError::ScanMaxRetries,
            ScanError::InvalidChunk(msg) => seraphis_core::SeraphisError::InvalidChunk(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propagate() -> Result<(), seraphis_core::SeraphisError> {
        Err(ScanError::InvalidChunk("block_ids length mismatch".into()))?;
        Ok(())
    }

    fn propagate_max_retries() -> Result<(), seraphis_core::SeraphisError> {
        Err(ScanError::MaxRetries)?;
        Ok(())
    }

    fn propagate_aborted() -> Result<(), seraphis_core::SeraphisError> {
        Err(ScanError::Aborted)?;
        Ok(())
    }

    #[test]
    fn scan_error_propagates_through_seraphis_error_and_keeps_the_message() {
        let err = propagate().unwrap_err();
        assert!(err.to_string().contains("block_ids length mismatch"));
    }

    #[test]
    fn max_retries_maps_to_the_dedicated_variant() {
        let err = propagate_max_retries().unwrap_err();
        assert!(matches!(err, seraphis_core::SeraphisError::ScanMaxRetries));
    }

    #[test]
    fn aborted_maps_to_other_and_keeps_the_message() {
        let err = propagate_aborted().unwrap_err();
        match err {
            seraphis_core::SeraphisError::Other(msg) => assert_eq!(msg, "scan aborted"),
            other => panic!("expected Other, got {other:?}"),
        }
    }
}
