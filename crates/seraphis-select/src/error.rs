use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no subset of available inputs covers target {need} (have {have})")]
    InsufficientFunds { need: u128, have: u128 },
    #[error("input selector produced no usable candidates")]
    SelectorExhausted,
}

impl From<SelectionError> for seraphis_core::SeraphisError {
    fn from(e: SelectionError) -> Self {
        match e {
            SelectionError::InsufficientFunds { need, have } => seraphis_core::SeraphisError::InsufficientFunds {
                need: need.min(u64::MAX as u128) as u64,
                have: have.min(u64::MAX as u128) as u64,
            },
            // Per §7's recovery policy, a selector with nothing left surfaces the same
            // way as coming up short: the caller can't distinguish "no candidates" from
            // "candidates summed to less than the target".
            SelectionError::SelectorExhausted => seraphis_core::SeraphisError::SelectorExhausted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn propagate() -> Result<(), seraphis_core::SeraphisError> {
        Err(SelectionError::InsufficientFunds { need: 500, have: 200 })?;
        Ok(())
    }

    fn propagate_exhausted() -> Result<(), seraphis_core::SeraphisError> {
        Err(SelectionError::SelectorExhausted)?;
        Ok(())
    }

    #[test]
    fn selection_error_propagates_through_seraphis_error_and_keeps_the_amounts() {
        let err = propagate().unwrap_err();
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("200"));
    }

    #[test]
    fn selector_exhausted_maps_to_the_dedicated_variant() {
        let err = propagate_exhausted().unwrap_err();
        assert!(matches!(err, seraphis_core::SeraphisError::SelectorExhausted));
    }
}
