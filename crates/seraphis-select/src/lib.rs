//! Greedy, marginal-fee-aware input selection (§4.6) over a pool of unspent contextual
//! enote records. See `DESIGN.md` for the greedy-only scope decision (no brute-force
//! fallback on `SelectorExhausted`).

pub mod error;
pub mod fee_calculator;
pub mod selector;

pub use error::SelectionError;
pub use fee_calculator::{FeeCalculator, LinearFeeCalculator};
pub use selector::{select_inputs, select_inputs_with_config, select_subset, InputSelector, SelectionConfig, VecInputSelector};
