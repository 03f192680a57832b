//! Ledger/unconfirmed/offchain chunk scanning and the `EnoteStore` it maintains.
//! See §4.4-§4.5 and `DESIGN.md` for the scan state machine this crate implements.

pub mod error;
pub mod find_context;
pub mod scanner;
pub mod store;

pub use error::ScanError;
pub use find_context::{EnoteFindingContextLedger, EnoteFindingContextOffchain, MockLedgerFindContext, MockOffchainFindContext};
pub use scanner::{refresh_full, refresh_ledger, refresh_offchain, refresh_unconfirmed, RecordProcessor, ScanConfig};
pub use store::EnoteStore;
