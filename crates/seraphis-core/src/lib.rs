//! Shared data model for the Seraphis transaction-protocol core: amount commitments,
//! enotes and their spent-form images, contextual enote records with monotone
//! origin/spent lifecycles, scan chunks, and the discretized-fee representation.
//!
//! This crate has no opinions about proving, scanning, or input selection — those live
//! in `seraphis-crypto`, `seraphis-scan`, and `seraphis-select` respectively, all of
//! which build on the types defined here.

pub mod amount;
pub mod chunk;
pub mod enote;
pub mod error;
pub mod fee;
pub mod record;
mod serde_point;

pub use amount::AmountCommitment;
pub use chunk::{BasicRecord, ChunkLedger, ChunkNonLedger, ContextualKeyImageSet, ContiguityMarker};
pub use enote::{EnoteImage, LegacyEnoteVariant};
pub use error::SeraphisError;
pub use fee::DiscretizedFee;
pub use record::{ContextualEnoteRecord, OriginContext, OriginStatus, SpentContext, SpentStatus};

/// Canonical 32-byte encoding alias used throughout the public API for points, scalars,
/// tx ids, and block ids.
pub type Bytes32 = [u8; 32];
