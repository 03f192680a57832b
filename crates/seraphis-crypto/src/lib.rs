//! Group/scalar algebra, the two Grootle membership-proof variants, the composition
//! proof (single-signer and multisig), legacy enote recovery, and the curve-cycle trait
//! pair. The direct analogue of the teacher's `salvium-crypto` crate, which likewise
//! bundles ring signatures, subaddress derivation, and output scanning primitives into
//! one crate.

pub mod composition;
pub mod cycle;
pub mod error;
pub mod grootle;
pub mod grootle_concise;
pub mod legacy;
pub mod group;
pub mod multisig;
pub mod transcript;

pub use composition::{CompositionProof, CompositionWitness};
pub use cycle::CycleCurve;
pub use error::{CompositionError, CurveError, GrootleError};
pub use grootle::{GrootleProof, GrootleWitness};
pub use grootle_concise::{ConciseGrootleProof, ConciseGrootleWitness};
pub use group::GroupContext;
pub use multisig::{MultisigPartial, MultisigPrep, MultisigProposal};
pub use transcript::Transcript;
