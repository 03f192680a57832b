use serde::{Deserialize, Serialize};

use crate::enote::{EnoteImage, LegacyEnoteVariant};

/// Where a record's owning enote was observed. Ordered `OFFCHAIN < UNCONFIRMED < ONCHAIN`;
/// a record's status only ever moves up this lattice (see `OriginContext::merge`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OriginStatus {
    Offchain,
    Unconfirmed,
    Onchain,
}

/// Where a record's key image was observed spent. Ordered the same way as `OriginStatus`,
/// with `Unspent` as the bottom element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpentStatus {
    Unspent,
    SpentOffchain,
    SpentUnconfirmed,
    SpentOnchain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginContext {
    pub status: OriginStatus,
    pub block_height: Option<u64>,
    pub tx_id: [u8; 32],
    pub enote_index: u64,
}

impl OriginContext {
    /// Monotone merge: keeps the stronger status (and its accompanying context); never
    /// regresses `status` even if the incoming context is otherwise more specific.
    pub fn merge(&mut self, other: OriginContext) {
        if other.status >= self.status {
            *self = other;
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpentContext {
    pub status: SpentStatus,
    pub block_height: Option<u64>,
    pub tx_id: [u8; 32],
}

impl SpentContext {
    pub fn unspent() -> Self {
        Self {
            status: SpentStatus::Unspent,
            block_height: None,
            tx_id: [0u8; 32],
        }
    }

    pub fn merge(&mut self, other: SpentContext) {
        if other.status >= self.status {
            *self = other;
        }
    }
}

/// A recovered enote plus its origin and spent lifecycle contexts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualEnoteRecord {
    pub enote: LegacyEnoteVariant,
    pub image: EnoteImage,
    pub origin_context: OriginContext,
    pub spent_context: SpentContext,
    /// Cleartext amount. For `V1` this is redundant with the enote's own `amount` field;
    /// for `V2`/`V3`/`V4` it is the value the scanner's `RecordProcessor` recovered via
    /// `seraphis_crypto::legacy::decode_amount_v2`/`decode_amount_v3` at decrypt time,
    /// since the enote itself carries only a commitment and an encoded/encrypted amount.
    pub decoded_amount: u64,
}

impl ContextualEnoteRecord {
    /// Apply a monotone context update: both `origin_context` and `spent_context` move up
    /// their respective lattices, never down, per §3's invariant.
    pub fn merge(&mut self, origin: Option<OriginContext>, spent: Option<SpentContext>) {
        if let Some(o) = origin {
            self.origin_context.merge(o);
        }
        if let Some(s) = spent {
            self.spent_context.merge(s);
        }
    }

    pub fn amount(&self) -> u64 {
        self.decoded_amount
    }
}
