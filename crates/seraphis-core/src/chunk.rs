use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::{OriginContext, SpentContext};

/// A basic find-received record: an onetime address candidate plus the tx it came from,
/// not yet decrypted or attributed to a spend key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRecord {
    pub tx_id: [u8; 32],
    pub onetime_address: [u8; 32],
    pub origin_context: OriginContext,
}

/// A key image observed spent within this chunk, with the spend's context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualKeyImageSet {
    pub tx_id: [u8; 32],
    pub key_images: Vec<[u8; 32]>,
    pub spent_context: SpentContext,
}

/// A unit of onchain scan work covering a contiguous block range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkLedger {
    pub start_height: u64,
    pub end_height: u64,
    pub prefix_block_id: [u8; 32],
    pub block_ids: Vec<[u8; 32]>,
    pub basic_records_by_tx: HashMap<[u8; 32], Vec<BasicRecord>>,
    pub contextual_key_images: Vec<ContextualKeyImageSet>,
}

impl ChunkLedger {
    /// §3 invariants: every key-image set's tx_id is a key of `basic_records_by_tx`;
    /// block range is non-empty and matches `block_ids.len()`.
    pub fn is_well_formed(&self) -> bool {
        if self.end_height <= self.start_height {
            return false;
        }
        if self.block_ids.len() as u64 != self.end_height - self.start_height {
            return false;
        }
        self.contextual_key_images
            .iter()
            .all(|ki| self.basic_records_by_tx.contains_key(&ki.tx_id))
    }

    pub fn is_empty_tip_chunk(&self) -> bool {
        self.block_ids.is_empty()
    }
}

/// An off-chain or unconfirmed (mempool) chunk: same record shape, no block range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkNonLedger {
    pub basic_records_by_tx: HashMap<[u8; 32], Vec<BasicRecord>>,
    pub contextual_key_images: Vec<ContextualKeyImageSet>,
}

impl ChunkNonLedger {
    pub fn is_well_formed(&self) -> bool {
        self.contextual_key_images
            .iter()
            .all(|ki| self.basic_records_by_tx.contains_key(&ki.tx_id))
    }
}

/// `(height, optional block id)` used to test whether a newly arrived chunk continues
/// the scanner's prior view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContiguityMarker {
    pub height: u64,
    pub block_id: Option<[u8; 32]>,
}

impl ContiguityMarker {
    /// Two markers are contiguous iff (a) at least one has no block id and its height is
    /// >= the other's, or (b) both share a height and either has no block id or they match.
    pub fn is_contiguous_with(&self, other: &ContiguityMarker) -> bool {
        if self.block_id.is_none() && self.height >= other.height {
            return true;
        }
        if other.block_id.is_none() && other.height >= self.height {
            return true;
        }
        if self.height == other.height {
            return match (self.block_id, other.block_id) {
                (None, _) | (_, None) => true,
                (Some(a), Some(b)) => a == b,
            };
        }
        false
    }
}
