//! The enote store: contextual records keyed by key image, plus the contiguous block-id
//! window the scanner uses for contiguity checks. Grounded in §4.5's operation contract.

use std::collections::HashMap;
use std::ops::Range;

use seraphis_core::{ContextualEnoteRecord, OriginStatus, SpentContext, SpentStatus};

#[derive(Default)]
pub struct EnoteStore {
    records: HashMap<[u8; 32], ContextualEnoteRecord>,
    /// `block_ids[i]` is the id of block `refresh_height + i`. No gaps; length only grows
    /// or has its tail replaced, per §4.5's invariants.
    block_ids: Vec<[u8; 32]>,
    refresh_height: u64,
}

impl EnoteStore {
    pub fn new(refresh_height: u64) -> Self {
        Self {
            records: HashMap::new(),
            block_ids: Vec::new(),
            refresh_height,
        }
    }

    pub fn refresh_height(&self) -> u64 {
        self.refresh_height
    }

    pub fn top_block_height(&self) -> Option<u64> {
        if self.block_ids.is_empty() {
            None
        } else {
            Some(self.refresh_height + self.block_ids.len() as u64 - 1)
        }
    }

    pub fn block_id_at(&self, height: u64) -> Option<[u8; 32]> {
        if height < self.refresh_height {
            return None;
        }
        let idx = (height - self.refresh_height) as usize;
        self.block_ids.get(idx).copied()
    }

    pub fn has_key_image(&self, ki: &[u8; 32]) -> bool {
        self.records.contains_key(ki)
    }

    pub fn get(&self, ki: &[u8; 32]) -> Option<&ContextualEnoteRecord> {
        self.records.get(ki)
    }

    /// Insert a never-before-seen record, or monotonically merge contexts into an
    /// existing one.
    pub fn add_or_refresh(&mut self, record: ContextualEnoteRecord) {
        let ki = record.image.key_image_bytes();
        match self.records.get_mut(&ki) {
            Some(existing) => existing.merge(Some(record.origin_context), Some(record.spent_context)),
            None => {
                self.records.insert(ki, record);
            }
        }
    }

    /// Drop all records with origin status in `statuses`, and clear spent contexts with
    /// spent status in `spent_statuses` back to unspent. Used by post-processing to undo
    /// the volatile part of the record set before re-applying a fresh scan range.
    pub fn drop_and_clear(&mut self, origin_statuses: &[OriginStatus], spent_statuses: &[SpentStatus]) {
        self.records.retain(|_, r| !origin_statuses.contains(&r.origin_context.status));
        for r in self.records.values_mut() {
            if spent_statuses.contains(&r.spent_context.status) {
                r.spent_context = seraphis_core::SpentContext::unspent();
            }
        }
    }

    /// Replace `block_ids[first_new_block - refresh_height ..]` with `new_ids`, extending
    /// the store's known range. `first_new_block` must not create a gap.
    pub fn replace_block_ids(&mut self, first_new_block: u64, new_ids: &[[u8; 32]]) {
        debug_assert!(first_new_block >= self.refresh_height);
        let idx = (first_new_block - self.refresh_height) as usize;
        self.block_ids.truncate(idx);
        self.block_ids.extend_from_slice(new_ids);
    }

    pub fn balance(&self, origin_statuses: &[OriginStatus], spent_statuses: &[SpentStatus]) -> u128 {
        let mut received: u128 = 0;
        let mut spent: u128 = 0;
        for r in self.records.values() {
            if origin_statuses.contains(&r.origin_context.status) {
                received += r.amount() as u128;
            }
            if spent_statuses.contains(&r.spent_context.status) {
                spent += r.amount() as u128;
            }
        }
        received.saturating_sub(spent)
    }

    pub fn unspent_records(&self) -> impl Iterator<Item = &ContextualEnoteRecord> {
        self.records.values().filter(|r| r.spent_context.status == SpentStatus::Unspent)
    }

    /// Transactional post-processing for one onchain scan pass covering `[first_new_block,
    /// end_height)`: drop stale ONCHAIN records inside the range and all UNCONFIRMED
    /// records outright, clear spent contexts the same way, re-insert what this pass
    /// found, apply the newly observed spends, then splice in the pass's block ids.
    pub fn apply_onchain_scan_result(
        &mut self,
        first_new_block: u64,
        end_height: u64,
        found: HashMap<[u8; 32], ContextualEnoteRecord>,
        spent_updates: &[([u8; 32], SpentContext)],
        block_ids: &[[u8; 32]],
    ) {
        let range: Range<u64> = first_new_block..end_height;
        self.records.retain(|_, r| {
            let stale_onchain = r.origin_context.status == OriginStatus::Onchain
                && r.origin_context.block_height.map(|h| range.contains(&h)).unwrap_or(false);
            let unconfirmed = r.origin_context.status == OriginStatus::Unconfirmed;
            !(stale_onchain || unconfirmed)
        });
        for r in self.records.values_mut() {
            let stale_spent_onchain = r.spent_context.status == SpentStatus::SpentOnchain
                && r.spent_context.block_height.map(|h| range.contains(&h)).unwrap_or(false);
            let spent_unconfirmed = r.spent_context.status == SpentStatus::SpentUnconfirmed;
            if stale_spent_onchain || spent_unconfirmed {
                r.spent_context = SpentContext::unspent();
            }
        }
        for record in found.into_values() {
            self.add_or_refresh(record);
        }
        for (ki, spent_ctx) in spent_updates {
            if let Some(r) = self.records.get_mut(ki) {
                r.spent_context.merge(*spent_ctx);
            }
        }
        self.replace_block_ids(first_new_block, block_ids);
    }

    /// Same contract as `apply_onchain_scan_result` but for a single non-ledger chunk
    /// (unconfirmed or offchain): everything with the given origin/spent status is
    /// dropped/cleared wholesale, since a non-ledger chunk is never partial.
    pub fn apply_nonledger_scan_result(
        &mut self,
        origin_to_clear: OriginStatus,
        spent_to_clear: SpentStatus,
        found: HashMap<[u8; 32], ContextualEnoteRecord>,
        spent_updates: &[([u8; 32], SpentContext)],
    ) {
        self.drop_and_clear(&[origin_to_clear], &[spent_to_clear]);
        for record in found.into_values() {
            self.add_or_refresh(record);
        }
        for (ki, spent_ctx) in spent_updates {
            if let Some(r) = self.records.get_mut(ki) {
                r.spent_context.merge(*spent_ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT as G;
    use seraphis_core::{EnoteImage, LegacyEnoteVariant, OriginContext};

    fn record(ki: [u8; 32], amount: u64, origin: OriginStatus) -> ContextualEnoteRecord {
        ContextualEnoteRecord {
            enote: LegacyEnoteVariant::V1 {
                onetime_address: G.compress().to_bytes(),
                amount,
            },
            image: EnoteImage::new(G, G, curve25519_dalek::edwards::CompressedEdwardsY(ki).decompress().unwrap_or(G)),
            origin_context: OriginContext {
                status: origin,
                block_height: Some(10),
                tx_id: [1; 32],
                enote_index: 0,
            },
            spent_context: seraphis_core::SpentContext::unspent(),
            decoded_amount: amount,
        }
    }

    /// A `V3` record, whose enote payload carries only an encoded amount: the commitment's
    /// amount is never stored in cleartext on the enote itself, so `balance()` must read it
    /// from `decoded_amount` rather than from the enote variant.
    fn v3_record(ki: [u8; 32], amount: u64, origin: OriginStatus) -> ContextualEnoteRecord {
        use seraphis_core::AmountCommitment;
        ContextualEnoteRecord {
            enote: LegacyEnoteVariant::V3 {
                onetime_address: G.compress().to_bytes(),
                amount_commitment: AmountCommitment::from_point(G),
                encoded_amount: [0u8; 8],
            },
            image: EnoteImage::new(G, G, curve25519_dalek::edwards::CompressedEdwardsY(ki).decompress().unwrap_or(G)),
            origin_context: OriginContext {
                status: origin,
                block_height: Some(10),
                tx_id: [1; 32],
                enote_index: 0,
            },
            spent_context: seraphis_core::SpentContext::unspent(),
            decoded_amount: amount,
        }
    }

    #[test]
    fn balance_sums_matching_origin_minus_spent() {
        let mut store = EnoteStore::new(0);
        store.add_or_refresh(record(G.compress().to_bytes(), 100, OriginStatus::Onchain));
        assert_eq!(store.balance(&[OriginStatus::Onchain], &[]), 100);
    }

    #[test]
    fn balance_uses_decoded_amount_for_v3_records() {
        let mut store = EnoteStore::new(0);
        store.add_or_refresh(v3_record(G.compress().to_bytes(), 250, OriginStatus::Onchain));
        assert_eq!(store.balance(&[OriginStatus::Onchain], &[]), 250);
    }

    #[test]
    fn drop_and_clear_removes_matching_origin_status() {
        let mut store = EnoteStore::new(0);
        store.add_or_refresh(record(G.compress().to_bytes(), 50, OriginStatus::Unconfirmed));
        store.drop_and_clear(&[OriginStatus::Unconfirmed], &[]);
        assert_eq!(store.balance(&[OriginStatus::Unconfirmed], &[]), 0);
    }

    #[test]
    fn block_id_lookup_respects_refresh_height() {
        let mut store = EnoteStore::new(5);
        store.replace_block_ids(5, &[[1; 32], [2; 32]]);
        assert_eq!(store.block_id_at(5), Some([1; 32]));
        assert_eq!(store.block_id_at(6), Some([2; 32]));
        assert_eq!(store.block_id_at(4), None);
        assert_eq!(store.block_id_at(7), None);
    }
}
