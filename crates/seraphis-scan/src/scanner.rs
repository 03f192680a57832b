//! The chunk-walking scanner state machine: an onchain pass, an unconfirmed pass, an
//! onchain follow-up pass, and an independent offchain refresh, all driving the same
//! contiguity-checked post-processing contract against `EnoteStore`. Grounded in §4.4 and
//! in the original source's `tx_enote_scanning.h` (`RefreshLedgerEnoteStoreConfig`,
//! `EnoteScanningChunkLedgerV1`/`NonLedgerV1`), re-architected per the Design Notes'
//! "virtual class hierarchy -> trait abstraction" note: `EnoteStoreUpdater` becomes the
//! `RecordProcessor` trait below instead of a polymorphic base class.
//!
//! `NEED_FULLSCAN` and `NEED_PARTIALSCAN` are modeled here as a single retry state: a
//! contiguity break of either kind restarts the onchain pass from a height recomputed
//! with the same exponential reorg-avoidance back-off, bounded below by the store's
//! refresh height, and budgeted by `max_partialscan_attempts`. See DESIGN.md.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use seraphis_core::{
    BasicRecord, ChunkNonLedger, ContextualEnoteRecord, ContextualKeyImageSet, ContiguityMarker, OriginStatus,
    SpentContext, SpentStatus,
};

use crate::error::ScanError;
use crate::find_context::{EnoteFindingContextLedger, EnoteFindingContextOffchain};
use crate::store::EnoteStore;

/// Mirrors the original's `RefreshLedgerEnoteStoreConfig` defaults.
#[derive(Clone, Copy, Debug)]
pub struct ScanConfig {
    pub reorg_avoidance_depth: u64,
    pub max_chunk_size: u64,
    pub max_partialscan_attempts: u64,
    /// Below this height, a contiguity break is logged and treated as a full rescan
    /// rather than a partial one — see the module doc's note on why both collapse to
    /// the same internal retry state; this field only changes how the break is named
    /// in the log, not the backoff applied.
    pub first_contiguity_height: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reorg_avoidance_depth: 10,
            max_chunk_size: 100,
            max_partialscan_attempts: 3,
            first_contiguity_height: 0,
        }
    }
}

/// The view-key-holding collaborator the scanner defers to for turning a `BasicRecord`
/// into an owned enote, in either a plain receive or a self-send decrypt pass. The
/// scanner crate itself never touches key material.
pub trait RecordProcessor {
    fn try_decrypt_plain(&self, basic: &BasicRecord) -> Option<ContextualEnoteRecord>;
    fn try_decrypt_self_send(&self, basic: &BasicRecord) -> Option<ContextualEnoteRecord>;
}

enum ScanSignal {
    Done,
    NeedRescan { break_height: u64 },
}

/// Runs the plain-receive pass over every basic record, then repeatedly re-scans any tx
/// whose key-image set includes an image we already recognize (from the store, from a
/// prior chunk this pass, or from this chunk's own plain-receive pass) via the self-send
/// decrypt path, until a fixed point is reached.
fn process_chunk(
    basic_records_by_tx: &HashMap<[u8; 32], Vec<BasicRecord>>,
    key_image_sets: &[ContextualKeyImageSet],
    store: &EnoteStore,
    found_so_far: &HashMap<[u8; 32], ContextualEnoteRecord>,
    processor: &dyn RecordProcessor,
) -> HashMap<[u8; 32], ContextualEnoteRecord> {
    let mut found: HashMap<[u8; 32], ContextualEnoteRecord> = HashMap::new();

    for records in basic_records_by_tx.values() {
        for basic in records {
            if let Some(rec) = processor.try_decrypt_plain(basic) {
                found.entry(rec.image.key_image_bytes()).or_insert(rec);
            }
        }
    }

    let is_known = |ki: &[u8; 32], found: &HashMap<[u8; 32], ContextualEnoteRecord>| {
        store.has_key_image(ki) || found_so_far.contains_key(ki) || found.contains_key(ki)
    };

    let mut processed_txs: HashSet<[u8; 32]> = HashSet::new();
    loop {
        let triggered: Vec<[u8; 32]> = key_image_sets
            .iter()
            .filter(|set| !processed_txs.contains(&set.tx_id))
            .filter(|set| set.key_images.iter().any(|ki| is_known(ki, &found)))
            .map(|set| set.tx_id)
            .collect();
        if triggered.is_empty() {
            break;
        }
        for tx_id in triggered {
            processed_txs.insert(tx_id);
            if let Some(records) = basic_records_by_tx.get(&tx_id) {
                for basic in records {
                    if let Some(rec) = processor.try_decrypt_self_send(basic) {
                        found.entry(rec.image.key_image_bytes()).or_insert(rec);
                    }
                }
            }
        }
    }

    found
}

fn spent_updates_for(
    key_image_sets: &[ContextualKeyImageSet],
    store: &EnoteStore,
    found: &HashMap<[u8; 32], ContextualEnoteRecord>,
) -> Vec<([u8; 32], SpentContext)> {
    let mut updates = Vec::new();
    for set in key_image_sets {
        for ki in &set.key_images {
            if store.has_key_image(ki) || found.contains_key(ki) {
                updates.push((*ki, set.spent_context));
            }
        }
    }
    updates
}

/// One onchain pass: walks chunks forward from `(start_height, start_trust)` until the
/// chain tip is reached (commits what was accumulated and returns `Done`) or a fetched
/// chunk's prefix disagrees with the running trust marker (nothing is committed; returns
/// `NeedRescan`). `start_trust = None` means "trust the first chunk unconditionally" —
/// used when `start_height` is at or below the store's own tracked floor, since there is
/// nothing recorded there to disagree with.
fn onchain_pass<L: EnoteFindingContextLedger>(
    config: &ScanConfig,
    store: &mut EnoteStore,
    ledger_ctx: &L,
    processor: &dyn RecordProcessor,
    terminate: &Arc<AtomicBool>,
    start_height: u64,
    start_trust: Option<ContiguityMarker>,
) -> Result<ScanSignal, ScanError> {
    let first_new_block = start_height;
    let mut next_height = start_height;
    let mut trust = start_trust;
    let mut found: HashMap<[u8; 32], ContextualEnoteRecord> = HashMap::new();
    let mut spent_updates: Vec<([u8; 32], SpentContext)> = Vec::new();
    let mut block_ids: Vec<[u8; 32]> = Vec::new();

    loop {
        if terminate.load(Ordering::SeqCst) {
            return Err(ScanError::Aborted);
        }

        let chunk = ledger_ctx.try_get_onchain_chunk(next_height, config.max_chunk_size)?;

        if !chunk.is_empty_tip_chunk() && (!chunk.is_well_formed() || chunk.start_height != next_height) {
            return Err(ScanError::InvalidChunk("chunk fails basic shape invariants".into()));
        }

        if let Some(trust_marker) = trust {
            let incoming = ContiguityMarker {
                height: chunk.start_height.saturating_sub(1),
                block_id: Some(chunk.prefix_block_id),
            };
            if !trust_marker.is_contiguous_with(&incoming) {
                let break_height = chunk.start_height.saturating_sub(1);
                let kind = if break_height <= config.first_contiguity_height { "NEED_FULLSCAN" } else { "NEED_PARTIALSCAN" };
                log::warn!("{kind}: onchain contiguity broken at height {break_height}");
                return Ok(ScanSignal::NeedRescan { break_height });
            }
        }

        if chunk.is_empty_tip_chunk() {
            log::debug!("onchain scan reached tip at height {}", next_height.saturating_sub(1));
            store.apply_onchain_scan_result(first_new_block, next_height, found, &spent_updates, &block_ids);
            return Ok(ScanSignal::Done);
        }

        log::debug!("processing onchain chunk [{}, {})", chunk.start_height, chunk.end_height);
        let chunk_found = process_chunk(&chunk.basic_records_by_tx, &chunk.contextual_key_images, store, &found, processor);
        let chunk_spent = spent_updates_for(&chunk.contextual_key_images, store, &chunk_found);
        for (ki, rec) in chunk_found {
            found.entry(ki).or_insert(rec);
        }
        spent_updates.extend(chunk_spent);
        block_ids.extend_from_slice(&chunk.block_ids);

        next_height = chunk.end_height;
        trust = Some(ContiguityMarker {
            height: chunk.end_height - 1,
            block_id: chunk.block_ids.last().copied(),
        });
    }
}

/// Computes this attempt's starting height and trust marker: the `k`-th retry backs off
/// `reorg_avoidance_depth.max(1) * 10^k` blocks from the session's top, bounded below by
/// the store's refresh height; once the backed-off height reaches that floor, the scan
/// restarts unconditionally from the store's tracked genesis.
fn attempt_start(store: &EnoteStore, config: &ScanConfig, attempt: u32) -> (u64, Option<ContiguityMarker>) {
    let floor = store.refresh_height();
    let distance = config.reorg_avoidance_depth.max(1).saturating_mul(10u64.saturating_pow(attempt));
    let start_height = match store.top_block_height() {
        Some(top) => (top + 1).saturating_sub(distance).max(floor),
        None => floor,
    };
    let trust = if start_height <= floor {
        None
    } else {
        Some(ContiguityMarker {
            height: start_height - 1,
            block_id: store.block_id_at(start_height - 1),
        })
    };
    (start_height, trust)
}

/// Runs the onchain pass to completion, retrying on contiguity breaks with exponential
/// reorg-avoidance back-off per §4.4, bounded by `config.max_partialscan_attempts`.
pub fn refresh_ledger<L: EnoteFindingContextLedger>(
    config: &ScanConfig,
    store: &mut EnoteStore,
    ledger_ctx: &L,
    processor: &dyn RecordProcessor,
    terminate: &Arc<AtomicBool>,
) -> Result<(), ScanError> {
    let mut attempts: u64 = 0;
    loop {
        let (start_height, start_trust) = attempt_start(store, config, attempts as u32);
        match onchain_pass(config, store, ledger_ctx, processor, terminate, start_height, start_trust)? {
            ScanSignal::Done => return Ok(()),
            ScanSignal::NeedRescan { break_height } => {
                attempts += 1;
                log::warn!(
                    "onchain scan rescan attempt {attempts}/{} after break at height {break_height}",
                    config.max_partialscan_attempts
                );
                if attempts > config.max_partialscan_attempts {
                    return Err(ScanError::MaxRetries);
                }
            }
        }
    }
}

fn run_nonledger_pass(
    store: &mut EnoteStore,
    chunk: &ChunkNonLedger,
    processor: &dyn RecordProcessor,
    origin_to_clear: OriginStatus,
    spent_to_clear: SpentStatus,
) -> Result<(), ScanError> {
    if !chunk.is_well_formed() {
        return Err(ScanError::InvalidChunk("non-ledger chunk fails basic shape invariants".into()));
    }
    let found = process_chunk(&chunk.basic_records_by_tx, &chunk.contextual_key_images, store, &HashMap::new(), processor);
    let spent_updates = spent_updates_for(&chunk.contextual_key_images, store, &found);
    store.apply_nonledger_scan_result(origin_to_clear, spent_to_clear, found, &spent_updates);
    Ok(())
}

pub fn refresh_unconfirmed<L: EnoteFindingContextLedger>(
    store: &mut EnoteStore,
    ledger_ctx: &L,
    processor: &dyn RecordProcessor,
) -> Result<(), ScanError> {
    let chunk = ledger_ctx.try_get_unconfirmed_chunk()?;
    run_nonledger_pass(store, &chunk, processor, OriginStatus::Unconfirmed, SpentStatus::SpentUnconfirmed)
}

pub fn refresh_offchain<O: EnoteFindingContextOffchain>(
    store: &mut EnoteStore,
    offchain_ctx: &O,
    processor: &dyn RecordProcessor,
) -> Result<(), ScanError> {
    let chunk = offchain_ctx.try_get_offchain_chunk()?;
    run_nonledger_pass(store, &chunk, processor, OriginStatus::Offchain, SpentStatus::SpentOffchain)
}

/// The full refresh: onchain pass, unconfirmed pass, then an onchain follow-up pass so
/// that any tx confirmed between the two mempool snapshots is picked up without waiting
/// for the next caller-driven refresh, then (if configured) an offchain pass.
pub fn refresh_full<L: EnoteFindingContextLedger, O: EnoteFindingContextOffchain>(
    config: &ScanConfig,
    store: &mut EnoteStore,
    ledger_ctx: &L,
    offchain_ctx: Option<&O>,
    processor: &dyn RecordProcessor,
    terminate: &Arc<AtomicBool>,
) -> Result<(), ScanError> {
    refresh_ledger(config, store, ledger_ctx, processor, terminate)?;
    refresh_unconfirmed(store, ledger_ctx, processor)?;
    refresh_ledger(config, store, ledger_ctx, processor, terminate)?;
    if let Some(offchain_ctx) = offchain_ctx {
        refresh_offchain(store, offchain_ctx, processor)?;
    }
    Ok(())
}
