//! Chunk-producing collaborators the scanner is generic over. Plain traits rather than a
//! virtual base class, per Design Notes §9's "virtual class hierarchies re-architected as
//! trait abstraction"; test code implements them over an in-memory vector of pre-scripted
//! chunks, grounded in the teacher's general preference for dependency-injected mocks
//! (e.g. `salvium-tx`'s fee/decoy test fixtures).

use seraphis_core::{ChunkLedger, ChunkNonLedger};

use crate::error::ScanError;

pub trait EnoteFindingContextLedger {
    /// Produces a chunk whose `start_height == next_height`, containing at most
    /// `max_size` blocks. An empty `block_ids` signals the top of the known chain; its
    /// `prefix_block_id` is still the id of block `next_height - 1` so the caller can
    /// check contiguity even when there is nothing new to scan.
    fn try_get_onchain_chunk(&self, next_height: u64, max_size: u64) -> Result<ChunkLedger, ScanError>;

    fn try_get_unconfirmed_chunk(&self) -> Result<ChunkNonLedger, ScanError>;
}

pub trait EnoteFindingContextOffchain {
    fn try_get_offchain_chunk(&self) -> Result<ChunkNonLedger, ScanError>;
}

/// An in-memory, pre-scripted ledger feed: scripted chunks are served in order, then an
/// empty tip chunk is served forever after.
pub struct MockLedgerFindContext {
    chunks: Vec<ChunkLedger>,
    unconfirmed: ChunkNonLedger,
}

impl MockLedgerFindContext {
    pub fn new(chunks: Vec<ChunkLedger>, unconfirmed: ChunkNonLedger) -> Self {
        Self { chunks, unconfirmed }
    }

    fn empty_tip_chunk(next_height: u64, prefix_block_id: [u8; 32]) -> ChunkLedger {
        ChunkLedger {
            start_height: next_height,
            end_height: next_height,
            prefix_block_id,
            block_ids: Vec::new(),
            basic_records_by_tx: Default::default(),
            contextual_key_images: Vec::new(),
        }
    }
}

impl EnoteFindingContextLedger for MockLedgerFindContext {
    fn try_get_onchain_chunk(&self, next_height: u64, _max_size: u64) -> Result<ChunkLedger, ScanError> {
        for chunk in &self.chunks {
            if chunk.start_height == next_height {
                return Ok(chunk.clone());
            }
        }
        let prefix_id = self
            .chunks
            .iter()
            .find(|c| c.end_height == next_height)
            .and_then(|c| c.block_ids.last().copied())
            .unwrap_or([0u8; 32]);
        Ok(Self::empty_tip_chunk(next_height, prefix_id))
    }

    fn try_get_unconfirmed_chunk(&self) -> Result<ChunkNonLedger, ScanError> {
        Ok(self.unconfirmed.clone())
    }
}

pub struct MockOffchainFindContext {
    chunk: ChunkNonLedger,
}

impl MockOffchainFindContext {
    pub fn new(chunk: ChunkNonLedger) -> Self {
        Self { chunk }
    }
}

impl EnoteFindingContextOffchain for MockOffchainFindContext {
    fn try_get_offchain_chunk(&self) -> Result<ChunkNonLedger, ScanError> {
        Ok(self.chunk.clone())
    }
}
