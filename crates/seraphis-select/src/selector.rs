//! Marginal-fee-aware input selection. Grounded in §4.6's core subset-selection
//! subroutine, with the `InputSelector` collaborator injected as a trait per the same
//! "virtual class hierarchy -> trait abstraction" pattern `seraphis-scan`'s
//! `EnoteFindingContextLedger` follows.

use std::collections::HashSet;

use seraphis_core::ContextualEnoteRecord;

use crate::error::SelectionError;
use crate::fee_calculator::FeeCalculator;

/// Input-selection tuning, grouped the same way `seraphis-scan`'s `ScanConfig` groups
/// its own tuning knobs rather than a loaded config file (§6a).
#[derive(Clone, Copy, Debug)]
pub struct SelectionConfig {
    pub max_inputs: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { max_inputs: 16 }
    }
}

/// A pool of unspent candidates the selector can draw from, one at a time, largest
/// remaining first. Implementations must never return a key image already present in
/// `excluded` — the core subroutine relies on that to avoid infinite loops.
pub trait InputSelector {
    fn next_candidate(&self, excluded: &HashSet<[u8; 32]>) -> Option<ContextualEnoteRecord>;
}

/// A selector backed by a fixed, descending-by-amount vector — the shape every test in
/// this module uses, and a reasonable adapter over `EnoteStore::unspent_records()` in
/// production.
pub struct VecInputSelector {
    candidates: Vec<ContextualEnoteRecord>,
}

impl VecInputSelector {
    pub fn new(mut candidates: Vec<ContextualEnoteRecord>) -> Self {
        candidates.sort_by(|a, b| b.amount().cmp(&a.amount()));
        Self { candidates }
    }
}

impl InputSelector for VecInputSelector {
    fn next_candidate(&self, excluded: &HashSet<[u8; 32]>) -> Option<ContextualEnoteRecord> {
        self.candidates
            .iter()
            .find(|c| !excluded.contains(&c.image.key_image_bytes()))
            .cloned()
    }
}

fn amount128(r: &ContextualEnoteRecord) -> u128 {
    r.amount() as u128
}

/// Insert keeping the vector sorted ascending by amount (so `.last()` is the largest).
fn insert_sorted(v: &mut Vec<ContextualEnoteRecord>, record: ContextualEnoteRecord) {
    let idx = v.partition_point(|r| amount128(r) <= amount128(&record));
    v.insert(idx, record);
}

/// The smallest `k` in `1..=max_k` such that the sum of `excluded`'s top `k` entries
/// exceeds the marginal fee of adding `k` inputs, or `None` if no such run exists.
fn best_excluded_run(
    excluded: &[ContextualEnoteRecord],
    current_fee: u64,
    fee_for: impl Fn(usize) -> u64,
    added_len: usize,
    max_k: usize,
) -> Option<usize> {
    let max_k = max_k.min(excluded.len());
    for k in 1..=max_k {
        let run = &excluded[excluded.len() - k..];
        let joint_sum: u128 = run.iter().map(amount128).sum();
        let joint_marginal = fee_for(added_len + k).saturating_sub(current_fee);
        if joint_sum > joint_marginal as u128 {
            return Some(k);
        }
    }
    None
}

/// Core subset-selection subroutine (§4.6): greedily promotes/replaces candidates to
/// reach `sum(added) >= target + fee(added.len(), n_outputs)`, preferring already-seen
/// `excluded` candidates over fresh selector queries when both would make progress.
pub fn select_subset(
    selector: &dyn InputSelector,
    fee_calc: &dyn FeeCalculator,
    fee_per_weight: u64,
    n_outputs: usize,
    max_inputs: usize,
    target: u128,
) -> Result<Vec<ContextualEnoteRecord>, SelectionError> {
    let mut added: Vec<ContextualEnoteRecord> = Vec::new();
    let mut excluded: Vec<ContextualEnoteRecord> = Vec::new();
    let mut seen: HashSet<[u8; 32]> = HashSet::new();

    let fee_for = |count: usize| fee_calc.get_fee(fee_per_weight, count, n_outputs);

    loop {
        let current_fee = fee_for(added.len());
        let added_sum: u128 = added.iter().map(amount128).sum();
        if added_sum >= target + current_fee as u128 {
            log::debug!(
                "selection complete: {} inputs, sum {added_sum}, fee {current_fee}",
                added.len()
            );
            return Ok(added);
        }

        let mut progressed = false;

        if added.len() < max_inputs {
            let next_fee = fee_for(added.len() + 1);
            let marginal = next_fee.saturating_sub(current_fee);

            let promote_top = excluded.last().map(|top| amount128(top) > marginal as u128).unwrap_or(false);
            if promote_top {
                let promoted = excluded.pop().expect("checked above");
                log::trace!("promoting excluded candidate (amount {}) into selection", promoted.amount());
                insert_sorted(&mut added, promoted);
                progressed = true;
            } else if let Some(candidate) = selector.next_candidate(&seen) {
                seen.insert(candidate.image.key_image_bytes());
                if amount128(&candidate) > marginal as u128 {
                    log::trace!("adding new candidate (amount {})", candidate.amount());
                    insert_sorted(&mut added, candidate);
                } else {
                    log::trace!("parking new candidate (amount {}) as excluded", candidate.amount());
                    insert_sorted(&mut excluded, candidate);
                }
                progressed = true;
            } else if let Some(k) = best_excluded_run(&excluded, current_fee, fee_for, added.len(), max_inputs - added.len()) {
                log::debug!("promoting a {k}-run of excluded candidates to cover their joint marginal fee");
                for _ in 0..k {
                    let promoted = excluded.pop().expect("run bounded by excluded.len()");
                    insert_sorted(&mut added, promoted);
                }
                progressed = true;
            }
        } else if let Some(smallest) = added.first().cloned() {
            let displace_with_excluded = excluded.last().map(|top| amount128(top) > amount128(&smallest)).unwrap_or(false);
            if displace_with_excluded {
                let better = excluded.pop().expect("checked above");
                added.remove(0);
                insert_sorted(&mut added, better);
                insert_sorted(&mut excluded, smallest);
                log::trace!("displaced smallest added input with a larger excluded candidate");
                progressed = true;
            } else if let Some(candidate) = selector.next_candidate(&seen) {
                seen.insert(candidate.image.key_image_bytes());
                if amount128(&candidate) > amount128(&smallest) {
                    added.remove(0);
                    insert_sorted(&mut added, candidate);
                    insert_sorted(&mut excluded, smallest);
                    log::trace!("displaced smallest added input with a larger new candidate");
                } else {
                    insert_sorted(&mut excluded, candidate);
                }
                progressed = true;
            }
        }

        if !progressed {
            return Err(if added.is_empty() && excluded.is_empty() {
                SelectionError::SelectorExhausted
            } else {
                SelectionError::InsufficientFunds { need: target + current_fee as u128, have: added_sum }
            });
        }
    }
}

/// The number of outputs implied by a user-facing output set plus an assumption about
/// change: a self-send change output is emitted only when change is non-zero.
pub fn implied_output_count(num_user_outputs: usize, has_nonzero_change: bool) -> usize {
    num_user_outputs + if has_nonzero_change { 1 } else { 0 }
}

/// The full input-selection algorithm (§4.6, steps 1-6): selects a subset covering
/// `output_sum` at zero change if an exact fit is found or the zero-change subset still
/// covers the fee of a change output being added; otherwise reselects targeting
/// `output_sum + 1` to force non-zero change.
pub fn select_inputs(
    selector: &dyn InputSelector,
    fee_calc: &dyn FeeCalculator,
    fee_per_weight: u64,
    num_user_outputs: usize,
    output_sum: u128,
    max_inputs: usize,
) -> Result<Vec<ContextualEnoteRecord>, SelectionError> {
    let outputs_0_change = implied_output_count(num_user_outputs, false);
    let subset = select_subset(selector, fee_calc, fee_per_weight, outputs_0_change, max_inputs, output_sum)?;

    let subset_sum: u128 = subset.iter().map(amount128).sum();
    let fee_0_change = fee_calc.get_fee(fee_per_weight, subset.len(), outputs_0_change) as u128;
    if subset_sum == output_sum + fee_0_change {
        log::debug!("exact zero-change fit with {} inputs", subset.len());
        return Ok(subset);
    }

    let outputs_with_change = implied_output_count(num_user_outputs, true);
    let fee_with_change = fee_calc.get_fee(fee_per_weight, subset.len(), outputs_with_change) as u128;
    if subset_sum >= output_sum + fee_with_change {
        log::debug!("zero-change subset also covers the change-output fee; reusing it");
        return Ok(subset);
    }

    log::debug!("reselecting with a forced non-zero change output");
    select_subset(selector, fee_calc, fee_per_weight, outputs_with_change, max_inputs, output_sum + 1)
}

/// `select_inputs`, taking its `max_inputs` bound from a `SelectionConfig` rather than a
/// bare argument — the shape a caller wiring this crate up from persistent settings uses.
pub fn select_inputs_with_config(
    selector: &dyn InputSelector,
    fee_calc: &dyn FeeCalculator,
    fee_per_weight: u64,
    num_user_outputs: usize,
    output_sum: u128,
    config: &SelectionConfig,
) -> Result<Vec<ContextualEnoteRecord>, SelectionError> {
    select_inputs(selector, fee_calc, fee_per_weight, num_user_outputs, output_sum, config.max_inputs)
}
