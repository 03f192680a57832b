use serde::{Deserialize, Serialize};

/// A fee value discretized to one of 256 representable levels, rounding up. The default
/// table is geometric (each level roughly doubles the previous, saturating at `u64::MAX`
/// for the top levels) so a small number of bytes still covers a wide fee range, matching
/// the original's "round up to the next representable fee" scheme.
const NUM_LEVELS: usize = 256;

fn default_table() -> [u64; NUM_LEVELS] {
    let mut table = [0u64; NUM_LEVELS];
    let mut value: u128 = 1;
    for slot in table.iter_mut() {
        *slot = value.min(u64::MAX as u128) as u64;
        value = (value * 5 / 4).max(value + 1);
    }
    table
}

/// `DiscretizedFee` — a one-byte level chosen from a monotone table of permissible fee
/// values (§3). `level(a) ≥ level(b) ⇔ a ≥ b`, and `value(level(a)) ≥ a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscretizedFee {
    level: u8,
}

impl DiscretizedFee {
    /// Discretize a raw fee value, rounding up to the least level whose table value is
    /// `>= raw_fee`. Values above the top level saturate to the top level.
    pub fn from_raw(raw_fee: u64) -> Self {
        let table = default_table();
        let level = table
            .iter()
            .position(|&v| v >= raw_fee)
            .unwrap_or(NUM_LEVELS - 1);
        Self { level: level as u8 }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// The concrete fee amount this level represents; always `>= ` the raw value that
    /// produced it.
    pub fn value(&self) -> u64 {
        default_table()[self.level as usize]
    }
}

impl PartialEq<u64> for DiscretizedFee {
    fn eq(&self, other: &u64) -> bool {
        self.value() == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_never_underestimates_raw() {
        for raw in [0u64, 1, 100, 1_000, 1_000_000, u64::MAX] {
            let fee = DiscretizedFee::from_raw(raw);
            assert!(fee.value() >= raw, "raw={raw} value={}", fee.value());
        }
    }

    #[test]
    fn level_is_monotone_in_raw_value() {
        let a = DiscretizedFee::from_raw(100);
        let b = DiscretizedFee::from_raw(200);
        assert!(a.level() <= b.level());

        let c = DiscretizedFee::from_raw(200);
        let d = DiscretizedFee::from_raw(100);
        assert!(c.level() >= d.level());
    }

    #[test]
    fn zero_rounds_up_to_first_level() {
        let fee = DiscretizedFee::from_raw(0);
        assert!(fee.value() >= 0);
    }
}
