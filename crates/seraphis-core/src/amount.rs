use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

use crate::serde_point;

/// `C = x*G + a*H`: a Pedersen commitment to a 64-bit amount under blinding factor `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountCommitment {
    #[serde(with = "serde_point")]
    point: [u8; 32],
}

impl AmountCommitment {
    pub fn commit(blinding: &Scalar, amount: u64, g: &EdwardsPoint, h: &EdwardsPoint) -> Self {
        let c = blinding * g + Scalar::from(amount) * h;
        Self {
            point: c.compress().to_bytes(),
        }
    }

    pub fn from_point(p: EdwardsPoint) -> Self {
        Self {
            point: p.compress().to_bytes(),
        }
    }

    pub fn point(&self) -> Option<EdwardsPoint> {
        curve25519_dalek::edwards::CompressedEdwardsY(self.point).decompress()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.point
    }
}
