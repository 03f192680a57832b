//! Fixed-order Fiat-Shamir transcript builder shared by Grootle and the composition
//! proof. Mirrors the teacher's domain-separated hashing idiom (`clsag.rs`'s
//! `pad_domain`/`hash_to_scalar`) generalized into an append-then-finalize builder so
//! both proof systems can share one implementation of "hash the prefix, then everything
//! else in a fixed order".

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;

use crate::group::hash_to_scalar;

pub struct Transcript {
    buf: Vec<u8>,
}

impl Transcript {
    /// Start a new transcript, hashing the domain-separation prefix into the initial
    /// state. Per §6, any appended input of length <= 1 byte is an implementation bug.
    pub fn new(domain_prefix: &'static str) -> Self {
        debug_assert!(domain_prefix.len() > 1);
        let mut buf = Vec::new();
        buf.extend_from_slice(domain_prefix.as_bytes());
        Self { buf }
    }

    pub fn append_bytes(&mut self, label: &'static str, data: &[u8]) -> &mut Self {
        debug_assert!(data.len() > 1, "transcript input '{label}' has length <= 1 byte");
        self.buf.extend_from_slice(data);
        self
    }

    pub fn append_point(&mut self, label: &'static str, p: &EdwardsPoint) -> &mut Self {
        self.append_bytes(label, &p.compress().to_bytes())
    }

    pub fn append_points(&mut self, label: &'static str, ps: &[EdwardsPoint]) -> &mut Self {
        for p in ps {
            self.append_point(label, p);
        }
        self
    }

    pub fn append_scalar(&mut self, label: &'static str, s: &Scalar) -> &mut Self {
        self.append_bytes(label, s.as_bytes())
    }

    /// Consume the transcript, producing the Fiat-Shamir challenge scalar.
    pub fn challenge(&self) -> Scalar {
        hash_to_scalar(&[&self.buf])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;

    #[test]
    fn challenge_is_deterministic_in_append_order() {
        let mut a = Transcript::new("grootle");
        a.append_point("A", &ED25519_BASEPOINT_POINT);
        a.append_scalar("s", &Scalar::from(7u64));

        let mut b = Transcript::new("grootle");
        b.append_point("A", &ED25519_BASEPOINT_POINT);
        b.append_scalar("s", &Scalar::from(7u64));

        assert_eq!(a.challenge(), b.challenge());
    }

    #[test]
    fn different_domain_prefix_changes_challenge() {
        let mut a = Transcript::new("grootle");
        a.append_scalar("s", &Scalar::from(7u64));
        let mut b = Transcript::new("concise_grootle");
        b.append_scalar("s", &Scalar::from(7u64));
        assert_ne!(a.challenge(), b.challenge());
    }
}
