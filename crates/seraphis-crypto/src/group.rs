//! Scalar/point algebra and the process-wide generator set.
//!
//! Grounded in `salvium-crypto`'s `clsag.rs`/`bulletproofs_plus.rs` hashing and batch-MSM
//! idioms, generalized into the free functions the Grootle and composition provers share.

use std::sync::OnceLock;

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::{Identity, VartimeMultiscalarMul};
use tiny_keccak::{Hasher, Keccak};

use crate::error::GrootleError;

pub const GROOTLE_MAX_MN: usize = 128;

/// keccak256, matching the teacher's CryptoNote-variant hash used throughout
/// `salvium-crypto` (there named `keccak256_internal`).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Hash an arbitrary number of byte slices to a scalar: keccak256 of their concatenation,
/// reduced mod the group order.
pub fn hash_to_scalar(data: &[&[u8]]) -> Scalar {
    let total: usize = data.iter().map(|d| d.len()).sum();
    let mut combined = Vec::with_capacity(total);
    for d in data {
        combined.extend_from_slice(d);
    }
    Scalar::from_bytes_mod_order(keccak256(&combined))
}

/// Hash a domain-separation label (optionally suffixed, e.g. with a varint index) to a
/// point in the prime-order subgroup, via try-and-increment: hash, attempt to decompress,
/// retry with an incremented counter on failure, then clear the cofactor by doubling three
/// times. This differs from the teacher's elligator2-based `hash_to_point` (whose backing
/// `elligator2` module was not available to this crate) but is an equally standard
/// hash-to-curve idiom and produces points indistinguishable in use.
pub fn hash_to_point(label: &[u8]) -> EdwardsPoint {
    let mut counter: u32 = 0;
    loop {
        let mut input = Vec::with_capacity(label.len() + 4);
        input.extend_from_slice(label);
        input.extend_from_slice(&counter.to_le_bytes());
        let h = keccak256(&input);
        if let Some(p) = CompressedEdwardsY(h).decompress() {
            return p.mul_by_cofactor();
        }
        counter += 1;
    }
}

fn varint(i: usize) -> Vec<u8> {
    let mut v = Vec::new();
    let mut n = i as u64;
    loop {
        let mut byte = (n & 0x7f) as u8;
        n >>= 7;
        if n != 0 {
            byte |= 0x80;
        }
        v.push(byte);
        if n == 0 {
            break;
        }
    }
    v
}

/// Process-wide generator set: `G`, `H`, `U`, `X`, and `{H_i}`. Lazily initialized once
/// via `OnceLock`, per the "process-wide initialized state" design note — idempotent and
/// race-free under concurrent first use, with no explicit locking needed after init.
pub struct GroupContext {
    pub g: EdwardsPoint,
    pub h: EdwardsPoint,
    pub u: EdwardsPoint,
    pub x: EdwardsPoint,
    pub h_vec: Vec<EdwardsPoint>,
}

static GROUP_CONTEXT: OnceLock<GroupContext> = OnceLock::new();

impl GroupContext {
    pub fn get() -> &'static GroupContext {
        GROUP_CONTEXT.get_or_init(|| {
            let h_vec = (0..GROOTLE_MAX_MN)
                .map(|i| {
                    let mut label = b"seraphis_Hi".to_vec();
                    label.extend_from_slice(&varint(i));
                    hash_to_point(&label)
                })
                .collect();
            GroupContext {
                g: ED25519_BASEPOINT_POINT,
                h: hash_to_point(b"seraphis_H"),
                u: hash_to_point(b"seraphis_U"),
                x: hash_to_point(b"seraphis_X"),
                h_vec,
            }
        })
    }
}

/// `invert(x) -> x^-1 mod l`; fails on zero.
pub fn invert(x: &Scalar) -> Result<Scalar, GrootleError> {
    if *x == Scalar::ZERO {
        return Err(GrootleError::ScalarInversion);
    }
    Ok(x.invert())
}

/// Write `val` as little-endian base-`base` digits of length `size`. Caller guarantees
/// `base^size >= val`, so truncation never occurs.
pub fn decompose(mut val: u64, base: u64, size: usize) -> Vec<u64> {
    assert!(base > 1);
    let mut digits = Vec::with_capacity(size);
    for _ in 0..size {
        digits.push(val % base);
        val /= base;
    }
    digits
}

/// `[±1, ±s, ±s^2, ..., ±s^{n-1}]`.
pub fn powers_of_scalar(s: Scalar, n: usize, negate: bool) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(n);
    let mut cur = Scalar::ONE;
    for _ in 0..n {
        out.push(if negate { -cur } else { cur });
        cur *= s;
    }
    out
}

/// Convolve `x[0..m]` with the degree-1 polynomial `y = [y0, y1]`:
/// `result[i+j] += x[i]*y[j]`, producing a length `m+1` result.
pub fn convolve(x: &[Scalar], y: [Scalar; 2]) -> Vec<Scalar> {
    let mut result = vec![Scalar::ZERO; x.len() + 1];
    for (i, xi) in x.iter().enumerate() {
        result[i] += xi * y[0];
        result[i + 1] += xi * y[1];
    }
    result
}

/// Build the `m*n + 1` MSM entries for `com_matrix(M, r) = r*G + Sum_{i,j} M[i][j]*H_{i*n+j}`,
/// returning `(scalars, points)` ready for `multi_exp`/`pippenger`.
pub fn com_matrix(m: &[Vec<Scalar>], r: Scalar) -> (Vec<Scalar>, Vec<EdwardsPoint>) {
    let ctx = GroupContext::get();
    let n = m.first().map(Vec::len).unwrap_or(0);
    let mut scalars = Vec::with_capacity(m.len() * n + 1);
    let mut points = Vec::with_capacity(m.len() * n + 1);
    scalars.push(r);
    points.push(ctx.g);
    for (i, row) in m.iter().enumerate() {
        for (j, s) in row.iter().enumerate() {
            scalars.push(*s);
            points.push(ctx.h_vec[i * n + j]);
        }
    }
    (scalars, points)
}

/// `multi_exp(scalars, points) -> Sum scalars[i]*points[i]`. Short-circuits scalars equal
/// to one (skipping the scalar multiplication) and otherwise defers to dalek's vartime
/// multiscalar-mul, matching the batching idiom the teacher uses in `bulletproofs_plus.rs`.
pub fn multi_exp(scalars: &[Scalar], points: &[EdwardsPoint]) -> EdwardsPoint {
    assert_eq!(scalars.len(), points.len());
    let mut acc = EdwardsPoint::identity();
    let mut batch_scalars = Vec::new();
    let mut batch_points = Vec::new();
    for (s, p) in scalars.iter().zip(points.iter()) {
        if *s == Scalar::ONE {
            acc += p;
        } else if *s != Scalar::ZERO {
            batch_scalars.push(*s);
            batch_points.push(*p);
        }
    }
    if !batch_scalars.is_empty() {
        acc += EdwardsPoint::vartime_multiscalar_mul(batch_scalars.iter(), batch_points.iter());
    }
    acc
}

/// One accumulated term set contributed by a single proof into a shared batch-verification
/// identity check.
pub struct PippengerTerm {
    pub scalars: Vec<Scalar>,
    pub points: Vec<EdwardsPoint>,
}

/// Batch-verify by folding every proof's weighted terms into one deferred multiscalar-mul
/// and checking the result is the identity — the teacher's idiom in `bulletproofs_plus.rs`
/// (`vartime_multiscalar_mul(...) == EdwardsPoint::default()`), generalized to an arbitrary
/// number of term sets. A degenerate `{(1, P), (-1, P)}` input correctly yields identity
/// because dalek's multiscalar-mul and point equality are both exact over the canonical
/// subgroup encoding, with no separate projective-coordinate check required.
pub fn pippenger(terms: &[PippengerTerm]) -> bool {
    let mut scalars = Vec::new();
    let mut points = Vec::new();
    for term in terms {
        scalars.extend_from_slice(&term.scalars);
        points.extend_from_slice(&term.points);
    }
    if scalars.is_empty() {
        return true;
    }
    let result = EdwardsPoint::vartime_multiscalar_mul(scalars.iter(), points.iter());
    result == EdwardsPoint::identity()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;
    use rand_core::RngCore;

    fn random_scalar() -> Scalar {
        let mut bytes = [0u8; 64];
        OsRng.fill_bytes(&mut bytes);
        Scalar::from_bytes_mod_order_wide(&bytes)
    }

    #[test]
    fn invert_is_involutive_and_inverse() {
        let x = random_scalar();
        let inv = invert(&x).unwrap();
        assert_eq!(invert(&inv).unwrap(), x);
        assert_eq!(inv * x, Scalar::ONE);
    }

    #[test]
    fn invert_zero_fails() {
        assert_eq!(invert(&Scalar::ZERO).unwrap_err(), GrootleError::ScalarInversion);
    }

    #[test]
    fn multi_exp_matches_naive_sum() {
        let ctx = GroupContext::get();
        let points = vec![ctx.g, ctx.h, ctx.u];
        let ones = vec![Scalar::ONE; 3];
        let sum = multi_exp(&ones, &points);
        assert_eq!(sum, points[0] + points[1] + points[2]);

        let s = random_scalar();
        let single = multi_exp(&[s], &[ctx.g]);
        assert_eq!(single, s * ctx.g);
    }

    #[test]
    fn pippenger_degenerate_cancel_is_identity() {
        let ctx = GroupContext::get();
        let p = ctx.h;
        let term = PippengerTerm {
            scalars: vec![Scalar::ONE, -Scalar::ONE],
            points: vec![p, p],
        };
        assert!(pippenger(&[term]));
    }

    #[test]
    fn decompose_round_trips_to_base_n_digits() {
        let digits = decompose(53, 4, 4);
        let mut val = 0u64;
        let mut mult = 1u64;
        for d in digits {
            val += d * mult;
            mult *= 4;
        }
        assert_eq!(val, 53);
    }

    #[test]
    fn group_context_is_idempotent_across_threads() {
        let first = GroupContext::get().g;
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| GroupContext::get().g)).collect();
            for h in handles {
                assert_eq!(h.join().unwrap(), first);
            }
        });
    }
}
