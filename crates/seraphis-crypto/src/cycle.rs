//! The curve-cycle hash-chain interface used by the scanner's accumulator-path
//! construction. Grounded in Design Notes §9's "two parallel modules with a trait
//! describing shared operations": `CycleCurve` names the operations either curve in a
//! 2-cycle must supply, and `selene`/`helios` are the two concrete implementations the
//! scanner is generic over.
//!
//! Neither curve's real arithmetic ships with this crate's dependency set (the teacher
//! never vendors a Selene/Helios backend either); both modules here implement the trait
//! over `curve25519-dalek`'s own point/scalar types, which is sufficient to drive the
//! scanner's accumulator-path tests end-to-end without pulling in an unrelated curve
//! library purely for test scaffolding.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;

use crate::error::CurveError;
use crate::group::hash_to_scalar;

/// Operations shared by both curves in the 2-cycle. `Point` is this curve's own point
/// type; `CycleScalar` is the *other* curve's scalar type, since `point_to_cycle_scalar`
/// projects across the cycle.
pub trait CycleCurve {
    type Point: Copy + PartialEq;
    type CycleScalar: Copy + PartialEq;

    fn hash_init_point() -> Self::Point;

    /// Projects the x-coordinate of `p` to a scalar of the other curve in the cycle.
    fn point_to_cycle_scalar(p: Self::Point) -> Self::CycleScalar;

    fn hash_grow(
        existing: Self::Point,
        offset: usize,
        existing_child_at_offset: Self::CycleScalar,
        new_children: &[Self::CycleScalar],
    ) -> Result<Self::Point, CurveError>;

    fn hash_trim(
        existing: Self::Point,
        offset: usize,
        children: &[Self::CycleScalar],
        child_to_grow_back: Self::CycleScalar,
    ) -> Result<Self::Point, CurveError>;

    fn zero_scalar() -> Self::CycleScalar;
    fn to_bytes(p: Self::Point) -> [u8; 32];
    fn from_bytes(bytes: &[u8; 32]) -> Result<Self::Point, CurveError>;
    fn scalar_to_bytes(s: Self::CycleScalar) -> [u8; 32];
    fn to_hex(p: Self::Point) -> String {
        hex::encode(Self::to_bytes(p))
    }
}

fn hash_grow_generic(existing: [u8; 32], offset: usize, existing_child: [u8; 32], new_children: &[[u8; 32]]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 + 8 + 32 + new_children.len() * 32);
    buf.extend_from_slice(&existing);
    buf.extend_from_slice(&(offset as u64).to_le_bytes());
    buf.extend_from_slice(&existing_child);
    for c in new_children {
        buf.extend_from_slice(c);
    }
    hash_to_scalar(&[&buf]).to_bytes()
}

fn hash_trim_generic(existing: [u8; 32], offset: usize, children: &[[u8; 32]], child_to_grow_back: [u8; 32]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(32 + 8 + children.len() * 32 + 32);
    buf.extend_from_slice(&existing);
    buf.extend_from_slice(&(offset as u64).to_le_bytes());
    for c in children {
        buf.extend_from_slice(c);
    }
    buf.extend_from_slice(&child_to_grow_back);
    hash_to_scalar(&[&buf]).to_bytes()
}

/// The "inner" curve of the cycle (Monero's Selene analogue).
pub mod selene {
    use super::*;

    pub struct Selene;

    impl CycleCurve for Selene {
        type Point = EdwardsPoint;
        type CycleScalar = Scalar;

        fn hash_init_point() -> EdwardsPoint {
            crate::group::hash_to_point(b"selene_init_point")
        }

        fn point_to_cycle_scalar(p: EdwardsPoint) -> Scalar {
            Scalar::from_bytes_mod_order(p.compress().to_bytes())
        }

        fn hash_grow(existing: EdwardsPoint, offset: usize, existing_child_at_offset: Scalar, new_children: &[Scalar]) -> Result<EdwardsPoint, CurveError> {
            let children: Vec<[u8; 32]> = new_children.iter().map(Scalar::to_bytes).collect();
            let out = hash_grow_generic(existing.compress().to_bytes(), offset, existing_child_at_offset.to_bytes(), &children);
            CompressedEdwardsY(out).decompress().map(|p| p.mul_by_cofactor()).ok_or_else(|| CurveError::Op("hash_grow produced non-canonical point".into()))
        }

        fn hash_trim(existing: EdwardsPoint, offset: usize, children: &[Scalar], child_to_grow_back: Scalar) -> Result<EdwardsPoint, CurveError> {
            let children_bytes: Vec<[u8; 32]> = children.iter().map(Scalar::to_bytes).collect();
            let out = hash_trim_generic(existing.compress().to_bytes(), offset, &children_bytes, child_to_grow_back.to_bytes());
            CompressedEdwardsY(out).decompress().map(|p| p.mul_by_cofactor()).ok_or_else(|| CurveError::Op("hash_trim produced non-canonical point".into()))
        }

        fn zero_scalar() -> Scalar {
            Scalar::ZERO
        }

        fn to_bytes(p: EdwardsPoint) -> [u8; 32] {
            p.compress().to_bytes()
        }

        fn from_bytes(bytes: &[u8; 32]) -> Result<EdwardsPoint, CurveError> {
            CompressedEdwardsY(*bytes).decompress().ok_or_else(|| CurveError::Op("malformed Selene point".into()))
        }

        fn scalar_to_bytes(s: Scalar) -> [u8; 32] {
            s.to_bytes()
        }
    }
}

/// The "outer" curve of the cycle (Monero's Helios analogue).
pub mod helios {
    use super::*;

    pub struct Helios;

    impl CycleCurve for Helios {
        type Point = EdwardsPoint;
        type CycleScalar = Scalar;

        fn hash_init_point() -> EdwardsPoint {
            crate::group::hash_to_point(b"helios_init_point")
        }

        fn point_to_cycle_scalar(p: EdwardsPoint) -> Scalar {
            Scalar::from_bytes_mod_order(p.compress().to_bytes())
        }

        fn hash_grow(existing: EdwardsPoint, offset: usize, existing_child_at_offset: Scalar, new_children: &[Scalar]) -> Result<EdwardsPoint, CurveError> {
            let children: Vec<[u8; 32]> = new_children.iter().map(Scalar::to_bytes).collect();
            let out = hash_grow_generic(existing.compress().to_bytes(), offset, existing_child_at_offset.to_bytes(), &children);
            CompressedEdwardsY(out).decompress().map(|p| p.mul_by_cofactor()).ok_or_else(|| CurveError::Op("hash_grow produced non-canonical point".into()))
        }

        fn hash_trim(existing: EdwardsPoint, offset: usize, children: &[Scalar], child_to_grow_back: Scalar) -> Result<EdwardsPoint, CurveError> {
            let children_bytes: Vec<[u8; 32]> = children.iter().map(Scalar::to_bytes).collect();
            let out = hash_trim_generic(existing.compress().to_bytes(), offset, &children_bytes, child_to_grow_back.to_bytes());
            CompressedEdwardsY(out).decompress().map(|p| p.mul_by_cofactor()).ok_or_else(|| CurveError::Op("hash_trim produced non-canonical point".into()))
        }

        fn zero_scalar() -> Scalar {
            Scalar::ZERO
        }

        fn to_bytes(p: EdwardsPoint) -> [u8; 32] {
            p.compress().to_bytes()
        }

        fn from_bytes(bytes: &[u8; 32]) -> Result<EdwardsPoint, CurveError> {
            CompressedEdwardsY(*bytes).decompress().ok_or_else(|| CurveError::Op("malformed Helios point".into()))
        }

        fn scalar_to_bytes(s: Scalar) -> [u8; 32] {
            s.to_bytes()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::helios::Helios;
    use super::selene::Selene;
    use super::*;

    #[test]
    fn selene_hash_grow_is_deterministic() {
        let init = Selene::hash_init_point();
        let children = [Scalar::from(1u64), Scalar::from(2u64)];
        let a = Selene::hash_grow(init, 0, Scalar::ZERO, &children).unwrap();
        let b = Selene::hash_grow(init, 0, Scalar::ZERO, &children).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn point_to_cycle_scalar_crosses_curves() {
        let p = Selene::hash_init_point();
        let s: Scalar = Selene::point_to_cycle_scalar(p);
        // the scalar lands in Helios' scalar field (here, the same backing type, by
        // construction of this in-repo toy cycle).
        let _ = Helios::zero_scalar();
        assert_ne!(s, Scalar::ZERO);
    }

    #[test]
    fn grow_then_trim_back_is_recoverable_shape() {
        let init = Selene::hash_init_point();
        let existing_child = Scalar::ZERO;
        let new_children = [Scalar::from(5u64)];
        let grown = Selene::hash_grow(init, 2, existing_child, &new_children).unwrap();
        // trimming re-derives a node from the same inputs in reverse role; exact equality
        // with `init` is not expected (hash_trim computes a sibling-aggregate commitment,
        // not a literal inverse), only that it succeeds and is deterministic.
        let trimmed_a = Selene::hash_trim(grown, 2, &new_children, existing_child).unwrap();
        let trimmed_b = Selene::hash_trim(grown, 2, &new_children, existing_child).unwrap();
        assert_eq!(trimmed_a, trimmed_b);
    }
}
