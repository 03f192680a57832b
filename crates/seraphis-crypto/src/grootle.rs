//! The "large" (fast-verify) Grootle one-of-many membership proof.
//!
//! Proves knowledge of a secret index `l* in [0, N)`, N = n^m, together with openings
//! `k_alpha` of `M[l*][alpha] - C_offsets[alpha] = k_alpha*G` for k commitment columns,
//! without revealing `l*`. Construction and verification equations follow §4.2 exactly;
//! batched verification folds several proofs sharing the same reference matrix `M` into
//! one deferred multiscalar-mul, grounded in the teacher's `bulletproofs_plus.rs` weighted
//! batch-identity-check idiom.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::GrootleError;
use crate::group::{com_matrix, convolve, decompose, multi_exp, powers_of_scalar, GroupContext};
use crate::transcript::Transcript;

/// Minimum entropy (in bytes) required of a per-proof batch "small weight" per the
/// Open Question in Design Notes §9: asserted but not derived in the source, preserved
/// as-is rather than re-justified.
const MIN_SMALL_WEIGHT_BYTES: usize = 3;

const INV_EIGHT_LABEL: &str = "grootle";

pub(crate) fn inv_eight() -> Scalar {
    Scalar::from(8u64).invert()
}

/// A large-variant Grootle proof. All group elements are stored pre-multiplied by `1/8`;
/// `verify`/`verify_batch` multiply back by 8 before using them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrootleProof {
    pub a: EdwardsPoint,
    pub b: EdwardsPoint,
    pub c: EdwardsPoint,
    pub d: EdwardsPoint,
    /// `f[j][i]` for `j in 0..m`, `i in 1..n` (index 0 is implied by the zero-sum row).
    pub f: Vec<Vec<Scalar>>,
    /// `x[alpha][j]` for `alpha in 0..k`, `j in 0..m`.
    pub x: Vec<Vec<EdwardsPoint>>,
    pub z_a: Scalar,
    pub z_c: Scalar,
    pub z: Vec<Scalar>,
}

pub struct GrootleWitness {
    pub index: usize,
    pub privkeys: Vec<Scalar>,
}

pub(crate) fn decompose_index(index: usize, n: usize, m: usize) -> Vec<usize> {
    decompose(index as u64, n as u64, m)
        .into_iter()
        .map(|d| d as usize)
        .collect()
}

pub(crate) fn zero_sum_row<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Vec<Scalar> {
    let mut row = Vec::with_capacity(n);
    let mut sum = Scalar::ZERO;
    for _ in 1..n {
        let v = Scalar::random(rng);
        sum += v;
        row.push(v);
    }
    row.insert(0, -sum);
    row
}

pub(crate) fn kronecker_row(n: usize, at: usize) -> Vec<Scalar> {
    (0..n).map(|i| if i == at { Scalar::ONE } else { Scalar::ZERO }).collect()
}

#[allow(clippy::too_many_arguments)]
pub fn prove<R: RngCore + CryptoRng>(
    matrix: &[Vec<EdwardsPoint>],
    offsets: &[EdwardsPoint],
    witness: &GrootleWitness,
    n: usize,
    m: usize,
    message: &[u8],
    rng: &mut R,
) -> Result<GrootleProof, GrootleError> {
    let nn = n.checked_pow(m as u32).ok_or_else(|| GrootleError::Malformed("n^m overflow".into()))?;
    if matrix.len() != nn {
        return Err(GrootleError::SizeMismatch { expected: nn, actual: matrix.len() });
    }
    let k = offsets.len();
    if witness.privkeys.len() != k {
        return Err(GrootleError::SizeMismatch { expected: k, actual: witness.privkeys.len() });
    }

    let decomp = decompose_index(witness.index, n, m);

    // Secret matrices, wrapped so they are wiped on every exit path (§5).
    let a_mat: Zeroizing<Vec<Vec<Scalar>>> = Zeroizing::new((0..m).map(|_| zero_sum_row(n, rng)).collect());
    let sigma: Zeroizing<Vec<Vec<Scalar>>> =
        Zeroizing::new((0..m).map(|j| kronecker_row(n, decomp[j])).collect());
    let a_sigma: Zeroizing<Vec<Vec<Scalar>>> = Zeroizing::new(
        (0..m)
            .map(|j| (0..n).map(|i| a_mat[j][i] * (Scalar::ONE - Scalar::from(2u64) * sigma[j][i])).collect())
            .collect(),
    );
    let a_sq: Zeroizing<Vec<Vec<Scalar>>> =
        Zeroizing::new((0..m).map(|j| (0..n).map(|i| -(a_mat[j][i] * a_mat[j][i])).collect()).collect());

    let r_a = Zeroizing::new(Scalar::random(rng));
    let r_b = Zeroizing::new(Scalar::random(rng));
    let r_c = Zeroizing::new(Scalar::random(rng));
    let r_d = Zeroizing::new(Scalar::random(rng));

    let (sa, pa) = com_matrix(&a_mat, *r_a);
    let a_point = multi_exp(&sa, &pa);
    let (sb, pb) = com_matrix(&sigma, *r_b);
    let b_point = multi_exp(&sb, &pb);
    let (sc, pc) = com_matrix(&a_sigma, *r_c);
    let c_point = multi_exp(&sc, &pc);
    let (sd, pd) = com_matrix(&a_sq, *r_d);
    let d_point = multi_exp(&sd, &pd);

    // p[k][j]: degree-m polynomial per reference-set row, built by repeated convolution.
    let p: Vec<Vec<Scalar>> = (0..nn)
        .map(|row| {
            let row_decomp = decompose_index(row, n, m);
            let mut poly = vec![Scalar::ONE];
            for j in 0..m {
                let i = row_decomp[j];
                poly = convolve(&poly, [a_mat[j][i], sigma[j][i]]);
            }
            poly
        })
        .collect();

    let rho: Zeroizing<Vec<Vec<Scalar>>> =
        Zeroizing::new((0..k).map(|_| (0..m).map(|_| Scalar::random(rng)).collect()).collect());

    let g = GroupContext::get().g;
    let mut x = vec![vec![EdwardsPoint::identity(); m]; k];
    for alpha in 0..k {
        for j in 0..m {
            let mut acc = EdwardsPoint::identity();
            for (row, p_row) in p.iter().enumerate() {
                acc += p_row[j] * (matrix[row][alpha] - offsets[alpha]);
            }
            acc += rho[alpha][j] * g;
            x[alpha][j] = acc;
        }
    }

    let mut transcript = Transcript::new(INV_EIGHT_LABEL);
    transcript.append_bytes("message", message);
    for row in matrix {
        transcript.append_points("M_row", row);
    }
    transcript.append_points("offsets", offsets);
    transcript.append_point("A", &a_point);
    transcript.append_point("B", &b_point);
    transcript.append_point("C", &c_point);
    transcript.append_point("D", &d_point);
    for row in &x {
        transcript.append_points("X_row", row);
    }
    let xi = transcript.challenge();
    if xi == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero challenge".into()));
    }

    let mut f = vec![Vec::with_capacity(n - 1); m];
    for j in 0..m {
        for i in 1..n {
            let val = sigma[j][i] * xi + a_mat[j][i];
            if val == Scalar::ZERO {
                return Err(GrootleError::Malformed("zero f response".into()));
            }
            f[j].push(val);
        }
    }

    let z_a = *r_b * xi + *r_a;
    let z_c = *r_c * xi + *r_d;
    if z_a == Scalar::ZERO || z_c == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero z_a/z_c response".into()));
    }

    let xi_pows = powers_of_scalar(xi, m + 1, false);
    let mut z = Vec::with_capacity(k);
    for alpha in 0..k {
        let mut sub = Scalar::ZERO;
        for j in 0..m {
            sub += rho[alpha][j] * xi_pows[j];
        }
        let val = witness.privkeys[alpha] * xi_pows[m] - sub;
        if val == Scalar::ZERO {
            return Err(GrootleError::Malformed("zero z response".into()));
        }
        z.push(val);
    }

    let inv8 = inv_eight();
    let x_scaled: Vec<Vec<EdwardsPoint>> = x.iter().map(|row| row.iter().map(|p| inv8 * p).collect()).collect();

    Ok(GrootleProof {
        a: inv8 * a_point,
        b: inv8 * b_point,
        c: inv8 * c_point,
        d: inv8 * d_point,
        f,
        x: x_scaled,
        z_a,
        z_c,
        z,
    })
}

fn reconstruct_f_row(xi: Scalar, row: &[Scalar]) -> Result<Vec<Scalar>, GrootleError> {
    let sum: Scalar = row.iter().sum();
    let f0 = xi - sum;
    if f0 == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero implied f[0]".into()));
    }
    let mut full = Vec::with_capacity(row.len() + 1);
    full.push(f0);
    full.extend_from_slice(row);
    Ok(full)
}

fn sanity_check(proof: &GrootleProof) -> Result<(), GrootleError> {
    let identity = EdwardsPoint::identity();
    if proof.a == identity || proof.b == identity || proof.c == identity || proof.d == identity {
        return Err(GrootleError::Malformed("commitment point is identity".into()));
    }
    if proof.z_a == Scalar::ZERO || proof.z_c == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero z_a/z_c".into()));
    }
    if proof.z.iter().any(|z| *z == Scalar::ZERO) {
        return Err(GrootleError::Malformed("zero z response".into()));
    }
    for row in &proof.f {
        if row.iter().any(|f| *f == Scalar::ZERO) {
            return Err(GrootleError::Malformed("zero f response".into()));
        }
    }
    for row in &proof.x {
        if row.iter().any(|p| *p == identity) {
            return Err(GrootleError::Malformed("X component is identity".into()));
        }
    }
    Ok(())
}

fn rederive_challenge(
    matrix: &[Vec<EdwardsPoint>],
    offsets: &[EdwardsPoint],
    message: &[u8],
    a: EdwardsPoint,
    b: EdwardsPoint,
    c: EdwardsPoint,
    d: EdwardsPoint,
    x: &[Vec<EdwardsPoint>],
) -> Scalar {
    let mut transcript = Transcript::new(INV_EIGHT_LABEL);
    transcript.append_bytes("message", message);
    for row in matrix {
        transcript.append_points("M_row", row);
    }
    transcript.append_points("offsets", offsets);
    transcript.append_point("A", &a);
    transcript.append_point("B", &b);
    transcript.append_point("C", &c);
    transcript.append_point("D", &d);
    for row in x {
        transcript.append_points("X_row", row);
    }
    transcript.challenge()
}

/// Verify a single proof directly (unbatched), by reconstructing both verification
/// equations as exact point checks.
pub fn verify(
    proof: &GrootleProof,
    matrix: &[Vec<EdwardsPoint>],
    offsets: &[EdwardsPoint],
    n: usize,
    m: usize,
    message: &[u8],
) -> Result<(), GrootleError> {
    sanity_check(proof)?;
    let k = offsets.len();
    if proof.z.len() != k || proof.x.len() != k {
        return Err(GrootleError::SizeMismatch { expected: k, actual: proof.z.len() });
    }
    if proof.f.len() != m {
        return Err(GrootleError::SizeMismatch { expected: m, actual: proof.f.len() });
    }

    let a = proof.a * Scalar::from(8u64);
    let b = proof.b * Scalar::from(8u64);
    let c = proof.c * Scalar::from(8u64);
    let d = proof.d * Scalar::from(8u64);
    let x: Vec<Vec<EdwardsPoint>> = proof.x.iter().map(|row| row.iter().map(|p| p * Scalar::from(8u64)).collect()).collect();

    let xi = rederive_challenge(matrix, offsets, message, a, b, c, d, &x);
    if xi == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero challenge".into()));
    }

    let mut f_full = Vec::with_capacity(m);
    for row in &proof.f {
        f_full.push(reconstruct_f_row(xi, row)?);
    }

    // (i) com_matrix(f, z_A) == A + xi*B
    let (sf, pf) = com_matrix(&f_full, proof.z_a);
    let lhs1 = multi_exp(&sf, &pf);
    if lhs1 != a + xi * b {
        return Err(GrootleError::Malformed("equation (i) failed".into()));
    }

    // (ii) com_matrix(f .* (xi - f), z_C) == xi*C + D
    let f_cross: Vec<Vec<Scalar>> = f_full.iter().map(|row| row.iter().map(|fi| fi * (xi - fi)).collect()).collect();
    let (sfc, pfc) = com_matrix(&f_cross, proof.z_c);
    let lhs2 = multi_exp(&sfc, &pfc);
    if lhs2 != xi * c + d {
        return Err(GrootleError::Malformed("equation (ii) failed".into()));
    }

    // (iii) Sum_k t_k*(M[k][alpha]-C_offsets[alpha]) == Sum_j xi^j*X[alpha][j] - z[alpha]*G, per alpha.
    let g = GroupContext::get().g;
    let decomps: Vec<Vec<usize>> = (0..matrix.len()).map(|row| decompose_index(row, n, m)).collect();
    let t: Vec<Scalar> = decomps
        .iter()
        .map(|d| (0..m).map(|j| f_full[j][d[j]]).product())
        .collect();
    let xi_pows = powers_of_scalar(xi, m, false);
    for alpha in 0..k {
        let mut lhs = EdwardsPoint::identity();
        for (row, tk) in matrix.iter().zip(t.iter()) {
            lhs += *tk * (row[alpha] - offsets[alpha]);
        }
        let mut rhs = EdwardsPoint::identity();
        for j in 0..m {
            rhs += xi_pows[j] * x[alpha][j];
        }
        rhs -= proof.z[alpha] * g;
        if lhs != rhs {
            return Err(GrootleError::Malformed("equation (iii) failed".into()));
        }
    }

    Ok(())
}

/// Batch-verify `N_proofs` proofs that all share the same reference matrix `M`, folding
/// every proof's weighted terms into one Pippenger-style multiscalar-mul identity check.
pub fn verify_batch<R: RngCore + CryptoRng>(
    proofs: &[GrootleProof],
    matrix: &[Vec<EdwardsPoint>],
    offsets: &[EdwardsPoint],
    n: usize,
    m: usize,
    message: &[u8],
    rng: &mut R,
) -> Result<(), GrootleError> {
    for p in proofs {
        sanity_check(p)?;
    }
    let k = offsets.len();
    let g = GroupContext::get().g;
    let decomps: Vec<Vec<usize>> = (0..matrix.len()).map(|row| decompose_index(row, n, m)).collect();

    let mut all_scalars: Vec<Scalar> = Vec::new();
    let mut all_points: Vec<EdwardsPoint> = Vec::new();

    for proof in proofs {
        let a = proof.a * Scalar::from(8u64);
        let b = proof.b * Scalar::from(8u64);
        let c = proof.c * Scalar::from(8u64);
        let d = proof.d * Scalar::from(8u64);
        let x: Vec<Vec<EdwardsPoint>> =
            proof.x.iter().map(|row| row.iter().map(|p| p * Scalar::from(8u64)).collect()).collect();

        let xi = rederive_challenge(matrix, offsets, message, a, b, c, d, &x);
        if xi == Scalar::ZERO {
            return Err(GrootleError::Malformed("zero challenge".into()));
        }
        let mut f_full = Vec::with_capacity(m);
        for row in &proof.f {
            f_full.push(reconstruct_f_row(xi, row)?);
        }

        let w1 = small_weight(rng, MIN_SMALL_WEIGHT_BYTES);
        let w2 = small_weight(rng, MIN_SMALL_WEIGHT_BYTES);
        let w3 = small_weight(rng, MIN_SMALL_WEIGHT_BYTES);

        // (i): w1*(com_matrix(f, z_A) - (A + xi*B)) == 0
        let (mut sf, mut pf) = com_matrix(&f_full, proof.z_a);
        for s in sf.iter_mut() {
            *s *= w1;
        }
        all_scalars.append(&mut sf);
        all_points.append(&mut pf);
        all_scalars.push(-w1);
        all_points.push(a);
        all_scalars.push(-w1 * xi);
        all_points.push(b);

        // (ii): w2*(com_matrix(f.*(xi-f), z_C) - (xi*C + D)) == 0
        let f_cross: Vec<Vec<Scalar>> =
            f_full.iter().map(|row| row.iter().map(|fi| fi * (xi - fi)).collect()).collect();
        let (mut sfc, mut pfc) = com_matrix(&f_cross, proof.z_c);
        for s in sfc.iter_mut() {
            *s *= w2;
        }
        all_scalars.append(&mut sfc);
        all_points.append(&mut pfc);
        all_scalars.push(-w2 * xi);
        all_points.push(c);
        all_scalars.push(-w2);
        all_points.push(d);

        // (iii), weighted by w3 and the per-column small weights sw[alpha] (sw[0] = 1).
        let xi_pows = powers_of_scalar(xi, m, false);
        let sw: Vec<Scalar> = (0..k)
            .map(|alpha| if alpha == 0 { Scalar::ONE } else { small_weight(rng, MIN_SMALL_WEIGHT_BYTES) })
            .collect();

        let t: Vec<Scalar> = decomps.iter().map(|d| (0..m).map(|j| f_full[j][d[j]]).product()).collect();
        for (row_idx, row) in matrix.iter().enumerate() {
            let tk = t[row_idx];
            if tk == Scalar::ZERO {
                continue;
            }
            for alpha in 0..k {
                all_scalars.push(w3 * tk * sw[alpha]);
                all_points.push(row[alpha]);
                // Identity offsets contribute nothing to the MSM; skipped as a performance
                // optimization matching the spec's note about dropping identity-valued
                // offset terms from the batched entry count.
                if offsets[alpha] != EdwardsPoint::identity() {
                    all_scalars.push(-w3 * tk * sw[alpha]);
                    all_points.push(offsets[alpha]);
                }
            }
        }
        for alpha in 0..k {
            for j in 0..m {
                all_scalars.push(-w3 * sw[alpha] * xi_pows[j]);
                all_points.push(x[alpha][j]);
            }
            all_scalars.push(w3 * sw[alpha] * proof.z[alpha]);
            all_points.push(g);
        }
    }

    let result = curve25519_dalek::traits::VartimeMultiscalarMul::vartime_multiscalar_mul(
        all_scalars.iter(),
        all_points.iter(),
    );
    if result != EdwardsPoint::identity() {
        return Err(GrootleError::BatchFailed);
    }
    Ok(())
}

fn small_weight<R: RngCore>(rng: &mut R, min_bytes: usize) -> Scalar {
    let mut buf = [0u8; 32];
    rng.fill_bytes(&mut buf[..min_bytes.max(3)]);
    // Ensure non-zero so a degenerate all-zero weight never silently no-ops a check.
    if buf.iter().all(|b| *b == 0) {
        buf[0] = 1;
    }
    Scalar::from_bytes_mod_order(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn build_matrix(n: usize, m: usize, index: usize, k: usize, privkeys: &[Scalar]) -> (Vec<Vec<EdwardsPoint>>, Vec<EdwardsPoint>) {
        let nn = n.pow(m as u32);
        let ctx = GroupContext::get();
        let offsets: Vec<EdwardsPoint> = (0..k).map(|i| ctx.h_vec[i]).collect();
        let mut matrix = Vec::with_capacity(nn);
        let mut rng = OsRng;
        for row in 0..nn {
            if row == index {
                let r: Vec<EdwardsPoint> =
                    (0..k).map(|alpha| offsets[alpha] + privkeys[alpha] * ctx.g).collect();
                matrix.push(r);
            } else {
                let r: Vec<EdwardsPoint> = (0..k).map(|_| Scalar::random(&mut rng) * ctx.g).collect();
                matrix.push(r);
            }
        }
        (matrix, offsets)
    }

    #[test]
    fn valid_witness_verifies() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 3, 2, 5usize);
        let privkeys: Vec<Scalar> = (0..k).map(|_| Scalar::random(&mut rng)).collect();
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let proof = prove(&matrix, &offsets, &witness, n, m, b"test message", &mut rng).unwrap();
        verify(&proof, &matrix, &offsets, n, m, b"test message").unwrap();
    }

    #[test]
    fn tamper_f_response_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 2usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        proof.f[0][0] += Scalar::ONE;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_z_response_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        proof.z[0] += Scalar::ONE;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_a_point_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        let ctx = GroupContext::get();
        proof.a += ctx.g;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_b_point_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        let ctx = GroupContext::get();
        proof.b += ctx.g;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_c_point_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        let ctx = GroupContext::get();
        proof.c += ctx.g;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_d_point_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        let ctx = GroupContext::get();
        proof.d += ctx.g;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn tamper_x_point_fails() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let witness = GrootleWitness { index, privkeys };
        let mut proof = prove(&matrix, &offsets, &witness, n, m, b"msg", &mut rng).unwrap();
        let ctx = GroupContext::get();
        proof.x[0][0] += ctx.g;
        assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err());
    }

    #[test]
    fn prove_rejects_out_of_range_index_without_panicking() {
        let mut rng = OsRng;
        let (n, m, k, index) = (2, 2, 1, 1usize);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        // Witness claims an index the matrix can't back with a real opening; the polynomial
        // construction degrades gracefully rather than panicking, and verification must
        // still reject the resulting proof if one is produced at all.
        let bad_witness = GrootleWitness { index: index + 10, privkeys };
        let result = prove(&matrix, &offsets, &bad_witness, n, m, b"msg", &mut rng);
        match result {
            Err(_) => {}
            Ok(proof) => assert!(verify(&proof, &matrix, &offsets, n, m, b"msg").is_err()),
        }
    }

    #[test]
    fn batch_verify_accepts_multiple_valid_proofs() {
        let mut rng = OsRng;
        let (n, m, k) = (2, 2, 1);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let index = 3usize;
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let mut proofs = Vec::new();
        for _ in 0..3 {
            let witness = GrootleWitness { index, privkeys: privkeys.clone() };
            proofs.push(prove(&matrix, &offsets, &witness, n, m, b"batch", &mut rng).unwrap());
        }
        verify_batch(&proofs, &matrix, &offsets, n, m, b"batch", &mut rng).unwrap();
    }

    #[test]
    fn batch_verify_rejects_corrupted_proof() {
        let mut rng = OsRng;
        let (n, m, k) = (2, 2, 1);
        let privkeys: Vec<Scalar> = vec![Scalar::random(&mut rng)];
        let index = 1usize;
        let (matrix, offsets) = build_matrix(n, m, index, k, &privkeys);
        let mut proofs = Vec::new();
        for _ in 0..2 {
            let witness = GrootleWitness { index, privkeys: privkeys.clone() };
            proofs.push(prove(&matrix, &offsets, &witness, n, m, b"batch", &mut rng).unwrap());
        }
        proofs[0].x[0][0] = Scalar::random(&mut rng) * GroupContext::get().g;
        assert!(verify_batch(&proofs, &matrix, &offsets, n, m, b"batch", &mut rng).is_err());
    }
}
