//! The "concise" (small proof, slow verify) Grootle variant: a single commitment-to-zero
//! column aggregated via a Triptych-style power-of-mu weighting, collapsing the large
//! variant's k-vector responses into a single scalar `z`.
//!
//! Per Design Notes §9's resolved Open Question, the source's two divergent evolutions of
//! this proof (`grootle_concise.cpp` vs `grootle_concise_temp.cpp`) are unified here behind
//! a single `with_linking_tag_components` flag rather than two proof types: both files build
//! the same dual-matrix mu-aggregation over `M` (one-time addresses) and `P` (commitments)
//! unconditionally, and differ only in whether the `J, K, Y` linking-tag components are also
//! computed and bound into the transcript.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::GrootleError;
use crate::grootle::{decompose_index, inv_eight, kronecker_row, zero_sum_row};
use crate::group::{com_matrix, convolve, invert, multi_exp, powers_of_scalar, GroupContext};
use crate::transcript::Transcript;

const DOMAIN: &str = "concise_grootle";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConciseGrootleProof {
    pub a: EdwardsPoint,
    pub b: EdwardsPoint,
    pub c: EdwardsPoint,
    pub d: EdwardsPoint,
    pub f: Vec<Vec<Scalar>>,
    /// `X[j]`, an m-vector (not an m x k matrix, since k = 1 for the concise variant).
    pub x: Vec<EdwardsPoint>,
    /// `Y[j]`, present only when `with_linking_tag_components` is set.
    pub y: Vec<EdwardsPoint>,
    /// Linking-tag base `J = (1/r)*U`, stored at full scale (not divided by 8): the
    /// subgroup/non-identity check on `l*J` is the caller's tx-protocol-level job, per the
    /// source's own comment on why `J` skips the usual `1/8` storage convention.
    pub j: Option<EdwardsPoint>,
    /// Linking tag `K = s*J`, stored scaled by `1/8` like the other proof points.
    pub k: Option<EdwardsPoint>,
    pub z_a: Scalar,
    pub z_c: Scalar,
    pub z: Scalar,
    pub with_linking_tag_components: bool,
}

pub struct ConciseGrootleWitness {
    pub index: usize,
    /// Discrete log of `M[index] = privkey_m*G` (the one-time-address opening; also the
    /// secret behind the linking tag `J = (1/privkey_m)*U` when linking-tag components are
    /// requested).
    pub privkey_m: Scalar,
    /// Opening of `P[index] - C_offset = privkey_p*G`.
    pub privkey_p: Scalar,
}

fn mu_aggregate(m_vec: &[EdwardsPoint], p_vec: &[EdwardsPoint], offset: EdwardsPoint, mu: Scalar) -> Vec<EdwardsPoint> {
    m_vec.iter().zip(p_vec.iter()).map(|(m_row, p_row)| m_row + mu * (p_row - offset)).collect()
}

#[allow(clippy::too_many_arguments)]
fn mu_transcript(
    message: &[u8],
    m_vec: &[EdwardsPoint],
    p_vec: &[EdwardsPoint],
    offset: EdwardsPoint,
    j: Option<EdwardsPoint>,
    k_scaled: Option<EdwardsPoint>,
    a: EdwardsPoint,
    b: EdwardsPoint,
    c: EdwardsPoint,
    d: EdwardsPoint,
) -> Scalar {
    let mut t = Transcript::new(DOMAIN);
    t.append_bytes("message", message);
    t.append_points("M", m_vec);
    t.append_points("P", p_vec);
    t.append_point("offset", &offset);
    if let Some(j) = j {
        t.append_point("J", &j);
    }
    if let Some(k) = k_scaled {
        t.append_point("K", &k);
    }
    t.append_point("A", &a);
    t.append_point("B", &b);
    t.append_point("C", &c);
    t.append_point("D", &d);
    t.challenge()
}

#[allow(clippy::too_many_arguments)]
fn xi_transcript(
    message: &[u8],
    m_vec: &[EdwardsPoint],
    offset: EdwardsPoint,
    a: EdwardsPoint,
    b: EdwardsPoint,
    c: EdwardsPoint,
    d: EdwardsPoint,
    x: &[EdwardsPoint],
    y: Option<&[EdwardsPoint]>,
) -> Scalar {
    let mut t = Transcript::new(DOMAIN);
    t.append_bytes("message", message);
    t.append_points("M", m_vec);
    t.append_point("offset", &offset);
    t.append_point("A", &a);
    t.append_point("B", &b);
    t.append_point("C", &c);
    t.append_point("D", &d);
    t.append_points("X", x);
    if let Some(y) = y {
        t.append_points("Y", y);
    }
    t.challenge()
}

#[allow(clippy::too_many_arguments)]
pub fn prove<R: RngCore + CryptoRng>(
    m_vec: &[EdwardsPoint],
    p_vec: &[EdwardsPoint],
    offset: EdwardsPoint,
    witness: &ConciseGrootleWitness,
    with_linking_tag_components: bool,
    n: usize,
    m: usize,
    message: &[u8],
    rng: &mut R,
) -> Result<ConciseGrootleProof, GrootleError> {
    let nn = n.checked_pow(m as u32).ok_or_else(|| GrootleError::Malformed("n^m overflow".into()))?;
    if m_vec.len() != nn {
        return Err(GrootleError::SizeMismatch { expected: nn, actual: m_vec.len() });
    }
    if p_vec.len() != nn {
        return Err(GrootleError::SizeMismatch { expected: nn, actual: p_vec.len() });
    }

    let decomp = decompose_index(witness.index, n, m);
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

    let ctx = GroupContext::get();
    let (j_point, k_point_scaled) = if with_linking_tag_components {
        let r_inv = invert(&witness.privkey_m)?;
        let j = r_inv * ctx.u;
        let k = witness.privkey_p * j;
        (Some(j), Some(inv_eight() * k))
    } else {
        (None, None)
    };

    let mu = mu_transcript(message, m_vec, p_vec, offset, j_point, k_point_scaled, a_point, b_point, c_point, d_point);
    let agg = mu_aggregate(m_vec, p_vec, offset, mu);

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

    let rho: Zeroizing<Vec<Scalar>> = Zeroizing::new((0..m).map(|_| Scalar::random(rng)).collect());
    let g = ctx.g;
    let u = ctx.u;
    let mut x = vec![EdwardsPoint::identity(); m];
    let mut y = vec![EdwardsPoint::identity(); m];
    for j in 0..m {
        let mut acc_x = EdwardsPoint::identity();
        let mut sum_p = Scalar::ZERO;
        for (row, p_row) in p.iter().enumerate() {
            acc_x += p_row[j] * agg[row];
            sum_p += p_row[j];
        }
        acc_x += rho[j] * g;
        x[j] = acc_x;
        if let Some(j_pt) = j_point {
            y[j] = sum_p * u + rho[j] * j_pt;
        }
    }

    let xi = xi_transcript(
        message,
        m_vec,
        offset,
        a_point,
        b_point,
        c_point,
        d_point,
        &x,
        with_linking_tag_components.then_some(y.as_slice()),
    );
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
    let mut sub = Scalar::ZERO;
    for j in 0..m {
        sub += rho[j] * xi_pows[j];
    }
    let combined_privkey = witness.privkey_m + mu * witness.privkey_p;
    let z = combined_privkey * xi_pows[m] - sub;
    if z == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero z response".into()));
    }

    let inv8 = inv_eight();
    Ok(ConciseGrootleProof {
        a: inv8 * a_point,
        b: inv8 * b_point,
        c: inv8 * c_point,
        d: inv8 * d_point,
        f,
        x: x.iter().map(|p| inv8 * p).collect(),
        y: if with_linking_tag_components { y.iter().map(|p| inv8 * p).collect() } else { Vec::new() },
        j: j_point,
        k: k_point_scaled,
        z_a,
        z_c,
        z,
        with_linking_tag_components,
    })
}

pub fn verify(
    proof: &ConciseGrootleProof,
    m_vec: &[EdwardsPoint],
    p_vec: &[EdwardsPoint],
    offset: EdwardsPoint,
    n: usize,
    m: usize,
    message: &[u8],
) -> Result<(), GrootleError> {
    let nn = n.checked_pow(m as u32).ok_or_else(|| GrootleError::Malformed("n^m overflow".into()))?;
    if m_vec.len() != nn {
        return Err(GrootleError::SizeMismatch { expected: nn, actual: m_vec.len() });
    }
    if p_vec.len() != nn {
        return Err(GrootleError::SizeMismatch { expected: nn, actual: p_vec.len() });
    }

    if proof.with_linking_tag_components {
        if proof.j.is_none() || proof.k.is_none() {
            return Err(GrootleError::Malformed("linking-tag components requested but missing".into()));
        }
        if proof.y.len() != m {
            return Err(GrootleError::SizeMismatch { expected: m, actual: proof.y.len() });
        }
    } else if proof.j.is_some() || proof.k.is_some() || !proof.y.is_empty() {
        return Err(GrootleError::Malformed("linking-tag components present but not requested".into()));
    }

    let identity = EdwardsPoint::identity();
    if proof.a == identity || proof.b == identity || proof.c == identity || proof.d == identity {
        return Err(GrootleError::Malformed("commitment point is identity".into()));
    }
    if proof.z_a == Scalar::ZERO || proof.z_c == Scalar::ZERO || proof.z == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero response".into()));
    }
    if proof.x.iter().any(|p| *p == identity) {
        return Err(GrootleError::Malformed("X component is identity".into()));
    }
    if proof.y.iter().any(|p| *p == identity) {
        return Err(GrootleError::Malformed("Y component is identity".into()));
    }
    if let Some(j) = proof.j {
        if j == identity {
            return Err(GrootleError::Malformed("J component is identity".into()));
        }
    }
    if let Some(k) = proof.k {
        if k == identity {
            return Err(GrootleError::Malformed("K component is identity".into()));
        }
    }
    if proof.f.len() != m {
        return Err(GrootleError::SizeMismatch { expected: m, actual: proof.f.len() });
    }

    let eight = Scalar::from(8u64);
    let a = proof.a * eight;
    let b = proof.b * eight;
    let c = proof.c * eight;
    let d = proof.d * eight;
    let x: Vec<EdwardsPoint> = proof.x.iter().map(|p| p * eight).collect();
    let k_scaled = proof.k.map(|k| k * eight);
    let y: Vec<EdwardsPoint> = proof.y.iter().map(|p| p * eight).collect();

    let mu = mu_transcript(message, m_vec, p_vec, offset, proof.j, k_scaled, a, b, c, d);
    let agg = mu_aggregate(m_vec, p_vec, offset, mu);

    let xi = xi_transcript(
        message,
        m_vec,
        offset,
        a,
        b,
        c,
        d,
        &x,
        proof.with_linking_tag_components.then_some(y.as_slice()),
    );
    if xi == Scalar::ZERO {
        return Err(GrootleError::Malformed("zero challenge".into()));
    }

    let mut f_full = Vec::with_capacity(m);
    for row in &proof.f {
        let sum: Scalar = row.iter().sum();
        let f0 = xi - sum;
        if f0 == Scalar::ZERO {
            return Err(GrootleError::Malformed("zero implied f[0]".into()));
        }
        let mut full = Vec::with_capacity(row.len() + 1);
        full.push(f0);
        full.extend_from_slice(row);
        f_full.push(full);
    }

    let (sf, pf) = com_matrix(&f_full, proof.z_a);
    if multi_exp(&sf, &pf) != a + xi * b {
        return Err(GrootleError::Malformed("equation (i) failed".into()));
    }
    let f_cross: Vec<Vec<Scalar>> = f_full.iter().map(|row| row.iter().map(|fi| fi * (xi - fi)).collect()).collect();
    let (sfc, pfc) = com_matrix(&f_cross, proof.z_c);
    if multi_exp(&sfc, &pfc) != xi * c + d {
        return Err(GrootleError::Malformed("equation (ii) failed".into()));
    }

    let ctx = GroupContext::get();
    let g = ctx.g;
    let decomps: Vec<Vec<usize>> = (0..m_vec.len()).map(|row| decompose_index(row, n, m)).collect();
    let t: Vec<Scalar> = decomps.iter().map(|d| (0..m).map(|j| f_full[j][d[j]]).product()).collect();
    let xi_pows = powers_of_scalar(xi, m, false);

    let mut lhs = EdwardsPoint::identity();
    for (row, tk) in agg.iter().zip(t.iter()) {
        lhs += *tk * row;
    }
    let mut rhs = EdwardsPoint::identity();
    for j in 0..m {
        rhs += xi_pows[j] * x[j];
    }
    rhs -= proof.z * g;
    if lhs != rhs {
        return Err(GrootleError::Malformed("equation (iii) failed".into()));
    }

    if proof.with_linking_tag_components {
        let u = ctx.u;
        let j_full = proof.j.expect("checked above");
        let k_full = k_scaled.expect("checked above");
        let sum_t: Scalar = t.iter().sum();

        let mut rhs4 = EdwardsPoint::identity();
        for j in 0..m {
            rhs4 += xi_pows[j] * y[j];
        }
        let lhs4 = sum_t * u + (mu * sum_t) * k_full - proof.z * j_full;
        if lhs4 != rhs4 {
            return Err(GrootleError::Malformed("equation (iv) failed".into()));
        }
    }

    Ok(())
}
