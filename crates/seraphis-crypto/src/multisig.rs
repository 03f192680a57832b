//! Three-round multi-party extension of the composition proof (§4.3): the spend key is
//! split so only `z_i = Sum_e z_{e,i}` is unknown to any single signer, while `x_i`/`y_i`
//! remain known to whoever proposes the signature. Round/message-flow shape (a proposal
//! struct consumed at most once, a JSON-serializable partial-signature transport type) is
//! grounded in `salvium-multisig`'s `account.rs`/`partial_sig.rs`.

use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::composition::{check_keys, CompositionProof};
use crate::error::CompositionError;
use crate::group::{powers_of_scalar, GroupContext};
use crate::transcript::Transcript;

const DOMAIN: &str = "sp_composition";

/// Round 1 output: distributed by the proposer to every co-signer. Per the "WARNING: must
/// only use a 'proposal' to make ONE signature" contract in the source, `used` guards
/// against a caller re-using the same opening for a second signature.
pub struct MultisigProposal {
    pub k: Vec<EdwardsPoint>,
    pub ki: Vec<EdwardsPoint>,
    pub message: Vec<u8>,
    pub alpha_a: Zeroizing<Scalar>,
    pub alpha_i: Zeroizing<Vec<Scalar>>,
    used: bool,
}

impl MultisigProposal {
    pub fn new<R: RngCore + CryptoRng>(k: Vec<EdwardsPoint>, ki: Vec<EdwardsPoint>, message: Vec<u8>, rng: &mut R) -> Self {
        let alpha_a = Zeroizing::new(Scalar::random(rng));
        let alpha_i = Zeroizing::new((0..k.len()).map(|_| Scalar::random(rng)).collect());
        Self { k, ki, message, alpha_a, alpha_i, used: false }
    }
}

/// Round 2 output: a signer's local opening for the `KI` response component.
pub struct MultisigPrep {
    pub opening_priv: Zeroizing<Scalar>,
    pub opening_pub: EdwardsPoint,
}

impl MultisigPrep {
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let opening_priv = Zeroizing::new(Scalar::random(rng));
        let opening_pub = *opening_priv * GroupContext::get().u;
        Self { opening_priv, opening_pub }
    }
}

/// Round 3 output: one signer's partial response, transportable as JSON (matching
/// `salvium-multisig::partial_sig::MultisigPartialSig`'s round-trip convention).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultisigPartial {
    pub c: [u8; 32],
    pub r_a: [u8; 32],
    pub r_i: Vec<[u8; 32]>,
    pub k_t1: Vec<[u8; 32]>,
    pub r_b_partial: [u8; 32],
}

fn derive_k_t1(k: &[EdwardsPoint], y: &[Scalar]) -> Result<Vec<EdwardsPoint>, CompositionError> {
    let mut out = Vec::with_capacity(k.len());
    for (ki, yi) in k.iter().zip(y.iter()) {
        if *yi == Scalar::ZERO {
            return Err(CompositionError::MalformedKeys("y is zero".into()));
        }
        out.push(ki * yi.invert());
    }
    Ok(out)
}

fn aggregation_coeffs(k_t1: &[EdwardsPoint], ki: &[EdwardsPoint]) -> (Scalar, Scalar) {
    let mut t = Transcript::new(DOMAIN);
    t.append_points("K_t1", k_t1);
    t.append_points("KI", ki);
    let mu_a = t.challenge();
    let mut t2 = Transcript::new(DOMAIN);
    t2.append_scalar("mu_a", &mu_a);
    let mu_b = t2.challenge();
    (mu_a, mu_b)
}

fn derive_message(mu_b: Scalar, k: &[EdwardsPoint], message: &[u8]) -> [u8; 32] {
    let mut t = Transcript::new(DOMAIN);
    t.append_scalar("mu_b", &mu_b);
    t.append_points("K", k);
    t.append_bytes("message", message);
    t.challenge().to_bytes()
}

/// Produce this signer's partial signature. `z_e` holds only this signer's share of each
/// `z_i`; `x`/`y` are the full (shared-knowledge) openings from the proposal. `signer_openings`
/// are every co-signer's round-2 public opening (including this signer's own), used to
/// reconstruct the shared `alpha_b*U = Sum_e alpha_{e,b}*U`.
pub fn respond(
    proposal: &mut MultisigProposal,
    x: &[Scalar],
    y: &[Scalar],
    z_e: &[Scalar],
    signer_openings: &[EdwardsPoint],
    local_opening_priv: &Scalar,
) -> Result<MultisigPartial, CompositionError> {
    if proposal.used {
        return Err(CompositionError::ProposalAlreadyUsed);
    }
    check_keys(&proposal.k, &proposal.ki)?;
    if x.len() != proposal.k.len() || y.len() != proposal.k.len() || z_e.len() != proposal.k.len() {
        return Err(CompositionError::MalformedKeys("witness length mismatch".into()));
    }

    let k_t1 = derive_k_t1(&proposal.k, y)?;
    let (mu_a, mu_b) = aggregation_coeffs(&k_t1, &proposal.ki);
    let m_prime = derive_message(mu_b, &proposal.k, &proposal.message);

    let ctx = GroupContext::get();
    let term_a = *proposal.alpha_a * ctx.g;
    let alpha_b_shared: EdwardsPoint = signer_openings.iter().sum();
    let term_b = alpha_b_shared;
    let terms_i: Vec<EdwardsPoint> = proposal
        .alpha_i
        .iter()
        .zip(proposal.k.iter())
        .map(|(a, k)| a * k)
        .collect();

    let mut t = Transcript::new(DOMAIN);
    t.append_bytes("m_prime", &m_prime);
    t.append_point("term_a", &term_a);
    t.append_point("term_b", &term_b);
    t.append_points("terms_i", &terms_i);
    let c = t.challenge();

    let mu_a_pows = powers_of_scalar(mu_a, proposal.k.len(), false);
    let mu_b_pows = powers_of_scalar(mu_b, proposal.k.len(), false);

    let mut sum_a = Scalar::ZERO;
    for i in 0..proposal.k.len() {
        sum_a += mu_a_pows[i] * x[i] * y[i].invert();
    }
    let r_a = *proposal.alpha_a - c * sum_a;

    let mut sum_b_local = Scalar::ZERO;
    for i in 0..proposal.k.len() {
        sum_b_local += mu_b_pows[i] * z_e[i] * y[i].invert();
    }
    let r_b_partial = *local_opening_priv - c * sum_b_local;

    let r_i: Vec<Scalar> = proposal.alpha_i.iter().zip(y.iter()).map(|(a, y)| a - c * y.invert()).collect();

    proposal.used = true;

    Ok(MultisigPartial {
        c: c.to_bytes(),
        r_a: r_a.to_bytes(),
        r_i: r_i.iter().map(Scalar::to_bytes).collect(),
        k_t1: k_t1.iter().map(|p| p.compress().to_bytes()).collect(),
        r_b_partial: r_b_partial.to_bytes(),
    })
}

/// Sum partial signatures from (at least) a threshold of signers into a complete
/// single-signer-shaped `CompositionProof`.
pub fn aggregate(partials: &[MultisigPartial]) -> Result<CompositionProof, CompositionError> {
    if partials.is_empty() {
        return Err(CompositionError::AggregationMismatch("no partial signatures".into()));
    }
    let c = Scalar::from_canonical_bytes(partials[0].c)
        .into_option()
        .ok_or_else(|| CompositionError::AggregationMismatch("malformed challenge".into()))?;
    let r_a = Scalar::from_canonical_bytes(partials[0].r_a)
        .into_option()
        .ok_or_else(|| CompositionError::AggregationMismatch("malformed r_a".into()))?;
    let k_t1 = &partials[0].k_t1;
    let r_i = &partials[0].r_i;

    for p in &partials[1..] {
        if p.c != partials[0].c || p.k_t1 != *k_t1 || p.r_i != *r_i {
            return Err(CompositionError::AggregationMismatch("inconsistent proposals".into()));
        }
    }

    let mut r_b = Scalar::ZERO;
    for p in partials {
        let part = Scalar::from_canonical_bytes(p.r_b_partial)
            .into_option()
            .ok_or_else(|| CompositionError::AggregationMismatch("malformed r_b_partial".into()))?;
        r_b += part;
    }

    let r_i_scalars: Result<Vec<Scalar>, CompositionError> = r_i
        .iter()
        .map(|b| Scalar::from_canonical_bytes(*b).into_option().ok_or_else(|| CompositionError::AggregationMismatch("malformed r_i".into())))
        .collect();
    let k_t1_points: Result<Vec<EdwardsPoint>, CompositionError> = k_t1
        .iter()
        .map(|b| {
            curve25519_dalek::edwards::CompressedEdwardsY(*b)
                .decompress()
                .ok_or_else(|| CompositionError::AggregationMismatch("malformed K_t1".into()))
        })
        .collect();

    Ok(CompositionProof {
        c,
        r_a,
        r_b,
        r_i: r_i_scalars?,
        k_t1: k_t1_points?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::verify;
    use rand::rngs::OsRng;

    fn split(total: Scalar, n: usize, rng: &mut OsRng) -> Vec<Scalar> {
        let mut shares: Vec<Scalar> = (0..n - 1).map(|_| Scalar::random(rng)).collect();
        let sum: Scalar = shares.iter().sum();
        shares.push(total - sum);
        shares
    }

    #[test]
    fn three_signers_sum_to_single_signer_proof() {
        run_multisig_round(3, 1);
    }

    /// Runs a full propose/respond/aggregate/verify round for `num_signers` co-signers
    /// jointly proving knowledge of `num_keys` independent `(x, y, z)` triples, and checks
    /// the aggregated proof verifies against the single-signer composition verifier.
    fn run_multisig_round(num_signers: usize, num_keys: usize) {
        let mut rng = OsRng;
        let ctx = GroupContext::get();
        let xs: Vec<Scalar> = (0..num_keys).map(|_| Scalar::random(&mut rng)).collect();
        let ys: Vec<Scalar> = (0..num_keys).map(|_| Scalar::random(&mut rng)).collect();
        let zs: Vec<Scalar> = (0..num_keys).map(|_| Scalar::random(&mut rng)).collect();
        let k: Vec<EdwardsPoint> = (0..num_keys).map(|i| xs[i] * ctx.g + ys[i] * ctx.x + zs[i] * ctx.u).collect();
        let ki: Vec<EdwardsPoint> = (0..num_keys).map(|i| zs[i] * ys[i].invert() * ctx.u).collect();

        let z_shares: Vec<Vec<Scalar>> = zs.iter().map(|z| split(*z, num_signers, &mut rng)).collect();

        let mut proposal = MultisigProposal::new(k.clone(), ki.clone(), b"msg".to_vec(), &mut rng);
        let preps: Vec<MultisigPrep> = (0..num_signers).map(|_| MultisigPrep::new(&mut rng)).collect();
        let openings: Vec<EdwardsPoint> = preps.iter().map(|p| p.opening_pub).collect();

        let mut partials = Vec::new();
        for (idx, prep) in preps.iter().enumerate() {
            let z_e: Vec<Scalar> = z_shares.iter().map(|shares| shares[idx]).collect();
            let partial = respond(&mut proposal, &xs, &ys, &z_e, &openings, &prep.opening_priv).unwrap();
            partials.push(partial);
            if idx + 1 < num_signers {
                proposal.used = false;
            }
        }

        let proof = aggregate(&partials).unwrap();
        verify(&proof, &k, &ki, b"msg").unwrap();
    }

    #[test]
    fn property_8_covers_every_signer_and_key_count_combination() {
        for num_signers in 1..=3 {
            for num_keys in 1..=3 {
                run_multisig_round(num_signers, num_keys);
            }
        }
    }

    #[test]
    fn respond_rejects_small_order_ki_without_panicking() {
        use curve25519_dalek::constants::EIGHT_TORSION;

        let mut rng = OsRng;
        let x = Scalar::random(&mut rng);
        let y = Scalar::random(&mut rng);
        let z = Scalar::random(&mut rng);
        let ctx = GroupContext::get();
        let k = x * ctx.g + y * ctx.x + z * ctx.u;
        let bad_ki = EIGHT_TORSION[1];

        let mut proposal = MultisigProposal::new(vec![k], vec![bad_ki], b"msg".to_vec(), &mut rng);
        let prep = MultisigPrep::new(&mut rng);
        let err = respond(&mut proposal, &[x], &[y], &[z], &[prep.opening_pub], &prep.opening_priv).unwrap_err();
        assert!(matches!(err, CompositionError::MalformedKeys(ref m) if m.contains("small-order")));
    }
}
