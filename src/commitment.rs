//! Commitment structure over ordered query results.
//!
//! Builds a bottom-up SHA-256 hash pyramid from an ordered item list: the
//! bottom level holds one hash per item (its canonical serialization
//! digested), each parent level hashes concatenated child pairs, and an
//! odd-length level self-pairs its last entry. The single top hash is the
//! root a remote verifier checks inclusion proofs against.
//!
//! Proof positions use the implicit index-parity convention: at each level
//! an even current index recombines as `current ‖ sibling`, an odd one as
//! `sibling ‖ current`, and the index integer-halves moving up. No explicit
//! left/right tag is stored.

use crate::error::{GeoChainError, Result};
use crate::types::Point;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::time::UNIX_EPOCH;

/// A SHA-256 digest.
///
/// The canonical string form (Display, serde) is the fixed-length lowercase
/// hexadecimal encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Distinguished sentinel root for an empty item list.
    ///
    /// All-zero rather than the hash of the empty string, so it is
    /// recognizable on sight and cannot collide with any digest this
    /// module produces from real input.
    pub const EMPTY: Self = Self([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a digest from its 64-character lowercase hex form.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode(s)
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or_else(|| {
                GeoChainError::InvalidInput(format!(
                    "expected 64 hex characters, got {} bytes",
                    s.len()
                ))
            })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// Canonical byte form of a point, hashed into the bottom tree level.
///
/// Field order is fixed by declaration; floats take serde_json's
/// shortest-roundtrip formatting, so identical logical points always
/// serialize identically. The timestamp is canonicalized to whole
/// milliseconds since the unix epoch.
#[derive(Serialize)]
struct CanonicalRecord<'a> {
    x: f64,
    y: f64,
    payload: &'a [u8],
    inserted_at_ms: u64,
    seq: u64,
}

/// Hash a point's canonical serialization.
///
/// Public so a remote verifier can recompute a claimed result's leaf digest
/// before checking its inclusion proof. Non-finite coordinates and
/// pre-epoch timestamps are serialization failures.
pub fn leaf_digest(point: &Point) -> Result<Digest> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(GeoChainError::InvalidInput(format!(
            "cannot canonicalize non-finite coordinates ({}, {})",
            point.x, point.y
        )));
    }

    let since_epoch = point
        .inserted_at
        .duration_since(UNIX_EPOCH)
        .map_err(|_| GeoChainError::InvalidTimestamp)?;
    let inserted_at_ms =
        u64::try_from(since_epoch.as_millis()).map_err(|_| GeoChainError::InvalidTimestamp)?;

    let record = CanonicalRecord {
        x: point.x,
        y: point.y,
        payload: point.payload.as_ref(),
        inserted_at_ms,
        seq: point.seq,
    };
    let bytes = serde_json::to_vec(&record)?;
    Ok(Digest(Sha256::digest(&bytes).into()))
}

fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Digest(hasher.finalize().into())
}

/// Ordered pyramid of hash levels over an item list.
///
/// Constructed fresh per query and discarded with the response; holds no
/// persistent identity. Level 0 is the leaf level; the last level holds the
/// single root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentTree {
    levels: Vec<Vec<Digest>>,
}

impl CommitmentTree {
    /// Build the pyramid bottom-up from an ordered item list.
    ///
    /// The leaf at position `i` corresponds, by position, to `items[i]`;
    /// reordering the input changes the root. An empty list produces a tree
    /// whose root is [`Digest::EMPTY`].
    pub fn build(items: &[Point]) -> Result<Self> {
        let leaves = items.iter().map(leaf_digest).collect::<Result<Vec<_>>>()?;
        if leaves.is_empty() {
            return Ok(Self { levels: Vec::new() });
        }

        let mut levels = vec![leaves];
        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }

            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = &pair[0];
                // Self-pair the trailing entry of an odd-length level.
                let right = pair.get(1).unwrap_or(left);
                next.push(hash_pair(left, right));
            }
            levels.push(next);
        }

        log::trace!(
            "built commitment over {} leaves ({} levels)",
            levels[0].len(),
            levels.len()
        );
        Ok(Self { levels })
    }

    /// The single top-level hash; [`Digest::EMPTY`] for an empty tree.
    pub fn root(&self) -> Digest {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Digest::EMPTY)
    }

    /// Number of leaves (input items).
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// The leaf hash at a position, if present.
    pub fn leaf(&self, index: usize) -> Option<&Digest> {
        self.levels.first().and_then(|level| level.get(index))
    }

    /// Inclusion proof for the leaf at `index`: the ordered sibling hashes
    /// from the leaf level up to (excluding) the root. A single-leaf tree
    /// yields an empty proof.
    pub fn proof(&self, index: usize) -> Result<InclusionProof> {
        let len = self.leaf_count();
        if index >= len {
            return Err(GeoChainError::ProofIndexOutOfRange { index, len });
        }

        let mut siblings = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            // Sibling is index XOR 1; a self-paired trailing entry is its
            // own sibling.
            let sibling = level.get(idx ^ 1).unwrap_or(&level[idx]);
            siblings.push(*sibling);
            idx /= 2;
        }
        Ok(InclusionProof { siblings })
    }
}

/// Ordered sibling-hash sequence proving one leaf's membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InclusionProof {
    siblings: Vec<Digest>,
}

impl InclusionProof {
    pub fn siblings(&self) -> &[Digest] {
        &self.siblings
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Recombine `leaf` with each sibling under the index-parity rule and
    /// compare against `claimed_root`.
    ///
    /// `index` must be the leaf's original position in the committed list;
    /// it halves at each level. Any flipped bit in the proof, a different
    /// leaf, or a wrong index makes the recombined root diverge.
    pub fn verify(&self, leaf: &Digest, index: usize, claimed_root: &Digest) -> bool {
        let mut acc = *leaf;
        let mut idx = index;
        for sibling in &self.siblings {
            acc = if idx % 2 == 0 {
                hash_pair(&acc, sibling)
            } else {
                hash_pair(sibling, &acc)
            };
            idx /= 2;
        }
        acc == *claimed_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn point(x: f64, y: f64, name: &str, seq: u64) -> Point {
        // Fixed timestamps keep leaf hashes reproducible across runs.
        Point::with_timestamp(
            x,
            y,
            name.as_bytes().to_vec(),
            UNIX_EPOCH + Duration::from_millis(1_700_000_000_000 + seq),
            seq,
        )
    }

    #[test]
    fn test_empty_tree_sentinel_root() {
        let tree = CommitmentTree::build(&[]).unwrap();
        assert_eq!(tree.root(), Digest::EMPTY);
        assert_eq!(tree.leaf_count(), 0);
        assert!(tree.proof(0).is_err());
    }

    #[test]
    fn test_single_item_root_is_leaf_hash() {
        let items = [point(1.0, 2.0, "only", 0)];
        let tree = CommitmentTree::build(&items).unwrap();

        assert_eq!(tree.root(), leaf_digest(&items[0]).unwrap());
        let proof = tree.proof(0).unwrap();
        assert!(proof.is_empty());
        assert!(proof.verify(&tree.root(), 0, &tree.root()));
    }

    #[test]
    fn test_three_items_self_pairs_trailing_leaf() {
        let items = [
            point(1.0, 1.0, "a", 0),
            point(2.0, 2.0, "b", 1),
            point(3.0, 3.0, "c", 2),
        ];
        let tree = CommitmentTree::build(&items).unwrap();

        let ha = leaf_digest(&items[0]).unwrap();
        let hb = leaf_digest(&items[1]).unwrap();
        let hc = leaf_digest(&items[2]).unwrap();

        // root = H(H(ha || hb) || H(hc || hc))
        let expected = hash_pair(&hash_pair(&ha, &hb), &hash_pair(&hc, &hc));
        assert_eq!(tree.root(), expected);

        // The self-paired leaf's proof carries its own hash as first sibling.
        let proof_c = tree.proof(2).unwrap();
        assert_eq!(proof_c.siblings()[0], hc);
        assert!(proof_c.verify(&hc, 2, &tree.root()));
    }

    #[test]
    fn test_build_is_deterministic() {
        let items: Vec<Point> = (0..7).map(|i| point(i as f64, -(i as f64), "p", i)).collect();
        let a = CommitmentTree::build(&items).unwrap();
        let b = CommitmentTree::build(&items).unwrap();
        assert_eq!(a.root(), b.root());

        // Duplicate logical items hash identically.
        let dup = [items[0].clone(), items[0].clone()];
        let t1 = CommitmentTree::build(&dup).unwrap();
        let t2 = CommitmentTree::build(&dup).unwrap();
        assert_eq!(t1.root(), t2.root());
    }

    #[test]
    fn test_reordering_changes_root() {
        let items = [point(1.0, 1.0, "a", 0), point(2.0, 2.0, "b", 1)];
        let swapped = [items[1].clone(), items[0].clone()];

        let t1 = CommitmentTree::build(&items).unwrap();
        let t2 = CommitmentTree::build(&swapped).unwrap();
        assert_ne!(t1.root(), t2.root());
    }

    #[test]
    fn test_all_proofs_verify() {
        for n in 1..=9 {
            let items: Vec<Point> = (0..n).map(|i| point(i as f64, 0.5, "p", i)).collect();
            let tree = CommitmentTree::build(&items).unwrap();
            let root = tree.root();

            for (i, item) in items.iter().enumerate() {
                let leaf = leaf_digest(item).unwrap();
                let proof = tree.proof(i).unwrap();
                assert!(proof.verify(&leaf, i, &root), "n={n} i={i}");
            }
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let items: Vec<Point> = (0..5).map(|i| point(i as f64, 0.0, "p", i)).collect();
        let tree = CommitmentTree::build(&items).unwrap();
        let root = tree.root();
        let leaf = leaf_digest(&items[3]).unwrap();
        let proof = tree.proof(3).unwrap();

        // Flip one bit in each proof entry in turn.
        for pos in 0..proof.len() {
            let mut siblings = proof.siblings().to_vec();
            let mut raw = *siblings[pos].as_bytes();
            raw[0] ^= 0x01;
            siblings[pos] = Digest(raw);
            let tampered = InclusionProof { siblings };
            assert!(!tampered.verify(&leaf, 3, &root), "flipped entry {pos}");
        }
    }

    #[test]
    fn test_wrong_index_fails() {
        let items: Vec<Point> = (0..5).map(|i| point(i as f64, 0.0, "p", i)).collect();
        let tree = CommitmentTree::build(&items).unwrap();
        let root = tree.root();
        let leaf = leaf_digest(&items[3]).unwrap();
        let proof = tree.proof(3).unwrap();

        assert!(proof.verify(&leaf, 3, &root));
        assert!(!proof.verify(&leaf, 2, &root));
        assert!(!proof.verify(&leaf, 0, &root));
    }

    #[test]
    fn test_leaf_digest_rejects_bad_input() {
        let nan = Point::with_timestamp(f64::NAN, 0.0, &b"x"[..], UNIX_EPOCH, 0);
        assert!(matches!(
            leaf_digest(&nan),
            Err(GeoChainError::InvalidInput(_))
        ));

        let pre_epoch =
            Point::with_timestamp(0.0, 0.0, &b"x"[..], UNIX_EPOCH - Duration::from_secs(1), 0);
        assert!(matches!(
            leaf_digest(&pre_epoch),
            Err(GeoChainError::InvalidTimestamp)
        ));
    }

    #[test]
    fn test_digest_hex_forms() {
        let d = leaf_digest(&point(1.0, 2.0, "hex", 0)).unwrap();
        let hex_str = d.to_hex();
        assert_eq!(hex_str.len(), 64);
        assert_eq!(hex_str, hex_str.to_lowercase());
        assert_eq!(Digest::from_hex(&hex_str).unwrap(), d);
        assert_eq!(format!("{d}"), hex_str);

        assert!(Digest::from_hex("abcd").is_err());
        assert!(Digest::from_hex("zz").is_err());
    }

    #[test]
    fn test_digest_serde_is_hex_string() {
        let d = Digest::EMPTY;
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", "0".repeat(64)));
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
