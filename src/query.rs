//! Query coordination: deterministic result ordering plus committed payloads.
//!
//! Pure composition over the spatial index and the commitment builder: a
//! query's raw hits are ordered by a documented deterministic key, a
//! commitment tree is built over the ordered list, and the caller receives
//! the results together with the root and index-aligned inclusion proofs.

use crate::commitment::{CommitmentTree, Digest, InclusionProof, leaf_digest};
use crate::error::Result;
use crate::types::Point;
use serde::{Deserialize, Serialize};

/// Order results by descending insertion timestamp, ties broken by
/// ascending insertion sequence, so repeated queries against an unchanged
/// index return identical orderings.
pub fn order_results(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at).then(a.seq.cmp(&b.seq)));
    points
}

/// A query's ordered results with their commitment.
///
/// `proofs[i]` proves `results[i]` against `root`. An empty result list
/// carries the [`Digest::EMPTY`] sentinel root and no proofs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedResults {
    pub results: Vec<Point>,
    pub root: Digest,
    pub proofs: Vec<InclusionProof>,
}

impl CommittedResults {
    /// Order raw query hits, commit to them, and attach aligned proofs.
    pub fn from_query(points: Vec<Point>) -> Result<Self> {
        let results = order_results(points);
        let tree = CommitmentTree::build(&results)?;
        let proofs = (0..results.len())
            .map(|i| tree.proof(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            results,
            root: tree.root(),
            proofs,
        })
    }

    /// Re-derive every leaf digest and check each proof against the root,
    /// the way a remote verifier would.
    pub fn verify(&self) -> bool {
        if self.results.len() != self.proofs.len() {
            return false;
        }
        if self.results.is_empty() {
            return self.root == Digest::EMPTY;
        }
        self.results
            .iter()
            .zip(&self.proofs)
            .enumerate()
            .all(|(i, (point, proof))| match leaf_digest(point) {
                Ok(leaf) => proof.verify(&leaf, i, &self.root),
                Err(_) => false,
            })
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Radius-query payload: the committed results plus the resolved center
/// and radius echoed back for the request layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedRadiusResults {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_meters: f64,
    #[serde(flatten)]
    pub committed: CommittedResults,
}

impl CommittedRadiusResults {
    pub fn verify(&self) -> bool {
        self.committed.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn point_at(ms: u64, seq: u64) -> Point {
        Point::with_timestamp(
            seq as f64,
            0.0,
            format!("p{seq}").into_bytes(),
            UNIX_EPOCH + Duration::from_millis(ms),
            seq,
        )
    }

    #[test]
    fn test_ordering_newest_first() {
        let ordered = order_results(vec![point_at(100, 0), point_at(300, 1), point_at(200, 2)]);
        let seqs: Vec<u64> = ordered.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![1, 2, 0]);
    }

    #[test]
    fn test_ordering_ties_broken_by_insertion_order() {
        let ordered = order_results(vec![point_at(100, 2), point_at(100, 0), point_at(100, 1)]);
        let seqs: Vec<u64> = ordered.iter().map(|p| p.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn test_committed_results_align_and_verify() {
        let committed =
            CommittedResults::from_query(vec![point_at(100, 0), point_at(300, 1), point_at(200, 2)])
                .unwrap();

        assert_eq!(committed.results.len(), 3);
        assert_eq!(committed.proofs.len(), 3);
        assert_ne!(committed.root, Digest::EMPTY);
        assert!(committed.verify());

        // Each proof is bound to its own position.
        let leaf0 = leaf_digest(&committed.results[0]).unwrap();
        assert!(!committed.proofs[1].verify(&leaf0, 1, &committed.root));
    }

    #[test]
    fn test_empty_query_commits_to_sentinel() {
        let committed = CommittedResults::from_query(Vec::new()).unwrap();
        assert!(committed.is_empty());
        assert_eq!(committed.root, Digest::EMPTY);
        assert!(committed.proofs.is_empty());
        assert!(committed.verify());
    }

    #[test]
    fn test_same_input_same_root() {
        let points = vec![point_at(100, 0), point_at(100, 1), point_at(50, 2)];
        let a = CommittedResults::from_query(points.clone()).unwrap();
        let b = CommittedResults::from_query(points).unwrap();
        assert_eq!(a.root, b.root);
        assert_eq!(a.results, b.results);
    }

    #[test]
    fn test_tampered_result_fails_verification() {
        let mut committed =
            CommittedResults::from_query(vec![point_at(100, 0), point_at(200, 1)]).unwrap();
        committed.results[0].x += 1.0;
        assert!(!committed.verify());
    }

    #[test]
    fn test_radius_payload_serializes_flat() {
        let committed = CommittedResults::from_query(vec![point_at(100, 0)]).unwrap();
        let radius = CommittedRadiusResults {
            center_x: 1.5,
            center_y: -2.5,
            radius_meters: 1000.0,
            committed,
        };
        assert!(radius.verify());

        let json = serde_json::to_value(&radius).unwrap();
        assert_eq!(json["center_x"], 1.5);
        assert!(json["results"].is_array());
        assert!(json["root"].is_string());
    }
}
