//! Labeled probability tables.
//!
//! A model parameter is either a distribution over a finite labeled set
//! ([`ProbVector`]) or a table of such distributions indexed by a source
//! label ([`ProbMatrix`]). Both are validated once at construction and
//! immutable afterwards, so the decoding recursions can read them through
//! shared references without any further checking.
use crate::error::HmmError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tolerance on the sum-to-one check.
pub const SUM_TOLERANCE: f64 = 1e-9;

/// A normalized distribution over a finite labeled set.
///
/// Labels keep their construction order, and that order is the canonical
/// index order for every dense array derived from this vector downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbVector {
    labels: Vec<String>,
    weights: Vec<f64>,
    index: HashMap<String, usize>,
}

impl ProbVector {
    /// Create a distribution from (label, weight) pairs.
    /// Fails if any weight is negative or the weights do not sum to one.
    pub fn new<S: Into<String>>(pairs: Vec<(S, f64)>) -> Result<Self, HmmError> {
        let (labels, weights): (Vec<String>, Vec<f64>) =
            pairs.into_iter().map(|(l, w)| (l.into(), w)).unzip();
        if let Some(pos) = weights.iter().position(|&w| w < 0f64) {
            return Err(HmmError::NegativeWeight {
                label: labels[pos].clone(),
                weight: weights[pos],
            });
        }
        let sum: f64 = weights.iter().sum();
        if !sum.is_finite() || (sum - 1f64).abs() > SUM_TOLERANCE {
            return Err(HmmError::InvalidDistribution { sum });
        }
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Ok(Self {
            labels,
            weights,
            index,
        })
    }
    /// Weight of `label`, or `UnknownLabel`.
    pub fn get(&self, label: &str) -> Result<f64, HmmError> {
        self.index
            .get(label)
            .map(|&i| self.weights[i])
            .ok_or_else(|| HmmError::UnknownLabel(label.to_string()))
    }
    /// Index of `label` in the canonical order.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }
    /// Labels in canonical (construction) order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
    /// Dense weights, matching `labels()` order.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    // Already-validated permutation of an existing row.
    fn reordered(&self, order: &[String]) -> Result<Self, HmmError> {
        let weights = order
            .iter()
            .map(|l| self.get(l))
            .collect::<Result<Vec<_>, _>>()?;
        let index = order
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Ok(Self {
            labels: order.to_vec(),
            weights,
            index,
        })
    }
}

/// A table of [`ProbVector`]s indexed by a source label.
///
/// Every row is a normalized distribution over the same target-label set.
/// Rows may be supplied with differing target orders; the first row's order
/// becomes the canonical column order and the remaining rows are re-indexed
/// to it at construction. The table is domain-agnostic: it serves both as
/// the state-transition matrix (states over states) and as the emission
/// matrix (states over observation symbols).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbMatrix {
    sources: Vec<String>,
    targets: Vec<String>,
    rows: Vec<ProbVector>,
    index: HashMap<String, usize>,
}

impl ProbMatrix {
    /// Create a table from (source label, row) pairs.
    /// Fails with `InconsistentColumns` naming the first offending row.
    pub fn new<S: Into<String>>(rows: Vec<(S, ProbVector)>) -> Result<Self, HmmError> {
        let (sources, rows): (Vec<String>, Vec<ProbVector>) =
            rows.into_iter().map(|(l, r)| (l.into(), r)).unzip();
        let targets: Vec<String> = match rows.first() {
            Some(row) => row.labels().to_vec(),
            None => Vec::new(),
        };
        for (source, row) in sources.iter().zip(rows.iter()) {
            let same_set = row.len() == targets.len()
                && targets.iter().all(|l| row.position(l).is_some());
            if !same_set {
                return Err(HmmError::InconsistentColumns {
                    row: source.clone(),
                });
            }
        }
        let rows = rows
            .iter()
            .map(|row| row.reordered(&targets))
            .collect::<Result<Vec<_>, _>>()?;
        let index = sources
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Ok(Self {
            sources,
            targets,
            rows,
            index,
        })
    }
    /// Full row for `source`, or `UnknownLabel`.
    pub fn row(&self, source: &str) -> Result<&ProbVector, HmmError> {
        self.index
            .get(source)
            .map(|&i| &self.rows[i])
            .ok_or_else(|| HmmError::UnknownLabel(source.to_string()))
    }
    /// Single cell, or `UnknownLabel` on either coordinate.
    pub fn get(&self, source: &str, target: &str) -> Result<f64, HmmError> {
        self.row(source)?.get(target)
    }
    /// Source labels in construction order.
    pub fn source_labels(&self) -> &[String] {
        &self.sources
    }
    /// Canonical target-label order (the first row's order).
    pub fn target_labels(&self) -> &[String] {
        &self.targets
    }
    /// Dense row-major table under caller-supplied orders.
    /// Fails with `UnknownLabel` if an order names an absent label.
    pub fn to_dense<S: AsRef<str>>(
        &self,
        source_order: &[S],
        target_order: &[S],
    ) -> Result<Vec<Vec<f64>>, HmmError> {
        source_order
            .iter()
            .map(|src| {
                let row = self.row(src.as_ref())?;
                target_order.iter().map(|tgt| row.get(tgt.as_ref())).collect()
            })
            .collect()
    }
}
