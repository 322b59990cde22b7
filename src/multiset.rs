//! Multiset<T> (§3): a token→positive-count mapping with set-like operations
//! that respect counts, plus the vector operations (magnitude, dot product)
//! the cosine/Lp kernels need.

use rustc_hash::{FxHashMap, FxHashSet};
use std::hash::Hash;

use crate::text::UnicodeText;

/// A counter over tokens. Counts are always strictly positive; a key with
/// count zero is removed rather than retained.
#[derive(Debug, Clone, Default)]
pub struct Multiset<T: Eq + Hash + Clone> {
    counts: FxHashMap<T, u64>,
}

impl<T: Eq + Hash + Clone> Multiset<T> {
    pub fn new() -> Self {
        Self {
            counts: FxHashMap::default(),
        }
    }

    /// Increment the count for `item`, inserting it at count 1 if absent.
    pub fn increment(&mut self, item: T) {
        *self.counts.entry(item).or_insert(0) += 1;
    }

    /// Current count for `item`, or 0 if absent.
    pub fn get(&self, item: &T) -> u64 {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct keys with non-zero count.
    pub fn distinct_count(&self) -> usize {
        self.counts.len()
    }

    /// The set of keys with non-zero count.
    pub fn keys(&self) -> FxHashSet<T> {
        self.counts.keys().cloned().collect()
    }

    /// Pointwise minimum of two multisets, dropping zero entries.
    pub fn intersect(&self, other: &Self) -> Self {
        let mut out = FxHashMap::default();
        for (k, &a) in &self.counts {
            if let Some(&b) = other.counts.get(k) {
                let m = a.min(b);
                if m > 0 {
                    out.insert(k.clone(), m);
                }
            }
        }
        Self { counts: out }
    }

    /// Pointwise maximum of two multisets.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.counts.clone();
        for (k, &b) in &other.counts {
            let entry = out.entry(k.clone()).or_insert(0);
            *entry = (*entry).max(b);
        }
        Self { counts: out }
    }

    /// Pointwise sum of two multisets.
    pub fn sum(&self, other: &Self) -> Self {
        let mut out = self.counts.clone();
        for (k, &b) in &other.counts {
            *out.entry(k.clone()).or_insert(0) += b;
        }
        Self { counts: out }
    }

    /// Union of the key sets of `self` and `other`.
    pub fn union_of_keys(&self, other: &Self) -> FxHashSet<T> {
        let mut out: FxHashSet<T> = self.counts.keys().cloned().collect();
        out.extend(other.counts.keys().cloned());
        out
    }

    /// Euclidean magnitude of the count vector: `sqrt(sum(count^2))`.
    pub fn magnitude(&self) -> f64 {
        self.counts.values().map(|&c| (c as f64) * (c as f64)).sum::<f64>().sqrt()
    }

    /// Largest single count, the L-infinity norm of the count vector.
    pub fn max_count(&self) -> u64 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Dot product of two count vectors over their shared keys.
    pub fn dot(&self, other: &Self) -> f64 {
        self.counts
            .iter()
            .map(|(k, &a)| a as f64 * other.get(k) as f64)
            .sum()
    }
}

impl<T: Eq + Hash + Clone> PartialEq for Multiset<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.counts.len() != other.counts.len() {
            return false;
        }
        self.counts.iter().all(|(k, &v)| other.counts.get(k) == Some(&v))
    }
}

/// Build a multiset keyed by token code-point sequence, counting duplicate
/// tokens (Character/NGram preprocessing semantics, §4.5).
pub fn multiset_from_tokens(tokens: &[UnicodeText]) -> Multiset<Vec<u32>> {
    let mut ms = Multiset::new();
    for t in tokens {
        ms.increment(t.code_points().to_vec());
    }
    ms
}

/// Build a deduplicated set (as a count-1 multiset) from tokens, for the
/// Word-preprocessing Jaccard set semantics (§4.5, Open Question 2).
pub fn set_from_tokens(tokens: &[UnicodeText]) -> FxHashSet<Vec<u32>> {
    tokens.iter().map(|t| t.code_points().to_vec()).collect()
}
