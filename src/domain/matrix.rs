//! Symmetric distance matrix over the currently active clusters.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use tracing::trace;

/// Sparse symmetric distance matrix.
///
/// Stored as a map of rows so that retiring a cluster touches only that
/// cluster's neighbours. `(a, b)` and `(b, a)` are always written and removed
/// together; `(x, x)` is never stored.
#[derive(Debug, Clone)]
pub struct DistanceMatrix<K> {
    rows: HashMap<K, HashMap<K, f64>>,
}

impl<K> Default for DistanceMatrix<K> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<K> DistanceMatrix<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance between `a` and `b`; None if the pair was never inserted.
    ///
    /// Keys carry no display name, so callers turn a miss into a
    /// labelled error themselves.
    pub fn get(&self, a: K, b: K) -> Option<f64> {
        self.rows.get(&a).and_then(|row| row.get(&b)).copied()
    }

    /// Insert or overwrite the distance for the unordered pair `{a, b}`.
    /// Self-pairs are ignored.
    pub fn put(&mut self, a: K, b: K, distance: f64) {
        if a == b {
            trace!("ignoring self distance for {:?}", a);
            return;
        }
        self.rows.entry(a).or_default().insert(b, distance);
        self.rows.entry(b).or_default().insert(a, distance);
    }

    /// Drop every entry whose key mentions `id`.
    pub fn remove_all_involving(&mut self, id: K) {
        if let Some(row) = self.rows.remove(&id) {
            for other in row.keys() {
                if let Some(other_row) = self.rows.get_mut(other) {
                    other_row.remove(&id);
                    if other_row.is_empty() {
                        self.rows.remove(other);
                    }
                }
            }
        }
        trace!("retired {:?} from distance matrix", id);
    }

    pub fn contains(&self, a: K, b: K) -> bool {
        self.rows.get(&a).is_some_and(|row| row.contains_key(&b))
    }

    /// Number of unordered pairs stored.
    pub fn len(&self) -> usize {
        self.rows.values().map(HashMap::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
