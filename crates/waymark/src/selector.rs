//! Rendezvous (highest-random-weight) node selection.
//!
//! Each (key, node) pair is scored with [`mix64`] over the XOR of the key
//! hash and a precomputed node hash; the node with the highest score owns
//! the key. Because every node's score is an independent uniform draw,
//! adding or removing a node only remaps the keys that pair wins or loses —
//! the rest of the keyspace is untouched. No virtual nodes, no ring: load
//! is even by construction and lookup is a single O(n) scan.
//!
//! # Use Cases
//! - Client-side sharding where all participants must agree on placement
//!   without a coordination service
//! - Picking a primary plus ordered replicas for a key ([`NodeSelector::lookup_n`])
//! - Routing work to the owning member of a peer group
//!
//! # Example
//! ```
//! use waymark::hasher::fnv1a_64;
//! use waymark::selector::NodeSelector;
//!
//! let selector = NodeSelector::new(vec!["node-a", "node-b", "node-c"], fnv1a_64);
//!
//! let owner = selector.lookup("user:42").unwrap();
//! // owner is one of "node-a", "node-b", "node-c", and every caller with
//! // the same roster and hasher picks the same one.
//!
//! // Primary + backup for the same key:
//! let replicas = selector.lookup_n("user:42", 2);
//! assert_eq!(replicas.len(), 2);
//! assert_eq!(replicas[0], owner);
//! ```
//!
//! # Concurrency
//!
//! The selector is not internally synchronized. Shared `&self` lookups are
//! safe; mutation takes `&mut self`, so the borrow checker enforces the
//! caller-synchronizes contract (wrap in a lock or use copy-on-write
//! replacement when readers and writers overlap).

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::hasher::KeyHasher;
use crate::mix::mix64;

/// Deterministic key→node selector using rendezvous hashing.
///
/// Generic over the node identifier type: anything byte-sequence-like whose
/// equality matches its byte representation (`String`, `&str`, `Vec<u8>`...).
/// The identifier bytes are hashed exactly once, at insertion.
#[derive(Clone)]
pub struct NodeSelector<N> {
    /// Roster of node identifiers. Order is insertion/compaction order and
    /// carries no semantic meaning; selection depends only on the
    /// (identifier, hash) pairs.
    nodes: Vec<N>,
    /// Parallel to `nodes`: `node_hash[i] = hasher(nodes[i])`, never stale.
    node_hash: Vec<u64>,
    /// Identifier → position in `nodes`/`node_hash`.
    index: HashMap<N, usize>,
    /// Injected byte hash. Treated as pure and total.
    hasher: KeyHasher,
}

/// Distribution quality snapshot, computed by simulating sample lookups.
#[derive(Debug, Clone)]
pub struct DistributionStats {
    /// Number of nodes in the roster.
    pub node_count: usize,
    /// Standard deviation of per-node key share, normalized by the expected
    /// share (lower = more even).
    pub distribution_stddev: f64,
    /// Smallest fraction of sample keys owned by any single node.
    pub min_fraction: f64,
    /// Largest fraction of sample keys owned by any single node.
    pub max_fraction: f64,
}

impl<N: AsRef<[u8]> + Clone + Eq + Hash> NodeSelector<N> {
    /// Create a selector from an initial roster.
    ///
    /// Nodes are inserted in the given order through the same path as
    /// [`add`](Self::add), so duplicate identifiers in the input are
    /// silently deduplicated (first occurrence wins).
    #[must_use]
    pub fn new(initial_nodes: impl IntoIterator<Item = N>, hasher: KeyHasher) -> Self {
        let mut selector = Self::empty(hasher);
        for node in initial_nodes {
            selector.add(node);
        }
        selector
    }

    /// Create a selector with no nodes.
    ///
    /// Lookups return `None` until the first [`add`](Self::add); that is the
    /// normal startup condition, not an error.
    #[must_use]
    pub fn empty(hasher: KeyHasher) -> Self {
        Self {
            nodes: Vec::new(),
            node_hash: Vec::new(),
            index: HashMap::new(),
            hasher,
        }
    }

    /// Number of nodes in the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if the given node is in the roster.
    #[must_use]
    pub fn contains(&self, node: &N) -> bool {
        self.index.contains_key(node)
    }

    /// Iterate over the roster.
    ///
    /// Iteration order is the internal insertion/compaction order; removals
    /// reorder at most one entry, so treat the order as arbitrary.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    /// Add a node to the roster. If the node already exists, this is a no-op.
    ///
    /// The identifier is hashed exactly once, here; existing nodes are not
    /// reordered and their stored hashes are untouched. Amortized O(1).
    pub fn add(&mut self, node: N) {
        if self.index.contains_key(&node) {
            return;
        }

        let hash = (self.hasher)(node.as_ref());
        let label = String::from_utf8_lossy(node.as_ref()).into_owned();
        self.index.insert(node.clone(), self.nodes.len());
        self.nodes.push(node);
        self.node_hash.push(hash);
        debug!(node = %label, roster_len = self.nodes.len(), "node added");
    }

    /// Remove a node from the roster. Returns true if the node was present.
    ///
    /// O(1): the last roster entry (identifier and hash together) is moved
    /// into the vacated slot and its index entry updated. That reorders at
    /// most one other node and never changes any other node's selection
    /// outcome, since scoring depends only on identifier+hash pairs.
    pub fn remove(&mut self, node: &N) -> bool {
        let Some(idx) = self.index.remove(node) else {
            return false;
        };

        let last = self.nodes.len() - 1;
        if idx != last {
            self.nodes.swap(idx, last);
            self.node_hash.swap(idx, last);
            self.index.insert(self.nodes[idx].clone(), idx);
        }
        self.nodes.truncate(last);
        self.node_hash.truncate(last);
        debug!(
            node = %String::from_utf8_lossy(node.as_ref()),
            roster_len = last,
            "node removed"
        );
        true
    }

    /// Get the node responsible for the given key.
    ///
    /// Returns `None` if the roster is empty. The key is hashed once; each
    /// node's score is `mix64(key_hash ^ node_hash)` and the highest score
    /// wins. An exact score tie (a collision in the mixed 64-bit space)
    /// resolves to the lower roster index: the scan uses strict `>`, so the
    /// first-encountered maximum is kept. Deterministic for a fixed roster
    /// and hasher, across calls and across processes.
    #[must_use]
    pub fn lookup<K: AsRef<[u8]>>(&self, key: K) -> Option<&N> {
        if self.nodes.is_empty() {
            return None;
        }

        let key_hash = (self.hasher)(key.as_ref());
        let mut best_idx = 0;
        let mut best_score = mix64(key_hash ^ self.node_hash[0]);
        for (i, &node_hash) in self.node_hash.iter().enumerate().skip(1) {
            let score = mix64(key_hash ^ node_hash);
            if score > best_score {
                best_score = score;
                best_idx = i;
            }
        }

        Some(&self.nodes[best_idx])
    }

    /// Get up to `n` distinct nodes for the given key, highest score first.
    ///
    /// The first entry always agrees with [`lookup`](Self::lookup); the rest
    /// are the natural replica order for the key. Returns an empty vec when
    /// `n == 0` or the roster is empty; `n` larger than the roster is
    /// clamped. O(len · log len) due to the sort.
    #[must_use]
    pub fn lookup_n<K: AsRef<[u8]>>(&self, key: K, n: usize) -> Vec<&N> {
        if n == 0 || self.nodes.is_empty() {
            return Vec::new();
        }

        let key_hash = (self.hasher)(key.as_ref());
        let mut scored: Vec<(u64, usize)> = self
            .node_hash
            .iter()
            .enumerate()
            .map(|(i, &node_hash)| (mix64(key_hash ^ node_hash), i))
            .collect();
        // Stable sort: equal scores retain roster order, consistent with
        // lookup's strict-`>` tie-break.
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(n.min(self.nodes.len()))
            .map(|(_, i)| &self.nodes[i])
            .collect()
    }

    /// Compute distribution statistics by simulating 10000 key lookups.
    #[must_use]
    pub fn stats(&self) -> DistributionStats {
        let node_count = self.nodes.len();
        let (stddev, min_frac, max_frac) = if node_count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            self.compute_distribution(10_000)
        };

        DistributionStats {
            node_count,
            distribution_stddev: stddev,
            min_fraction: min_frac,
            max_fraction: max_frac,
        }
    }

    fn compute_distribution(&self, sample_count: u64) -> (f64, f64, f64) {
        let mut counts: HashMap<&N, u64> = HashMap::new();
        for i in 0..sample_count {
            let key = format!("sample-key-{i}");
            if let Some(node) = self.lookup(&key) {
                *counts.entry(node).or_insert(0) += 1;
            }
        }

        let n = self.nodes.len() as f64;
        let expected = sample_count as f64 / n;
        let variance: f64 = counts
            .values()
            .map(|&c| {
                let diff = c as f64 - expected;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let stddev = variance.sqrt() / expected;

        let min_count = self
            .nodes
            .iter()
            .map(|node| counts.get(node).copied().unwrap_or(0))
            .min()
            .unwrap_or(0) as f64;
        let max_count = counts.values().max().copied().unwrap_or(0) as f64;

        (
            stddev,
            min_count / sample_count as f64,
            max_count / sample_count as f64,
        )
    }
}

impl<N: std::fmt::Debug> std::fmt::Debug for NodeSelector<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSelector")
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::fnv1a_64;

    #[test]
    fn empty_selector_returns_none() {
        let selector: NodeSelector<&str> = NodeSelector::empty(fnv1a_64);
        assert!(selector.is_empty());
        assert_eq!(selector.lookup("key"), None);
        assert!(selector.lookup_n("key", 3).is_empty());
    }

    #[test]
    fn single_node_always_wins() {
        let mut selector = NodeSelector::empty(fnv1a_64);
        selector.add("node-0");

        assert_eq!(selector.lookup("any-key"), Some(&"node-0"));
        assert_eq!(selector.lookup("another-key"), Some(&"node-0"));
        assert_eq!(selector.len(), 1);
    }

    #[test]
    fn lookup_is_deterministic() {
        let selector = NodeSelector::new(vec!["a", "b", "c", "d"], fnv1a_64);

        let first = *selector.lookup("user:42").unwrap();
        for _ in 0..50 {
            assert_eq!(*selector.lookup("user:42").unwrap(), first);
        }

        // A fresh selector with the same roster agrees.
        let other = NodeSelector::new(vec!["a", "b", "c", "d"], fnv1a_64);
        assert_eq!(*other.lookup("user:42").unwrap(), first);
    }

    #[test]
    fn add_duplicate_is_noop() {
        let mut selector = NodeSelector::empty(fnv1a_64);
        selector.add("A");
        selector.add("A");
        assert_eq!(selector.len(), 1);

        // Roster built with duplicates dedups on first occurrence.
        let from_dups = NodeSelector::new(vec!["A", "B", "A", "B"], fnv1a_64);
        assert_eq!(from_dups.len(), 2);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut selector = NodeSelector::new(vec!["A", "B"], fnv1a_64);
        assert!(!selector.remove(&"Z"));
        assert_eq!(selector.len(), 2);

        assert!(selector.remove(&"A"));
        assert!(!selector.remove(&"A"));
        assert_eq!(selector.len(), 1);
        assert_eq!(selector.lookup("anything"), Some(&"B"));
    }

    #[test]
    fn contains_and_nodes() {
        let mut selector = NodeSelector::new(vec!["A", "B", "C"], fnv1a_64);
        assert!(selector.contains(&"A"));
        assert!(!selector.contains(&"Z"));

        selector.remove(&"A");
        let mut roster: Vec<&str> = selector.nodes().copied().collect();
        roster.sort_unstable();
        assert_eq!(roster, vec!["B", "C"]);
    }

    #[test]
    fn remove_swaps_last_into_slot() {
        let mut selector = NodeSelector::new(vec!["A", "B", "C", "D"], fnv1a_64);

        // Winner for each key, recorded before the removal.
        let keys: Vec<String> = (0..200).map(|i| format!("key-{i}")).collect();
        let before: Vec<&str> = keys.iter().map(|k| *selector.lookup(k).unwrap()).collect();

        // Removing "B" moves "D" into its slot; every key that was not on
        // "B" must keep its winner regardless of the reorder.
        selector.remove(&"B");
        for (key, winner) in keys.iter().zip(&before) {
            if *winner != "B" {
                assert_eq!(selector.lookup(key), Some(winner));
            }
        }
    }

    #[test]
    fn unrelated_keys_stable_under_removal() {
        let nodes: Vec<String> = (0..8).map(|i| format!("node-{i}")).collect();
        let mut selector = NodeSelector::new(nodes, fnv1a_64);

        let keys: Vec<String> = (0..1000).map(|i| format!("key-{i}")).collect();
        let before: Vec<String> = keys
            .iter()
            .map(|k| selector.lookup(k).unwrap().clone())
            .collect();

        let victim = "node-3".to_string();
        selector.remove(&victim);

        for (key, winner) in keys.iter().zip(&before) {
            let after = selector.lookup(key).unwrap();
            if *winner == victim {
                assert_ne!(*after, victim, "removed node still selected for {key}");
            } else {
                assert_eq!(after, winner, "unrelated key {key} was remapped");
            }
        }
    }

    #[test]
    fn concrete_three_node_scenario() {
        let mut selector = NodeSelector::new(vec!["a", "b", "c"], fnv1a_64);

        let before = *selector.lookup("k1").unwrap();
        selector.remove(&"b");
        let after = *selector.lookup("k1").unwrap();

        if before == "b" {
            assert!(after == "a" || after == "c");
        } else {
            assert_eq!(after, before);
        }
    }

    #[test]
    fn lookup_n_agrees_with_lookup() {
        let nodes: Vec<String> = (0..10).map(|i| format!("node-{i}")).collect();
        let selector = NodeSelector::new(nodes, fnv1a_64);

        for i in 0..500 {
            let key = format!("key-{i}");
            let top = selector.lookup_n(&key, 1);
            assert_eq!(top.len(), 1);
            assert_eq!(Some(top[0]), selector.lookup(&key));
        }
    }

    #[test]
    fn lookup_n_full_roster_is_permutation() {
        let nodes: Vec<String> = (0..12).map(|i| format!("node-{i}")).collect();
        let selector = NodeSelector::new(nodes.clone(), fnv1a_64);

        let ranked = selector.lookup_n("some-key", 12);
        assert_eq!(ranked.len(), 12);

        let mut sorted: Vec<&String> = ranked.clone();
        sorted.sort_unstable();
        let mut expected: Vec<&String> = nodes.iter().collect();
        expected.sort_unstable();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn lookup_n_scores_non_increasing() {
        let nodes: Vec<String> = (0..16).map(|i| format!("node-{i}")).collect();
        let selector = NodeSelector::new(nodes, fnv1a_64);

        for i in 0..100 {
            let key = format!("key-{i}");
            let ranked = selector.lookup_n(&key, 16);
            let key_hash = fnv1a_64(key.as_bytes());
            let scores: Vec<u64> = ranked
                .iter()
                .map(|node| crate::mix::mix64(key_hash ^ fnv1a_64(node.as_bytes())))
                .collect();
            for pair in scores.windows(2) {
                assert!(pair[0] >= pair[1], "scores out of order for {key}");
            }
        }
    }

    #[test]
    fn lookup_n_clamps_and_rejects_zero() {
        let selector = NodeSelector::new(vec!["A", "B"], fnv1a_64);

        assert!(selector.lookup_n("key", 0).is_empty());
        assert_eq!(selector.lookup_n("key", 5).len(), 2);

        let distinct: std::collections::HashSet<_> =
            selector.lookup_n("key", 5).into_iter().collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn load_is_uniform_across_sixteen_nodes() {
        let nodes: Vec<String> = (0..16).map(|i| format!("node-{i}")).collect();
        let selector = NodeSelector::new(nodes.clone(), fnv1a_64);

        let total_keys = 100_000;
        let mut counts: HashMap<&String, usize> = HashMap::new();
        for i in 0..total_keys {
            let key = format!("key-{i}");
            *counts.entry(selector.lookup(&key).unwrap()).or_insert(0) += 1;
        }

        let expected = total_keys as f64 / nodes.len() as f64;
        for node in &nodes {
            let count = counts.get(node).copied().unwrap_or(0) as f64;
            let deviation = (count - expected).abs() / expected;
            assert!(
                deviation <= 0.05,
                "node {node} got {count} keys, expected ~{expected:.0} (deviation {:.1}%)",
                deviation * 100.0
            );
        }
    }

    #[test]
    fn byte_vec_identifiers() {
        let mut selector: NodeSelector<Vec<u8>> =
            NodeSelector::new(vec![b"alpha".to_vec(), b"beta".to_vec()], fnv1a_64);

        let owner = selector.lookup(b"key-1").unwrap().clone();
        assert!(owner == b"alpha" || owner == b"beta");
        assert!(selector.remove(&owner));
        assert_eq!(selector.len(), 1);
    }

    #[test]
    fn stats_on_balanced_roster() {
        let nodes: Vec<String> = (0..16).map(|i| format!("node-{i}")).collect();
        let selector = NodeSelector::new(nodes, fnv1a_64);

        let stats = selector.stats();
        assert_eq!(stats.node_count, 16);
        assert!(
            stats.distribution_stddev < 0.2,
            "stddev too high: {}",
            stats.distribution_stddev
        );
        assert!(stats.min_fraction > 0.0);
        assert!(stats.max_fraction < 0.15, "max={}", stats.max_fraction);
    }

    #[test]
    fn stats_empty_roster() {
        let selector: NodeSelector<&str> = NodeSelector::empty(fnv1a_64);
        let stats = selector.stats();
        assert_eq!(stats.node_count, 0);
        assert!(stats.distribution_stddev.abs() < f64::EPSILON);
    }

    #[test]
    fn add_remove_cycle_stays_consistent() {
        let mut selector = NodeSelector::empty(fnv1a_64);
        for round in 0..10 {
            selector.add(format!("node-{round}"));
            if round > 2 {
                selector.remove(&format!("node-{}", round - 3));
            }
        }
        // Rounds 7, 8, 9 survive.
        assert_eq!(selector.len(), 3);
        assert!(selector.lookup("key").is_some());
        for round in 7..10 {
            assert!(selector.contains(&format!("node-{round}")));
        }
    }
}
