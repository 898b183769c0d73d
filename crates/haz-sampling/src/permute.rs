//! Index permutations for shuffling attribute values.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

/// A uniformly random permutation of `0..n`.
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);
    order
}

/// A permutation of `0..keys.len()` that only exchanges positions sharing a key.
///
/// Reading `values[perm[i]]` for every `i` shuffles `values` within each group.
/// Groups are shuffled in key order, so the result depends only on `keys` and
/// the state of `rng`.
pub fn permutation_within_groups<K: Ord, R: Rng + ?Sized>(keys: &[K], rng: &mut R) -> Vec<usize> {
    let mut groups: BTreeMap<&K, Vec<usize>> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate() {
        groups.entry(key).or_default().push(idx);
    }
    let mut perm: Vec<usize> = (0..keys.len()).collect();
    for members in groups.values() {
        let mut shuffled = members.clone();
        shuffled.shuffle(rng);
        for (slot, source) in members.iter().zip(shuffled) {
            perm[*slot] = source;
        }
    }
    perm
}
