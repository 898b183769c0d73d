use haz_core::rng::RngHandle;
use haz_sampling::{permutation, permutation_within_groups};

#[test]
fn permutation_covers_every_index() {
    let mut perm = permutation(20, &mut RngHandle::from_seed(3));
    perm.sort_unstable();
    assert_eq!(perm, (0..20).collect::<Vec<_>>());
}

#[test]
fn grouped_permutation_stays_inside_groups() {
    let keys = ["x", "y", "x", "z", "y", "x", "x", "y"];
    let perm = permutation_within_groups(&keys, &mut RngHandle::from_seed(11));
    for (slot, source) in perm.iter().enumerate() {
        assert_eq!(keys[slot], keys[*source]);
    }
    let mut sorted = perm.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..keys.len()).collect::<Vec<_>>());
}

#[test]
fn singleton_groups_are_fixed_points() {
    let keys = [1, 2, 3];
    let perm = permutation_within_groups(&keys, &mut RngHandle::from_seed(5));
    assert_eq!(perm, vec![0, 1, 2]);
}

#[test]
fn grouped_permutation_is_seed_deterministic() {
    let keys: Vec<u32> = (0..200).map(|i| i % 7).collect();
    let a = permutation_within_groups(&keys, &mut RngHandle::from_seed(42));
    let b = permutation_within_groups(&keys, &mut RngHandle::from_seed(42));
    assert_eq!(a, b);
}
