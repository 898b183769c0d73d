use haz_core::rng::RngHandle;
use haz_sampling::weighted_values;
use proptest::prelude::*;

fn distribution() -> impl Strategy<Value = (Vec<u32>, Vec<f64>)> {
    prop::collection::vec(0.01f64..10.0, 1..8).prop_map(|weights| {
        let total: f64 = weights.iter().sum();
        let probs = weights.iter().map(|w| w / total).collect();
        ((0..weights.len() as u32).collect(), probs)
    })
}

proptest! {
    #[test]
    fn forced_draws_ignore_the_random_source(
        (values, probs) in distribution(),
        forced in prop::collection::vec(0.0f64..1.0, 0..40),
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        let size = [forced.len()];
        let a = weighted_values(&values, &probs, &size, Some(&forced[..]), &mut RngHandle::from_seed(seed_a)).unwrap();
        let b = weighted_values(&values, &probs, &size, Some(&forced[..]), &mut RngHandle::from_seed(seed_b)).unwrap();
        prop_assert_eq!(&a, &b);
        prop_assert!(a.iter().all(|v| (*v as usize) < values.len()));
    }

    #[test]
    fn draws_are_monotone_in_the_forced_value(
        (values, probs) in distribution(),
        u in 0.0f64..1.0,
        v in 0.0f64..1.0,
    ) {
        let (lo, hi) = if u <= v { (u, v) } else { (v, u) };
        let mut rng = RngHandle::from_seed(0);
        let out = weighted_values(&values, &probs, &[2], Some(&[lo, hi][..]), &mut rng).unwrap();
        prop_assert!(out[0] <= out[1]);
    }
}
