use pixnn::activation::activation::{identity, tanh, tanh_derivative};
use pixnn::{Dataset, Layer, Network, NnError, Sample, Unit, WeightRange};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded(widths: &[usize], seed: u64) -> Network {
    Network::with_range(widths, WeightRange::default(), &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn two_input_identity_unit_adds_inputs() {
    let unit = Unit::from_weights(vec![1.0, 1.0, 0.0]).unwrap();
    let mut net = Network::from_layers(vec![Layer::from_units(vec![unit]).unwrap()]).unwrap();
    assert_eq!(net.input_width(), 2);
    assert_eq!(net.output_width(), 1);
    assert_eq!(net.predict(identity, &[2.0, 3.0]).unwrap(), vec![5.0]);
}

#[test]
fn tanh_step_on_fixed_sample_does_not_grow_error() {
    for seed in 0..16 {
        let mut net = seeded(&[2, 1], seed);
        let before = (net.predict(tanh, &[1.0, -1.0]).unwrap()[0] - 1.0).abs();
        let reported = net.train(tanh, tanh_derivative, &[1.0, -1.0], &[1.0], 1e-3).unwrap();
        assert!((reported - before).abs() < 1e-12);
        let after = (net.predict(tanh, &[1.0, -1.0]).unwrap()[0] - 1.0).abs();
        assert!(after <= before, "seed {seed}: {after} > {before}");
    }
}

#[test]
fn repeated_training_fits_separable_points() {
    let data: Dataset = vec![
        Sample::point(0.8, 0.2, 0.9),
        Sample::point(0.6, -0.4, 0.9),
        Sample::point(-0.7, 0.3, -0.9),
        Sample::point(-0.5, -0.6, -0.9),
    ]
    .into();
    let mut net = seeded(&[2, 1], 21);
    let mut last = f64::INFINITY;
    for _ in 0..2000 {
        last = net.train_dataset(tanh, tanh_derivative, &data, None, 0.05).unwrap();
    }
    assert!(last < 0.1, "error stayed at {last}");
}

#[test]
fn taken_network_keeps_working_and_source_is_flagged() {
    let mut a = seeded(&[2, 4, 1], 3);
    let expected = a.clone().predict(tanh, &[0.1, 0.2]).unwrap();
    let mut b = a.take();
    assert!(a.is_moved());
    assert!(a.layers().is_empty());
    assert_eq!(b.predict(tanh, &[0.1, 0.2]).unwrap(), expected);
    assert!(matches!(a.guess(tanh, &[0.1, 0.2], &mut [0.0]), Err(NnError::MovedOut)));
}

proptest! {
    #[test]
    fn guess_is_deterministic_and_sized(
        hidden in proptest::collection::vec(1usize..6, 0..3),
        outputs in 1usize..4,
        seed in any::<u64>(),
        x in -1.0f64..1.0,
        y in -1.0f64..1.0,
    ) {
        let mut widths = vec![2];
        widths.extend(hidden);
        widths.push(outputs);
        let mut net = seeded(&widths, seed);
        let a = net.predict(tanh, &[x, y]).unwrap();
        let b = net.predict(tanh, &[x, y]).unwrap();
        prop_assert_eq!(a.len(), outputs);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn training_a_clone_leaves_original_untouched(seed in any::<u64>(), rate in 0.001f64..0.5) {
        let original = seeded(&[2, 3, 2], seed);
        let snapshot = original.clone();
        let mut copy = original.clone();
        copy.train(tanh, tanh_derivative, &[0.3, -0.3], &[1.0, -1.0], rate).unwrap();
        prop_assert_eq!(original, snapshot);
    }

    #[test]
    fn whole_dataset_pass_is_mean_of_steps(
        seed in any::<u64>(),
        points in proptest::collection::vec((-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0), 1..8),
    ) {
        let data: Dataset = points.iter().map(|&(x, y, v)| Sample::point(x, y, v)).collect();
        let mut a = seeded(&[2, 3, 1], seed);
        let mut b = a.clone();
        let mean = a.train_dataset(tanh, tanh_derivative, &data, None, 0.01).unwrap();
        let mut sum = 0.0;
        for s in &data {
            sum += b.train(tanh, tanh_derivative, &s.input, &s.expected, 0.01).unwrap();
        }
        prop_assert!((mean - sum / data.len() as f64).abs() < 1e-12);
        prop_assert_eq!(a, b);
    }
}
