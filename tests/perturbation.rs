use std::collections::BTreeSet;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use preflop_quiz::chart::{ActionFrequencyRecord, ActionKey};
use preflop_quiz::perturb::{MAX_ALTERED_KEYS, MIN_DIFFERENCE, perturb};

fn full_record() -> ActionFrequencyRecord {
    ActionFrequencyRecord::from_pairs([
        (ActionKey::SbOpen, 100.0),
        (ActionKey::SbFourBet, 12.3),
        (ActionKey::SbCallThreeBet, 75.0),
        (ActionKey::BbThreeBet, 0.0),
        (ActionKey::BbCall, 49.5),
        (ActionKey::BbFiveBet, 96.0),
        (ActionKey::BbCallFourBet, 5.0),
        (ActionKey::BbFoldFourBet, 95.0),
    ])
    .expect("valid record")
}

fn changed_keys(canonical: &ActionFrequencyRecord, perturbed: &ActionFrequencyRecord) -> Vec<ActionKey> {
    canonical
        .iter()
        .filter(|(key, value)| perturbed.get(*key) != Some(*value))
        .map(|(key, _)| key)
        .collect()
}

#[test]
fn altered_keys_move_at_least_the_minimum_difference() {
    let canonical = full_record();
    for seed in 0..500 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let perturbed = perturb(&canonical, &mut rng);

        let canonical_keys: BTreeSet<ActionKey> = canonical.keys().collect();
        let perturbed_keys: BTreeSet<ActionKey> = perturbed.keys().collect();
        assert_eq!(canonical_keys, perturbed_keys, "seed={seed}");

        let changed = changed_keys(&canonical, &perturbed);
        assert!(
            (1..=MAX_ALTERED_KEYS).contains(&changed.len()),
            "seed={seed} changed={changed:?}"
        );
        for key in changed {
            let before = canonical.value(key);
            let after = perturbed.value(key);
            assert!((after - before).abs() >= MIN_DIFFERENCE, "seed={seed} {key}: {before} -> {after}");
            assert!((0.0..=100.0).contains(&after), "seed={seed} {key}: {after}");
        }
    }
}

#[test]
fn every_alteration_count_occurs() {
    let canonical = full_record();
    let mut seen = BTreeSet::new();
    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        seen.insert(changed_keys(&canonical, &perturb(&canonical, &mut rng)).len());
    }
    assert_eq!(seen, BTreeSet::from([1, 2, 3]));
}

#[test]
fn small_records_change_at_most_their_size() {
    let single = ActionFrequencyRecord::from_pairs([(ActionKey::SbOpen, 40.0)]).unwrap();
    let pair =
        ActionFrequencyRecord::from_pairs([(ActionKey::BbThreeBet, 20.0), (ActionKey::BbCall, 60.0)]).unwrap();
    for seed in 0..100 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        assert_eq!(changed_keys(&single, &perturb(&single, &mut rng)).len(), 1);
        let changed = changed_keys(&pair, &perturb(&pair, &mut rng)).len();
        assert!((1..=2).contains(&changed));
    }
}

#[test]
fn empty_record_is_returned_unchanged() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let empty = ActionFrequencyRecord::new();
    assert_eq!(perturb(&empty, &mut rng), empty);
}

#[test]
fn extreme_values_land_in_their_replacement_ranges() {
    let low = ActionFrequencyRecord::from_pairs([(ActionKey::SbOpen, 2.0)]).unwrap();
    let high = ActionFrequencyRecord::from_pairs([(ActionKey::SbOpen, 98.0)]).unwrap();
    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let raised = perturb(&low, &mut rng).value(ActionKey::SbOpen);
        assert!((20.0..70.0).contains(&raised), "seed={seed} {raised}");
        assert_eq!(raised.fract(), 0.0);

        let lowered = perturb(&high, &mut rng).value(ActionKey::SbOpen);
        assert!((10.0..60.0).contains(&lowered), "seed={seed} {lowered}");
    }
}

#[test]
fn mid_range_values_stay_within_thirty_points() {
    let canonical = ActionFrequencyRecord::from_pairs([(ActionKey::BbCall, 50.0)]).unwrap();
    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let after = perturb(&canonical, &mut rng).value(ActionKey::BbCall);
        let delta = (after - 50.0).abs();
        assert!((MIN_DIFFERENCE..=30.0).contains(&delta), "seed={seed} {after}");
    }
}

#[test]
fn same_seed_reproduces_the_same_perturbation() {
    let canonical = full_record();
    let first = perturb(&canonical, &mut ChaCha8Rng::seed_from_u64(77));
    let second = perturb(&canonical, &mut ChaCha8Rng::seed_from_u64(77));
    assert_eq!(first, second);
}
