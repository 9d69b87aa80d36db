use crate::*;
use fp_types::{has_overlap, Dim, Layout};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_sizes(n: usize, rng: &mut impl Rng) -> Vec<(Dim, Dim)> {
    (0..n)
        .map(|_| (rng.gen_range(1..=50), rng.gen_range(1..=50)))
        .collect()
}

#[test]
fn identity_pair_packs_in_a_row() {
    let sp = SequencePair::new([(4, 6), (3, 7)]);
    let mut layout = Layout::from_sizes([(4, 6), (3, 7)]);
    for eval in [
        &mut DagEvaluator::new() as &mut dyn Evaluator,
        &mut LcsEvaluator::new(),
    ] {
        assert_eq!(eval.evaluate(&sp, &mut layout), (7, 7));
        assert_eq!(layout.x(), &[0, 4]);
        assert_eq!(layout.y(), &[0, 0]);
    }
}

#[test]
fn opposed_order_stacks() {
    let mut sp = SequencePair::new([(4, 6), (3, 7)]);
    // 0 precedes 1 in sp_y but follows in sp_x: 0 goes below 1.
    let dist = ChangeDistribution::from_pairs(&[(Change::SwapX, 1.0)]).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    while sp.sp_x() != [1, 0] {
        sp.apply_change(&mut rng, &dist);
    }
    let mut layout = Layout::from_sizes([(4, 6), (3, 7)]);
    for eval in [
        &mut DagEvaluator::new() as &mut dyn Evaluator,
        &mut LcsEvaluator::new(),
    ] {
        assert_eq!(eval.evaluate(&sp, &mut layout), (4, 13));
        assert_eq!(layout.y(), &[0, 6]);
        assert_eq!(layout.x(), &[0, 0]);
    }
}

#[test]
fn rollback_restores_state_for_every_operator() {
    let operators = [
        Change::Rotate,
        Change::SwapX,
        Change::SwapY,
        Change::SwapXy,
        Change::ReverseX,
        Change::ReverseY,
        Change::ReverseXy,
        Change::RotateX,
        Change::RotateY,
        Change::RotateXy,
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for &op in &operators {
        let dist = ChangeDistribution::from_pairs(&[(op, 1.0)]).unwrap();
        for _ in 0..32 {
            let mut sp = SequencePair::new(random_sizes(16, &mut rng));
            sp.shuffle(&mut rng, 0.5);
            let before = sp.clone();
            let applied = sp.apply_change(&mut rng, &dist);
            assert_eq!(applied, op);
            assert!(sp.rollback(), "{op:?} must be undoable");
            // The memo differs (consumed), everything else must be bitwise equal.
            assert_eq!(sp.widths(), before.widths(), "{op:?}");
            assert_eq!(sp.heights(), before.heights(), "{op:?}");
            assert_eq!(sp.sp_x(), before.sp_x(), "{op:?}");
            assert_eq!(sp.sp_y(), before.sp_y(), "{op:?}");
        }
    }
}

#[test]
fn rollback_is_one_shot_and_invalidated() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let mut sp = SequencePair::new(random_sizes(8, &mut rng));
    assert!(!sp.rollback());

    let dist = ChangeDistribution::default();
    sp.apply_change(&mut rng, &dist);
    assert!(sp.rollback());
    assert!(!sp.rollback());

    sp.apply_change(&mut rng, &dist);
    sp.shuffle(&mut rng, 0.5);
    assert!(!sp.rollback());

    sp.apply_change(&mut rng, &dist);
    sp.construct(random_sizes(8, &mut rng), &mut rng);
    assert!(!sp.rollback());
    assert_eq!(sp.len(), 8);
}

/// Both evaluators agree on 64 random sequence pairs over 32 random
/// rectangles, and the placements they produce are overlap-free.
#[test]
fn evaluators_agree() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut dag = DagEvaluator::new();
    let mut lcs = LcsEvaluator::new();
    for round in 0..64 {
        let sizes = random_sizes(32, &mut rng);
        let mut sp = SequencePair::new(sizes.clone());
        sp.shuffle(&mut rng, 0.5);

        let mut dag_layout = Layout::from_sizes(sizes.iter().copied());
        let mut lcs_layout = Layout::from_sizes(sizes.iter().copied());
        let dag_box = dag.evaluate(&sp, &mut dag_layout);
        let lcs_box = lcs.evaluate(&sp, &mut lcs_layout);

        assert_eq!(dag_box, lcs_box, "round {round}");
        assert_eq!(dag_layout.bounding_box(), dag_box, "round {round}");
        assert!(!has_overlap(&dag_layout), "round {round}");
        assert!(!has_overlap(&lcs_layout), "round {round}");
    }
}

/// Evaluator agreement under a mutation workload rather than fresh shuffles.
#[test]
fn evaluators_agree_across_changes() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let dist = ChangeDistribution::default();
    let sizes = random_sizes(24, &mut rng);
    let mut sp = SequencePair::new(sizes.clone());
    sp.shuffle(&mut rng, 0.5);

    let mut dag = DagEvaluator::new();
    let mut lcs = LcsEvaluator::new();
    let mut layout = Layout::from_sizes(sizes.iter().copied());
    for _ in 0..500 {
        sp.apply_change(&mut rng, &dist);
        let a = dag.evaluate(&sp, &mut layout);
        let b = lcs.evaluate(&sp, &mut layout);
        assert_eq!(a, b);
    }
}

#[test]
fn empty_pair_evaluates_to_zero() {
    let sp = SequencePair::new(std::iter::empty());
    let mut layout = Layout::default();
    assert_eq!(DagEvaluator::new().evaluate(&sp, &mut layout), (0, 0));
    assert_eq!(LcsEvaluator::new().evaluate(&sp, &mut layout), (0, 0));
}
