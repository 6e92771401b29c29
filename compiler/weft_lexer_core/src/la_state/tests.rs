use std::sync::Arc;

use pretty_assertions::assert_eq;

use super::*;

fn entries(la: &LaState) -> Vec<(u32, Option<LexerState>)> {
    (0..la.len()).map(|i| (la.lookahead(i), la.state(i))).collect()
}

// === Encoding selection ===

#[test]
fn empty_starts_without_state() {
    let la = LaState::empty();
    assert_eq!(la.kind(), LaStateKind::NoState);
    assert!(la.is_empty());
    assert_eq!(la.capacity(), 0);
}

#[test]
fn small_lookahead_without_state_stays_narrow() {
    let mut la = LaState::empty();
    for i in 0..50 {
        la.add(i % 128, None);
    }
    assert_eq!(la.kind(), LaStateKind::NoState);
    assert_eq!(la.lookahead(49), 49);
    assert_eq!(la.state(49), None);
}

#[test]
fn small_state_upgrades_to_byte_state() {
    let mut la = LaState::empty();
    la.add(1, None);
    la.add(2, Some(LexerState::Int(5)));
    assert_eq!(la.kind(), LaStateKind::ByteState);
    assert_eq!(entries(&la), vec![(1, None), (2, Some(LexerState::Int(5)))]);
}

#[test]
fn large_lookahead_upgrades_to_large_state() {
    let mut la = LaState::empty();
    la.add(3, Some(LexerState::Int(1)));
    la.add(1000, None);
    assert_eq!(la.kind(), LaStateKind::LargeState);
    assert_eq!(
        entries(&la),
        vec![(3, Some(LexerState::Int(1))), (1000, None)]
    );
}

#[test]
fn structured_state_upgrades_to_large_state() {
    let mut la = LaState::empty();
    let stack = LexerState::Stack(Arc::from([1, 2, 3]));
    la.add(0, Some(stack.clone()));
    assert_eq!(la.kind(), LaStateKind::LargeState);
    assert_eq!(la.state(0), Some(stack));
}

#[test]
fn state_128_does_not_fit_a_byte() {
    let mut la = LaState::empty();
    la.add(0, Some(LexerState::Int(127)));
    assert_eq!(la.kind(), LaStateKind::ByteState);
    la.add(0, Some(LexerState::Int(128)));
    assert_eq!(la.kind(), LaStateKind::LargeState);
    assert_eq!(la.state(0), Some(LexerState::Int(127)));
    assert_eq!(la.state(1), Some(LexerState::Int(128)));
}

#[test]
fn never_narrows_again() {
    let mut la = LaState::empty();
    la.add(500, None);
    la.remove(0, 1);
    la.add(1, None);
    la.trim_to_size();
    assert_eq!(la.kind(), LaStateKind::LargeState);
}

// === Gap discipline ===

#[test]
fn capacity_doubles_on_append() {
    let mut la = LaState::empty();
    la.add(0, None);
    assert_eq!(la.capacity(), 2);
    la.add(0, None);
    la.add(0, None);
    assert_eq!(la.capacity(), 6);
}

#[test]
fn insert_in_middle_keeps_order() {
    let mut la = LaState::empty();
    for i in 0..10 {
        la.add(i, None);
    }
    la.insert(3, 100, None);
    la.insert(0, 101, None);
    let got: Vec<u32> = (0..la.len()).map(|i| la.lookahead(i)).collect();
    assert_eq!(got, vec![101, 0, 1, 2, 100, 3, 4, 5, 6, 7, 8, 9]);
}

#[test]
fn remove_range() {
    let mut la = LaState::empty();
    for i in 0..10 {
        la.add(i, Some(LexerState::Int(i as i32)));
    }
    la.remove(2, 5);
    assert_eq!(
        entries(&la),
        vec![
            (0, Some(LexerState::Int(0))),
            (1, Some(LexerState::Int(1))),
            (7, Some(LexerState::Int(7))),
            (8, Some(LexerState::Int(8))),
            (9, Some(LexerState::Int(9))),
        ]
    );
}

#[test]
fn trim_releases_gap() {
    let mut la = LaState::empty();
    for i in 0..9 {
        la.add(i, None);
    }
    la.remove(4, 2);
    let before = entries(&la);
    la.trim_to_size();
    assert_eq!(la.capacity(), la.len());
    assert_eq!(entries(&la), before);
}

#[test]
fn add_all_grows_by_ten_percent() {
    let mut source = LaState::empty();
    for i in 0..100 {
        source.add(i % 100, None);
    }
    let mut target = LaState::empty();
    target.add_all(&source, 0, 100);
    assert_eq!(target.len(), 100);
    assert_eq!(target.capacity(), 110);
}

#[test]
fn insert_all_widens_to_the_widest_inserted_value() {
    let mut source = LaState::empty();
    source.add(1, Some(LexerState::Int(3)));
    source.add(200, None);
    let mut target = LaState::empty();
    target.add(9, None);
    target.add(9, None);

    target.insert_all(1, &source, 0, 1);
    assert_eq!(target.kind(), LaStateKind::ByteState);
    target.insert_all(1, &source, 1, 2);
    assert_eq!(target.kind(), LaStateKind::LargeState);
    assert_eq!(
        entries(&target),
        vec![
            (9, None),
            (200, None),
            (1, Some(LexerState::Int(3))),
            (9, None)
        ]
    );
}

#[test]
#[should_panic(expected = "out of bounds")]
fn lookahead_out_of_bounds_panics() {
    let mut la = LaState::empty();
    la.add(1, None);
    let _ = la.lookahead(1);
}

// === Property tests ===

mod proptest_la_state {
    use super::super::*;
    use proptest::prelude::*;

    fn any_state() -> impl Strategy<Value = Option<LexerState>> {
        prop_oneof![
            4 => Just(None),
            4 => (0i32..=127).prop_map(|v| Some(LexerState::Int(v))),
            1 => any::<i32>().prop_map(|v| Some(LexerState::Int(v))),
            1 => proptest::collection::vec(any::<i32>(), 0..4)
                .prop_map(|v| Some(LexerState::Stack(v.into()))),
        ]
    }

    fn any_lookahead() -> impl Strategy<Value = u32> {
        prop_oneof![8 => 0u32..=127, 1 => 128u32..100_000]
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(u32, Option<LexerState>),
        Insert(usize, u32, Option<LexerState>),
        Remove(usize, usize),
        Trim,
    }

    fn any_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (any_lookahead(), any_state()).prop_map(|(la, st)| Op::Add(la, st)),
            2 => (any::<usize>(), any_lookahead(), any_state())
                .prop_map(|(i, la, st)| Op::Insert(i, la, st)),
            2 => (any::<usize>(), 0usize..5).prop_map(|(i, n)| Op::Remove(i, n)),
            1 => Just(Op::Trim),
        ]
    }

    proptest! {
        #[test]
        fn adds_survive_any_upgrade_sequence(
            pairs in proptest::collection::vec((any_lookahead(), any_state()), 0..200)
        ) {
            let mut la = LaState::empty();
            for (lookahead, state) in &pairs {
                la.add(*lookahead, state.clone());
            }
            prop_assert_eq!(la.len(), pairs.len());
            for (i, (lookahead, state)) in pairs.iter().enumerate() {
                prop_assert_eq!(la.lookahead(i), *lookahead);
                prop_assert_eq!(&la.state(i), state);
            }
        }

        #[test]
        fn matches_vec_model(ops in proptest::collection::vec(any_op(), 0..120)) {
            let mut la = LaState::empty();
            let mut model: Vec<(u32, Option<LexerState>)> = Vec::new();
            for op in ops {
                match op {
                    Op::Add(lookahead, state) => {
                        la.add(lookahead, state.clone());
                        model.push((lookahead, state));
                    }
                    Op::Insert(i, lookahead, state) => {
                        let i = i % (model.len() + 1);
                        la.insert(i, lookahead, state.clone());
                        model.insert(i, (lookahead, state));
                    }
                    Op::Remove(i, n) => {
                        if model.is_empty() {
                            continue;
                        }
                        let i = i % model.len();
                        let n = n.min(model.len() - i);
                        la.remove(i, n);
                        model.drain(i..i + n);
                    }
                    Op::Trim => la.trim_to_size(),
                }
                prop_assert_eq!(la.len(), model.len());
            }
            let before: Vec<_> = (0..la.len()).map(|i| (la.lookahead(i), la.state(i))).collect();
            prop_assert_eq!(&before, &model);
            la.trim_to_size();
            let after: Vec<_> = (0..la.len()).map(|i| (la.lookahead(i), la.state(i))).collect();
            prop_assert_eq!(after, before);
        }
    }
}
