use super::*;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

// Raw ids far above anything a test language is assigned.
fn id(raw: u16) -> LanguageId {
    LanguageId::from_raw(500 + raw)
}

fn set_of(raw: &[u16]) -> LanguageIds {
    raw.iter()
        .fold(LanguageIds::empty(), |set, r| set.with(id(*r)))
}

#[test]
fn equal_sets_are_the_same_instance() {
    let forward = set_of(&[1, 2, 3]);
    let backward = set_of(&[3, 2, 1]);
    assert!(Arc::ptr_eq(&forward.0, &backward.0));
    assert_eq!(forward, backward);
    assert_ne!(forward, set_of(&[1, 2]));
}

#[test]
fn membership() {
    let set = set_of(&[0, 70]);
    assert!(set.contains(id(0)));
    assert!(set.contains(id(70)));
    assert!(!set.contains(id(1)));
    // Far beyond the allocated bit words.
    assert!(!set.contains(LanguageId::from_raw(u16::MAX - 1)));
    assert_eq!(set.len(), 2);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![id(0), id(70)]);
}

#[test]
fn with_existing_member_is_identity() {
    let set = set_of(&[4]);
    assert_eq!(set.with(id(4)), set);
}

#[test]
fn extension_is_memoized() {
    let base = set_of(&[10]);
    let first = base.with(id(11));
    let second = base.with(id(11));
    assert!(Arc::ptr_eq(&first.0, &second.0));
    assert!(base.0.extensions.lock().contains_key(&id(11).raw()));
}

#[test]
fn without_returns_canonical_sets() {
    let set = set_of(&[20, 21, 22]);
    assert_eq!(set.without(id(21)), set_of(&[22, 20]));
    assert_eq!(set.without(id(99)), set);
    assert_eq!(set_of(&[20]).without(id(20)), LanguageIds::empty());
    assert!(LanguageIds::default().is_empty());
}

#[test]
fn debug_lists_raw_ids() {
    assert_eq!(format!("{:?}", set_of(&[2, 1])), "{501, 502}");
}

mod proptest_language_ids {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        With(u16),
        Without(u16),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0u16..40).prop_map(Op::With),
            1 => (0u16..40).prop_map(Op::Without),
        ]
    }

    proptest! {
        #[test]
        fn matches_set_model(ops in proptest::collection::vec(op(), 0..40)) {
            let mut set = LanguageIds::empty();
            let mut model = BTreeSet::new();
            for op in ops {
                match op {
                    Op::With(raw) => {
                        set = set.with(id(raw));
                        model.insert(id(raw));
                    }
                    Op::Without(raw) => {
                        set = set.without(id(raw));
                        model.remove(&id(raw));
                    }
                }
                prop_assert_eq!(set.iter().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());
            }
            let rebuilt = model.iter().rev().fold(LanguageIds::empty(), |s, l| s.with(*l));
            prop_assert!(Arc::ptr_eq(&set.0, &rebuilt.0));
        }
    }
}
