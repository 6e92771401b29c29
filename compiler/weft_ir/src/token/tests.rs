use super::*;
use crate::{LanguageId, TokenIdDef, TokenIdSet, WrapTokenIdCache};
use pretty_assertions::assert_eq;

fn wrap_ids() -> WrapTokenIdCache {
    let ids = TokenIdSet::new(&[TokenIdDef::new("op", 0), TokenIdDef::new("kw", 1)]).unwrap();
    WrapTokenIdCache::new(LanguageId::from_raw(920), &ids)
}

#[test]
fn same_text_is_shared() {
    let wrap_ids = wrap_ids();
    let cache = FlyTokenCache::new(2);
    let plus = cache.get(&wrap_ids.plain(TokenId(0)), "+");
    let again = cache.get(&wrap_ids.plain(TokenId(0)), "+");
    assert!(Arc::ptr_eq(&plus, &again));
    assert_eq!(plus.length(), 1);
    assert_eq!(plus.text(), "+");
    assert_eq!(plus.id(), TokenId(0));
}

#[test]
fn content_equal_text_hits() {
    let wrap_ids = wrap_ids();
    let cache = FlyTokenCache::new(2);
    let owned: &'static str = Box::leak(String::from("let").into_boxed_str());
    let first = cache.get(&wrap_ids.plain(TokenId(1)), "let");
    let second = cache.get(&wrap_ids.plain(TokenId(1)), owned);
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn third_text_evicts_least_recent() {
    let wrap_ids = wrap_ids();
    let cache = FlyTokenCache::new(2);
    let op = wrap_ids.plain(TokenId(0));
    let plus = cache.get(&op, "+");
    let minus = cache.get(&op, "-");
    // "+" becomes most recent, so "-" is evicted by "*".
    assert!(Arc::ptr_eq(&plus, &cache.get(&op, "+")));
    cache.get(&op, "*");
    assert_eq!(cache.cached(TokenId(0)), 2);
    assert!(Arc::ptr_eq(&plus, &cache.get(&op, "+")));
    assert!(!Arc::ptr_eq(&minus, &cache.get(&op, "-")));
    assert_eq!(cache.cached(TokenId(1)), 0);
}

#[test]
fn token_accessors() {
    let wrap_ids = wrap_ids();
    let cache = FlyTokenCache::new(2);
    let fly = Token::Fly(cache.get(&wrap_ids.plain(TokenId(1)), "if"));
    let regular = Token::Regular(RegularToken {
        wrap_id: wrap_ids.plain(TokenId(0)),
        offset: 7,
        length: 3,
        text: None,
    });
    assert!(fly.is_flyweight());
    assert_eq!(fly.stored_offset(), None);
    assert_eq!(fly.fly_text(), Some("if"));
    assert_eq!(fly.length(), 2);
    assert!(!regular.is_flyweight());
    assert_eq!(regular.stored_offset(), Some(7));
    assert_eq!(regular.id(), TokenId(0));
    assert!(regular.preprocessed_text().is_none());
}

mod proptest_fly_tokens {
    use super::*;
    use proptest::prelude::*;

    const TEXTS: [&str; 5] = ["a", "b", "c", "d", "e"];

    proptest! {
        #[test]
        fn at_most_two_cached_per_id(picks in proptest::collection::vec((0usize..5, 0u16..2), 1..60)) {
            let wrap_ids = wrap_ids();
            let cache = FlyTokenCache::new(2);
            for (text, id) in picks {
                let token = cache.get(&wrap_ids.plain(TokenId(id)), TEXTS[text]);
                prop_assert_eq!(token.text(), TEXTS[text]);
                prop_assert!(cache.cached(TokenId(0)) <= 2);
                prop_assert!(cache.cached(TokenId(1)) <= 2);
                // The most recent request is always a hit.
                prop_assert!(Arc::ptr_eq(&token, &cache.get(&wrap_ids.plain(TokenId(id)), TEXTS[text])));
            }
        }
    }
}
