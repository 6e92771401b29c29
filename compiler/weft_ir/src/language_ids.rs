//! Canonical sets of language ids.
//!
//! Every distinct set exists exactly once per process, so two sets are equal
//! iff they are the same allocation and comparing or hashing one is a
//! pointer operation. Membership is a bit test.
//!
//! Growing a set by one id is memoized on the smaller set, so the common
//! "this token also failed to embed language L" step costs one lock and one
//! map lookup after the first time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::LanguageId;

struct Node {
    /// Sorted raw ids.
    ids: Box<[u16]>,
    bits: Box<[u64]>,
    /// Memoized `with(id)` results.
    extensions: Mutex<FxHashMap<u16, LanguageIds>>,
}

impl Node {
    fn new(ids: &[u16]) -> Self {
        let words = ids.last().map_or(0, |max| usize::from(*max) / 64 + 1);
        let mut bits = vec![0u64; words];
        for id in ids {
            bits[usize::from(*id) / 64] |= 1 << (id % 64);
        }
        Node {
            ids: ids.into(),
            bits: bits.into_boxed_slice(),
            extensions: Mutex::new(FxHashMap::default()),
        }
    }
}

type Table = Mutex<FxHashMap<Box<[u16]>, LanguageIds>>;

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(FxHashMap::default()))
}

/// Immutable, canonical set of language ids.
#[derive(Clone)]
pub struct LanguageIds(Arc<Node>);

impl LanguageIds {
    /// The canonical empty set.
    pub fn empty() -> Self {
        Self::canonical(Vec::new())
    }

    fn canonical(ids: Vec<u16>) -> Self {
        let mut table = table().lock();
        if let Some(existing) = table.get(ids.as_slice()) {
            return existing.clone();
        }
        let set = LanguageIds(Arc::new(Node::new(&ids)));
        table.insert(ids.into_boxed_slice(), set.clone());
        set
    }

    #[inline]
    pub fn contains(&self, id: LanguageId) -> bool {
        let raw = id.raw();
        self.0
            .bits
            .get(usize::from(raw) / 64)
            .is_some_and(|word| word & (1 << (raw % 64)) != 0)
    }

    /// The canonical set holding this set's ids and `id`.
    #[must_use]
    pub fn with(&self, id: LanguageId) -> LanguageIds {
        if self.contains(id) {
            return self.clone();
        }
        let raw = id.raw();
        if let Some(known) = self.0.extensions.lock().get(&raw) {
            return known.clone();
        }
        let mut ids = self.0.ids.to_vec();
        let at = ids.partition_point(|i| *i < raw);
        ids.insert(at, raw);
        let extended = Self::canonical(ids);
        self.0.extensions.lock().insert(raw, extended.clone());
        extended
    }

    /// The canonical set holding this set's ids except `id`.
    ///
    /// Rebuilt by extending the empty set, so every intermediate set is
    /// memoized as well.
    #[must_use]
    pub fn without(&self, id: LanguageId) -> LanguageIds {
        if !self.contains(id) {
            return self.clone();
        }
        self.iter()
            .filter(|other| *other != id)
            .fold(LanguageIds::empty(), |set, other| set.with(other))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.ids.is_empty()
    }

    /// Ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = LanguageId> + '_ {
        self.0.ids.iter().map(|raw| LanguageId::from_raw(*raw))
    }
}

impl Default for LanguageIds {
    fn default() -> Self {
        LanguageIds::empty()
    }
}

impl PartialEq for LanguageIds {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for LanguageIds {}

impl Hash for LanguageIds {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for LanguageIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.ids.iter()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;
