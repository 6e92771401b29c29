//! All token lists of one language path.

use smallvec::SmallVec;
use weft_ir::LanguagePath;

use crate::store::TokenStore;
use crate::{TokenHierarchy, TokenList, TokenListError};

/// Token indices leading from the root list to an embedded list.
pub type ListAddress = SmallVec<[usize; 4]>;

/// Snapshot of where the lists of a language path are.
///
/// Valid only while the hierarchy's modification count equals the one it
/// was built at; every access through it checks.
#[derive(Clone, Debug)]
pub struct TokenListList {
    path: LanguagePath,
    mod_count: u64,
    addresses: Vec<ListAddress>,
    starts: Vec<u32>,
    ends: Vec<u32>,
}

impl TokenListList {
    /// Lex the hierarchy far enough to find every list of `path`.
    ///
    /// Materializes every token of every list on the way down.
    pub fn build(hierarchy: &mut TokenHierarchy, path: &LanguagePath) -> TokenListList {
        TokenListList::build_until(hierarchy, path, u32::MAX)
    }

    /// Like [`build`](Self::build) but stops each level at the first token
    /// starting at or past `limit`; lists beyond it are left out.
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path, limit))]
    pub fn build_until(
        hierarchy: &mut TokenHierarchy,
        path: &LanguagePath,
        limit: u32,
    ) -> TokenListList {
        let mut lists = TokenListList {
            path: path.clone(),
            mod_count: hierarchy.mod_count(),
            addresses: Vec::new(),
            starts: Vec::new(),
            ends: Vec::new(),
        };
        let root = hierarchy.root_store();
        if root.language() != path.top_language() {
            return lists;
        }
        if path.size() == 1 {
            lists.push(ListAddress::new(), root.start_offset(), root.window_end_offset());
        } else {
            lists.collect(root, 1, limit, &mut ListAddress::new());
        }
        tracing::debug!(lists = lists.len(), "token lists collected");
        lists
    }

    fn collect(
        &mut self,
        store: &mut TokenStore,
        depth: usize,
        limit: u32,
        address: &mut ListAddress,
    ) {
        let target = self.path.language(depth).id();
        store.check_live();
        let mut next = 0;
        while store.ensure(next) && store.offset_of(next) < limit {
            let index = next;
            next += 1;
            let Some(list) = store.embedded(index) else {
                continue;
            };
            if list.store.language().id() != target {
                continue;
            }
            address.push(index);
            if depth + 1 == self.path.size() {
                let (start, end) = (list.store.start_offset(), list.window_end_offset());
                self.push(address.clone(), start, end);
            } else {
                self.collect(&mut list.store, depth + 1, limit, address);
            }
            address.pop();
        }
    }

    fn push(&mut self, address: ListAddress, start: u32, end: u32) {
        self.addresses.push(address);
        self.starts.push(start);
        self.ends.push(end);
    }

    pub fn path(&self) -> &LanguagePath {
        &self.path
    }

    pub fn mod_count(&self) -> u64 {
        self.mod_count
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn address(&self, index: usize) -> &[usize] {
        &self.addresses[index]
    }

    /// Offset where list `index` starts.
    pub fn start_offset(&self, index: usize) -> u32 {
        self.starts[index]
    }

    /// Offset where list `index` ends.
    pub fn end_offset(&self, index: usize) -> u32 {
        self.ends[index]
    }

    /// Index of the first list ending after `offset`, or `len()`.
    pub fn find_index(&self, offset: u32) -> usize {
        self.ends.partition_point(|end| *end <= offset)
    }

    pub fn check(&self, hierarchy: &TokenHierarchy) -> Result<(), TokenListError> {
        let actual = hierarchy.mod_count();
        if actual == self.mod_count {
            Ok(())
        } else {
            Err(TokenListError::StaleView {
                expected: self.mod_count,
                actual,
            })
        }
    }

    /// List `index`, after checking that the snapshot is current.
    pub fn list<'h>(
        &self,
        hierarchy: &'h mut TokenHierarchy,
        index: usize,
    ) -> Result<Option<&'h mut dyn TokenList>, TokenListError> {
        self.check(hierarchy)?;
        Ok(hierarchy.token_list(&self.addresses[index]))
    }
}
