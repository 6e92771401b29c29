//! Token iteration across all lists of one language path.

use weft_ir::Token;

use crate::{SubSequenceTokenList, TokenHierarchy, TokenListError, TokenListList};

/// A token yielded by a [`TokenSequenceList`].
#[derive(Clone, Debug)]
pub struct SequenceToken {
    pub token: Token,
    /// Absolute offset in the root text.
    pub offset: u32,
    /// Index of the list it came from in the underlying [`TokenListList`].
    pub list: usize,
}

/// Index range still to yield from one list.
struct Cursor {
    list: usize,
    index: usize,
    end: usize,
}

/// The tokens of every list of a language path overlapping `[start, end)`,
/// in text order.
///
/// Built over a snapshot of the hierarchy; once the hierarchy is modified
/// every call fails with [`TokenListError::StaleView`].
pub struct TokenSequenceList {
    lists: TokenListList,
    start: u32,
    end: u32,
    next_list: usize,
    cursor: Option<Cursor>,
}

impl TokenSequenceList {
    pub fn new(lists: TokenListList, start: u32, end: u32) -> Self {
        let next_list = lists.find_index(start);
        TokenSequenceList {
            lists,
            start,
            end,
            next_list,
            cursor: None,
        }
    }

    #[inline]
    pub fn lists(&self) -> &TokenListList {
        &self.lists
    }

    #[inline]
    pub fn bounds(&self) -> (u32, u32) {
        (self.start, self.end)
    }

    /// Next token, or `None` when the window is exhausted.
    pub fn next(
        &mut self,
        hierarchy: &mut TokenHierarchy,
    ) -> Result<Option<SequenceToken>, TokenListError> {
        self.lists.check(hierarchy)?;
        loop {
            if let Some(cursor) = &mut self.cursor {
                if cursor.index < cursor.end {
                    let Some(list) = hierarchy.token_list(self.lists.address(cursor.list)) else {
                        self.cursor = None;
                        continue;
                    };
                    let index = cursor.index;
                    cursor.index += 1;
                    let offset = list.token_offset(index);
                    if let Some(token) = list.token(index) {
                        return Ok(Some(SequenceToken {
                            token: token.clone(),
                            offset,
                            list: cursor.list,
                        }));
                    }
                }
                self.cursor = None;
            }

            let i = self.next_list;
            if i >= self.lists.len() || self.start >= self.end || self.lists.start_offset(i) >= self.end
            {
                return Ok(None);
            }
            self.next_list += 1;
            let inside =
                self.lists.start_offset(i) >= self.start && self.lists.end_offset(i) <= self.end;
            let Some(list) = hierarchy.token_list(self.lists.address(i)) else {
                continue;
            };
            let (index, end) = if inside {
                (0, list.token_count())
            } else {
                let view = SubSequenceTokenList::new(list, self.start, self.end);
                (view.start_index(), view.end_index())
            };
            self.cursor = Some(Cursor {
                list: i,
                index,
                end,
            });
        }
    }

    /// Remaining tokens of the window.
    pub fn collect(
        &mut self,
        hierarchy: &mut TokenHierarchy,
    ) -> Result<Vec<SequenceToken>, TokenListError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next(hierarchy)? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}
