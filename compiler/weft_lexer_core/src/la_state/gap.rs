//! Gap buffer backing the lookahead/state encodings.
//!
//! A single contiguous free region (the gap) sits inside `data`. Writes
//! first move the gap to the write position, so sequential appends and
//! edits clustered around one place cost O(1) amortized.
//!
//! ```text
//! [e0 e1 e2 | _ _ _ _ | e3 e4]
//!            ^gap_start ^gap_start + gap_len
//! ```

/// Growable array with a movable gap.
#[derive(Clone, Debug)]
pub(super) struct GapBuffer<T> {
    data: Vec<T>,
    gap_start: usize,
    gap_len: usize,
}

/// How to size a reallocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Growth {
    /// Single insert: `(capacity + 1) * 2`.
    Double,
    /// Bulk insert: combined size plus 10%.
    Bulk,
}

impl<T: Clone + Default> GapBuffer<T> {
    pub(super) fn with_capacity(capacity: usize) -> Self {
        GapBuffer {
            data: vec![T::default(); capacity],
            gap_start: 0,
            gap_len: capacity,
        }
    }

    /// Build a buffer holding `items` followed by a gap of `spare` slots.
    pub(super) fn from_items(items: impl ExactSizeIterator<Item = T>, spare: usize) -> Self {
        let len = items.len();
        let mut data = Vec::with_capacity(len + spare);
        data.extend(items);
        data.resize(len + spare, T::default());
        GapBuffer {
            data,
            gap_start: len,
            gap_len: spare,
        }
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.data.len() - self.gap_len
    }

    #[inline]
    pub(super) fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn physical(&self, index: usize) -> usize {
        if index < self.gap_start {
            index
        } else {
            index + self.gap_len
        }
    }

    #[inline]
    pub(super) fn get(&self, index: usize) -> &T {
        assert!(
            index < self.len(),
            "lookahead/state index {index} out of bounds (len {})",
            self.len()
        );
        &self.data[self.physical(index)]
    }

    pub(super) fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        (0..self.len()).map(move |i| &self.data[self.physical(i)])
    }

    pub(super) fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len(), "insert index {index} out of bounds");
        self.reserve(1, Growth::Double);
        self.move_gap(index);
        self.data[self.gap_start] = value;
        self.gap_start += 1;
        self.gap_len -= 1;
    }

    pub(super) fn insert_all(&mut self, index: usize, values: impl ExactSizeIterator<Item = T>) {
        assert!(index <= self.len(), "insert index {index} out of bounds");
        self.reserve(values.len(), Growth::Bulk);
        self.move_gap(index);
        for value in values {
            self.data[self.gap_start] = value;
            self.gap_start += 1;
            self.gap_len -= 1;
        }
    }

    pub(super) fn remove(&mut self, index: usize, count: usize) {
        assert!(
            index + count <= self.len(),
            "remove range {index}..{} out of bounds (len {})",
            index + count,
            self.len()
        );
        self.move_gap(index);
        let gap_end = self.gap_start + self.gap_len;
        for slot in &mut self.data[gap_end..gap_end + count] {
            *slot = T::default();
        }
        self.gap_len += count;
    }

    /// Drop the gap so the storage is exactly `len()` long.
    pub(super) fn trim_to_size(&mut self) {
        let len = self.len();
        self.move_gap(len);
        self.data.truncate(len);
        self.data.shrink_to_fit();
        self.gap_len = 0;
    }

    /// Make room for `extra` more items, reallocating if the gap is too small.
    fn reserve(&mut self, extra: usize, growth: Growth) {
        if self.gap_len >= extra {
            return;
        }
        let len = self.len();
        let needed = len + extra;
        let new_capacity = match growth {
            Growth::Double => ((self.capacity() + 1) * 2).max(needed),
            Growth::Bulk => needed + needed / 10,
        };
        let tail = self.data.split_off(self.gap_start + self.gap_len);
        self.data.truncate(self.gap_start);
        self.data.resize(new_capacity - tail.len(), T::default());
        self.data.extend(tail);
        self.gap_len = new_capacity - len;
    }

    /// Relocate the gap to start at logical `index`.
    ///
    /// Cost is proportional to the distance moved, never to the gap size.
    fn move_gap(&mut self, index: usize) {
        if index < self.gap_start {
            for i in (index..self.gap_start).rev() {
                self.data.swap(i, i + self.gap_len);
            }
        } else if index > self.gap_start {
            for i in self.gap_start..index {
                self.data.swap(i + self.gap_len, i);
            }
        }
        self.gap_start = index;
    }
}
