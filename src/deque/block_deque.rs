//! Bounded double-ended queue over a chain of fixed-size blocks.
//!
//! Elements live in fixed-length slot blocks linked into a list, so growth
//! never relocates existing elements and shrink returns whole blocks at a
//! time. A single drained block is kept aside for reuse, which makes
//! steady-state push/pop traffic allocation-free. With a non-zero `max_len`
//! the deque behaves as a sliding window: pushing past the bound silently
//! evicts from the opposite end instead of blocking or failing.

use std::collections::VecDeque;
use std::fmt;
use std::fmt::Debug;
use std::mem;

use super::block_list::Block;
use super::block_list::BlockList;
use super::iter::Blocks;
use super::iter::Iter;
use crate::constants::DEFAULT_BLOCK_LEN;
use crate::constants::UNBOUNDED;

/// Block-structured bounded deque.
///
/// Push and pop at both ends run in O(1), amortized for pushes that have to
/// link a fresh block. The deque is single-owner and carries no internal
/// locking; wrap it in a mutex when it backs a queue shared across tasks.
pub struct BlockDeque<T> {
    list: BlockList<T>,
    /// Slots per block, fixed at construction.
    block_len: usize,
    /// Maximum element count before pushes start evicting; 0 means unbounded.
    max_len: usize,
    len: usize,
    /// Index of the first occupied slot of the head block.
    front: usize,
    /// One past the last occupied slot of the tail block.
    back: usize,
    /// At most one drained block kept for reuse.
    free: Option<Block<T>>,
}

impl<T> BlockDeque<T> {
    /// Creates a deque with `block_len` slots per block, bounded to `max_len`
    /// elements.
    ///
    /// A `max_len` of 0 disables the bound. While bounded, a push that would
    /// exceed `max_len` evicts one element from the opposite end first, so
    /// the deque holds the most recent `max_len` elements seen from that end.
    ///
    /// # Panics
    /// Panics if `block_len < 2`; cursor movement needs at least two slots
    /// per block.
    pub fn new(block_len: usize, max_len: usize) -> Self {
        assert!(
            block_len >= 2,
            "block_len must be at least 2, got {}",
            block_len
        );
        let mut list = BlockList::new();
        list.push_tail(Block::new(block_len));
        let mid = block_len / 2;
        Self {
            list,
            block_len,
            max_len,
            len: 0,
            front: mid,
            back: mid,
            free: None,
        }
    }

    /// Number of elements currently buffered.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots per block, as passed at construction.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Element bound, 0 when unbounded.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Appends `value` at the back. Evicts the front element first when the
    /// deque is bounded and full.
    pub fn push_back(&mut self, value: T) {
        if self.back == self.block_len {
            let block = self.take_free_or_alloc();
            self.list.push_tail(block);
            self.back = 0;
        }
        self.list.tail_block_mut().write(self.back, value);
        self.back += 1;
        self.len += 1;
        if self.max_len != UNBOUNDED && self.len > self.max_len {
            self.pop_front();
        }
    }

    /// Prepends `value` at the front. Evicts the back element first when the
    /// deque is bounded and full.
    pub fn push_front(&mut self, value: T) {
        if self.front == 0 {
            let block = self.take_free_or_alloc();
            self.list.push_head(block);
            self.front = self.block_len;
        }
        self.front -= 1;
        self.list.head_block_mut().write(self.front, value);
        self.len += 1;
        if self.max_len != UNBOUNDED && self.len > self.max_len {
            self.pop_back();
        }
    }

    /// Removes and returns the back element, or `None` when empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.back -= 1;
        // SAFETY: len > 0, so slot `back` of the tail block is occupied, and
        // moving the cursor before the read vacates it.
        let value = unsafe { self.list.tail_block_mut().take(self.back) };
        self.len -= 1;
        if self.len == 0 {
            self.reset_empty();
        } else if self.back == 0 {
            // Tail block drained with elements left further up the chain.
            let idx = self.list.tail().expect("block list is never empty");
            let drained = self.list.remove(idx);
            self.cache_free(drained);
            self.back = self.block_len;
        }
        Some(value)
    }

    /// Removes and returns the front element, or `None` when empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: len > 0, so slot `front` of the head block is occupied, and
        // advancing the cursor after the read vacates it.
        let value = unsafe { self.list.head_block_mut().take(self.front) };
        self.front += 1;
        self.len -= 1;
        if self.len == 0 {
            self.reset_empty();
        } else if self.front == self.block_len {
            // Head block drained with elements left further down the chain.
            let idx = self.list.head().expect("block list is never empty");
            let drained = self.list.remove(idx);
            self.cache_free(drained);
            self.front = 0;
        }
        Some(value)
    }

    /// Borrows the front element without removing it.
    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: len > 0, so slot `front` of the head block is occupied.
        Some(unsafe { self.list.head_block().get(self.front) })
    }

    /// Borrows the back element without removing it.
    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        // SAFETY: len > 0, so slot `back - 1` of the tail block is occupied.
        Some(unsafe { self.list.tail_block().get(self.back - 1) })
    }

    /// Mutably borrows the front element without removing it.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            return None;
        }
        let front = self.front;
        // SAFETY: len > 0, so slot `front` of the head block is occupied.
        Some(unsafe { self.list.head_block_mut().get_mut(front) })
    }

    /// Mutably borrows the back element without removing it.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            return None;
        }
        let back = self.back;
        // SAFETY: len > 0, so slot `back - 1` of the tail block is occupied.
        Some(unsafe { self.list.tail_block_mut().get_mut(back - 1) })
    }

    /// Iterates the elements front to back without consuming them.
    ///
    /// The iterator snapshots the block chain at creation and walks its own
    /// copy; it is double-ended, so `rev()` gives back-to-front order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.snapshot(), self.front, self.back, self.len)
    }

    /// Iterates whole blocks front to back, yielding each block's occupied
    /// range as one slice.
    ///
    /// This is the bulk hand-off path: a consumer draining the deque into a
    /// writer touches one slice per block instead of one element at a time.
    /// Yielded slices are never empty. Double-ended, so `rev()` walks the
    /// blocks back to front.
    pub fn blocks(&self) -> Blocks<'_, T> {
        Blocks::new(self.snapshot(), self.front, self.back)
    }

    /// Collects the live block chain front to back for an iterator snapshot.
    fn snapshot(&self) -> VecDeque<&Block<T>> {
        let mut blocks = VecDeque::new();
        if self.len == 0 {
            return blocks;
        }
        let mut cursor = self.list.head();
        while let Some(idx) = cursor {
            blocks.push_back(self.list.block(idx));
            cursor = self.list.next(idx);
        }
        blocks
    }

    /// Recenters the cursors in the sole remaining block so the next push in
    /// either direction has room before a block link becomes necessary.
    fn reset_empty(&mut self) {
        let mid = self.block_len / 2;
        self.front = mid;
        self.back = mid;
    }

    fn take_free_or_alloc(&mut self) -> Block<T> {
        match self.free.take() {
            Some(block) => block,
            None => Block::new(self.block_len),
        }
    }

    /// Keeps `block` for reuse unless a free block is already cached.
    fn cache_free(&mut self, block: Block<T>) {
        if self.free.is_none() {
            self.free = Some(block);
        }
    }
}

impl<T> Default for BlockDeque<T> {
    /// Unbounded deque with the default block length.
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_LEN, UNBOUNDED)
    }
}

impl<T> Drop for BlockDeque<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            while self.pop_front().is_some() {}
        }
    }
}

impl<T: Debug> Debug for BlockDeque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a BlockDeque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
