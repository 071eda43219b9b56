//! Snapshot iterators over a block deque.
//!
//! Both iterator types copy the block chain into a private `VecDeque` of
//! block references at creation and consume that copy, so walking them never
//! disturbs the deque itself. Because they borrow the deque, the borrow
//! checker rules out pushes and pops for as long as a snapshot is alive,
//! which is what makes handing out raw slot references sound.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use super::block_list::Block;

/// Element-wise iterator, front to back; `rev()` for back to front.
pub struct Iter<'a, T> {
    blocks: VecDeque<&'a Block<T>>,
    /// First unread slot of the first snapshot block.
    front: usize,
    /// One past the last unread slot of the last snapshot block.
    back: usize,
    len: usize,
}

impl<'a, T> Iter<'a, T> {
    /// `blocks` must be empty when `len` is 0, and otherwise hold the full
    /// chain with `front`/`back` marking the occupied range of its edges.
    pub(super) fn new(blocks: VecDeque<&'a Block<T>>, front: usize, back: usize, len: usize) -> Self {
        Self {
            blocks,
            front,
            back,
            len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let block = *self.blocks.front()?;
        // SAFETY: len > 0, so slot `front` of the first snapshot block is
        // occupied.
        let value = unsafe { block.get(self.front) };
        self.front += 1;
        self.len -= 1;
        if self.len > 0 && self.front == block.len() {
            self.blocks.pop_front();
            self.front = 0;
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.len == 0 {
            return None;
        }
        let block = *self.blocks.back()?;
        self.back -= 1;
        // SAFETY: len > 0, so slot `back` (after the decrement) of the last
        // snapshot block is occupied.
        let value = unsafe { block.get(self.back) };
        self.len -= 1;
        if self.len > 0 && self.back == 0 {
            self.blocks.pop_back();
            self.back = block.len();
        }
        Some(value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Block-wise iterator yielding each block's occupied range as one slice,
/// front to back; `rev()` for back to front.
///
/// Every remaining snapshot block produces exactly one non-empty slice, so
/// the iterator's length equals the number of blocks left.
pub struct Blocks<'a, T> {
    blocks: VecDeque<&'a Block<T>>,
    /// First unread slot of the first snapshot block.
    front: usize,
    /// One past the last unread slot of the last snapshot block.
    back: usize,
}

impl<'a, T> Blocks<'a, T> {
    /// `blocks` must be empty when the deque is empty, and otherwise hold the
    /// full chain with `front`/`back` marking the occupied range of its edges.
    pub(super) fn new(blocks: VecDeque<&'a Block<T>>, front: usize, back: usize) -> Self {
        Self {
            blocks,
            front,
            back,
        }
    }
}

impl<'a, T> Iterator for Blocks<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<&'a [T]> {
        let block = self.blocks.pop_front()?;
        let end = if self.blocks.is_empty() {
            self.back
        } else {
            block.len()
        };
        // SAFETY: the first snapshot block is occupied from `front`, up to
        // `back` when it is also the last block and to its full length
        // otherwise.
        let slice = unsafe { block.occupied(self.front..end) };
        self.front = 0;
        Some(slice)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.blocks.len(), Some(self.blocks.len()))
    }
}

impl<'a, T> DoubleEndedIterator for Blocks<'a, T> {
    fn next_back(&mut self) -> Option<&'a [T]> {
        let block = self.blocks.pop_back()?;
        let start = if self.blocks.is_empty() { self.front } else { 0 };
        // SAFETY: the last snapshot block is occupied up to `back`, from
        // `front` when it is also the first block and from 0 otherwise.
        let slice = unsafe { block.occupied(start..self.back) };
        self.back = block.len();
        Some(slice)
    }
}

impl<T> ExactSizeIterator for Blocks<'_, T> {
    fn len(&self) -> usize {
        self.blocks.len()
    }
}

impl<T> FusedIterator for Blocks<'_, T> {}
