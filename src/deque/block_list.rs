//! Fixed-capacity element blocks chained into a doubly linked list.
//!
//! Nodes live in a `Vec` arena and link to each other by index, so pushing
//! at either end and unlinking a known node are O(1) with no per-node
//! allocation beyond the block itself.

use std::mem::MaybeUninit;
use std::ops::Range;

/// A fixed-length run of element slots.
///
/// Slot occupancy is tracked by the owning deque's cursors, not by the block.
/// The accessors that touch slot contents are `unsafe` for that reason: only
/// the cursor owner knows which slots hold live values.
pub(crate) struct Block<T> {
    slots: Box<[MaybeUninit<T>]>,
}

impl<T> Block<T> {
    pub(crate) fn new(block_len: usize) -> Self {
        let slots = (0..block_len).map(|_| MaybeUninit::uninit()).collect();
        Self { slots }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Writes `value` into `slot`.
    ///
    /// If the slot already holds a live value it is overwritten without being
    /// dropped, so callers must only write into vacant slots.
    pub(crate) fn write(&mut self, slot: usize, value: T) {
        self.slots[slot].write(value);
    }

    /// Moves the value out of `slot`, leaving it vacant.
    ///
    /// # Safety
    /// `slot` must hold a live value, and the caller must not read it again.
    pub(crate) unsafe fn take(&mut self, slot: usize) -> T {
        self.slots[slot].assume_init_read()
    }

    /// # Safety
    /// `slot` must hold a live value.
    pub(crate) unsafe fn get(&self, slot: usize) -> &T {
        self.slots[slot].assume_init_ref()
    }

    /// # Safety
    /// `slot` must hold a live value.
    pub(crate) unsafe fn get_mut(&mut self, slot: usize) -> &mut T {
        self.slots[slot].assume_init_mut()
    }

    /// Returns the slots in `range` as an initialized slice.
    ///
    /// # Safety
    /// Every slot in `range` must hold a live value.
    pub(crate) unsafe fn occupied(&self, range: Range<usize>) -> &[T] {
        let slots = &self.slots[range];
        // SAFETY: MaybeUninit<T> has the same layout as T, and the caller
        // guarantees every slot in the range is initialized.
        &*(slots as *const [MaybeUninit<T>] as *const [T])
    }
}

struct Node<T> {
    block: Block<T>,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly linked list of blocks backed by an index arena.
///
/// Removal swaps the vacated arena slot with the last node and patches the
/// links that pointed at it, so the arena stays dense without shifting.
pub(crate) struct BlockList<T> {
    nodes: Vec<Node<T>>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<T> BlockList<T> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    pub(crate) fn next(&self, idx: usize) -> Option<usize> {
        self.nodes[idx].next
    }

    pub(crate) fn block(&self, idx: usize) -> &Block<T> {
        &self.nodes[idx].block
    }

    /// First block in the chain.
    ///
    /// # Panics
    /// Panics if the list is empty.
    pub(crate) fn head_block(&self) -> &Block<T> {
        let idx = self.head.expect("block list is empty");
        &self.nodes[idx].block
    }

    pub(crate) fn head_block_mut(&mut self) -> &mut Block<T> {
        let idx = self.head.expect("block list is empty");
        &mut self.nodes[idx].block
    }

    /// Last block in the chain.
    ///
    /// # Panics
    /// Panics if the list is empty.
    pub(crate) fn tail_block(&self) -> &Block<T> {
        let idx = self.tail.expect("block list is empty");
        &self.nodes[idx].block
    }

    pub(crate) fn tail_block_mut(&mut self) -> &mut Block<T> {
        let idx = self.tail.expect("block list is empty");
        &mut self.nodes[idx].block
    }

    pub(crate) fn push_head(&mut self, block: Block<T>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            block,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(old) => self.nodes[old].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        idx
    }

    pub(crate) fn push_tail(&mut self, block: Block<T>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            block,
            prev: self.tail,
            next: None,
        });
        match self.tail {
            Some(old) => self.nodes[old].next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
        idx
    }

    /// Unlinks the node at `idx` and returns its block.
    pub(crate) fn remove(&mut self, idx: usize) -> Block<T> {
        self.unlink(idx);
        let node = self.nodes.swap_remove(idx);

        // swap_remove moved the former last node into `idx`; every link that
        // pointed at the old position has to be redirected.
        let moved = self.nodes.len();
        if idx < moved {
            if let Some(prev) = self.nodes[idx].prev {
                self.nodes[prev].next = Some(idx);
            }
            if let Some(next) = self.nodes[idx].next {
                self.nodes[next].prev = Some(idx);
            }
            if self.head == Some(moved) {
                self.head = Some(idx);
            }
            if self.tail == Some(moved) {
                self.tail = Some(idx);
            }
        }

        node.block
    }

    fn unlink(&mut self, idx: usize) {
        let prev = self.nodes[idx].prev;
        let next = self.nodes[idx].next;
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }
}
