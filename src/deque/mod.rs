//! Block-structured bounded deque, the buffering primitive under every
//! per-dispatcher queue in the pipeline.

mod block_deque;
mod block_list;
mod iter;

#[cfg(test)]
mod block_deque_test;

pub use block_deque::*;
pub use iter::*;
