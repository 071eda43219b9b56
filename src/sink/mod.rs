//! Downstream delivery concerns: topic routing for outgoing events and the
//! per-changefeed accounting wrapped around sink writes.

mod statistics;
mod topic;
mod writer;

#[cfg(test)]
mod statistics_test;
#[cfg(test)]
mod topic_test;

pub use statistics::*;
pub use topic::*;
pub use writer::*;
