//! Event broker: the fan-out stage between the change source and the sink.
//!
//! Each downstream dispatcher registers a path with the broker. Scan signals
//! arrive over a channel; the broker scans the source for the signalled
//! path, buffers the events in that path's bounded deque, and drains the
//! deque into the sink block by block.

mod dispatcher;
mod event_broker;
mod source;

pub use dispatcher::*;
pub use event_broker::*;
pub use source::*;
