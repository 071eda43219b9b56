//! Message envelope shared by every hop of the pipeline.

mod message;


pub use message::*;
