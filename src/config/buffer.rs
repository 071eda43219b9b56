use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Geometry of the per-dispatcher event buffers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BufferConfig {
    /// Slots per block in every buffer deque.
    #[serde(default = "default_block_len")]
    pub block_len: usize,

    /// Bound on buffered events per dispatcher; pushes past it evict the
    /// oldest buffered event. 0 disables the bound.
    #[serde(default = "default_max_buffered_events")]
    pub max_buffered_events: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            block_len: default_block_len(),
            max_buffered_events: default_max_buffered_events(),
        }
    }
}

impl BufferConfig {
    /// Validates buffer geometry; mirrors the deque constructor guard so a
    /// bad value surfaces at load time instead of as a panic later.
    pub fn validate(&self) -> Result<()> {
        if self.block_len < 2 {
            return Err(Error::Config(ConfigError::Message(
                "buffer.block_len must be at least 2".into(),
            )));
        }
        Ok(())
    }
}

fn default_block_len() -> usize {
    32
}

fn default_max_buffered_events() -> usize {
    8192
}
