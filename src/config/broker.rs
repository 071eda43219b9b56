use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Tuning knobs for the event broker loop.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrokerConfig {
    /// Upper bound on events pulled from the source per scan call.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,

    /// Capacity of the notification channel feeding the broker loop.
    #[serde(default = "default_notification_channel_capacity")]
    pub notification_channel_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            scan_batch_size: default_scan_batch_size(),
            notification_channel_capacity: default_notification_channel_capacity(),
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.scan_batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "broker.scan_batch_size must be greater than 0".into(),
            )));
        }
        if self.notification_channel_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "broker.notification_channel_capacity must be greater than 0".into(),
            )));
        }
        Ok(())
    }
}

fn default_scan_batch_size() -> usize {
    256
}

fn default_notification_channel_capacity() -> usize {
    1024
}
