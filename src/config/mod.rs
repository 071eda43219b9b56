//! Configuration management for the changeflow pipeline.
//!
//! Provides hierarchical configuration loading from multiple sources with priority:
//! 1. Default values (hardcoded)
//! 2. Explicit config file
//! 3. File named by `CHANGEFLOW_CONFIG`
//! 4. Local overrides
//! 5. Environment variables (highest priority)
//!

mod broker;
mod buffer;
mod monitoring;
mod sink;
pub use broker::*;
pub use buffer::*;
pub use monitoring::*;
pub use sink::*;


//---
use std::env;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    /// Per-dispatcher buffer geometry
    #[serde(default)]
    pub buffer: BufferConfig,
    /// Event broker loop tuning
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Downstream sink settings
    #[serde(default)]
    pub sink: SinkConfig,
    /// Metrics and monitoring settings
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl Settings {
    /// Load configuration from multiple sources with priority:
    /// 1. Explicit config file
    /// 2. File named by `CHANGEFLOW_CONFIG`
    /// 3. Local overrides
    /// 4. Environment variables
    ///
    /// # Arguments
    /// * `config_path` - Optional path to an explicit configuration file
    ///
    /// # Returns
    /// Merged and validated configuration
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Config::builder();

        // 1. Explicit config file
        if let Some(path) = config_path {
            config = config.add_source(File::with_name(path).required(true));
        }

        // 2. Environment-named config file
        if let Ok(path) = env::var("CHANGEFLOW_CONFIG") {
            config = config.add_source(File::with_name(&path));
        }

        // 3. Local overrides
        config = config.add_source(File::with_name("config/local").required(false));

        // 4. Environment variables (highest priority)
        config = config.add_source(
            Environment::with_prefix("CHANGEFLOW")
                .separator("__")
                .ignore_empty(true)
                .try_parsing(true),
        );

        let settings: Settings = config.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates every section; the first violation wins.
    pub fn validate(&self) -> Result<()> {
        self.buffer.validate()?;
        self.broker.validate()?;
        self.sink.validate()?;
        self.monitoring.validate()?;
        Ok(())
    }
}
