use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::sink::TopicGenerator;
use crate::Error;
use crate::Result;

/// Downstream sink settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SinkConfig {
    /// Changefeed this sink belongs to; used as a metric label.
    #[serde(default = "default_changefeed")]
    pub changefeed: String,

    /// Sink flavor name, e.g. "kafka" or "pulsar"; used as a metric label.
    #[serde(default = "default_sink_type")]
    pub sink_type: String,

    /// Topic routing rule. Empty or a plain topic name routes everything to
    /// `default_topic`; an expression with `{schema}` (and optionally
    /// `{table}`) routes per table.
    #[serde(default = "default_topic_rule")]
    pub topic_rule: String,

    /// Topic used when `topic_rule` names no placeholders.
    #[serde(default = "default_topic")]
    pub default_topic: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            changefeed: default_changefeed(),
            sink_type: default_sink_type(),
            topic_rule: default_topic_rule(),
            default_topic: default_topic(),
        }
    }
}

impl SinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.changefeed.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "sink.changefeed must not be empty".into(),
            )));
        }
        if self.default_topic.is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "sink.default_topic must not be empty".into(),
            )));
        }
        if let Err(e) = TopicGenerator::from_rule(&self.topic_rule, &self.default_topic) {
            return Err(Error::Config(ConfigError::Message(format!(
                "sink.topic_rule is invalid: {e}"
            ))));
        }
        Ok(())
    }

    /// Builds the topic generator this sink routes with.
    pub fn topic_generator(&self) -> Result<TopicGenerator> {
        TopicGenerator::from_rule(&self.topic_rule, &self.default_topic)
    }
}

fn default_changefeed() -> String {
    "default".to_string()
}

fn default_sink_type() -> String {
    "kafka".to_string()
}

fn default_topic_rule() -> String {
    String::new()
}

fn default_topic() -> String {
    "cdc-events".to_string()
}
