//! Topic routing for events leaving the pipeline.
//!
//! A routing rule is either a hard-coded topic name or a template such as
//! `cdc_{schema}_{table}`. Templates are validated once at configuration
//! time; substitution sanitizes schema and table names so the result is
//! always a legal broker topic.

use std::fmt;

use crate::constants::SCHEMA_PLACEHOLDER;
use crate::constants::TABLE_PLACEHOLDER;
use crate::constants::TOPIC_MAX_LEN;
use crate::Result;
use crate::SinkError;

fn is_legal_topic_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

/// Replaces every character a broker would reject with `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if is_legal_topic_char(c) { c } else { '_' })
        .collect()
}

/// A rule made only of legal literal characters names a topic directly
/// instead of describing a template.
fn is_hard_code(rule: &str) -> bool {
    !rule.is_empty() && rule.chars().all(is_legal_topic_char)
}

/// A validated topic template: literal segments around a `{schema}`
/// placeholder and an optional later `{table}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicExpression(String);

impl TopicExpression {
    /// Validates `rule` as a topic template.
    ///
    /// # Errors
    /// Returns [`SinkError::InvalidTopicExpression`] when `{schema}` is
    /// missing, `{table}` appears before `{schema}`, or a literal segment
    /// contains characters a broker topic cannot carry.
    pub fn parse(rule: &str) -> Result<Self> {
        let schema_at = match rule.find(SCHEMA_PLACEHOLDER) {
            Some(at) => at,
            None => {
                return Err(SinkError::InvalidTopicExpression(format!(
                    "expression {:?} must contain {}",
                    rule, SCHEMA_PLACEHOLDER
                ))
                .into())
            }
        };

        let prefix = &rule[..schema_at];
        let rest = &rule[schema_at + SCHEMA_PLACEHOLDER.len()..];
        let (middle, suffix) = match rest.find(TABLE_PLACEHOLDER) {
            Some(table_at) => (&rest[..table_at], &rest[table_at + TABLE_PLACEHOLDER.len()..]),
            None => ("", rest),
        };

        // A second placeholder occurrence leaves a `{` or `}` in one of the
        // literal segments and fails here.
        for segment in [prefix, middle, suffix] {
            if !segment.chars().all(is_legal_topic_char) {
                return Err(SinkError::InvalidTopicExpression(format!(
                    "expression {:?} contains illegal characters in segment {:?}",
                    rule, segment
                ))
                .into());
            }
        }

        Ok(Self(rule.to_string()))
    }

    /// Expands the template for one event's schema and table, capped at the
    /// broker's topic-name length limit.
    pub fn substitute(&self, schema: &str, table: &str) -> String {
        let mut topic = self
            .0
            .replace(SCHEMA_PLACEHOLDER, &sanitize(schema))
            .replace(TABLE_PLACEHOLDER, &sanitize(table));
        // Sanitized output is pure ASCII, so byte truncation is char-safe.
        topic.truncate(TOPIC_MAX_LEN);
        topic
    }
}

impl fmt::Display for TopicExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chooses the destination topic for each event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicGenerator {
    /// Every event goes to one fixed topic.
    Static(String),
    /// Topic derived from the event's schema and table.
    Dynamic(TopicExpression),
}

impl TopicGenerator {
    /// Builds a generator from a routing rule.
    ///
    /// An empty or hard-coded rule pins every event to `default_topic`;
    /// anything else must parse as a valid [`TopicExpression`].
    pub fn from_rule(rule: &str, default_topic: &str) -> Result<Self> {
        if rule.is_empty() || is_hard_code(rule) {
            return Ok(TopicGenerator::Static(default_topic.to_string()));
        }
        Ok(TopicGenerator::Dynamic(TopicExpression::parse(rule)?))
    }

    /// Topic for an event of the given schema and table.
    pub fn substitute(&self, schema: &str, table: &str) -> String {
        match self {
            TopicGenerator::Static(topic) => topic.clone(),
            TopicGenerator::Dynamic(expression) => expression.substitute(schema, table),
        }
    }
}

impl fmt::Display for TopicGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicGenerator::Static(topic) => f.write_str(topic),
            TopicGenerator::Dynamic(expression) => expression.fmt(f),
        }
    }
}
