// -
// Buffer geometry

/// Slots per block when no explicit block length is configured
pub(crate) const DEFAULT_BLOCK_LEN: usize = 32;

/// Unbounded buffer sentinel for `max_len`
pub(crate) const UNBOUNDED: usize = 0;

// -
// Sink topic naming

/// Kafka caps topic names at 249 characters
pub(crate) const TOPIC_MAX_LEN: usize = 249;

/// Placeholder substituted with the event schema name
pub(crate) const SCHEMA_PLACEHOLDER: &str = "{schema}";

/// Placeholder substituted with the event table name
pub(crate) const TABLE_PLACEHOLDER: &str = "{table}";
