//! Typed payloads and the target-addressed envelope that carries them
//! between nodes.
//!
//! On the wire a payload travels as its kind tag plus an opaque byte run;
//! `Payload::decode` is the single place those bytes are given a type again.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::MessagingError;
use crate::Result;

/// Wire size of a [`ServerId`] payload.
const SERVER_ID_LEN: usize = 16;

/// Discriminant tag carried ahead of each payload on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Invalid = 0,
    Bytes = 1,
    ServerId = 2,
    DmlEvent = 3,
    DdlEvent = 4,
}

impl PayloadKind {
    pub fn tag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for PayloadKind {
    type Error = MessagingError;

    fn try_from(tag: i32) -> std::result::Result<Self, MessagingError> {
        match tag {
            0 => Ok(PayloadKind::Invalid),
            1 => Ok(PayloadKind::Bytes),
            2 => Ok(PayloadKind::ServerId),
            3 => Ok(PayloadKind::DmlEvent),
            4 => Ok(PayloadKind::DdlEvent),
            other => Err(MessagingError::UnknownKind(other)),
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Bytes => "Bytes",
            PayloadKind::ServerId => "ServerId",
            PayloadKind::DmlEvent => "DMLEvent",
            PayloadKind::DdlEvent => "DDLEvent",
            PayloadKind::Invalid => "Unknown",
        };
        f.write_str(name)
    }
}

/// Identity of one node in the cluster, 16 bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerId(Uuid);

impl ServerId {
    /// Generates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The all-zero identity used before a sender is known.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn as_bytes(&self) -> &[u8; SERVER_ID_LEN] {
        self.0.as_bytes()
    }

    /// Rebuilds an identity from its wire form.
    ///
    /// # Errors
    /// Returns [`MessagingError::IncompletePayload`] unless `data` is exactly
    /// 16 bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let bytes: [u8; SERVER_ID_LEN] =
            data.try_into()
                .map_err(|_| MessagingError::IncompletePayload {
                    kind: "ServerId",
                    expected: SERVER_ID_LEN,
                    actual: data.len(),
                })?;
        Ok(Self(Uuid::from_bytes(bytes)))
    }
}

impl Default for ServerId {
    fn default() -> Self {
        Self::nil()
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Row-change event scanned from the source database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DmlEvent {
    pub schema: String,
    pub table: String,
    /// Commit timestamp assigned by the source; events for one dispatcher
    /// arrive in non-decreasing commit order.
    pub commit_ts: u64,
    /// Encoded row images, one entry per changed row.
    pub rows: Vec<Vec<u8>>,
}

impl DmlEvent {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Approximate in-memory size of the row payloads.
    pub fn size_bytes(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Schema-change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdlEvent {
    pub schema: String,
    pub table: String,
    pub commit_ts: u64,
    pub query: String,
}

/// The closed set of payloads the pipeline ships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Bytes(Vec<u8>),
    ServerId(ServerId),
    Dml(DmlEvent),
    Ddl(DdlEvent),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Bytes(_) => PayloadKind::Bytes,
            Payload::ServerId(_) => PayloadKind::ServerId,
            Payload::Dml(_) => PayloadKind::DmlEvent,
            Payload::Ddl(_) => PayloadKind::DdlEvent,
        }
    }

    /// Appends the wire form of the payload to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Payload::Bytes(data) => buf.extend_from_slice(data),
            Payload::ServerId(id) => buf.extend_from_slice(id.as_bytes()),
            Payload::Dml(event) => bincode::serialize_into(&mut *buf, event)?,
            Payload::Ddl(event) => bincode::serialize_into(&mut *buf, event)?,
        }
        Ok(())
    }

    /// Rebuilds a payload of `kind` from its wire form.
    ///
    /// # Errors
    /// Returns [`MessagingError::UnknownKind`] for the `Invalid` tag,
    /// [`MessagingError::IncompletePayload`] for a truncated `ServerId`, and
    /// [`MessagingError::Codec`] when event deserialization fails.
    pub fn decode(kind: PayloadKind, data: &[u8]) -> Result<Payload> {
        match kind {
            PayloadKind::Bytes => Ok(Payload::Bytes(data.to_vec())),
            PayloadKind::ServerId => Ok(Payload::ServerId(ServerId::from_slice(data)?)),
            PayloadKind::DmlEvent => Ok(Payload::Dml(bincode::deserialize(data)?)),
            PayloadKind::DdlEvent => Ok(Payload::Ddl(bincode::deserialize(data)?)),
            PayloadKind::Invalid => {
                Err(MessagingError::UnknownKind(PayloadKind::Invalid.tag()).into())
            }
        }
    }
}

/// A payload addressed to one target server, as buffered per dispatcher.
///
/// `sequence` is stamped by the broker when the message enters a dispatcher
/// buffer and is strictly increasing per path; `epoch` changes when the
/// dispatcher re-registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMessage {
    pub from: ServerId,
    pub to: ServerId,
    pub epoch: u64,
    pub sequence: u64,
    pub payload: Payload,
}

impl TargetMessage {
    pub fn new(from: ServerId, to: ServerId, payload: Payload) -> Self {
        Self {
            from,
            to,
            epoch: 0,
            sequence: 0,
            payload,
        }
    }

    pub fn kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    /// Appends the payload's wire form to `buf`; the kind tag travels in the
    /// transport header, not here.
    pub fn encode_payload(&self, buf: &mut Vec<u8>) -> Result<()> {
        self.payload.encode(buf)
    }
}
