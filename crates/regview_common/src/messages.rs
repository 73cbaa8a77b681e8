use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/// Wire tag of envelopes carrying server status text.
pub const SERVER_INFO_TAG: &str = "serverInfo";
/// Wire tag of envelopes carrying a register snapshot.
pub const DATA_UPDATE_TAG: &str = "modbusData";

/// Format used when showing a transport timestamp to the user.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The kind of an [`Envelope`], taken from its `type` field.
///
/// Unknown tags are kept as [`MessageKind::Other`] so a newer server can add
/// kinds without older viewers rejecting the whole frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    ServerInfo,
    DataUpdate,
    Other(String),
}

impl MessageKind {
    pub fn as_tag(&self) -> &str {
        match self {
            MessageKind::ServerInfo => SERVER_INFO_TAG,
            MessageKind::DataUpdate => DATA_UPDATE_TAG,
            MessageKind::Other(tag) => tag,
        }
    }
}

impl From<String> for MessageKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            SERVER_INFO_TAG => MessageKind::ServerInfo,
            DATA_UPDATE_TAG => MessageKind::DataUpdate,
            _ => MessageKind::Other(tag),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(tag) => tag,
            known => known.as_tag().to_string(),
        }
    }
}

/// A point in time as it travels on the wire.
///
/// Servers send either epoch milliseconds or an RFC 3339 string. Both are
/// accepted; conversion to a calendar time happens only when displayed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransportTime {
    /// Milliseconds since the Unix epoch.
    Millis(f64),
    /// RFC 3339 date-time text, e.g. `2024-05-01T12:30:00Z`.
    Text(String),
}

impl TransportTime {
    /// Converts the wire value into a UTC timestamp.
    pub fn to_utc(&self) -> Result<DateTime<Utc>, EnvelopeError> {
        match self {
            TransportTime::Millis(millis) => {
                if !millis.is_finite() {
                    return Err(EnvelopeError::InvalidTimestamp(millis.to_string()));
                }
                DateTime::from_timestamp_millis(millis.trunc() as i64)
                    .ok_or_else(|| EnvelopeError::InvalidTimestamp(millis.to_string()))
            }
            TransportTime::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|time| time.with_timezone(&Utc))
                .map_err(|_| EnvelopeError::InvalidTimestamp(text.clone())),
        }
    }

    /// Renders the timestamp in the local time zone using [`DISPLAY_FORMAT`].
    pub fn to_local_string(&self) -> Result<String, EnvelopeError> {
        Ok(self
            .to_utc()?
            .with_timezone(&Local)
            .format(DISPLAY_FORMAT)
            .to_string())
    }
}

impl From<DateTime<Utc>> for TransportTime {
    fn from(time: DateTime<Utc>) -> Self {
        TransportTime::Text(time.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// One push message from the server.
///
/// ```json
/// { "type": "modbusData", "content": "0:12, 1:34", "timestamp": "2024-05-01T12:30:00Z" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TransportTime>,
}

impl Envelope {
    pub fn server_info(content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::ServerInfo,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn data_update(content: impl Into<String>, timestamp: impl Into<TransportTime>) -> Self {
        Self {
            kind: MessageKind::DataUpdate,
            content: content.into(),
            timestamp: Some(timestamp.into()),
        }
    }

    /// The timestamp a data envelope must carry.
    pub fn data_timestamp(&self) -> Result<&TransportTime, EnvelopeError> {
        self.timestamp.as_ref().ok_or(EnvelopeError::MissingTimestamp)
    }
}
