use thiserror::Error;

/// Reasons an inbound envelope could not be used.
///
/// None of these are fatal to a session: the viewer logs them and drops the
/// envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The frame is not a JSON object with the required `type` and `content` fields.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
    /// A data envelope arrived without a `timestamp`.
    #[error("data envelope has no timestamp")]
    MissingTimestamp,
    /// The timestamp could not be converted into a point in time.
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
}
