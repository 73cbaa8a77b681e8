use codee::{Decoder, Encoder};

use crate::{error::EnvelopeError, Envelope};

/// Text codec for regview envelopes.
///
/// Every WebSocket text frame carries exactly one JSON-encoded [`Envelope`].
/// There is no framing or length prefix.
///
/// ## Usage
///
/// ```rust
/// use codee::{Decoder, Encoder};
/// use regview_common::codec::EnvelopeJsonCodec;
/// use regview_common::{Envelope, MessageKind};
///
/// let frame = EnvelopeJsonCodec::encode(&Envelope::server_info("Server: plc-1:502")).unwrap();
/// let envelope = EnvelopeJsonCodec::decode(&frame).unwrap();
/// assert_eq!(envelope.kind, MessageKind::ServerInfo);
/// ```
pub struct EnvelopeJsonCodec;

impl Encoder<Envelope> for EnvelopeJsonCodec {
    type Error = EnvelopeError;
    type Encoded = String;

    fn encode(val: &Envelope) -> Result<Self::Encoded, Self::Error> {
        Ok(serde_json::to_string(val)?)
    }
}

impl Decoder<Envelope> for EnvelopeJsonCodec {
    type Error = EnvelopeError;
    type Encoded = str;

    fn decode(val: &Self::Encoded) -> Result<Envelope, Self::Error> {
        Ok(serde_json::from_str(val)?)
    }
}
