mod json;

pub use json::EnvelopeJsonCodec;
