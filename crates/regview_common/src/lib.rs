pub mod messages;
pub use messages::*;

pub mod readings;
pub use readings::{DataPayload, Reading, FAULT_PREFIX};

pub mod codec;

pub mod error;
pub use error::EnvelopeError;
