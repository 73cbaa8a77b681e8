/// Prefix the acquisition side puts on the content of a failed read.
pub const FAULT_PREFIX: &str = "Error:";

const PAIR_SEPARATOR: &str = ", ";

/// One register reading decoded from a data envelope.
///
/// Neither field is validated: the address is whatever preceded the first
/// colon and the value is whatever followed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reading {
    pub address: String,
    pub value: String,
}

impl Reading {
    pub fn new(address: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            value: value.into(),
        }
    }

    /// Splits an `address:value` token on its first colon.
    ///
    /// A token without a colon becomes an address with an empty value.
    pub fn from_pair(token: &str) -> Self {
        match token.split_once(':') {
            Some((address, value)) => Self::new(address, value),
            None => Self::new(token, ""),
        }
    }
}

/// The content of a data envelope, decoded at the protocol boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataPayload {
    /// Readings in the order the server listed them.
    Readings(Vec<Reading>),
    /// A fault reported by the acquisition side, kept verbatim.
    Fault(String),
}

impl DataPayload {
    /// Decodes `"<addr>:<val>, <addr>:<val>"` content, or an `"Error: ..."` fault.
    ///
    /// Empty content yields no readings.
    pub fn parse(content: &str) -> Self {
        if content.starts_with(FAULT_PREFIX) {
            return DataPayload::Fault(content.to_string());
        }
        if content.is_empty() {
            return DataPayload::Readings(Vec::new());
        }
        DataPayload::Readings(content.split(PAIR_SEPARATOR).map(Reading::from_pair).collect())
    }
}
