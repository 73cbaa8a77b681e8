//! The view surface a session writes to.
//!
//! A page provides three sinks (status text, timestamp text, and the
//! readings table) plus a timer for deferred work. Keeping them behind traits
//! lets one page host several independent sessions and lets tests run
//! without a DOM.

use std::time::Duration;

use regview_common::Reading;

/// One row of the readings table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableRow {
    /// Address and value cells.
    Reading { address: String, value: String },
    /// A single cell spanning both columns, used for faults and placeholders.
    Spanning(String),
}

impl TableRow {
    pub fn spanning(text: impl Into<String>) -> Self {
        TableRow::Spanning(text.into())
    }

    /// Every piece of text the row shows.
    pub fn cells(&self) -> Vec<&str> {
        match self {
            TableRow::Reading { address, value } => vec![address.as_str(), value.as_str()],
            TableRow::Spanning(text) => vec![text.as_str()],
        }
    }
}

impl From<Reading> for TableRow {
    fn from(reading: Reading) -> Self {
        TableRow::Reading {
            address: reading.address,
            value: reading.value,
        }
    }
}

/// Receives server status text.
pub trait StatusSink {
    fn set_status(&self, text: &str);
}

/// Receives the human-readable time of the latest data update.
pub trait TimestampSink {
    fn set_timestamp(&self, text: &str);
}

/// The readings table.
///
/// Sinks are cheap handles: cloning one must address the same table, since
/// the pulse removal runs later from a timer callback.
pub trait TableSink: Clone + 'static {
    /// Replaces the whole table body with `rows`.
    fn replace_rows(&self, rows: Vec<TableRow>);

    /// Adds a CSS marker class to the table container.
    fn add_marker(&self, class: &str);

    /// Removes a CSS marker class. Removing an absent class is a no-op.
    fn remove_marker(&self, class: &str);
}

/// Runs a task once after a delay, on the same thread as the session.
pub trait PulseTimer {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + 'static>);
}
