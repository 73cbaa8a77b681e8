use std::time::Duration;

use log::warn;
use regview_common::{DataPayload, TransportTime};

use crate::config::ViewerConfig;
use crate::sinks::{PulseTimer, TableRow, TableSink, TimestampSink};

/// Turns routed envelope content into view updates.
///
/// This is the seam between a [`LiveSession`](crate::LiveSession) and the
/// page: sessions only ever call these two operations.
pub trait Render {
    /// Replaces the table with the readings (or fault) in `content` and
    /// refreshes the timestamp.
    fn render_data_update(&self, content: &str, timestamp: &TransportTime);

    /// Replaces the table with a single spanning row holding `text`.
    fn render_placeholder(&self, text: &str);
}

/// The standard [`Render`] implementation over injected sinks.
pub struct Renderer<B, T, P> {
    table: B,
    timestamp: T,
    timer: P,
    pulse_duration: Duration,
    pulse_class: String,
}

impl<B, T, P> Renderer<B, T, P>
where
    B: TableSink,
    T: TimestampSink,
    P: PulseTimer,
{
    pub fn new(table: B, timestamp: T, timer: P, config: &ViewerConfig) -> Self {
        Self {
            table,
            timestamp,
            timer,
            pulse_duration: config.pulse_duration,
            pulse_class: config.pulse_class.clone(),
        }
    }

    /// Flags the table as freshly updated until the timer removes the marker.
    ///
    /// Overlapping pulses each schedule their own removal.
    fn pulse(&self) {
        self.table.add_marker(&self.pulse_class);

        let table = self.table.clone();
        let class = self.pulse_class.clone();
        self.timer.schedule(
            self.pulse_duration,
            Box::new(move || table.remove_marker(&class)),
        );
    }
}

impl<B, T, P> Render for Renderer<B, T, P>
where
    B: TableSink,
    T: TimestampSink,
    P: PulseTimer,
{
    fn render_data_update(&self, content: &str, timestamp: &TransportTime) {
        self.pulse();

        let rows = match DataPayload::parse(content) {
            DataPayload::Fault(text) => vec![TableRow::Spanning(text)],
            DataPayload::Readings(readings) => readings.into_iter().map(TableRow::from).collect(),
        };
        self.table.replace_rows(rows);

        match timestamp.to_local_string() {
            Ok(local) => self
                .timestamp
                .set_timestamp(&format!("Last updated: {local}")),
            Err(err) => warn!("Keeping previous update time: {}", err),
        }
    }

    fn render_placeholder(&self, text: &str) {
        self.table.replace_rows(vec![TableRow::spanning(text)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{DeferredQueue, MemoryView};

    fn renderer() -> (Renderer<MemoryView, MemoryView, DeferredQueue>, MemoryView, DeferredQueue) {
        let view = MemoryView::new();
        let timer = DeferredQueue::new();
        let renderer = Renderer::new(
            view.clone(),
            view.clone(),
            timer.clone(),
            &ViewerConfig::default(),
        );
        (renderer, view, timer)
    }

    fn at(text: &str) -> TransportTime {
        TransportTime::Text(text.to_string())
    }

    fn reading(address: &str, value: &str) -> TableRow {
        TableRow::Reading {
            address: address.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_two_pairs_two_rows_in_order() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("a1:v1, a2:v2", &at("2024-05-01T12:30:00Z"));

        assert_eq!(view.rows(), vec![reading("a1", "v1"), reading("a2", "v2")]);
    }

    #[test]
    fn test_empty_content_clears_table() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("0:1", &at("2024-05-01T12:30:00Z"));
        renderer.render_data_update("", &at("2024-05-01T12:30:01Z"));

        assert!(view.rows().is_empty());
    }

    #[test]
    fn test_fault_spans_both_columns() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("Error: sensor timeout", &at("2024-05-01T12:30:00Z"));

        assert_eq!(view.rows(), vec![TableRow::spanning("Error: sensor timeout")]);
    }

    #[test]
    fn test_pair_without_colon_has_empty_value() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("40001", &at("2024-05-01T12:30:00Z"));

        assert_eq!(view.rows(), vec![reading("40001", "")]);
    }

    #[test]
    fn test_later_update_replaces_earlier() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("0:1, 1:2, 2:3", &at("2024-05-01T12:30:00Z"));
        renderer.render_data_update("7:70", &at("2024-05-01T12:30:01Z"));

        assert_eq!(view.rows(), vec![reading("7", "70")]);
    }

    #[test]
    fn test_timestamp_is_local_time() {
        let (renderer, view, _) = renderer();
        let time = at("2024-05-01T12:30:00Z");
        renderer.render_data_update("0:1", &time);

        let expected = format!("Last updated: {}", time.to_local_string().unwrap());
        assert_eq!(view.timestamp(), Some(expected));
    }

    #[test]
    fn test_invalid_timestamp_keeps_previous_text() {
        let (renderer, view, _) = renderer();
        renderer.render_data_update("0:1", &at("2024-05-01T12:30:00Z"));
        let before = view.timestamp();

        renderer.render_data_update("0:2", &at("not a time"));

        assert_eq!(view.timestamp(), before);
        assert_eq!(view.rows(), vec![reading("0", "2")]);
    }

    #[test]
    fn test_pulse_is_removed_by_timer() {
        let (renderer, view, timer) = renderer();
        renderer.render_data_update("0:1", &at("2024-05-01T12:30:00Z"));

        assert!(view.has_marker("pulse"));
        assert_eq!(timer.pending(), 1);

        timer.run_all();
        assert!(!view.has_marker("pulse"));
    }

    #[test]
    fn test_overlapping_pulses_both_remove() {
        let (renderer, view, timer) = renderer();
        renderer.render_data_update("0:1", &at("2024-05-01T12:30:00Z"));
        renderer.render_data_update("0:2", &at("2024-05-01T12:30:01Z"));

        assert_eq!(view.pulses(), 2);
        assert_eq!(timer.pending(), 2);
        assert_eq!(timer.run_all(), 2);
        assert!(!view.has_marker("pulse"));
    }

    #[test]
    fn test_pulse_honours_configured_class() {
        let view = MemoryView::new();
        let timer = DeferredQueue::new();
        let config = ViewerConfig::default().with_pulse_class("flash");
        let renderer = Renderer::new(view.clone(), view.clone(), timer, &config);

        renderer.render_data_update("0:1", &at("2024-05-01T12:30:00Z"));
        assert!(view.has_marker("flash"));
        assert!(!view.has_marker("pulse"));
    }

    #[test]
    fn test_placeholder_is_idempotent() {
        let (renderer, view, timer) = renderer();
        renderer.render_data_update("0:1, 1:2", &at("2024-05-01T12:30:00Z"));

        renderer.render_placeholder("Connection closed.");
        renderer.render_placeholder("Connection closed.");

        assert_eq!(view.rows(), vec![TableRow::spanning("Connection closed.")]);
        // Placeholders do not pulse.
        assert_eq!(timer.pending(), 1);
    }
}
