//! In-memory sinks and timer.
//!
//! Used by native viewers and by tests to observe exactly what a session
//! renders.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::sinks::{PulseTimer, StatusSink, TableRow, TableSink, TimestampSink};

/// Everything a [`MemoryView`] has been told to show.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryViewState {
    pub rows: Vec<TableRow>,
    pub status: Option<String>,
    pub timestamp: Option<String>,
    pub markers: Vec<String>,
    /// Every table body rendered, oldest first. Only filled by views built
    /// with [`MemoryView::recording`].
    pub history: Vec<Vec<TableRow>>,
    /// Number of times a marker was added.
    pub pulses: usize,
}

/// Status, timestamp and table sinks backed by shared memory.
///
/// Clones share state, so a clone handed to a renderer can be inspected
/// through the original. Only the latest content is retained unless the view
/// was built with [`recording`](Self::recording).
#[derive(Clone, Debug, Default)]
pub struct MemoryView {
    inner: Rc<RefCell<MemoryViewState>>,
    record_history: bool,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    /// A view that also keeps every table body it is given.
    pub fn recording() -> Self {
        Self {
            inner: Rc::default(),
            record_history: true,
        }
    }

    pub fn snapshot(&self) -> MemoryViewState {
        self.inner.borrow().clone()
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.inner.borrow().rows.clone()
    }

    pub fn status(&self) -> Option<String> {
        self.inner.borrow().status.clone()
    }

    pub fn timestamp(&self) -> Option<String> {
        self.inner.borrow().timestamp.clone()
    }

    pub fn history(&self) -> Vec<Vec<TableRow>> {
        self.inner.borrow().history.clone()
    }

    pub fn pulses(&self) -> usize {
        self.inner.borrow().pulses
    }

    pub fn has_marker(&self, class: &str) -> bool {
        self.inner.borrow().markers.iter().any(|marker| marker == class)
    }

    /// All text currently visible in the view.
    pub fn visible_text(&self) -> String {
        let state = self.inner.borrow();
        let mut parts: Vec<&str> = state.rows.iter().flat_map(TableRow::cells).collect();
        parts.extend(state.status.as_deref());
        parts.extend(state.timestamp.as_deref());
        parts.join("\n")
    }
}

impl StatusSink for MemoryView {
    fn set_status(&self, text: &str) {
        self.inner.borrow_mut().status = Some(text.to_string());
    }
}

impl TimestampSink for MemoryView {
    fn set_timestamp(&self, text: &str) {
        self.inner.borrow_mut().timestamp = Some(text.to_string());
    }
}

impl TableSink for MemoryView {
    fn replace_rows(&self, rows: Vec<TableRow>) {
        let mut state = self.inner.borrow_mut();
        if self.record_history {
            state.history.push(rows.clone());
        }
        state.rows = rows;
    }

    fn add_marker(&self, class: &str) {
        let mut state = self.inner.borrow_mut();
        state.pulses += 1;
        if !state.markers.iter().any(|marker| marker == class) {
            state.markers.push(class.to_string());
        }
    }

    fn remove_marker(&self, class: &str) {
        self.inner.borrow_mut().markers.retain(|marker| marker != class);
    }
}

type DeferredTask = (Instant, Box<dyn FnOnce() + 'static>);

/// A single-threaded queue of delayed tasks.
///
/// Nothing runs on its own: the owner drives the queue with
/// [`run_due`](Self::run_due) or [`run_all`](Self::run_all).
#[derive(Clone, Default)]
pub struct DeferredQueue {
    tasks: Rc<RefCell<Vec<DeferredTask>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.borrow().iter().map(|(deadline, _)| *deadline).min()
    }

    /// Runs every task whose deadline is at or before `now`, returning how many ran.
    pub fn run_due(&self, now: Instant) -> usize {
        let due: Vec<DeferredTask> = {
            let mut tasks = self.tasks.borrow_mut();
            let (due, waiting): (Vec<_>, Vec<_>) =
                tasks.drain(..).partition(|(deadline, _)| *deadline <= now);
            *tasks = waiting;
            due
        };
        let count = due.len();
        // Tasks may schedule more work, so the borrow is released first.
        for (_, task) in due {
            task();
        }
        count
    }

    /// Runs every pending task regardless of its deadline.
    pub fn run_all(&self) -> usize {
        let tasks = std::mem::take(&mut *self.tasks.borrow_mut());
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

impl PulseTimer for DeferredQueue {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce() + 'static>) {
        self.tasks.borrow_mut().push((Instant::now() + delay, task));
    }
}

impl std::fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
