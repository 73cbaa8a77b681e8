//! Ready-to-use components for the live view.
//!
//! These read the signals provided by `LiveViewProvider`; page layout and
//! styling are left to the application.

use leptos::prelude::*;
use leptos_use::core::ConnectionReadyState;

use crate::hooks::{use_live_view, use_ready_state};
use crate::sinks::TableRow;

fn render_row(row: TableRow) -> AnyView {
    match row {
        TableRow::Reading { address, value } => view! {
            <tr>
                <td>{address}</td>
                <td>{value}</td>
            </tr>
        }
        .into_any(),
        TableRow::Spanning(text) => view! {
            <tr>
                <td colspan="2">{text}</td>
            </tr>
        }
        .into_any(),
    }
}

/// Two-column table of the latest readings.
///
/// The table element carries the pulse marker class while fresh data is
/// being highlighted.
#[component]
pub fn ReadingsTable(
    /// Base CSS class of the table (default: `readings`)
    #[prop(optional, into)]
    class: Option<String>,
) -> impl IntoView {
    let sinks = use_live_view();
    let base = class.unwrap_or_else(|| "readings".to_string());

    let table_class = move || match sinks.marker.get() {
        Some(marker) => format!("{base} {marker}"),
        None => base.clone(),
    };

    view! {
        <table class=table_class>
            <thead>
                <tr>
                    <th>"Address"</th>
                    <th>"Value"</th>
                </tr>
            </thead>
            <tbody>
                {move || sinks.rows.get().into_iter().map(render_row).collect_view()}
            </tbody>
        </table>
    }
}

/// Status text sent by the server.
#[component]
pub fn ServerStatus() -> impl IntoView {
    let sinks = use_live_view();
    view! { <div class="server-info">{move || sinks.status.get()}</div> }
}

/// Time of the latest data update.
#[component]
pub fn LastUpdated() -> impl IntoView {
    let sinks = use_live_view();
    view! { <div class="timestamp">{move || sinks.timestamp.get()}</div> }
}

/// Small badge showing whether the connection is up.
#[component]
pub fn ConnectionBadge() -> impl IntoView {
    let ready_state = use_ready_state();

    let label = move || match ready_state.get() {
        ConnectionReadyState::Connecting => "Connecting...",
        ConnectionReadyState::Open => "Live",
        ConnectionReadyState::Closing => "Closing...",
        ConnectionReadyState::Closed => "Offline",
    };

    view! {
        <span
            class="connection-badge"
            class:connected=move || ready_state.get() == ConnectionReadyState::Open
        >
            {label}
        </span>
    }
}
