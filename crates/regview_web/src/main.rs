use leptos::prelude::*;
use regview_client::{
    ConnectionBadge, LastUpdated, LiveViewProvider, ReadingsTable, ServerStatus, ViewerConfig,
};

fn main() {
    console_error_panic_hook::set_once();
    _ = console_log::init_with_level(log::Level::Debug);

    leptos::mount::mount_to_body(App);
}

#[component]
fn App() -> impl IntoView {
    view! {
        <main class="container">
            <LiveViewProvider config=ViewerConfig::default()>
                <header>
                    <h1>"Register Viewer"</h1>
                    <ConnectionBadge/>
                </header>
                <ServerStatus/>
                <ReadingsTable/>
                <LastUpdated/>
            </LiveViewProvider>
        </main>
    }
}
