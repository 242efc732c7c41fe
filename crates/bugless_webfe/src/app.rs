use std::rc::Rc;

use bugless_client::note::{make_notes, NoteWidget};
use bugless_client::web::{use_issue_query, BrowserRuntime, DomContainer, DomRenderer, WebSocketStub};
use bugless_client::{ClientConfig, QueryStreamController};
use bugless_common::{Issue, QueryFilter};
use leptos::html::Div;
use leptos::prelude::*;
use wasm_bindgen::JsValue;

/// Query shown on the landing page.
const LANDING_QUERY: &str = "author:q3k@q3k.org";

/// Resolves a configured endpoint against the page location, so `rpc` on
/// `https://bugless.example/` becomes `wss://bugless.example/rpc`.
fn rpc_url(endpoint: &str) -> String {
    if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
        return endpoint.to_string();
    }
    let location = window().location();
    let secure = location.protocol().map(|p| p == "https:").unwrap_or(false);
    let host = location.host().unwrap_or_default();
    format!(
        "{}://{}/{}",
        if secure { "wss" } else { "ws" },
        host,
        endpoint.trim_start_matches('/')
    )
}

/// Renders the issues that have no widget yet. Issues only ever get appended,
/// so everything past `widgets.len()` is new.
fn render_new_issues(
    issues: &[Issue],
    widgets: &mut Vec<NoteWidget<DomRenderer>>,
    container: &mut DomContainer,
    renderer: Rc<DomRenderer>,
) -> Result<(), JsValue> {
    let new = make_notes(issues.iter().skip(widgets.len()), container, renderer)?;
    widgets.extend(new);
    Ok(())
}

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::default();
    let url = rpc_url(&config.rpc_endpoint);
    log::info!("Bugless front-end, RPC at {}", url);

    let controller = QueryStreamController::with_config(WebSocketStub::new(url), BrowserRuntime, config);
    let query = use_issue_query(&controller, QueryFilter::by_search(LANDING_QUERY));

    // Issues are rendered as note widgets into this element as they arrive
    let notes_ref = NodeRef::<Div>::new();
    let widgets = StoredValue::new_local(Vec::<NoteWidget<DomRenderer>>::new());
    let renderer = StoredValue::new_local(DomRenderer::new().map(Rc::new));

    Effect::new(move |_| {
        // Subscribe before the early returns so the effect reruns on every chunk
        query.issues.track();
        let Some(div) = notes_ref.get() else {
            return;
        };
        let Some(renderer) = renderer.get_value() else {
            log::error!("no document to render notes into");
            return;
        };

        let mut container = DomContainer(div.into());
        widgets.update_value(|widgets| {
            let result = query
                .issues
                .with(|issues| render_new_issues(issues, widgets, &mut container, renderer));
            if let Err(error) = result {
                log::error!("could not render notes: {:?}", error);
            }
        });
    });

    let status = move || match query.status.get() {
        Some(status) => status.to_string(),
        None => "waiting for server".to_string(),
    };

    view! {
        <div class="app-container">
            <h1>"Bugless"</h1>
            <p class="subtitle">"Issues matching " <code>{LANDING_QUERY}</code></p>
            <p class="status">
                "Status: " {status}
                {move || query.done.get().then(|| " (done)")}
            </p>
            {move || query.error.get().map(|error| view! { <p class="error">{error}</p> })}
            <ul class="query-errors">
                {move || {
                    query
                        .query_errors
                        .get()
                        .into_iter()
                        .map(|error| view! { <li>{error}</li> })
                        .collect_view()
                }}
            </ul>
            <div class="notes" node_ref=notes_ref></div>
        </div>
    }
}
