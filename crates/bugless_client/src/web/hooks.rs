use bugless_common::{GetIssuesRequest, Issue, IssuesChunk, QueryFilter, RpcStatus};
use leptos::prelude::*;

use crate::controller::QueryStreamController;
use crate::traits::{RpcStub, Runtime};

/// Reactive view of one issue query.
#[derive(Clone, Copy)]
pub struct IssueQueryState {
    /// Last status reported by the server.
    pub status: RwSignal<Option<RpcStatus>>,
    /// Issues received so far, in stream order.
    pub issues: RwSignal<Vec<Issue>>,
    /// Problems the server found in the search string.
    pub query_errors: RwSignal<Vec<String>>,
    /// Set when the query was rejected or the call failed.
    pub error: RwSignal<Option<String>>,
    /// True once the stream has ended, successfully or not.
    pub done: RwSignal<bool>,
}

/// Runs `filter` through `controller` and exposes the results as signals.
///
/// The stream is closed when the owning reactive scope is cleaned up.
///
/// # Example
///
/// ```rust,ignore
/// let query = use_issue_query(&controller, QueryFilter::by_search("author:q3k@q3k.org"));
/// view! {
///     <ul>
///         {move || query.issues.get().into_iter().map(|issue| view! { <li>{issue.current.title}</li> }).collect_view()}
///     </ul>
/// }
/// ```
pub fn use_issue_query<S, R>(controller: &QueryStreamController<S, R>, filter: QueryFilter) -> IssueQueryState
where
    S: RpcStub<Request = GetIssuesRequest, Response = IssuesChunk>,
    R: Runtime,
{
    let state = IssueQueryState {
        status: RwSignal::new(None),
        issues: RwSignal::new(Vec::new()),
        query_errors: RwSignal::new(Vec::new()),
        error: RwSignal::new(None),
        done: RwSignal::new(false),
    };

    let handle = match controller.query(filter) {
        Ok(handle) => handle,
        Err(error) => {
            log::warn!("[use_issue_query] query rejected: {}", error);
            state.error.set(Some(error.to_string()));
            state.done.set(true);
            return state;
        }
    };

    handle
        .on_status(move |status| state.status.set(Some(status.clone())))
        .on_data(move |chunk: &IssuesChunk| {
            state.issues.update(|issues| issues.extend(chunk.issues.iter().cloned()));
            if !chunk.query_errors.is_empty() {
                state
                    .query_errors
                    .update(|errors| errors.extend(chunk.query_errors.iter().cloned()));
            }
        })
        .on_end(move || state.done.set(true))
        .on_error(move |error| {
            state.error.set(Some(error.to_string()));
            state.done.set(true);
        });

    // StreamHandle is !Send, so it lives in local storage.
    let stored = StoredValue::new_local(handle);
    on_cleanup(move || {
        stored.try_with_value(|handle| handle.close());
    });

    state
}
