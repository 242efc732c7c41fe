use std::cell::Cell;

use bugless_common::{GetIssuesRequest, PaginationSelector, QueryFilter, SelectionMode};
use futures::future::{AbortHandle, Abortable};
use futures::{FutureExt, StreamExt};
use log::{debug, trace};

use crate::config::ClientConfig;
use crate::error::QueryError;
use crate::stream::{StreamEvent, StreamHandle};
use crate::traits::{RpcStub, Runtime, StreamMessage, TransportStream};

/// Turns query filters into streaming `GetIssues` calls.
///
/// Every call gets its own [`StreamHandle`] and its own delivery task on the
/// runtime. The controller keeps no per-call state besides the id counter, so
/// it can be shared freely between views.
///
/// ```rust
/// use bugless_client::{MemoryStub, QueryStreamController};
/// use bugless_common::{GetIssuesRequest, IssuesChunk, QueryFilter};
/// use futures::executor::LocalPool;
///
/// let mut pool = LocalPool::new();
/// let stub = MemoryStub::<GetIssuesRequest, IssuesChunk>::new();
/// let controller = QueryStreamController::new(stub.clone(), pool.spawner());
///
/// let handle = controller.query(QueryFilter::by_search("author:q3k@q3k.org")).unwrap();
/// handle.on_end(|| println!("done"));
///
/// stub.last_sender().unwrap().finish();
/// pool.run_until_stalled();
/// assert!(!handle.is_open());
/// ```
pub struct QueryStreamController<S, R> {
    stub: S,
    runtime: R,
    config: ClientConfig,
    next_id: Cell<u64>,
}

impl<S, R> QueryStreamController<S, R>
where
    S: RpcStub<Request = GetIssuesRequest>,
    R: Runtime,
{
    pub fn new(stub: S, runtime: R) -> Self {
        Self::with_config(stub, runtime, ClientConfig::default())
    }

    pub fn with_config(stub: S, runtime: R, config: ClientConfig) -> Self {
        Self {
            stub,
            runtime,
            config,
            next_id: Cell::new(1),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Opens one stream for `filter` and returns the handle its events go to.
    ///
    /// A malformed filter is rejected before anything reaches the stub.
    pub fn query(&self, filter: QueryFilter) -> Result<StreamHandle<S::Response>, QueryError> {
        let filter = self.apply_defaults(filter);
        if let Some(search) = filter.search_query() {
            debug!("[QueryStreamController] parsed search: {:?}", search);
        }
        let request = filter.into_request()?;

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        debug!(
            "[stream {}] opening {} query ({:?}, {:?})",
            id,
            request.query.mode(),
            request.view,
            request.order_by
        );

        let events = self.stub.open_stream(request);
        let (abort, registration) = AbortHandle::new_pair();
        let handle = StreamHandle::new(id, abort);

        let task = Abortable::new(pump(handle.clone(), events), registration).map(move |result| {
            if result.is_err() {
                trace!("[stream {}] delivery task aborted", id);
            }
        });
        self.runtime.spawn_local(task.boxed_local())?;

        Ok(handle)
    }

    fn apply_defaults(&self, mut filter: QueryFilter) -> QueryFilter {
        filter.view.get_or_insert(self.config.default_view);
        filter.order_by.get_or_insert(self.config.default_order);
        if filter.selection_mode() == Some(SelectionMode::BySearch) && filter.pagination.is_none() {
            filter.pagination = Some(PaginationSelector {
                after: String::new(),
                count: self.config.page_size,
            });
        }
        filter
    }
}

/// Moves events from the transport to the handle until the terminal event or
/// until the handle is closed. Dropping `events` on return releases the
/// transport.
async fn pump<T: 'static>(handle: StreamHandle<T>, mut events: TransportStream<T>) {
    while handle.is_open() {
        let event = match events.next().await {
            Some(Ok(StreamMessage::Status(status))) => StreamEvent::Status(status),
            Some(Ok(StreamMessage::Data(item))) => StreamEvent::Data(item),
            Some(Err(error)) => StreamEvent::Error(error),
            None => StreamEvent::End,
        };
        handle.deliver(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryStub;
    use bugless_common::{IssueView, IssuesChunk, OrderBy};
    use futures::executor::LocalPool;

    #[test]
    fn test_ids_increase_per_query() {
        let pool = LocalPool::new();
        let stub = MemoryStub::<GetIssuesRequest, IssuesChunk>::new();
        let controller = QueryStreamController::new(stub, pool.spawner());

        let first = controller.query(QueryFilter::by_id(1)).unwrap();
        let second = controller.query(QueryFilter::by_id(2)).unwrap();
        assert_eq!(first.id() + 1, second.id());
    }

    #[test]
    fn test_explicit_filter_fields_win_over_config() {
        let pool = LocalPool::new();
        let stub = MemoryStub::<GetIssuesRequest, IssuesChunk>::new();
        let config = ClientConfig::builder()
            .default_view(IssueView::Summary)
            .page_size(10)
            .build();
        let controller = QueryStreamController::with_config(stub.clone(), pool.spawner(), config);

        controller
            .query(
                QueryFilter::by_search("status:new")
                    .with_view(IssueView::Full)
                    .with_order_by(OrderBy::Created)
                    .with_pagination("2024-01-01", 3),
            )
            .unwrap();

        let request = &stub.requests()[0];
        assert_eq!(request.view, IssueView::Full);
        assert_eq!(request.order_by, OrderBy::Created);
        assert_eq!(
            request.pagination,
            Some(PaginationSelector {
                after: "2024-01-01".to_string(),
                count: 3
            })
        );
    }

    #[test]
    fn test_by_id_gets_no_pagination() {
        let pool = LocalPool::new();
        let stub = MemoryStub::<GetIssuesRequest, IssuesChunk>::new();
        let controller = QueryStreamController::new(stub.clone(), pool.spawner());

        controller.query(QueryFilter::by_id(42)).unwrap();
        assert_eq!(stub.requests()[0].pagination, None);
    }
}
