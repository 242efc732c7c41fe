use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FilterError;
use crate::issue::Issue;
use crate::search::SearchQuery;

/// Shape of the issues returned by a query.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum IssueView {
    /// Every field of every issue.
    #[default]
    Full,
    /// Only what a result list needs (id, title, status).
    Summary,
}

/// Ordering of query results.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OrderBy {
    Created,
    #[default]
    LastUpdate,
}

/// Value-based pagination: at most `count` results, starting after the
/// result whose ordering value is `after`.
///
/// An empty `after` starts at the beginning. A non-positive `count` lets the
/// server pick its default page size.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct PaginationSelector {
    pub after: String,
    pub count: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ById {
    pub id: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BySearch {
    /// A search in the query language, e.g. `author:q3k@q3k.org status:new`.
    pub search: String,
}

/// Discriminant of a query: which selection strategy is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    ById,
    BySearch,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::ById => f.write_str("by_id"),
            SelectionMode::BySearch => f.write_str("by_search"),
        }
    }
}

/// The selection part of a [`GetIssuesRequest`]. Exactly one mode per request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum IssueQuery {
    ById(ById),
    BySearch(BySearch),
}

impl IssueQuery {
    pub fn mode(&self) -> SelectionMode {
        match self {
            IssueQuery::ById(_) => SelectionMode::ById,
            IssueQuery::BySearch(_) => SelectionMode::BySearch,
        }
    }

    pub fn by_id(&self) -> Option<&ById> {
        match self {
            IssueQuery::ById(by_id) => Some(by_id),
            IssueQuery::BySearch(_) => None,
        }
    }

    pub fn by_search(&self) -> Option<&BySearch> {
        match self {
            IssueQuery::BySearch(by_search) => Some(by_search),
            IssueQuery::ById(_) => None,
        }
    }
}

/// Request payload of the streaming `GetIssues` call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GetIssuesRequest {
    pub query: IssueQuery,
    pub view: IssueView,
    pub order_by: OrderBy,
    pub pagination: Option<PaginationSelector>,
}

/// Caller-facing builder for a [`GetIssuesRequest`].
///
/// Selection modes are set independently, the way generated request
/// messages expose them, so a filter can be malformed. [`QueryFilter::validate`]
/// checks that exactly one mode is set before a request is built.
///
/// ```rust
/// use bugless_common::{IssueView, QueryFilter, SelectionMode};
///
/// let filter = QueryFilter::by_search("author:q3k@q3k.org").with_view(IssueView::Summary);
/// assert_eq!(filter.selection_mode(), Some(SelectionMode::BySearch));
///
/// let request = filter.into_request().unwrap();
/// assert_eq!(request.query.by_search().unwrap().search, "author:q3k@q3k.org");
/// assert!(request.query.by_id().is_none());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
    pub by_id: Option<ById>,
    pub by_search: Option<BySearch>,
    pub view: Option<IssueView>,
    pub order_by: Option<OrderBy>,
    pub pagination: Option<PaginationSelector>,
}

impl QueryFilter {
    /// An empty filter with no selection mode.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_search(search: impl Into<String>) -> Self {
        Self::new().set_by_search(search)
    }

    pub fn by_id(id: i64) -> Self {
        Self::new().set_by_id(id)
    }

    pub fn set_by_search(mut self, search: impl Into<String>) -> Self {
        self.by_search = Some(BySearch {
            search: search.into(),
        });
        self
    }

    pub fn set_by_id(mut self, id: i64) -> Self {
        self.by_id = Some(ById { id });
        self
    }

    pub fn with_view(mut self, view: IssueView) -> Self {
        self.view = Some(view);
        self
    }

    pub fn with_order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn with_pagination(mut self, after: impl Into<String>, count: i64) -> Self {
        self.pagination = Some(PaginationSelector {
            after: after.into(),
            count,
        });
        self
    }

    /// The active selection mode, or `None` if zero or several are set.
    pub fn selection_mode(&self) -> Option<SelectionMode> {
        match (&self.by_id, &self.by_search) {
            (Some(_), None) => Some(SelectionMode::ById),
            (None, Some(_)) => Some(SelectionMode::BySearch),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        match (&self.by_id, &self.by_search) {
            (None, None) => Err(FilterError::NoSelectionMode),
            (Some(_), Some(_)) => Err(FilterError::MultipleSelectionModes),
            (Some(ById { id }), None) if *id <= 0 => Err(FilterError::InvalidId(*id)),
            (None, Some(BySearch { search })) if search.trim().is_empty() => {
                Err(FilterError::EmptySearch)
            }
            _ => Ok(()),
        }
    }

    /// Parses the search string of a `by_search` filter.
    pub fn search_query(&self) -> Option<SearchQuery> {
        self.by_search
            .as_ref()
            .map(|by_search| SearchQuery::parse(&by_search.search))
    }

    /// Validates the filter and builds the request. Unset view and ordering
    /// fall back to their defaults.
    pub fn into_request(self) -> Result<GetIssuesRequest, FilterError> {
        self.validate()?;
        let query = match (self.by_id, self.by_search) {
            (Some(by_id), _) => IssueQuery::ById(by_id),
            (None, Some(by_search)) => IssueQuery::BySearch(by_search),
            (None, None) => return Err(FilterError::NoSelectionMode),
        };
        Ok(GetIssuesRequest {
            query,
            view: self.view.unwrap_or_default(),
            order_by: self.order_by.unwrap_or_default(),
            pagination: self.pagination,
        })
    }
}

/// One chunk of a `GetIssues` response stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct IssuesChunk {
    pub issues: Vec<Issue>,
    /// Problems the server found in the search string, for display next to
    /// the search box. Only ever set on the first chunk.
    pub query_errors: Vec<String>,
}

/// gRPC-style status codes.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StatusCode {
    const ALL: [StatusCode; 17] = [
        StatusCode::Ok,
        StatusCode::Cancelled,
        StatusCode::Unknown,
        StatusCode::InvalidArgument,
        StatusCode::DeadlineExceeded,
        StatusCode::NotFound,
        StatusCode::AlreadyExists,
        StatusCode::PermissionDenied,
        StatusCode::ResourceExhausted,
        StatusCode::FailedPrecondition,
        StatusCode::Aborted,
        StatusCode::OutOfRange,
        StatusCode::Unimplemented,
        StatusCode::Internal,
        StatusCode::Unavailable,
        StatusCode::DataLoss,
        StatusCode::Unauthenticated,
    ];

    /// Maps a numeric code to its variant. Codes outside the known range are `Unknown`.
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
            .unwrap_or(StatusCode::Unknown)
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_ok(&self) -> bool {
        *self == StatusCode::Ok
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// A status reported by the server over the stream.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RpcStatus {
    pub code: StatusCode,
    pub message: String,
}

impl RpcStatus {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::Ok, "")
    }
}

impl fmt::Display for RpcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// A server-to-client frame of a streaming call.
///
/// A well-formed stream is any number of `Status` and `Data` frames followed
/// by exactly one `End` or `Error`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum StreamFrame<T> {
    Status(RpcStatus),
    Data(T),
    End,
    Error(RpcStatus),
}

impl<T> StreamFrame<T> {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::End | StreamFrame::Error(_))
    }
}
