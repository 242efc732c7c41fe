//! Types shared by the Bugless front-end and the services it talks to.
//!
//! This crate owns everything that crosses the wire: the issue model, the
//! `GetIssues` request and its [`QueryFilter`] builder, RPC status codes,
//! the stream frames and the length-prefixed bincode codec that carries
//! them. It also contains the search query language used by `by_search`
//! filters.

pub mod codec;
pub mod error;
pub mod issue;
pub mod messages;
pub mod search;

pub use error::{CodecError, FilterError};
pub use issue::{Issue, IssueState, IssueStatus, IssueType};
pub use messages::*;
pub use search::SearchQuery;
