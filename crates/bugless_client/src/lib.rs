//! # Bugless Client
//!
//! Browser-side building blocks of the Bugless front-end.
//!
//! - [`QueryStreamController`] turns a [`QueryFilter`](bugless_common::QueryFilter)
//!   into one streaming `GetIssues` call and routes its events to the
//!   handlers registered on the returned [`StreamHandle`].
//! - [`note`] holds the inline-editable note widget and [`make_notes`], its
//!   collection factory.
//!
//! Both talk to the outside world only through traits: [`RpcStub`] and
//! [`Runtime`] for the controller, [`Renderer`](note::Renderer) and
//! [`Container`](note::Container) for notes. The in-memory implementations in
//! [`transport`] make both usable in native tests; the `web` module (wasm32
//! only) provides the browser ones.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bugless_client::web::{BrowserRuntime, WebSocketStub};
//! use bugless_client::QueryStreamController;
//! use bugless_common::QueryFilter;
//!
//! let controller = QueryStreamController::new(WebSocketStub::new("ws://localhost:8080/rpc"), BrowserRuntime);
//! let handle = controller.query(QueryFilter::by_search("author:q3k@q3k.org"))?;
//! handle
//!     .on_status(|status| log::info!("status: {}", status))
//!     .on_data(|chunk| log::info!("{} issues", chunk.issues.len()))
//!     .on_end(|| log::info!("end"));
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod note;
pub mod stream;
pub mod traits;
pub mod transport;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ClientConfig, ClientConfigBuilder, MAX_PAGE_SIZE};
pub use controller::QueryStreamController;
pub use error::{ConfigError, QueryError, RpcError};
pub use note::{make_notes, Note, NoteAction, NoteMode, NoteWidget};
pub use stream::{HandleState, StreamEvent, StreamHandle};
pub use traits::{RpcStub, Runtime, StreamMessage, TransportStream};
pub use transport::{frame_stream, MemoryStub, StreamSender};
