//! Note widgets: a title/content pair with inline editing.
//!
//! The widget owns its state machine and talks to the page only through a
//! [`Renderer`] and a [`Container`], so it runs the same against the DOM and
//! against an in-memory renderer in tests.

mod render;
mod widget;

pub use render::{Container, NoteTemplate, Renderer};
pub use widget::{make_notes, Note, NoteAction, NoteDispatcher, NoteMode, NoteWidget};
