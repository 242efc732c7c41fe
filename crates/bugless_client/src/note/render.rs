use std::fmt::Debug;

use super::widget::{Note, NoteDispatcher};

/// CSS classes of the note markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteTemplate {
    pub root_class: String,
    pub view_class: String,
    pub title_class: String,
    pub content_class: String,
    pub editor_class: String,
    pub save_class: String,
}

impl Default for NoteTemplate {
    fn default() -> Self {
        Self {
            root_class: "note".to_string(),
            view_class: "note-view".to_string(),
            title_class: "note-title".to_string(),
            content_class: "note-content".to_string(),
            editor_class: "note-editor".to_string(),
            save_class: "note-save".to_string(),
        }
    }
}

/// Builds and updates the subtree of one note.
///
/// A rendered node has two presentations: the read-only view (title and
/// content) and the editor (a text area holding the buffer plus a save
/// control). Exactly one is visible at a time.
pub trait Renderer {
    type Node: Clone;
    type Error: Debug;

    /// Creates the subtree for `note`, showing the read-only view.
    fn render_element(&self, template: &NoteTemplate, note: &Note) -> Result<Self::Node, Self::Error>;

    /// Shows the read-only view with the current title and content.
    fn show_view(&self, node: &Self::Node, note: &Note);

    /// Shows the editor filled with `buffer`.
    fn show_editor(&self, node: &Self::Node, buffer: &str);

    /// Wires user interaction on `node` to `dispatcher`.
    fn bind(&self, node: &Self::Node, dispatcher: NoteDispatcher) -> Result<(), Self::Error>;
}

/// Accepts rendered root nodes, keeping insertion order.
pub trait Container {
    type Node;

    fn append_child(&mut self, node: Self::Node);
}

impl<N> Container for Vec<N> {
    type Node = N;

    fn append_child(&mut self, node: N) {
        self.push(node);
    }
}
