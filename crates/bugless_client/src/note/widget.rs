use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bugless_common::Issue;
use log::{trace, warn};

use super::render::{Container, NoteTemplate, Renderer};

/// A title/content pair shown by a [`NoteWidget`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub content: String,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

impl From<&Issue> for Note {
    fn from(issue: &Issue) -> Self {
        Self {
            title: format!("#{} {}", issue.id, issue.current.title),
            content: issue.summary(),
        }
    }
}

impl From<Issue> for Note {
    fn from(issue: Issue) -> Self {
        Note::from(&issue)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteMode {
    Viewing,
    Editing,
}

/// User interaction with a rendered note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoteAction {
    OpenEditor,
    Edit(String),
    Save,
}

/// Routes [`NoteAction`]s from the rendered subtree back to its widget.
///
/// Only holds a weak reference: once every [`NoteWidget`] clone is dropped,
/// dispatching does nothing.
#[derive(Clone)]
pub struct NoteDispatcher {
    dispatch: Rc<dyn Fn(NoteAction)>,
}

impl NoteDispatcher {
    pub fn new(dispatch: impl Fn(NoteAction) + 'static) -> Self {
        Self {
            dispatch: Rc::new(dispatch),
        }
    }

    pub fn dispatch(&self, action: NoteAction) {
        (self.dispatch)(action)
    }
}

impl fmt::Debug for NoteDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoteDispatcher")
    }
}

struct NoteState {
    note: Note,
    /// `Some` while editing.
    buffer: Option<String>,
}

struct WidgetInner<R: Renderer> {
    state: RefCell<NoteState>,
    renderer: Rc<R>,
    template: Rc<NoteTemplate>,
    node: RefCell<Option<R::Node>>,
}

/// One note with a view/edit state machine and the subtree it renders.
///
/// Starts in [`NoteMode::Viewing`]. `open_editor` copies the content into an
/// edit buffer and shows the editor; `save` writes the buffer back and shows
/// the view again. There is no way to leave the editor without saving.
pub struct NoteWidget<R: Renderer> {
    inner: Rc<WidgetInner<R>>,
}

impl<R: Renderer> Clone for NoteWidget<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Renderer + 'static> NoteWidget<R> {
    pub fn new(note: impl Into<Note>, renderer: Rc<R>) -> Self {
        Self::with_template(note, renderer, Rc::new(NoteTemplate::default()))
    }

    pub fn with_template(note: impl Into<Note>, renderer: Rc<R>, template: Rc<NoteTemplate>) -> Self {
        Self {
            inner: Rc::new(WidgetInner {
                state: RefCell::new(NoteState {
                    note: note.into(),
                    buffer: None,
                }),
                renderer,
                template,
                node: RefCell::new(None),
            }),
        }
    }

    pub fn note(&self) -> Note {
        self.inner.state.borrow().note.clone()
    }

    pub fn title(&self) -> String {
        self.inner.state.borrow().note.title.clone()
    }

    pub fn content(&self) -> String {
        self.inner.state.borrow().note.content.clone()
    }

    pub fn mode(&self) -> NoteMode {
        match self.inner.state.borrow().buffer {
            Some(_) => NoteMode::Editing,
            None => NoteMode::Viewing,
        }
    }

    /// The edit buffer, while editing.
    pub fn buffer(&self) -> Option<String> {
        self.inner.state.borrow().buffer.clone()
    }

    /// The root node, once rendered.
    pub fn node(&self) -> Option<R::Node> {
        self.inner.node.borrow().clone()
    }

    /// Switches to the editor with the buffer set to the current content.
    /// Does nothing while already editing, so the buffer is kept.
    pub fn open_editor(&self) {
        let buffer = {
            let mut state = self.inner.state.borrow_mut();
            if state.buffer.is_some() {
                trace!("[NoteWidget] '{}' already editing", state.note.title);
                return;
            }
            let buffer = state.note.content.clone();
            state.buffer = Some(buffer.clone());
            buffer
        };

        if let Some(node) = self.node() {
            self.inner.renderer.show_editor(&node, &buffer);
        }
    }

    /// Replaces the edit buffer. The editor already shows what the user
    /// typed, so nothing is re-rendered. Ignored while viewing.
    pub fn edit(&self, value: impl Into<String>) {
        let mut state = self.inner.state.borrow_mut();
        match state.buffer.as_mut() {
            Some(buffer) => *buffer = value.into(),
            None => trace!("[NoteWidget] '{}' not editing, edit ignored", state.note.title),
        }
    }

    /// Writes the buffer into the content and switches back to the view.
    /// Ignored while viewing.
    pub fn save(&self) {
        let note = {
            let mut state = self.inner.state.borrow_mut();
            match state.buffer.take() {
                Some(buffer) => state.note.content = buffer,
                None => {
                    trace!("[NoteWidget] '{}' not editing, save ignored", state.note.title);
                    return;
                }
            }
            state.note.clone()
        };

        if let Some(node) = self.node() {
            self.inner.renderer.show_view(&node, &note);
        }
    }

    pub fn apply(&self, action: NoteAction) {
        match action {
            NoteAction::OpenEditor => self.open_editor(),
            NoteAction::Edit(value) => self.edit(value),
            NoteAction::Save => self.save(),
        }
    }

    /// A dispatcher that applies actions to this widget while it is alive.
    pub fn dispatcher(&self) -> NoteDispatcher {
        let weak: Weak<WidgetInner<R>> = Rc::downgrade(&self.inner);
        NoteDispatcher::new(move |action| match weak.upgrade() {
            Some(inner) => NoteWidget { inner }.apply(action),
            None => trace!("[NoteDispatcher] widget dropped, {:?} ignored", action),
        })
    }

    /// Renders the note, binds its interaction and appends the root node to
    /// `container`.
    ///
    /// Meant to be called once; a second call attaches a second subtree and
    /// only the newest one is kept in sync.
    pub fn render<C>(&self, container: &mut C) -> Result<(), R::Error>
    where
        C: Container<Node = R::Node> + ?Sized,
    {
        if self.inner.node.borrow().is_some() {
            warn!("[NoteWidget] '{}' rendered more than once", self.title());
        }

        let (note, buffer) = {
            let state = self.inner.state.borrow();
            (state.note.clone(), state.buffer.clone())
        };
        let renderer = &self.inner.renderer;
        let node = renderer.render_element(&self.inner.template, &note)?;
        renderer.bind(&node, self.dispatcher())?;
        if let Some(buffer) = buffer {
            renderer.show_editor(&node, &buffer);
        }

        *self.inner.node.borrow_mut() = Some(node.clone());
        container.append_child(node);
        Ok(())
    }
}

/// Builds, renders and appends one widget per item, returning the widgets in
/// input order.
///
/// ```rust
/// use std::rc::Rc;
/// use bugless_client::note::{make_notes, Note, NoteDispatcher, NoteTemplate, Renderer};
///
/// struct Text;
///
/// impl Renderer for Text {
///     type Node = String;
///     type Error = std::convert::Infallible;
///
///     fn render_element(&self, _: &NoteTemplate, note: &Note) -> Result<String, Self::Error> {
///         Ok(format!("{}: {}", note.title, note.content))
///     }
///     fn show_view(&self, _: &String, _: &Note) {}
///     fn show_editor(&self, _: &String, _: &str) {}
///     fn bind(&self, _: &String, _: NoteDispatcher) -> Result<(), Self::Error> {
///         Ok(())
///     }
/// }
///
/// let mut container = Vec::new();
/// let notes = make_notes([Note::new("foo", "bar")], &mut container, Rc::new(Text)).unwrap();
/// assert_eq!(notes.len(), 1);
/// assert_eq!(container, vec!["foo: bar".to_string()]);
/// ```
pub fn make_notes<I, C, R>(items: I, container: &mut C, renderer: Rc<R>) -> Result<Vec<NoteWidget<R>>, R::Error>
where
    I: IntoIterator,
    I::Item: Into<Note>,
    C: Container<Node = R::Node> + ?Sized,
    R: Renderer + 'static,
{
    let template = Rc::new(NoteTemplate::default());
    let mut widgets = Vec::new();
    for item in items {
        let widget = NoteWidget::with_template(item, renderer.clone(), template.clone());
        widget.render(container)?;
        widgets.push(widget);
    }
    Ok(widgets)
}
