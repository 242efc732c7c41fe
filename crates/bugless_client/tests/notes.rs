use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use bugless_client::note::{
    make_notes, Note, NoteAction, NoteDispatcher, NoteMode, NoteTemplate, NoteWidget, Renderer,
};

// What a fake DOM node shows at the moment
#[derive(Debug, Default)]
struct FakeNode {
    class: String,
    title: String,
    content: String,
    editor: Option<String>,
    dispatcher: Option<NoteDispatcher>,
}

type Node = Rc<RefCell<FakeNode>>;

#[derive(Default)]
struct FakeRenderer {
    renders: RefCell<usize>,
}

impl Renderer for FakeRenderer {
    type Node = Node;
    type Error = Infallible;

    fn render_element(&self, template: &NoteTemplate, note: &Note) -> Result<Node, Infallible> {
        *self.renders.borrow_mut() += 1;
        Ok(Rc::new(RefCell::new(FakeNode {
            class: template.root_class.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            ..Default::default()
        })))
    }

    fn show_view(&self, node: &Node, note: &Note) {
        let mut node = node.borrow_mut();
        node.title = note.title.clone();
        node.content = note.content.clone();
        node.editor = None;
    }

    fn show_editor(&self, node: &Node, buffer: &str) {
        node.borrow_mut().editor = Some(buffer.to_string());
    }

    fn bind(&self, node: &Node, dispatcher: NoteDispatcher) -> Result<(), Infallible> {
        node.borrow_mut().dispatcher = Some(dispatcher);
        Ok(())
    }
}

fn single(title: &str, content: &str) -> (NoteWidget<FakeRenderer>, Node) {
    let mut container = Vec::new();
    let mut widgets = make_notes([Note::new(title, content)], &mut container, Rc::new(FakeRenderer::default()))
        .unwrap();
    let widget = widgets.remove(0);
    (widget, container.remove(0))
}

// User interaction goes through the dispatcher the renderer was given
fn click(node: &Node, action: NoteAction) {
    let dispatcher = node.borrow().dispatcher.clone().expect("bound");
    dispatcher.dispatch(action);
}

#[test]
fn test_make_notes_renders_each_note_in_order() {
    let renderer = Rc::new(FakeRenderer::default());
    let mut container: Vec<Node> = Vec::new();
    let items = [
        Note::new("foo", "lorem ipsum dolor sit amet?"),
        Note::new("baz", "lorem ipsum dolor sit amet!"),
    ];

    let widgets = make_notes(items, &mut container, renderer.clone()).unwrap();

    assert_eq!(widgets.len(), 2);
    assert_eq!(widgets[0].title(), "foo");
    assert_eq!(widgets[1].title(), "baz");
    assert!(widgets.iter().all(|w| w.mode() == NoteMode::Viewing));

    assert_eq!(container.len(), 2);
    assert_eq!(*renderer.renders.borrow(), 2);
    let first = container[0].borrow();
    assert_eq!(first.class, "note");
    assert_eq!(first.title, "foo");
    assert_eq!(first.content, "lorem ipsum dolor sit amet?");
    assert_eq!(first.editor, None);
    let second = container[1].borrow();
    assert_eq!(second.title, "baz");
    assert_eq!(second.content, "lorem ipsum dolor sit amet!");
}

#[test]
fn test_open_editor_is_idempotent() {
    let (widget, node) = single("foo", "original");

    widget.open_editor();
    widget.edit("half typed");
    widget.open_editor();

    assert_eq!(widget.mode(), NoteMode::Editing);
    assert_eq!(widget.buffer().as_deref(), Some("half typed"));
    assert_eq!(node.borrow().editor.as_deref(), Some("original"));
}

#[test]
fn test_second_save_is_noop() {
    let (widget, node) = single("foo", "original");

    widget.open_editor();
    widget.edit("changed");
    widget.save();
    widget.save();

    assert_eq!(widget.mode(), NoteMode::Viewing);
    assert_eq!(widget.content(), "changed");
    assert_eq!(node.borrow().content, "changed");
}

#[test]
fn test_edit_round_trip() {
    let (widget, node) = single("foo", "lorem ipsum dolor sit amet?");

    widget.open_editor();
    assert_eq!(node.borrow().editor.as_deref(), Some("lorem ipsum dolor sit amet?"));
    widget.edit("V");
    widget.save();

    assert_eq!(widget.content(), "V");
    assert_eq!(widget.mode(), NoteMode::Viewing);
    assert_eq!(widget.buffer(), None);
    assert_eq!(node.borrow().editor, None);
    assert_eq!(node.borrow().content, "V");
}

#[test]
fn test_edit_and_save_ignored_while_viewing() {
    let (widget, _node) = single("foo", "original");

    widget.edit("nope");
    widget.save();

    assert_eq!(widget.mode(), NoteMode::Viewing);
    assert_eq!(widget.content(), "original");
}

#[test]
fn test_dispatched_actions_drive_widget() {
    let (widget, node) = single("baz", "before");

    click(&node, NoteAction::OpenEditor);
    click(&node, NoteAction::Edit("after".to_string()));
    assert_eq!(widget.mode(), NoteMode::Editing);
    click(&node, NoteAction::Save);

    assert_eq!(widget.content(), "after");
    assert_eq!(node.borrow().content, "after");
}

#[test]
fn test_dispatcher_inert_after_widget_dropped() {
    let (widget, node) = single("foo", "kept");
    drop(widget);

    click(&node, NoteAction::OpenEditor);

    assert_eq!(node.borrow().editor, None);
}

#[test]
fn test_render_twice_attaches_twice() {
    let renderer = Rc::new(FakeRenderer::default());
    let widget = NoteWidget::new(Note::new("foo", "bar"), renderer.clone());
    let mut container: Vec<Node> = Vec::new();

    widget.render(&mut container).unwrap();
    widget.render(&mut container).unwrap();

    assert_eq!(container.len(), 2);
    assert_eq!(*renderer.renders.borrow(), 2);
}
