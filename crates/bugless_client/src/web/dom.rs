use log::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, HtmlElement, HtmlTextAreaElement};

use crate::note::{Container, Note, NoteAction, NoteDispatcher, NoteTemplate, Renderer};

/// The elements of one rendered note.
#[derive(Clone, Debug)]
pub struct NoteNode {
    pub root: HtmlElement,
    view: HtmlElement,
    title: HtmlElement,
    content: HtmlElement,
    editor: HtmlTextAreaElement,
    save: HtmlElement,
}

/// Renders notes into real DOM elements.
///
/// Markup per note:
///
/// ```html
/// <div class="note">
///   <div class="note-view"><h3 class="note-title"></h3><p class="note-content"></p></div>
///   <textarea class="note-editor" hidden></textarea>
///   <button class="note-save" hidden>Save</button>
/// </div>
/// ```
#[derive(Clone, Debug)]
pub struct DomRenderer {
    document: Document,
}

impl DomRenderer {
    /// Renderer for the current window's document, if there is one.
    pub fn new() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self { document })
    }

    pub fn from_document(document: Document) -> Self {
        Self { document }
    }

    fn element<T: JsCast>(&self, tag: &str, class: &str) -> Result<T, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        element.dyn_into::<T>().map_err(JsValue::from)
    }
}

fn listen<E: JsCast + 'static>(
    target: &HtmlElement,
    event: &str,
    mut handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the element.
    closure.forget();
    Ok(())
}

impl Renderer for DomRenderer {
    type Node = NoteNode;
    type Error = JsValue;

    fn render_element(&self, template: &NoteTemplate, note: &Note) -> Result<NoteNode, JsValue> {
        let root: HtmlElement = self.element("div", &template.root_class)?;
        let view: HtmlElement = self.element("div", &template.view_class)?;
        let title: HtmlElement = self.element("h3", &template.title_class)?;
        let content: HtmlElement = self.element("p", &template.content_class)?;
        let editor: HtmlTextAreaElement = self.element("textarea", &template.editor_class)?;
        let save: HtmlElement = self.element("button", &template.save_class)?;
        save.set_text_content(Some("Save"));

        view.append_child(&title)?;
        view.append_child(&content)?;
        root.append_child(&view)?;
        root.append_child(&editor)?;
        root.append_child(&save)?;

        let node = NoteNode {
            root,
            view,
            title,
            content,
            editor,
            save,
        };
        self.show_view(&node, note);
        Ok(node)
    }

    fn show_view(&self, node: &NoteNode, note: &Note) {
        node.title.set_text_content(Some(&note.title));
        node.content.set_text_content(Some(&note.content));
        node.view.set_hidden(false);
        node.editor.set_hidden(true);
        node.save.set_hidden(true);
    }

    fn show_editor(&self, node: &NoteNode, buffer: &str) {
        node.editor.set_value(buffer);
        node.view.set_hidden(true);
        node.editor.set_hidden(false);
        node.save.set_hidden(false);
        if let Err(error) = node.editor.focus() {
            warn!("[DomRenderer] could not focus editor: {:?}", error);
        }
    }

    fn bind(&self, node: &NoteNode, dispatcher: NoteDispatcher) -> Result<(), JsValue> {
        let open = dispatcher.clone();
        listen(&node.view, "click", move |_: Event| open.dispatch(NoteAction::OpenEditor))?;

        let edit = dispatcher.clone();
        let editor = node.editor.clone();
        listen(&node.editor, "input", move |_: Event| {
            edit.dispatch(NoteAction::Edit(editor.value()))
        })?;

        listen(&node.save, "click", move |_: Event| dispatcher.dispatch(NoteAction::Save))
    }
}

/// A DOM element that note roots are appended to.
#[derive(Clone, Debug)]
pub struct DomContainer(pub Element);

impl Container for DomContainer {
    type Node = NoteNode;

    fn append_child(&mut self, node: NoteNode) {
        if let Err(error) = self.0.append_child(&node.root) {
            warn!("[DomContainer] could not append note: {:?}", error);
        }
    }
}
