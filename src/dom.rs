//! The popup's DOM surface and event wiring.

use crate::{
    option::PopupOptions,
    popup::{Popup, Surface, is_save_shortcut},
    storage::{ChromeStorage, LocalStorage, NotesStorage},
    util::task::spawn_local,
    view::{EmptyState, NoteCard, NoteListView, Notification, Tab, TabError},
};
use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use std::{cell::RefCell, rc::Rc};
use tracing::{error, warn};
use wasm_bindgen::{JsCast, JsValue, prelude::wasm_bindgen};
use web_sys::{Document, Element, HtmlTextAreaElement, KeyboardEvent};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

const INPUT_ID: &str = "noteInput";
const CHAR_COUNT_ID: &str = "charCount";
const NOTE_LIST_ID: &str = "noteList";
const SAVE_BUTTON_ID: &str = "saveNote";

const ACTIVE_CLASS: &str = "active";
const NOTE_ID_ATTRIBUTE: &str = "data-note-id";
const TAB_ATTRIBUTE: &str = "data-tab";

thread_local! {
    static EVENT_HANDLERS: RefCell<Vec<EventListener>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MountError {
    #[error("Element not found: #{0}")]
    MissingElement(&'static str),
    #[error("Element #{0} has an unexpected type")]
    WrongElementType(&'static str),
}

impl From<MountError> for JsValue {
    fn from(err: MountError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// [`Surface`] over the popup document.
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
    input: HtmlTextAreaElement,
    char_count: Element,
    note_list: Element,
}

impl DomSurface {
    /// Looks up the popup's elements in `document`.
    pub fn from_document(document: &Document) -> Result<Self, MountError> {
        let input = element_by_id(document, INPUT_ID)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| MountError::WrongElementType(INPUT_ID))?;
        Ok(Self {
            document: document.clone(),
            input,
            char_count: element_by_id(document, CHAR_COUNT_ID)?,
            note_list: element_by_id(document, NOTE_LIST_ID)?,
        })
    }

    fn create(&self, tag: &str, class: &str) -> Result<Element, JsValue> {
        let element = self.document.create_element(tag)?;
        element.set_class_name(class);
        Ok(element)
    }

    fn build_empty_state(&self, empty: &EmptyState) -> Result<Element, JsValue> {
        let container = self.create("div", "empty-state")?;

        let svg = self.document.create_element_ns(Some(SVG_NS), "svg")?;
        svg.set_attribute("fill", "currentColor")?;
        svg.set_attribute("viewBox", "0 0 20 20")?;
        let path = self.document.create_element_ns(Some(SVG_NS), "path")?;
        path.set_attribute("fill-rule", "evenodd")?;
        path.set_attribute("d", empty.icon_path)?;
        path.set_attribute("clip-rule", "evenodd")?;
        svg.append_child(&path)?;

        let text = self.document.create_element("p")?;
        for (i, line) in empty.hint.iter().enumerate() {
            if i > 0 {
                text.append_child(&self.document.create_element("br")?)?;
            }
            text.append_child(&self.document.create_text_node(line))?;
        }

        container.append_child(&svg)?;
        container.append_child(&text)?;
        Ok(container)
    }

    fn build_card(&self, card: &NoteCard) -> Result<Element, JsValue> {
        let container = self.create("div", "note-card")?;
        let header = self.create("div", "note-header")?;

        let date = self.create("span", "note-date")?;
        date.set_text_content(Some(&card.date));

        let delete = self.create("button", "delete-btn")?;
        delete.set_text_content(Some("Delete"));
        delete.set_attribute(NOTE_ID_ATTRIBUTE, &card.id)?;

        header.append_child(&date)?;
        header.append_child(&delete)?;

        let content = self.create("div", "note-content")?;
        content.set_text_content(Some(&card.content));

        container.append_child(&header)?;
        container.append_child(&content)?;
        Ok(container)
    }

    fn build_list(&self, view: &NoteListView) -> Result<(), JsValue> {
        self.note_list.set_text_content(None);
        match view {
            NoteListView::Empty(empty) => {
                self.note_list
                    .append_child(&self.build_empty_state(empty)?)?;
            }
            NoteListView::Cards(cards) => {
                for card in cards {
                    self.note_list.append_child(&self.build_card(card)?)?;
                }
            }
        }
        Ok(())
    }

    fn show_notification(&self, notification: &Notification) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        let element = self.create("div", "error-notification")?;
        element.set_text_content(Some(&notification.message));
        body.append_child(&element)?;

        let fade_for = millis(notification.fade_for);
        Timeout::new(millis(notification.visible_for), move || {
            let _ = element.class_list().add_1("fade-out");
            Timeout::new(fade_for, move || element.remove()).forget();
        })
        .forget();
        Ok(())
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }
}

impl Surface for DomSurface {
    fn input_text(&self) -> String {
        self.input.value()
    }

    fn set_input_text(&self, text: &str) {
        self.input.set_value(text);
    }

    fn set_char_count(&self, count: usize) {
        self.char_count.set_text_content(Some(&count.to_string()));
    }

    fn render_notes(&self, view: &NoteListView) {
        if let Err(e) = self.build_list(view) {
            error!("Failed to render notes: {e:?}");
        }
    }

    fn notify(&self, notification: Notification) {
        if let Err(e) = self.show_notification(&notification) {
            error!("Failed to show notification {:?}: {e:?}", notification.message);
        }
    }

    fn switch_tab(&self, tab: Tab) -> Result<(), TabError> {
        let panel = self
            .document
            .get_element_by_id(tab.as_str())
            .ok_or(TabError::MissingPanel(tab))?;

        for element in self.query_all(".tab").iter().chain(&self.query_all(".tab-content")) {
            let _ = element.class_list().remove_1(ACTIVE_CLASS);
        }
        let selector = format!(".tab[{TAB_ATTRIBUTE}=\"{tab}\"]");
        for button in self.query_all(&selector) {
            let _ = button.class_list().add_1(ACTIVE_CLASS);
        }
        let _ = panel.class_list().add_1(ACTIVE_CLASS);
        Ok(())
    }
}

/// Attaches the popup's event listeners to its document.
///
/// The listeners live as long as the page.
pub fn mount<S: NotesStorage + 'static>(
    popup: &Rc<Popup<S, DomSurface>>,
) -> Result<(), MountError> {
    let surface = popup.surface();
    let save_button = element_by_id(&surface.document, SAVE_BUTTON_ID)?;
    let mut handlers = Vec::new();

    for tab in surface.query_all(".tab") {
        let popup = popup.clone();
        let target = tab.get_attribute(TAB_ATTRIBUTE).unwrap_or_default();
        handlers.push(EventListener::new(&tab, "click", move |_| {
            // Failures are logged by `select_tab`.
            let _ = popup.select_tab(&target);
        }));
    }

    let input_popup = popup.clone();
    handlers.push(EventListener::new(&surface.input, "input", move |_| {
        input_popup.handle_input();
    }));

    let keydown_popup = popup.clone();
    handlers.push(EventListener::new(&surface.input, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if is_save_shortcut(&event.key(), event.ctrl_key(), event.meta_key()) {
            spawn_save(keydown_popup.clone());
        }
    }));

    let save_popup = popup.clone();
    handlers.push(EventListener::new(&save_button, "click", move |_| {
        spawn_save(save_popup.clone());
    }));

    let list_popup = popup.clone();
    handlers.push(EventListener::new(&surface.note_list, "click", move |event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(button)) = target.closest(".delete-btn") else {
            return;
        };
        let Some(id) = button.get_attribute(NOTE_ID_ATTRIBUTE) else {
            warn!("Delete control without a note id");
            return;
        };
        let popup = list_popup.clone();
        spawn_local(async move {
            let _ = popup.delete(&id).await;
        });
    }));

    EVENT_HANDLERS.with(|cell| cell.borrow_mut().extend(handlers));
    Ok(())
}

/// Routes panics and `tracing` events to the browser console. Calling it again is a no-op.
pub fn init_console() {
    console_error_panic_hook::set_once();
    // Fails only when a subscriber is already installed.
    let _ = tracing_wasm::try_set_as_global_default();
}

/// Entry point for `popup.html`: wires the document to storage and loads notes.
///
/// Notes go to `chrome.storage.local` inside the extension and to `window.localStorage` when the
/// page is opened on its own.
#[wasm_bindgen(js_name = runPopup)]
pub fn run_popup() -> Result<(), JsValue> {
    init_console();
    let surface = DomSurface::from_document(&gloo_utils::document())?;
    if ChromeStorage::is_available() {
        start_popup(ChromeStorage::new(), surface)
    } else {
        warn!("chrome.storage.local is unavailable, using localStorage");
        start_popup(LocalStorage::new(), surface)
    }
}

fn start_popup<S: NotesStorage + 'static>(
    storage: S,
    surface: DomSurface,
) -> Result<(), JsValue> {
    let popup = Rc::new(Popup::new(storage, surface, PopupOptions::default()));
    mount(&popup)?;
    spawn_local(async move {
        popup.start().await;
    });
    Ok(())
}

fn spawn_save<S: NotesStorage + 'static>(popup: Rc<Popup<S, DomSurface>>) {
    spawn_local(async move {
        // Rejections and failures are already shown to the user.
        let _ = popup.save().await;
    });
}

fn element_by_id(document: &Document, id: &'static str) -> Result<Element, MountError> {
    document
        .get_element_by_id(id)
        .ok_or(MountError::MissingElement(id))
}

fn millis(duration: std::time::Duration) -> u32 {
    duration.as_millis().try_into().unwrap_or(u32::MAX)
}
