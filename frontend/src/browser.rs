//! [`Dom`] over the live browser document.

use anyhow::{anyhow, bail, Result};
use futures::future::LocalBoxFuture;
use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Promise, Reflect};
use lesson_site_shared::dom::{Dom, Handler, Observation, VisibilityCallback, VisibilityOptions};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlDocument, HtmlElement, HtmlTextAreaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, NodeList, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

/// Handle to the page's window and document.
#[derive(Clone)]
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    /// `None` outside a browser main thread.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
        })
    }

    /// The wrapped document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

// navigator.clipboard is looked up reflectively so a missing API surfaces as
// an error instead of a thrown exception.
fn clipboard_write(window: &Window, text: &str) -> Result<Promise> {
    let navigator = window.navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .map_err(|err| anyhow!("navigator.clipboard lookup failed: {}", describe(&err)))?;
    if clipboard.is_undefined() || clipboard.is_null() {
        bail!("navigator.clipboard is unavailable");
    }
    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(|err| anyhow!("clipboard.writeText lookup failed: {}", describe(&err)))?;
    let Some(write_fn) = write_text.dyn_ref::<Function>() else {
        bail!("clipboard.writeText is not a function");
    };
    let promise = write_fn
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(|err| anyhow!("clipboard.writeText threw: {}", describe(&err)))?;
    promise
        .dyn_into::<Promise>()
        .map_err(|_| anyhow!("clipboard.writeText did not return a promise"))
}

impl Dom for BrowserDom {
    type Node = Element;
    type Event = Event;

    fn query_selector(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Vec<Element> {
        scope
            .query_selector_all(selector)
            .map(elements)
            .unwrap_or_default()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn set_text_content(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.style().set_property(property, value);
        }
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn create_element(&self, tag: &str) -> Option<Element> {
        self.document.create_element(tag).ok()
    }

    fn append_to_body(&self, node: &Element) {
        if let Some(body) = self.document.body() {
            let _ = body.append_child(node);
        }
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn set_value(&self, node: &Element, value: &str) {
        match node.dyn_ref::<HtmlTextAreaElement>() {
            Some(area) => area.set_value(value),
            None => {
                let _ = node.set_attribute("value", value);
            },
        }
    }

    fn select_text(&self, node: &Element) {
        if let Some(area) = node.dyn_ref::<HtmlTextAreaElement>() {
            area.select();
        }
    }

    fn exec_copy(&self) -> bool {
        self.document
            .dyn_ref::<HtmlDocument>()
            .and_then(|doc| doc.exec_command("copy").ok())
            .unwrap_or(false)
    }

    fn location_path(&self) -> String {
        self.window.location().pathname().unwrap_or_default()
    }

    fn scroll_into_view(&self, node: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn listen(&self, node: &Element, event: &str, mut handler: Handler<Event>) {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&event));
        if let Err(err) = node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            tracing::warn!("failed to register {event} listener: {}", describe(&err));
            return;
        }
        // listeners live as long as the page
        closure.forget();
    }

    fn prevent_default(&self, event: &Event) {
        event.prevent_default();
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        Timeout::new(delay_ms, callback).forget();
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, Result<()>> {
        // writeText is called synchronously so it still runs inside the
        // click's user activation.
        let pending = clipboard_write(&self.window, text);
        Box::pin(async move {
            let promise = pending?;
            JsFuture::from(promise)
                .await
                .map(|_| ())
                .map_err(|err| anyhow!("clipboard write rejected: {}", describe(&err)))
        })
    }

    fn supports_visibility(&self) -> bool {
        Reflect::has(&self.window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
    }

    fn observe_visibility(
        &self,
        targets: &[Element],
        options: &VisibilityOptions,
        mut on_visible: VisibilityCallback<Element>,
    ) {
        if targets.is_empty() || !self.supports_visibility() {
            return;
        }

        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    if on_visible(&target) == Observation::Unobserve {
                        observer.unobserve(&target);
                    }
                }
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
            Ok(observer) => {
                for target in targets {
                    observer.observe(target);
                }
                callback.forget();
            },
            Err(err) => {
                tracing::warn!("IntersectionObserver construction failed: {}", describe(&err));
            },
        }
    }
}
