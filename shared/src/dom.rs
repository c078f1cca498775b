//! The seam between page behavior and the document it runs against.
//!
//! Components never touch `web-sys` directly. They are written against
//! [`Dom`], which the frontend implements over the real browser document and
//! `sim::SimDom` implements in memory for tests.

use futures::future::LocalBoxFuture;

/// Event handler registered through [`Dom::listen`].
pub type Handler<E> = Box<dyn FnMut(&E)>;

/// Callback invoked for each observed element that enters the viewport.
pub type VisibilityCallback<N> = Box<dyn FnMut(&N) -> Observation>;

/// What a visibility callback wants to happen to the element it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Keep reporting this element.
    Continue,
    /// Stop observing this element.
    Unobserve,
}

/// Trigger zone for visibility observation.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityOptions {
    /// Fraction of the element that must be visible, `0.0..=1.0`.
    pub threshold: f64,
    /// CSS margin applied to the viewport, e.g. `0px 0px -50px 0px`.
    pub root_margin: String,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: "0px".to_string(),
        }
    }
}

/// Document operations needed by the page components.
///
/// Lookups return `Option`/`Vec` instead of errors: a missing element means
/// the dependent behavior is skipped. Mutators on detached or unsuitable
/// nodes are silent no-ops.
pub trait Dom: Clone + 'static {
    /// Handle to an element.
    type Node: Clone + 'static;
    /// Event delivered to handlers.
    type Event: 'static;

    /// First element in the document matching `selector`.
    fn query_selector(&self, selector: &str) -> Option<Self::Node>;
    /// Every element in the document matching `selector`, in document order.
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Node>;
    /// Descendants of `scope` matching `selector`, in document order.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Vec<Self::Node>;
    /// `node` itself or its nearest ancestor matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;

    /// Attribute value, if present.
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    /// Set an attribute.
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    /// Remove an attribute.
    fn remove_attribute(&self, node: &Self::Node, name: &str);

    /// Whether the class list contains `class`.
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    /// Add `class` to the class list.
    fn add_class(&self, node: &Self::Node, class: &str);
    /// Remove `class` from the class list.
    fn remove_class(&self, node: &Self::Node, class: &str);

    /// Concatenated text of the node and its descendants.
    fn text_content(&self, node: &Self::Node) -> String;
    /// Replace the node's children with a single text node.
    fn set_text_content(&self, node: &Self::Node, text: &str);
    /// Serialized markup of the node's children.
    fn inner_html(&self, node: &Self::Node) -> String;
    /// Replace the node's children with parsed markup.
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    /// Set an inline style property.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    /// Whether the node is still attached to the document.
    fn is_connected(&self, node: &Self::Node) -> bool;

    /// Create a detached element.
    fn create_element(&self, tag: &str) -> Option<Self::Node>;
    /// Append `node` to the document body.
    fn append_to_body(&self, node: &Self::Node);
    /// Detach `node` from the document.
    fn remove(&self, node: &Self::Node);
    /// Set the value of a form control.
    fn set_value(&self, node: &Self::Node, value: &str);
    /// Select the whole content of a text control.
    fn select_text(&self, node: &Self::Node);
    /// Run the legacy copy command on the current selection.
    fn exec_copy(&self) -> bool;

    /// Path component of the current location, e.g. `/docs/lessons.html`.
    fn location_path(&self) -> String;
    /// Smoothly scroll so that `node`'s top edge meets the viewport top.
    fn scroll_into_view(&self, node: &Self::Node);

    /// Register `handler` for `event` on `node` for the page lifetime.
    fn listen(&self, node: &Self::Node, event: &str, handler: Handler<Self::Event>);
    /// Suppress the browser default action of `event`.
    fn prevent_default(&self, event: &Self::Event);

    /// Run `callback` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>);
    /// Drive `task` to completion on the event loop.
    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>);
    /// Write `text` to the system clipboard.
    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, anyhow::Result<()>>;

    /// Whether viewport intersection notifications are available.
    fn supports_visibility(&self) -> bool;
    /// Report each of `targets` to `on_visible` whenever it intersects the
    /// viewport, until the callback asks to unobserve it.
    fn observe_visibility(
        &self,
        targets: &[Self::Node],
        options: &VisibilityOptions,
        on_visible: VisibilityCallback<Self::Node>,
    );
}
