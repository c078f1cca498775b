//! In-memory document implementing [`Dom`].
//!
//! `SimDom` keeps a small element tree plus everything the browser would
//! otherwise own: listeners, a virtual clock for timers, a local task pool
//! for async work, a clipboard with a configurable outcome, and visibility
//! observers that fire only when a test calls [`SimDom::intersect`].
//!
//! Markup passed to `set_inner_html` is stored verbatim, not parsed.
//! Selector support covers compound selectors and descendant chains (see
//! the `selector` submodule); other combinators match nothing.

mod selector;

use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt::Write as _,
    rc::Rc,
};

use anyhow::anyhow;
use futures::{
    executor::{LocalPool, LocalSpawner},
    future::{self, LocalBoxFuture},
    task::LocalSpawnExt,
};

use self::selector::{SelectorList, Tree};
use crate::dom::{Dom, Handler, Observation, VisibilityCallback, VisibilityOptions};

const ROOT: SimNode = SimNode(0);

/// Element handle inside a [`SimDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimNode(usize);

/// Event delivered by [`SimDom::dispatch`].
#[derive(Debug)]
pub struct SimEvent {
    kind: String,
    default_prevented: Cell<bool>,
}

impl SimEvent {
    /// Event type, e.g. `click`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether a handler suppressed the default action.
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }
}

/// How the simulated clipboard answers write requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipboardMode {
    /// Writes succeed.
    #[default]
    Grant,
    /// Writes are rejected as a permission error.
    Deny,
    /// The clipboard API does not exist.
    Unavailable,
}

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    parent: Option<SimNode>,
    children: Vec<SimNode>,
}

struct Listener {
    node: SimNode,
    event: String,
    handler: Rc<RefCell<Handler<SimEvent>>>,
}

struct Timer {
    due_ms: u64,
    seq: u64,
    callback: Box<dyn FnOnce()>,
}

struct Observer {
    targets: Vec<SimNode>,
    options: VisibilityOptions,
    callback: Rc<RefCell<VisibilityCallback<SimNode>>>,
}

struct Document {
    elements: Vec<Element>,
    location_path: String,
    listeners: Vec<Listener>,
    timers: Vec<Timer>,
    next_timer_seq: u64,
    now_ms: u64,
    clipboard_mode: ClipboardMode,
    clipboard: Option<String>,
    clipboard_writes: Vec<String>,
    legacy_copies: Vec<String>,
    selection: Option<SimNode>,
    visibility_supported: bool,
    observers: Vec<Observer>,
    scrolled_to: Vec<SimNode>,
}

impl Document {
    fn new() -> Self {
        Self {
            elements: vec![Element {
                tag: "body".to_string(),
                ..Element::default()
            }],
            location_path: "/".to_string(),
            listeners: Vec::new(),
            timers: Vec::new(),
            next_timer_seq: 0,
            now_ms: 0,
            clipboard_mode: ClipboardMode::default(),
            clipboard: None,
            clipboard_writes: Vec::new(),
            legacy_copies: Vec::new(),
            selection: None,
            visibility_supported: true,
            observers: Vec::new(),
            scrolled_to: Vec::new(),
        }
    }

    fn element(&self, node: SimNode) -> Option<&Element> {
        self.elements.get(node.0)
    }

    fn element_mut(&mut self, node: SimNode) -> Option<&mut Element> {
        self.elements.get_mut(node.0)
    }

    fn create(&mut self, tag: &str) -> SimNode {
        self.elements.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Element::default()
        });
        SimNode(self.elements.len() - 1)
    }

    fn attach(&mut self, parent: SimNode, node: SimNode) {
        if self.element(parent).is_none() || self.element(node).is_none() {
            return;
        }
        // an element cannot become its own ancestor
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == node {
                return;
            }
            ancestor = self.element(current).and_then(|el| el.parent);
        }
        self.detach(node);
        if let Some(el) = self.element_mut(node) {
            el.parent = Some(parent);
        }
        if let Some(el) = self.element_mut(parent) {
            el.children.push(node);
        }
    }

    fn detach(&mut self, node: SimNode) {
        let Some(parent) = self.element_mut(node).and_then(|el| el.parent.take()) else {
            return;
        };
        if let Some(el) = self.element_mut(parent) {
            el.children.retain(|child| *child != node);
        }
    }

    fn clear_children(&mut self, node: SimNode) {
        let children = self
            .element_mut(node)
            .map(|el| std::mem::take(&mut el.children))
            .unwrap_or_default();
        for child in children {
            if let Some(el) = self.element_mut(child) {
                el.parent = None;
            }
        }
    }

    fn is_connected(&self, node: SimNode) -> bool {
        let mut current = node;
        loop {
            if current == ROOT {
                return true;
            }
            match self.element(current).and_then(|el| el.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn descendants(&self, scope: SimNode) -> Vec<SimNode> {
        let mut found = Vec::new();
        let mut stack: Vec<SimNode> = self
            .element(scope)
            .map(|el| el.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            found.push(node);
            if let Some(el) = self.element(node) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        found
    }

    fn matches(&self, node: SimNode, selectors: &SelectorList) -> bool {
        selectors.matches(self, node)
    }

    fn text_content(&self, node: SimNode, out: &mut String) {
        if let Some(el) = self.element(node) {
            out.push_str(&el.text);
            for child in &el.children {
                self.text_content(*child, out);
            }
        }
    }

    fn serialize(&self, node: SimNode, out: &mut String) {
        let Some(el) = self.element(node) else {
            return;
        };
        let _ = write!(out, "<{}", el.tag);
        for (name, value) in &el.attributes {
            let _ = write!(out, " {name}=\"{value}\"");
        }
        out.push('>');
        self.serialize_children(node, out);
        let _ = write!(out, "</{}>", el.tag);
    }

    fn serialize_children(&self, node: SimNode, out: &mut String) {
        if let Some(el) = self.element(node) {
            out.push_str(&el.text);
            for child in &el.children {
                self.serialize(*child, out);
            }
        }
    }
}

/// Shared handle to an in-memory document. Clones see the same document.
#[derive(Clone)]
pub struct SimDom {
    doc: Rc<RefCell<Document>>,
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl Default for SimDom {
    fn default() -> Self {
        Self::new()
    }
}

impl SimDom {
    /// Empty document whose root is `<body>`, located at `/`.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            doc: Rc::new(RefCell::new(Document::new())),
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }

    /// The `<body>` element.
    pub fn body(&self) -> SimNode {
        ROOT
    }

    /// Append a new `<tag>` with `attributes` under `parent`.
    pub fn append(&self, parent: SimNode, tag: &str, attributes: &[(&str, &str)]) -> SimNode {
        self.append_with_text(parent, tag, attributes, "")
    }

    /// Append a new `<tag>` with `attributes` and text content under `parent`.
    pub fn append_with_text(
        &self,
        parent: SimNode,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> SimNode {
        let mut doc = self.doc.borrow_mut();
        let node = doc.create(tag);
        if let Some(el) = doc.element_mut(node) {
            el.attributes = attributes
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect();
            el.text = text.to_string();
        }
        doc.attach(parent, node);
        node
    }

    /// Change the path reported by [`Dom::location_path`].
    pub fn set_location_path(&self, path: &str) {
        self.doc.borrow_mut().location_path = path.to_string();
    }

    /// Choose how future clipboard writes are answered.
    pub fn set_clipboard_mode(&self, mode: ClipboardMode) {
        self.doc.borrow_mut().clipboard_mode = mode;
    }

    /// Toggle availability of visibility observation.
    pub fn set_visibility_supported(&self, supported: bool) {
        self.doc.borrow_mut().visibility_supported = supported;
    }

    /// Dispatch a `click` on `node`.
    pub fn click(&self, node: SimNode) -> SimEvent {
        self.dispatch(node, "click")
    }

    /// Dispatch `kind` to the handlers registered on `node`, then run any
    /// async work they queued until it stalls.
    pub fn dispatch(&self, node: SimNode, kind: &str) -> SimEvent {
        let event = SimEvent {
            kind: kind.to_string(),
            default_prevented: Cell::new(false),
        };
        let handlers: Vec<_> = self
            .doc
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.node == node && listener.event == kind)
            .map(|listener| Rc::clone(&listener.handler))
            .collect();
        for handler in handlers {
            let mut handler = handler.borrow_mut();
            (*handler)(&event);
        }
        self.run_until_stalled();
        event
    }

    /// Move the virtual clock forward, firing due timers in order.
    pub fn advance(&self, ms: u64) {
        let target = self.doc.borrow().now_ms.saturating_add(ms);
        loop {
            let next = {
                let mut doc = self.doc.borrow_mut();
                let position = doc
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
                    .map(|(index, _)| index);
                position.map(|index| {
                    let timer = doc.timers.remove(index);
                    doc.now_ms = timer.due_ms;
                    timer.callback
                })
            };
            match next {
                Some(callback) => {
                    callback();
                    self.run_until_stalled();
                },
                None => break,
            }
        }
        self.doc.borrow_mut().now_ms = target;
    }

    /// Poll queued async tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Report `node` as intersecting the viewport to every observer watching
    /// it. Returns how many observers were notified.
    pub fn intersect(&self, node: SimNode) -> usize {
        let callbacks: Vec<_> = self
            .doc
            .borrow()
            .observers
            .iter()
            .enumerate()
            .filter(|(_, observer)| observer.targets.contains(&node))
            .map(|(index, observer)| (index, Rc::clone(&observer.callback)))
            .collect();
        let notified = callbacks.len();
        for (index, callback) in callbacks {
            let next = {
                let mut callback = callback.borrow_mut();
                (*callback)(&node)
            };
            if next == Observation::Unobserve {
                if let Some(observer) = self.doc.borrow_mut().observers.get_mut(index) {
                    observer.targets.retain(|target| *target != node);
                }
            }
        }
        notified
    }

    /// Whether any observer still watches `node`.
    pub fn is_observed(&self, node: SimNode) -> bool {
        self.doc
            .borrow()
            .observers
            .iter()
            .any(|observer| observer.targets.contains(&node))
    }

    /// Options of every observer created so far.
    pub fn observer_options(&self) -> Vec<VisibilityOptions> {
        self.doc
            .borrow()
            .observers
            .iter()
            .map(|observer| observer.options.clone())
            .collect()
    }

    /// Inline style property of `node`.
    pub fn style(&self, node: SimNode, property: &str) -> Option<String> {
        self.doc
            .borrow()
            .element(node)
            .and_then(|el| el.styles.get(property).cloned())
    }

    /// Form value of `node`.
    pub fn value(&self, node: SimNode) -> Option<String> {
        self.doc.borrow().element(node).map(|el| el.value.clone())
    }

    /// Current clipboard contents.
    pub fn clipboard(&self) -> Option<String> {
        self.doc.borrow().clipboard.clone()
    }

    /// Every text handed to the asynchronous clipboard API.
    pub fn clipboard_writes(&self) -> Vec<String> {
        self.doc.borrow().clipboard_writes.clone()
    }

    /// Every text copied through the legacy copy command.
    pub fn legacy_copies(&self) -> Vec<String> {
        self.doc.borrow().legacy_copies.clone()
    }

    /// Elements scrolled into view, oldest first.
    pub fn scrolled_to(&self) -> Vec<SimNode> {
        self.doc.borrow().scrolled_to.clone()
    }

    /// Timers not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.doc.borrow().timers.len()
    }

    /// Handlers registered for `event` on `node`.
    pub fn listener_count(&self, node: SimNode, event: &str) -> usize {
        self.doc
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.node == node && listener.event == event)
            .count()
    }

    /// Elements currently attached under the body, body excluded.
    pub fn attached_count(&self) -> usize {
        self.doc.borrow().descendants(ROOT).len()
    }
}

impl Tree for Document {
    type Node = SimNode;

    fn tag(&self, node: SimNode) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    fn attribute(&self, node: SimNode, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    fn parent(&self, node: SimNode) -> Option<SimNode> {
        self.element(node).and_then(|el| el.parent)
    }
}

impl Dom for SimDom {
    type Node = SimNode;
    type Event = SimEvent;

    fn query_selector(&self, selector: &str) -> Option<SimNode> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<SimNode> {
        let Some(selectors) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        let doc = self.doc.borrow();
        std::iter::once(ROOT)
            .chain(doc.descendants(ROOT))
            .filter(|node| doc.matches(*node, &selectors))
            .collect()
    }

    fn query_within(&self, scope: &SimNode, selector: &str) -> Vec<SimNode> {
        let Some(selectors) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        let doc = self.doc.borrow();
        doc.descendants(*scope)
            .into_iter()
            .filter(|node| doc.matches(*node, &selectors))
            .collect()
    }

    fn closest(&self, node: &SimNode, selector: &str) -> Option<SimNode> {
        let selectors = SelectorList::parse(selector)?;
        let doc = self.doc.borrow();
        let mut current = Some(*node);
        while let Some(candidate) = current {
            if doc.matches(candidate, &selectors) {
                return Some(candidate);
            }
            current = doc.element(candidate).and_then(|el| el.parent);
        }
        None
    }

    fn attribute(&self, node: &SimNode, name: &str) -> Option<String> {
        self.doc
            .borrow()
            .element(*node)
            .and_then(|el| el.attributes.get(name).cloned())
    }

    fn set_attribute(&self, node: &SimNode, name: &str, value: &str) {
        if let Some(el) = self.doc.borrow_mut().element_mut(*node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&self, node: &SimNode, name: &str) {
        if let Some(el) = self.doc.borrow_mut().element_mut(*node) {
            el.attributes.remove(name);
        }
    }

    fn has_class(&self, node: &SimNode, class: &str) -> bool {
        self.attribute(node, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    fn add_class(&self, node: &SimNode, class: &str) {
        if class.is_empty() || self.has_class(node, class) {
            return;
        }
        let classes = self.attribute(node, "class").unwrap_or_default();
        let updated = if classes.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", classes.trim())
        };
        self.set_attribute(node, "class", &updated);
    }

    fn remove_class(&self, node: &SimNode, class: &str) {
        let Some(classes) = self.attribute(node, "class") else {
            return;
        };
        let updated = classes
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "class", &updated);
    }

    fn text_content(&self, node: &SimNode) -> String {
        let mut text = String::new();
        self.doc.borrow().text_content(*node, &mut text);
        text
    }

    fn set_text_content(&self, node: &SimNode, text: &str) {
        let mut doc = self.doc.borrow_mut();
        doc.clear_children(*node);
        if let Some(el) = doc.element_mut(*node) {
            el.text = text.to_string();
        }
    }

    fn inner_html(&self, node: &SimNode) -> String {
        let mut html = String::new();
        self.doc.borrow().serialize_children(*node, &mut html);
        html
    }

    fn set_inner_html(&self, node: &SimNode, html: &str) {
        self.set_text_content(node, html);
    }

    fn set_style(&self, node: &SimNode, property: &str, value: &str) {
        if let Some(el) = self.doc.borrow_mut().element_mut(*node) {
            el.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn is_connected(&self, node: &SimNode) -> bool {
        self.doc.borrow().is_connected(*node)
    }

    fn create_element(&self, tag: &str) -> Option<SimNode> {
        Some(self.doc.borrow_mut().create(tag))
    }

    fn append_to_body(&self, node: &SimNode) {
        self.doc.borrow_mut().attach(ROOT, *node);
    }

    fn remove(&self, node: &SimNode) {
        self.doc.borrow_mut().detach(*node);
    }

    fn set_value(&self, node: &SimNode, value: &str) {
        if let Some(el) = self.doc.borrow_mut().element_mut(*node) {
            el.value = value.to_string();
        }
    }

    fn select_text(&self, node: &SimNode) {
        self.doc.borrow_mut().selection = Some(*node);
    }

    fn exec_copy(&self) -> bool {
        let mut doc = self.doc.borrow_mut();
        let Some(node) = doc.selection else {
            return false;
        };
        if !doc.is_connected(node) {
            return false;
        }
        let Some(value) = doc.element(node).map(|el| el.value.clone()) else {
            return false;
        };
        doc.legacy_copies.push(value.clone());
        doc.clipboard = Some(value);
        true
    }

    fn location_path(&self) -> String {
        self.doc.borrow().location_path.clone()
    }

    fn scroll_into_view(&self, node: &SimNode) {
        self.doc.borrow_mut().scrolled_to.push(*node);
    }

    fn listen(&self, node: &SimNode, event: &str, handler: Handler<SimEvent>) {
        self.doc.borrow_mut().listeners.push(Listener {
            node: *node,
            event: event.to_string(),
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn prevent_default(&self, event: &SimEvent) {
        event.default_prevented.set(true);
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) {
        let mut doc = self.doc.borrow_mut();
        let seq = doc.next_timer_seq;
        doc.next_timer_seq += 1;
        let due_ms = doc.now_ms.saturating_add(u64::from(delay_ms));
        doc.timers.push(Timer {
            due_ms,
            seq,
            callback,
        });
    }

    fn spawn_local(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(task) {
            tracing::warn!(error = %err, "simulated task could not be spawned");
        }
    }

    fn write_clipboard(&self, text: &str) -> LocalBoxFuture<'static, anyhow::Result<()>> {
        let mut doc = self.doc.borrow_mut();
        let result = match doc.clipboard_mode {
            ClipboardMode::Grant => {
                doc.clipboard_writes.push(text.to_string());
                doc.clipboard = Some(text.to_string());
                Ok(())
            },
            ClipboardMode::Deny => {
                doc.clipboard_writes.push(text.to_string());
                Err(anyhow!("NotAllowedError: clipboard write permission denied"))
            },
            ClipboardMode::Unavailable => Err(anyhow!("navigator.clipboard is unavailable")),
        };
        Box::pin(future::ready(result))
    }

    fn supports_visibility(&self) -> bool {
        self.doc.borrow().visibility_supported
    }

    fn observe_visibility(
        &self,
        targets: &[SimNode],
        options: &VisibilityOptions,
        on_visible: VisibilityCallback<SimNode>,
    ) {
        let mut doc = self.doc.borrow_mut();
        if !doc.visibility_supported {
            return;
        }
        doc.observers.push(Observer {
            targets: targets.to_vec(),
            options: options.clone(),
            callback: Rc::new(RefCell::new(on_visible)),
        });
    }
}
