//! Copy buttons for code blocks.
//!
//! A click copies the text of the code element inside the button's enclosing
//! block. The asynchronous clipboard API is tried first; when it is missing
//! or denied, the text goes through an off-screen textarea and the legacy
//! copy command. Either way the button shows a short confirmation and then
//! returns to the label it had when the page was initialized.

use std::rc::Rc;

use crate::{config::ClipboardConfig, dom::Dom};

/// Register a copy handler on every copy button. Returns how many were bound.
pub fn bind_copy_buttons<D: Dom>(dom: &D, config: &Rc<ClipboardConfig>) -> usize {
    let buttons = dom.query_selector_all(&config.button_selector);
    for button in &buttons {
        let label = dom.inner_html(button);
        let handle = dom.clone();
        let trigger = button.clone();
        let config = Rc::clone(config);
        dom.listen(
            button,
            "click",
            Box::new(move |_: &D::Event| copy_code_block(&handle, &trigger, &label, &config)),
        );
    }
    buttons.len()
}

/// Raw text of the code block a button belongs to.
pub fn code_text<D: Dom>(dom: &D, button: &D::Node, config: &ClipboardConfig) -> Option<String> {
    let block = dom.closest(button, &config.container_selector)?;
    let code = dom
        .query_within(&block, &config.code_selector)
        .into_iter()
        .next()?;
    Some(dom.text_content(&code))
}

/// Copy the button's code block, then show the confirmation. `label` is the
/// content restored once the confirmation expires.
pub fn copy_code_block<D: Dom>(dom: &D, button: &D::Node, label: &str, config: &Rc<ClipboardConfig>) {
    let Some(text) = code_text(dom, button, config) else {
        tracing::debug!(container = %config.container_selector, "copy button outside a code block");
        return;
    };

    let write = dom.write_clipboard(&text);
    let handle = dom.clone();
    let button = button.clone();
    let label = label.to_string();
    let config = Rc::clone(config);
    dom.spawn_local(Box::pin(async move {
        if let Err(err) = write.await {
            tracing::warn!("clipboard write failed, falling back to manual selection: {err:#}");
            copy_via_selection(&handle, &text);
        }
        show_copied(&handle, &button, &label, &config);
    }));
}

/// Copy `text` through a temporary off-screen textarea and the legacy copy
/// command. The textarea is always removed again.
pub fn copy_via_selection<D: Dom>(dom: &D, text: &str) -> bool {
    let Some(area) = dom.create_element("textarea") else {
        return false;
    };
    dom.set_value(&area, text);
    dom.set_attribute(&area, "readonly", "");
    dom.set_attribute(&area, "aria-hidden", "true");
    dom.set_style(&area, "position", "fixed");
    dom.set_style(&area, "top", "0");
    dom.set_style(&area, "left", "-9999px");
    dom.set_style(&area, "opacity", "0");

    dom.append_to_body(&area);
    dom.select_text(&area);
    let copied = dom.exec_copy();
    dom.remove(&area);

    if !copied {
        tracing::debug!("legacy copy command reported failure");
    }
    copied
}

/// Show the copied state on `button` and schedule the restore of `label`.
/// The restore does nothing if the button has left the page by then.
pub fn show_copied<D: Dom>(dom: &D, button: &D::Node, label: &str, config: &ClipboardConfig) {
    dom.set_inner_html(button, &config.copied_label);
    dom.add_class(button, &config.copied_class);

    let handle = dom.clone();
    let button = button.clone();
    let label = label.to_string();
    let class = config.copied_class.clone();
    dom.set_timeout(
        config.feedback_ms,
        Box::new(move || {
            if !handle.is_connected(&button) {
                return;
            }
            handle.set_inner_html(&button, &label);
            handle.remove_class(&button, &class);
        }),
    );
}
