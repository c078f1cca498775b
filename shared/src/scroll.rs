//! Scroll utilities: smooth same-page anchors, lazy images and fade-in on
//! first visibility.

use crate::{
    config::ScrollConfig,
    dom::{Dom, Observation, VisibilityOptions},
};

/// Make same-page hash links scroll smoothly. Returns how many links were
/// bound.
pub fn bind_smooth_anchors<D: Dom>(dom: &D, config: &ScrollConfig) -> usize {
    let links = dom.query_selector_all(&config.anchor_selector);
    for link in &links {
        let handle = dom.clone();
        let anchor = link.clone();
        dom.listen(
            link,
            "click",
            Box::new(move |event: &D::Event| {
                let Some(href) = handle.attribute(&anchor, "href") else {
                    return;
                };
                // unknown targets fall through to the browser's own jump
                if let Some(target) = anchor_target(&handle, &href) {
                    handle.prevent_default(event);
                    handle.scroll_into_view(&target);
                }
            }),
        );
    }
    links.len()
}

/// Element a hash link points at. A bare `#` and unknown ids yield `None`,
/// leaving navigation to the browser.
pub fn anchor_target<D: Dom>(dom: &D, href: &str) -> Option<D::Node> {
    let id = href.strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    dom.query_selector(href)
}

/// Defer loading of images carrying the deferred-source attribute until
/// they first intersect the viewport. Returns how many images are observed.
pub fn lazy_load_images<D: Dom>(dom: &D, config: &ScrollConfig) -> usize {
    if !dom.supports_visibility() {
        tracing::debug!("visibility observation unavailable, lazy loading skipped");
        return 0;
    }

    let images = dom.query_selector_all(&config.lazy_image_selector);
    if images.is_empty() {
        return 0;
    }

    let handle = dom.clone();
    let attribute = config.lazy_source_attribute.clone();
    dom.observe_visibility(
        &images,
        &VisibilityOptions::default(),
        Box::new(move |image: &D::Node| {
            load_image(&handle, image, &attribute);
            Observation::Unobserve
        }),
    );
    images.len()
}

/// Move the deferred source into `src` and drop the marker attribute.
pub fn load_image<D: Dom>(dom: &D, image: &D::Node, attribute: &str) {
    if let Some(source) = dom.attribute(image, attribute) {
        dom.set_attribute(image, "src", &source);
        dom.remove_attribute(image, attribute);
    }
}

/// Hide fade elements and reveal each on its first visibility. Returns how
/// many elements are observed.
pub fn fade_in_on_scroll<D: Dom>(dom: &D, config: &ScrollConfig) -> usize {
    if !dom.supports_visibility() {
        tracing::debug!("visibility observation unavailable, fade-in skipped");
        return 0;
    }

    let elements = dom.query_selector_all(&config.fade_selector);
    if elements.is_empty() {
        return 0;
    }

    let transition = format!(
        "opacity {secs}s ease, transform {secs}s ease",
        secs = f64::from(config.fade_duration_ms) / 1000.0
    );
    let offset = format!("translateY({}px)", config.fade_offset_px);
    for element in &elements {
        dom.set_style(element, "opacity", "0");
        dom.set_style(element, "transform", &offset);
        dom.set_style(element, "transition", &transition);
    }

    let handle = dom.clone();
    dom.observe_visibility(
        &elements,
        &config.fade_visibility(),
        Box::new(move |element: &D::Node| {
            handle.set_style(element, "opacity", "1");
            handle.set_style(element, "transform", "translateY(0)");
            Observation::Unobserve
        }),
    );
    elements.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimDom;

    #[test]
    fn hash_link_scrolls_to_target() {
        let dom = SimDom::new();
        let link = dom.append(dom.body(), "a", &[("href", "#install")]);
        let section = dom.append(dom.body(), "section", &[("id", "install")]);
        assert_eq!(bind_smooth_anchors(&dom, &ScrollConfig::default()), 1);

        let event = dom.click(link);
        assert!(event.default_prevented());
        assert_eq!(dom.scrolled_to(), vec![section]);
    }

    #[test]
    fn bare_hash_and_unknown_targets_keep_default_navigation() {
        let dom = SimDom::new();
        let bare = dom.append(dom.body(), "a", &[("href", "#")]);
        let dangling = dom.append(dom.body(), "a", &[("href", "#missing")]);
        let other_page = dom.append(dom.body(), "a", &[("href", "lessons.html#quiz")]);
        assert_eq!(bind_smooth_anchors(&dom, &ScrollConfig::default()), 2);

        assert!(!dom.click(bare).default_prevented());
        assert!(!dom.click(dangling).default_prevented());
        assert_eq!(dom.listener_count(other_page, "click"), 0);
        assert!(dom.scrolled_to().is_empty());
    }

    #[test]
    fn lazy_image_loads_only_after_intersection() {
        let dom = SimDom::new();
        let image = dom.append(dom.body(), "img", &[("data-src", "img/foo.png")]);
        assert_eq!(lazy_load_images(&dom, &ScrollConfig::default()), 1);
        assert_eq!(dom.attribute(&image, "src"), None);

        assert_eq!(dom.intersect(image), 1);
        assert_eq!(dom.attribute(&image, "src").as_deref(), Some("img/foo.png"));
        assert_eq!(dom.attribute(&image, "data-src"), None);
        assert!(!dom.is_observed(image));
        assert_eq!(dom.intersect(image), 0);
    }

    #[test]
    fn lazy_loading_is_skipped_without_observer_support() {
        let dom = SimDom::new();
        dom.set_visibility_supported(false);
        let image = dom.append(dom.body(), "img", &[("data-src", "img/foo.png")]);

        assert_eq!(lazy_load_images(&dom, &ScrollConfig::default()), 0);
        assert_eq!(dom.attribute(&image, "data-src").as_deref(), Some("img/foo.png"));
    }

    #[test]
    fn fade_elements_start_hidden_and_reveal_once() {
        let dom = SimDom::new();
        let card = dom.append(dom.body(), "div", &[("class", "card fade-in")]);
        assert_eq!(fade_in_on_scroll(&dom, &ScrollConfig::default()), 1);

        assert_eq!(dom.style(card, "opacity").as_deref(), Some("0"));
        assert_eq!(dom.style(card, "transform").as_deref(), Some("translateY(20px)"));
        assert_eq!(
            dom.style(card, "transition").as_deref(),
            Some("opacity 0.6s ease, transform 0.6s ease")
        );
        assert_eq!(
            dom.observer_options(),
            vec![VisibilityOptions {
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".to_string(),
            }]
        );

        dom.intersect(card);
        assert_eq!(dom.style(card, "opacity").as_deref(), Some("1"));
        assert_eq!(dom.style(card, "transform").as_deref(), Some("translateY(0)"));
        assert!(!dom.is_observed(card));
    }

    #[test]
    fn fade_styles_are_not_applied_without_observer_support() {
        let dom = SimDom::new();
        dom.set_visibility_supported(false);
        let card = dom.append(dom.body(), "div", &[("class", "fade-in")]);

        assert_eq!(fade_in_on_scroll(&dom, &ScrollConfig::default()), 0);
        assert_eq!(dom.style(card, "opacity"), None);
    }
}
