//! Navigation controller: mobile menu toggle and active link highlighting.

use crate::{config::NavConfig, dom::Dom};

const ARIA_EXPANDED: &str = "aria-expanded";

/// Page identifier of a location path: its last segment, or `home_page`
/// when the path ends in `/` or is empty.
pub fn current_page(path: &str, home_page: &str) -> String {
    path.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(home_page)
        .to_string()
}

/// Page identifier a link points at, ignoring query and fragment.
///
/// Pure fragment links (`#intro`) point at no page and return `None`.
pub fn link_page(href: &str, home_page: &str) -> Option<String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    let path = without_fragment.split('?').next().unwrap_or_default().trim();
    if path.is_empty() {
        return None;
    }
    Some(current_page(path, home_page))
}

/// Wire the mobile menu toggle. Returns `false` when the toggle control or
/// the menu is missing from the page.
pub fn bind_mobile_menu<D: Dom>(dom: &D, config: &NavConfig) -> bool {
    let toggle = dom.query_selector(&config.toggle_selector);
    let menu = dom.query_selector(&config.menu_selector);
    let (Some(toggle), Some(menu)) = (toggle, menu) else {
        tracing::debug!(
            toggle = %config.toggle_selector,
            menu = %config.menu_selector,
            "mobile menu markup not found"
        );
        return false;
    };

    let handle = dom.clone();
    let trigger = toggle.clone();
    let hidden_class = config.hidden_class.clone();
    dom.listen(
        &toggle,
        "click",
        Box::new(move |_: &D::Event| {
            toggle_mobile_menu(&handle, &trigger, &menu, &hidden_class);
        }),
    );
    true
}

/// Flip the menu's hidden class and invert the trigger's `aria-expanded`.
/// Returns the new expanded state.
pub fn toggle_mobile_menu<D: Dom>(dom: &D, toggle: &D::Node, menu: &D::Node, hidden_class: &str) -> bool {
    if dom.has_class(menu, hidden_class) {
        dom.remove_class(menu, hidden_class);
    } else {
        dom.add_class(menu, hidden_class);
    }

    let expanded = !is_expanded(dom, toggle);
    dom.set_attribute(toggle, ARIA_EXPANDED, if expanded { "true" } else { "false" });
    expanded
}

fn is_expanded<D: Dom>(dom: &D, toggle: &D::Node) -> bool {
    dom.attribute(toggle, ARIA_EXPANDED).as_deref() == Some("true")
}

/// Mark the links pointing at the current page active and every other link
/// inactive. Safe to call repeatedly. Returns the number of active links.
pub fn highlight_active_link<D: Dom>(dom: &D, config: &NavConfig) -> usize {
    let page = current_page(&dom.location_path(), &config.home_page);
    let mut active = 0;

    for link in dom.query_selector_all(&config.link_selector) {
        let target = dom
            .attribute(&link, "href")
            .and_then(|href| link_page(&href, &config.home_page));
        let is_current = target.as_deref() == Some(page.as_str());

        let (add, remove) = if is_current {
            active += 1;
            (&config.active_classes, &config.inactive_classes)
        } else {
            (&config.inactive_classes, &config.active_classes)
        };
        for class in remove {
            dom.remove_class(&link, class);
        }
        for class in add {
            dom.add_class(&link, class);
        }
    }

    tracing::debug!(page = %page, active, "highlighted navigation links");
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimDom, SimNode};

    fn nav_page(path: &str) -> (SimDom, SimNode, SimNode) {
        let dom = SimDom::new();
        dom.set_location_path(path);
        let nav = dom.append(dom.body(), "nav", &[]);
        let home = dom.append(nav, "a", &[("class", "nav-link text-gray-300"), ("href", "index.html")]);
        let lessons = dom.append(nav, "a", &[("class", "nav-link text-gray-300"), ("href", "lessons.html")]);
        (dom, home, lessons)
    }

    #[test]
    fn current_page_uses_last_segment() {
        assert_eq!(current_page("/site/lessons.html", "index.html"), "lessons.html");
        assert_eq!(current_page("/site/", "index.html"), "index.html");
        assert_eq!(current_page("", "index.html"), "index.html");
    }

    #[test]
    fn link_page_strips_query_and_fragment() {
        assert_eq!(link_page("lessons.html#quiz", "index.html").as_deref(), Some("lessons.html"));
        assert_eq!(link_page("/docs/setup.html?v=2", "index.html").as_deref(), Some("setup.html"));
        assert_eq!(link_page("/", "index.html").as_deref(), Some("index.html"));
        assert_eq!(link_page("#top", "index.html"), None);
    }

    #[test]
    fn highlights_only_the_current_page_link() {
        let (dom, home, lessons) = nav_page("/lessons.html");

        assert_eq!(highlight_active_link(&dom, &NavConfig::default()), 1);
        assert!(dom.has_class(&lessons, "text-white"));
        assert!(dom.has_class(&lessons, "font-semibold"));
        assert!(!dom.has_class(&lessons, "text-gray-300"));
        assert!(!dom.has_class(&home, "text-white"));
        assert!(dom.has_class(&home, "text-gray-300"));
    }

    #[test]
    fn empty_path_highlights_home() {
        let (dom, home, lessons) = nav_page("/");

        highlight_active_link(&dom, &NavConfig::default());
        assert!(dom.has_class(&home, "text-white"));
        assert!(!dom.has_class(&lessons, "text-white"));
    }

    #[test]
    fn mobile_menu_links_are_highlighted_too() {
        let (dom, _, lessons) = nav_page("/lessons.html");
        let menu = dom.append(dom.body(), "div", &[("id", "mobile-menu"), ("class", "hidden")]);
        let mobile_lessons = dom.append(menu, "a", &[("href", "lessons.html")]);

        assert_eq!(highlight_active_link(&dom, &NavConfig::default()), 2);
        assert!(dom.has_class(&lessons, "font-semibold"));
        assert!(dom.has_class(&mobile_lessons, "font-semibold"));
    }

    #[test]
    fn repeated_highlighting_leaves_no_stale_marks() {
        let (dom, home, lessons) = nav_page("/lessons.html");
        let config = NavConfig::default();
        highlight_active_link(&dom, &config);

        dom.set_location_path("/index.html");
        highlight_active_link(&dom, &config);
        highlight_active_link(&dom, &config);

        assert!(dom.has_class(&home, "text-white"));
        assert!(!dom.has_class(&lessons, "text-white"));
        assert!(!dom.has_class(&lessons, "font-semibold"));
        assert!(dom.has_class(&lessons, "text-gray-300"));
    }

    #[test]
    fn multi_class_styles_are_applied_together() {
        let (dom, _, lessons) = nav_page("/lessons.html");
        let config = NavConfig {
            active_classes: vec!["text-blue-600".to_string(), "font-semibold".to_string()],
            inactive_classes: vec!["text-gray-600".to_string()],
            ..NavConfig::default()
        };

        highlight_active_link(&dom, &config);
        assert!(dom.has_class(&lessons, "text-blue-600"));
        assert!(dom.has_class(&lessons, "font-semibold"));
        assert!(!dom.has_class(&lessons, "text-gray-600"));
    }

    #[test]
    fn toggle_flips_visibility_and_aria_state() {
        let dom = SimDom::new();
        let button = dom.append(
            dom.body(),
            "button",
            &[("id", "mobile-menu-btn"), ("aria-expanded", "false")],
        );
        let menu = dom.append(dom.body(), "div", &[("id", "mobile-menu"), ("class", "hidden")]);
        assert!(bind_mobile_menu(&dom, &NavConfig::default()));

        dom.click(button);
        assert!(!dom.has_class(&menu, "hidden"));
        assert_eq!(dom.attribute(&button, "aria-expanded").as_deref(), Some("true"));

        dom.click(button);
        assert!(dom.has_class(&menu, "hidden"));
        assert_eq!(dom.attribute(&button, "aria-expanded").as_deref(), Some("false"));
    }

    #[test]
    fn only_literal_true_counts_as_expanded() {
        let dom = SimDom::new();
        let button = dom.append(
            dom.body(),
            "button",
            &[("id", "mobile-menu-btn"), ("aria-expanded", "TRUE")],
        );
        let menu = dom.append(dom.body(), "div", &[("id", "mobile-menu")]);
        bind_mobile_menu(&dom, &NavConfig::default());

        dom.click(button);
        assert!(dom.has_class(&menu, "hidden"));
        assert_eq!(dom.attribute(&button, "aria-expanded").as_deref(), Some("true"));
    }

    #[test]
    fn menu_links_do_not_toggle_the_menu() {
        let dom = SimDom::new();
        let button = dom.append(dom.body(), "button", &[("id", "mobile-menu-btn")]);
        let menu = dom.append(dom.body(), "div", &[("id", "mobile-menu"), ("class", "hidden")]);
        let link = dom.append(menu, "a", &[("href", "lessons.html")]);
        bind_mobile_menu(&dom, &NavConfig::default());

        dom.click(button);
        dom.click(link);
        assert!(!dom.has_class(&menu, "hidden"));
        assert_eq!(dom.listener_count(link, "click"), 0);
    }

    #[test]
    fn missing_markup_skips_binding() {
        let dom = SimDom::new();
        dom.append(dom.body(), "button", &[("id", "mobile-menu-btn")]);
        assert!(!bind_mobile_menu(&dom, &NavConfig::default()));
    }
}
