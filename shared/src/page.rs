//! Single entry point wiring every component onto a page.

use std::rc::Rc;

use crate::{clipboard, config::SiteConfig, dom::Dom, nav, quiz, scroll};

/// What [`init_page`] attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitReport {
    /// Whether the mobile menu toggle was bound.
    pub mobile_menu: bool,
    /// Navigation links marked active.
    pub active_links: usize,
    /// Copy buttons bound.
    pub copy_buttons: usize,
    /// Quizzes mounted.
    pub quizzes: usize,
    /// Hash links scrolled smoothly.
    pub anchors: usize,
    /// Images waiting for their first visibility.
    pub lazy_images: usize,
    /// Elements waiting to fade in.
    pub fade_elements: usize,
}

/// Attach every component to the page. Components are independent: markup
/// missing for one of them only skips that one.
///
/// Handlers stay registered for the page lifetime, so call this once per
/// page load.
pub fn init_page<D: Dom>(dom: &D, config: &SiteConfig) -> InitReport {
    let report = InitReport {
        mobile_menu: nav::bind_mobile_menu(dom, &config.nav),
        active_links: nav::highlight_active_link(dom, &config.nav),
        copy_buttons: clipboard::bind_copy_buttons(dom, &Rc::new(config.clipboard.clone())),
        quizzes: quiz::mount_all(dom, &Rc::new(config.quiz.clone())).len(),
        anchors: scroll::bind_smooth_anchors(dom, &config.scroll),
        lazy_images: scroll::lazy_load_images(dom, &config.scroll),
        fade_elements: scroll::fade_in_on_scroll(dom, &config.scroll),
    };

    tracing::info!(
        mobile_menu = report.mobile_menu,
        active_links = report.active_links,
        copy_buttons = report.copy_buttons,
        quizzes = report.quizzes,
        anchors = report.anchors,
        lazy_images = report.lazy_images,
        fade_elements = report.fade_elements,
        "page interactivity initialized"
    );
    report
}
