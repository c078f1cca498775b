//! Client-side behavior for the lesson site: mobile navigation, active link
//! highlighting, copy buttons for code blocks, quizzes, smooth anchors, lazy
//! images and fade-in on scroll.
//!
//! Everything is written against the [`dom::Dom`] trait. The wasm frontend
//! implements it over `web-sys`; `sim::SimDom` (behind the `sim` feature)
//! implements it in memory so the behavior can be exercised without a
//! browser.

pub mod clipboard;
pub mod config;
pub mod dom;
pub mod i18n;
pub mod nav;
pub mod page;
pub mod quiz;
pub mod scroll;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use config::SiteConfig;
pub use dom::Dom;
pub use page::{init_page, InitReport};
