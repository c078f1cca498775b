//! WebAssembly entry points attaching the lesson site behavior to the page.
//!
//! The hosting page loads the module and calls `initSite()` once the DOM is
//! ready, or `initSiteWithConfig(json)` to pass configuration explicitly.

mod browser;
mod config;
mod logging;

use std::cell::Cell;

use lesson_site_shared::{init_page, InitReport, SiteConfig};
use wasm_bindgen::prelude::*;

use crate::browser::BrowserDom;

thread_local! {
    static INITIALIZED: Cell<bool> = const { Cell::new(false) };
}

/// Initialize every component using the configuration embedded in the page.
/// Malformed configuration is logged and replaced with defaults.
#[wasm_bindgen(js_name = initSite)]
pub fn init() {
    let Some(dom) = BrowserDom::new() else {
        return;
    };
    let (config, config_error) = match config::load_embedded(dom.document()) {
        Ok(config) => (config, None),
        Err(err) => (SiteConfig::default(), Some(err)),
    };
    logging::init(config.log_level);
    if let Some(err) = config_error {
        tracing::error!("ignoring embedded site config: {err:#}");
    }
    start(&dom, &config);
}

/// Initialize every component with `json` as configuration.
#[wasm_bindgen(js_name = initSiteWithConfig)]
pub fn init_with_config(json: &str) -> Result<(), JsValue> {
    let config = SiteConfig::from_json(json).map_err(|err| JsValue::from_str(&format!("{err:#}")))?;
    let dom = BrowserDom::new().ok_or_else(|| JsValue::from_str("no browser document available"))?;
    logging::init(config.log_level);
    start(&dom, &config);
    Ok(())
}

fn start(dom: &BrowserDom, config: &SiteConfig) -> Option<InitReport> {
    if INITIALIZED.with(|initialized| initialized.replace(true)) {
        tracing::warn!("site already initialized, ignoring repeated call");
        return None;
    }
    Some(init_page(dom, config))
}
