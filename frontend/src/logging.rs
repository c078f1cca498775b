//! Forwards `tracing` events to the browser console.

use std::fmt::{self, Write as _};

use lesson_site_shared::config::LogLevel;
use tracing::{
    field::{Field, Visit},
    level_filters::LevelFilter,
    Event, Level, Subscriber,
};
use tracing_subscriber::{layer::Context, prelude::*, Layer};
use wasm_bindgen::JsValue;
use web_sys::console;

/// Layer writing each event as one console line at the matching severity.
pub struct ConsoleLayer;

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let meta = event.metadata();
        let line = format_line(*meta.level(), meta.target(), &fields.message, &fields.fields);
        let line = JsValue::from_str(&line);
        match *meta.level() {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            _ => console::debug_1(&line),
        }
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }
}

/// `LEVEL target: message key=value ...`
pub fn format_line(level: Level, target: &str, message: &str, fields: &[(&str, String)]) -> String {
    let mut line = format!("{level} {target}: {message}");
    for (name, value) in fields {
        let _ = write!(line, " {name}={value}");
    }
    line
}

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    }
}

/// Install the console subscriber. Later calls keep the first subscriber.
pub fn init(level: LogLevel) {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer.with_filter(level_filter(level)));
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("console logging already initialized");
    }
}
