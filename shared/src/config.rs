//! Page configuration: selectors, class names, timings and messages.
//!
//! Every field has a default matching the stock markup, so an empty JSON
//! object (or no configuration at all) is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{dom::VisibilityOptions, i18n::current as t};

/// Page used when the location path has no last segment.
pub const DEFAULT_HOME_PAGE: &str = "index.html";
/// How long copy confirmations stay visible.
pub const DEFAULT_COPY_FEEDBACK_MS: u32 = 2_000;

/// Top-level configuration handed to [`crate::page::init_page`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Navigation controller settings.
    pub nav: NavConfig,
    /// Copy button settings.
    pub clipboard: ClipboardConfig,
    /// Quiz widget settings.
    pub quiz: QuizConfig,
    /// Anchor, lazy image and fade-in settings.
    pub scroll: ScrollConfig,
    /// Maximum log level forwarded to the console (`error` .. `trace`).
    pub log_level: LogLevel,
}

impl SiteConfig {
    /// Parse a JSON document, filling omitted fields with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).context("invalid site config JSON")
    }
}

/// Console verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Lifecycle messages.
    #[default]
    Info,
    /// Wiring details.
    Debug,
    /// Everything.
    Trace,
}

/// Mobile menu and active link highlighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavConfig {
    /// Control that opens and closes the mobile menu.
    pub toggle_selector: String,
    /// Mobile menu container.
    pub menu_selector: String,
    /// Class hiding the mobile menu.
    pub hidden_class: String,
    /// Navigation links considered for highlighting.
    pub link_selector: String,
    /// Classes applied to the link of the current page.
    pub active_classes: Vec<String>,
    /// Classes applied to every other link.
    pub inactive_classes: Vec<String>,
    /// Page identifier used for an empty path.
    pub home_page: String,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            toggle_selector: "#mobile-menu-btn".to_string(),
            menu_selector: "#mobile-menu".to_string(),
            hidden_class: "hidden".to_string(),
            link_selector: ".nav-link, #mobile-menu a".to_string(),
            active_classes: vec!["text-white".to_string(), "font-semibold".to_string()],
            inactive_classes: vec!["text-gray-300".to_string()],
            home_page: DEFAULT_HOME_PAGE.to_string(),
        }
    }
}

/// Copy-to-clipboard buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipboardConfig {
    /// Copy buttons.
    pub button_selector: String,
    /// Enclosing block searched upwards from a button.
    pub container_selector: String,
    /// Element inside the block holding the text to copy.
    pub code_selector: String,
    /// Button content while the confirmation is visible.
    pub copied_label: String,
    /// Class applied while the confirmation is visible.
    pub copied_class: String,
    /// Confirmation duration.
    pub feedback_ms: u32,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            button_selector: ".copy-btn".to_string(),
            container_selector: ".code-block".to_string(),
            code_selector: "pre code, .code-content pre".to_string(),
            copied_label: t::clipboard::COPIED_LABEL.to_string(),
            copied_class: "copied".to_string(),
            feedback_ms: DEFAULT_COPY_FEEDBACK_MS,
        }
    }
}

/// Quiz widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuizConfig {
    /// Quiz containers.
    pub quiz_selector: String,
    /// Answer options inside a quiz.
    pub option_selector: String,
    /// Submit control inside a quiz.
    pub submit_selector: String,
    /// Feedback region inside a quiz.
    pub feedback_selector: String,
    /// Marker opening every message after a correct answer.
    pub correct_prefix: String,
    /// Text following [`Self::correct_prefix`] unless the feedback region
    /// overrides it.
    pub correct_feedback: String,
    /// Marker opening every message after a wrong answer.
    pub incorrect_prefix: String,
    /// Text following [`Self::incorrect_prefix`] unless the feedback region
    /// overrides it.
    pub incorrect_feedback: String,
    /// Class marking the selected option.
    pub selected_class: String,
    /// Class marking correct options and positive feedback.
    pub correct_class: String,
    /// Class marking the wrong choice and negative feedback.
    pub incorrect_class: String,
    /// Class marking inert options after submission.
    pub disabled_class: String,
    /// Class revealing the feedback region after submission.
    pub show_class: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            quiz_selector: ".quiz-container".to_string(),
            option_selector: ".quiz-option".to_string(),
            submit_selector: ".quiz-submit".to_string(),
            feedback_selector: ".quiz-feedback".to_string(),
            correct_prefix: t::quiz::CORRECT_PREFIX.to_string(),
            correct_feedback: t::quiz::CORRECT_FEEDBACK.to_string(),
            incorrect_prefix: t::quiz::INCORRECT_PREFIX.to_string(),
            incorrect_feedback: t::quiz::INCORRECT_FEEDBACK.to_string(),
            selected_class: "selected".to_string(),
            correct_class: "correct".to_string(),
            incorrect_class: "incorrect".to_string(),
            disabled_class: "disabled".to_string(),
            show_class: "show".to_string(),
        }
    }
}

/// Smooth anchors, lazy images and fade-in animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollConfig {
    /// Same-page links scrolled smoothly.
    pub anchor_selector: String,
    /// Images with a deferred source.
    pub lazy_image_selector: String,
    /// Attribute holding the deferred source.
    pub lazy_source_attribute: String,
    /// Elements faded in on first visibility.
    pub fade_selector: String,
    /// Initial downward offset of fade elements, in pixels.
    pub fade_offset_px: u32,
    /// Fade transition duration, in milliseconds.
    pub fade_duration_ms: u32,
    /// Visible fraction that triggers a fade.
    pub fade_threshold: f64,
    /// Viewport margin for the fade trigger zone.
    pub fade_root_margin: String,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            anchor_selector: "a[href^=\"#\"]".to_string(),
            lazy_image_selector: "img[data-src]".to_string(),
            lazy_source_attribute: "data-src".to_string(),
            fade_selector: ".fade-in".to_string(),
            fade_offset_px: 20,
            fade_duration_ms: 600,
            fade_threshold: 0.1,
            fade_root_margin: "0px 0px -50px 0px".to_string(),
        }
    }
}

impl ScrollConfig {
    /// Observer options for fade elements.
    pub fn fade_visibility(&self) -> VisibilityOptions {
        VisibilityOptions {
            threshold: self.fade_threshold.clamp(0.0, 1.0),
            root_margin: self.fade_root_margin.clone(),
        }
    }
}
