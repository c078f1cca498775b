//! Configuration embedded in the hosting page.
//!
//! The page may carry `<script type="application/json" id="site-config">`
//! with a partial [`SiteConfig`]; omitted fields keep their defaults.

use anyhow::Result;
use lesson_site_shared::SiteConfig;
use web_sys::Document;

/// Id of the inline JSON configuration element.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Read the inline configuration, falling back to defaults when the page
/// does not provide one.
pub fn load_embedded(document: &Document) -> Result<SiteConfig> {
    parse_embedded(
        document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content()),
    )
}

fn parse_embedded(text: Option<String>) -> Result<SiteConfig> {
    match text {
        Some(json) => SiteConfig::from_json(&json),
        None => Ok(SiteConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::parse_embedded;
    use lesson_site_shared::SiteConfig;

    #[test]
    fn missing_element_means_defaults() -> Result<()> {
        assert_eq!(parse_embedded(None)?, SiteConfig::default());
        assert_eq!(parse_embedded(Some("  \n".to_string()))?, SiteConfig::default());
        Ok(())
    }

    #[test]
    fn embedded_json_is_applied() -> Result<()> {
        let config = parse_embedded(Some(r#"{"quiz": {"selected_class": "is-picked"}}"#.to_string()))?;
        assert_eq!(config.quiz.selected_class, "is-picked");
        Ok(())
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_embedded(Some("{".to_string())).is_err());
    }
}
