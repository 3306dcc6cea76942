//! Request bodies accepted by the admin API, with the checks that must pass
//! before anything is written.

use serde::Deserialize;
use url::Url;

use crate::db::models::{BackgroundType, DEFAULT_BACKGROUND_COLOR, DEFAULT_OVERLAY_OPACITY};
use crate::error::BiolinkError;
use crate::middleware::payload::ListItem;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub background_type: Option<BackgroundType>,
    #[serde(default)]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub background_overlay_opacity: Option<f64>,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), BiolinkError> {
        if self.name.trim().is_empty() {
            return Err(BiolinkError::Validation("Name is required.".to_string()));
        }
        Ok(())
    }

    pub fn background_color(&self) -> &str {
        self.background_color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BACKGROUND_COLOR)
    }

    pub fn background_type(&self) -> BackgroundType {
        self.background_type.unwrap_or_default()
    }

    pub fn background_image_url(&self) -> Option<&str> {
        non_blank(self.background_image_url.as_deref())
    }

    pub fn overlay_opacity(&self) -> f64 {
        self.background_overlay_opacity
            .filter(|o| o.is_finite())
            .map(|o| o.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_OVERLAY_OPACITY)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ButtonInput {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
}

impl ListItem for LinkInput {
    const PLURAL: &'static str = "links";
}

impl ListItem for ButtonInput {
    const PLURAL: &'static str = "buttons";
}

const LINK_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Targets a visitor may be sent to: absolute `http`, `https`, `mailto` or
/// `tel` URLs, or an in-page `#fragment`.
pub fn is_safe_href(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.starts_with('#') {
        return true;
    }
    Url::parse(raw).is_ok_and(|url| LINK_SCHEMES.contains(&url.scheme()))
}

pub fn validate_links(links: &[LinkInput]) -> Result<(), BiolinkError> {
    for (pos, link) in links.iter().enumerate() {
        if link.title.trim().is_empty() || link.url.trim().is_empty() {
            return Err(BiolinkError::Validation(format!(
                "Each link must have a title and url (link {} is incomplete).",
                pos + 1
            )));
        }
        if !is_safe_href(&link.url) {
            return Err(unsupported_url("link", pos));
        }
    }
    Ok(())
}

pub fn validate_buttons(buttons: &[ButtonInput]) -> Result<(), BiolinkError> {
    for (pos, button) in buttons.iter().enumerate() {
        if button.label.trim().is_empty() || button.url.trim().is_empty() {
            return Err(BiolinkError::Validation(format!(
                "Each button must have a label and url (button {} is incomplete).",
                pos + 1
            )));
        }
        if !is_safe_href(&button.url) {
            return Err(unsupported_url("button", pos));
        }
    }
    Ok(())
}

fn unsupported_url(entity: &str, pos: usize) -> BiolinkError {
    BiolinkError::Validation(format!(
        "The url of {entity} {} must use http, https, mailto or tel, or be a #fragment.",
        pos + 1
    ))
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_defaults_fill_missing_background() {
        let input: ProfileInput = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.background_color(), "#000000");
        assert_eq!(input.background_type(), BackgroundType::Solid);
        assert_eq!(input.overlay_opacity(), 0.5);
        assert_eq!(input.background_image_url(), None);
    }

    #[test]
    fn profile_requires_name() {
        let input: ProfileInput = serde_json::from_str(r#"{"name":"   ","bio":"x"}"#).unwrap();
        assert!(matches!(input.validate(), Err(BiolinkError::Validation(_))));
    }

    #[test]
    fn overlay_opacity_is_clamped_and_zero_is_kept() {
        let mut input = ProfileInput {
            name: "Ada".into(),
            background_overlay_opacity: Some(3.0),
            ..Default::default()
        };
        assert_eq!(input.overlay_opacity(), 1.0);
        input.background_overlay_opacity = Some(0.0);
        assert_eq!(input.overlay_opacity(), 0.0);
    }

    #[test]
    fn incomplete_link_names_its_position() {
        let links = vec![
            LinkInput {
                title: "Blog".into(),
                url: "https://example.com".into(),
                icon_url: None,
            },
            LinkInput {
                title: "".into(),
                url: "https://example.org".into(),
                icon_url: None,
            },
        ];
        match validate_links(&links) {
            Err(BiolinkError::Validation(msg)) => assert!(msg.contains("link 2")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn client_order_index_is_ignored() {
        let buttons: Vec<ButtonInput> =
            serde_json::from_str(r##"[{"label":"Hi","url":"#top","order_index":7,"id":3}]"##).unwrap();
        assert_eq!(buttons.len(), 1);
        assert!(validate_buttons(&buttons).is_ok());
    }

    #[test]
    fn only_navigable_schemes_are_accepted() {
        for ok in [
            "https://example.com",
            "http://example.com/a?b=c",
            "mailto:me@example.com",
            "tel:+15551234",
            "#contact",
        ] {
            assert!(is_safe_href(ok), "{ok}");
        }
        for bad in [
            "javascript:alert(1)",
            " JavaScript:alert(1)",
            "data:text/html,<script>x</script>",
            "vbscript:msgbox",
            "/relative",
            "example.com",
        ] {
            assert!(!is_safe_href(bad), "{bad}");
        }
    }

    #[test]
    fn script_url_button_is_rejected() {
        let buttons = vec![ButtonInput {
            label: "Click".into(),
            url: "javascript:alert(document.cookie)".into(),
        }];
        match validate_buttons(&buttons) {
            Err(BiolinkError::Validation(msg)) => assert!(msg.contains("button 1")),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
