//! Typed per-widget configuration.
//!
//! Instance config is stored as a JSON object. Every write goes through
//! [`WidgetConfig::parse`], which picks the variant for the instance's widget
//! slug, rejects unknown keys and out-of-range values, and fills defaults.
//! Widget slugs without a typed variant keep a free-form object.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::PlacementError;

/// Slugs of the widgets with a typed configuration.
pub mod widget_slugs {
    pub const HERO: &str = "hero";
    pub const TEXT: &str = "text";
    pub const DONATIONS_LIST: &str = "donations_list";
    pub const TOP_DONORS: &str = "top_donors";
    pub const EVENTS: &str = "events";
    pub const NEWS: &str = "news";
    pub const CONTACT_FORM: &str = "contact_form";
    pub const IMAGE_GALLERY: &str = "image_gallery";
    pub const NEWSLETTER: &str = "newsletter";

    pub const ALL: &[&str] = &[
        HERO,
        TEXT,
        DONATIONS_LIST,
        TOP_DONORS,
        EVENTS,
        NEWS,
        CONTACT_FORM,
        IMAGE_GALLERY,
        NEWSLETTER,
    ];
}

// ---------------------------------------------------------------------------
// Variant field sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct HeroConfig {
    #[validate(length(max = 120))]
    pub title: String,
    #[validate(length(max = 240))]
    pub subtitle: Option<String>,
    #[validate(url)]
    pub background_image: Option<String>,
    #[validate(length(max = 40))]
    pub cta_label: Option<String>,
    #[validate(url)]
    pub cta_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    #[validate(length(max = 120))]
    pub heading: Option<String>,
    #[validate(length(max = 20000))]
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct DonationsListConfig {
    pub campaign_id: Option<i64>,
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
    pub show_amounts: bool,
}

impl Default for DonationsListConfig {
    fn default() -> Self {
        Self {
            campaign_id: None,
            limit: 5,
            show_amounts: true,
        }
    }
}

/// Time window a donor leaderboard aggregates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorPeriod {
    #[default]
    AllTime,
    Year,
    Month,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct TopDonorsConfig {
    #[validate(range(min = 1, max = 25))]
    pub limit: u32,
    pub period: DonorPeriod,
    pub anonymize: bool,
}

impl Default for TopDonorsConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            period: DonorPeriod::AllTime,
            anonymize: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
    pub show_past: bool,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            show_past: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct NewsConfig {
    #[validate(range(min = 1, max = 50))]
    pub limit: u32,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    pub show_excerpt: bool,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            limit: 3,
            category: None,
            show_excerpt: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ContactFormConfig {
    #[validate(email)]
    pub recipient_email: Option<String>,
    #[validate(length(max = 240))]
    pub success_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct GalleryImage {
    #[validate(url)]
    pub url: String,
    #[serde(default)]
    #[validate(length(max = 240))]
    pub caption: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ImageGalleryConfig {
    #[validate(length(max = 50))]
    #[validate(nested)]
    pub images: Vec<GalleryImage>,
    #[validate(range(min = 1, max = 6))]
    pub columns: u32,
}

impl Default for ImageGalleryConfig {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            columns: 3,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct NewsletterConfig {
    #[validate(length(max = 120))]
    pub heading: Option<String>,
    #[validate(length(max = 40))]
    pub button_label: Option<String>,
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Configuration of one site widget instance, keyed by widget slug.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetConfig {
    Hero(HeroConfig),
    Text(TextConfig),
    DonationsList(DonationsListConfig),
    TopDonors(TopDonorsConfig),
    Events(EventsConfig),
    News(NewsConfig),
    ContactForm(ContactFormConfig),
    ImageGallery(ImageGalleryConfig),
    Newsletter(NewsletterConfig),
    /// Widget without a typed schema; any JSON object is accepted.
    Custom {
        widget_slug: String,
        fields: Map<String, Value>,
    },
}

fn invalid(widget_slug: &str, message: impl Into<String>) -> PlacementError {
    PlacementError::InvalidConfig {
        widget: widget_slug.to_string(),
        message: message.into(),
    }
}

fn typed<T: DeserializeOwned + Validate>(
    widget_slug: &str,
    value: &Value,
) -> Result<T, PlacementError> {
    let parsed: T =
        serde_json::from_value(value.clone()).map_err(|e| invalid(widget_slug, e.to_string()))?;
    parsed
        .validate()
        .map_err(|e| invalid(widget_slug, e.to_string()))?;
    Ok(parsed)
}

impl WidgetConfig {
    /// Parse and validate `value` as the configuration of `widget_slug`.
    pub fn parse(widget_slug: &str, value: &Value) -> Result<Self, PlacementError> {
        let Some(fields) = value.as_object() else {
            return Err(invalid(widget_slug, "config must be a JSON object"));
        };

        let config = match widget_slug {
            widget_slugs::HERO => Self::Hero(typed(widget_slug, value)?),
            widget_slugs::TEXT => Self::Text(typed(widget_slug, value)?),
            widget_slugs::DONATIONS_LIST => Self::DonationsList(typed(widget_slug, value)?),
            widget_slugs::TOP_DONORS => Self::TopDonors(typed(widget_slug, value)?),
            widget_slugs::EVENTS => Self::Events(typed(widget_slug, value)?),
            widget_slugs::NEWS => Self::News(typed(widget_slug, value)?),
            widget_slugs::CONTACT_FORM => Self::ContactForm(typed(widget_slug, value)?),
            widget_slugs::IMAGE_GALLERY => Self::ImageGallery(typed(widget_slug, value)?),
            widget_slugs::NEWSLETTER => Self::Newsletter(typed(widget_slug, value)?),
            other => Self::Custom {
                widget_slug: other.to_string(),
                fields: fields.clone(),
            },
        };
        Ok(config)
    }

    /// Canonical JSON object for storage, defaults filled in.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::Hero(c) => serde_json::to_value(c),
            Self::Text(c) => serde_json::to_value(c),
            Self::DonationsList(c) => serde_json::to_value(c),
            Self::TopDonors(c) => serde_json::to_value(c),
            Self::Events(c) => serde_json::to_value(c),
            Self::News(c) => serde_json::to_value(c),
            Self::ContactForm(c) => serde_json::to_value(c),
            Self::ImageGallery(c) => serde_json::to_value(c),
            Self::Newsletter(c) => serde_json::to_value(c),
            Self::Custom { fields, .. } => Ok(Value::Object(fields.clone())),
        }
    }
}

/// Validate `value` for `widget_slug` and return its canonical form.
pub fn normalize(widget_slug: &str, value: &Value) -> Result<Value, PlacementError> {
    WidgetConfig::parse(widget_slug, value)?
        .to_value()
        .map_err(|e| invalid(widget_slug, e.to_string()))
}

/// Shallow-merge `partial` over `existing`.
///
/// Top-level keys in `partial` replace those in `existing`; nested objects
/// are replaced whole. A non-object `existing` is treated as empty.
pub fn merge_config(
    widget_slug: &str,
    existing: &Value,
    partial: &Value,
) -> Result<Value, PlacementError> {
    let Some(patch) = partial.as_object() else {
        return Err(invalid(widget_slug, "config patch must be a JSON object"));
    };
    let mut merged = existing.as_object().cloned().unwrap_or_default();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_empty_object_is_valid_for_every_typed_widget() {
        for slug in widget_slugs::ALL {
            assert!(WidgetConfig::parse(slug, &json!({})).is_ok(), "{slug}");
        }
    }

    #[test]
    fn test_normalize_fills_defaults() {
        let value = normalize("top_donors", &json!({"limit": 3})).unwrap();
        assert_eq!(value["limit"], 3);
        assert_eq!(value["period"], "all_time");
        assert_eq!(value["anonymize"], false);
    }

    #[test]
    fn test_non_object_rejected() {
        assert_matches!(
            WidgetConfig::parse("hero", &json!([1, 2])),
            Err(PlacementError::InvalidConfig { .. })
        );
        assert_matches!(
            WidgetConfig::parse("unknown_widget", &json!("text")),
            Err(PlacementError::InvalidConfig { .. })
        );
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = WidgetConfig::parse("hero", &json!({"titel": "typo"})).unwrap_err();
        assert_eq!(err.kind(), "INVALID_CONFIG");
        assert!(err.to_string().contains("titel"));
    }

    #[test]
    fn test_wrong_type_rejected() {
        assert!(WidgetConfig::parse("events", &json!({"limit": "ten"})).is_err());
    }

    #[test]
    fn test_range_validation() {
        assert!(WidgetConfig::parse("donations_list", &json!({"limit": 50})).is_ok());
        assert!(WidgetConfig::parse("donations_list", &json!({"limit": 51})).is_err());
        assert!(WidgetConfig::parse("donations_list", &json!({"limit": 0})).is_err());
    }

    #[test]
    fn test_length_and_url_validation() {
        let long_title = "x".repeat(121);
        assert!(WidgetConfig::parse("hero", &json!({"title": long_title})).is_err());
        assert!(WidgetConfig::parse("hero", &json!({"cta_url": "not a url"})).is_err());
        assert!(WidgetConfig::parse("hero", &json!({"cta_url": "https://example.org/give"})).is_ok());
    }

    #[test]
    fn test_email_validation() {
        assert!(WidgetConfig::parse("contact_form", &json!({"recipient_email": "office@school.edu"})).is_ok());
        assert!(WidgetConfig::parse("contact_form", &json!({"recipient_email": "nope"})).is_err());
    }

    #[test]
    fn test_nested_gallery_validation() {
        let ok = json!({"images": [{"url": "https://cdn.example.org/a.jpg"}], "columns": 2});
        assert_matches!(
            WidgetConfig::parse("image_gallery", &ok),
            Ok(WidgetConfig::ImageGallery(ImageGalleryConfig { columns: 2, .. }))
        );
        let bad = json!({"images": [{"url": "relative/a.jpg"}]});
        assert!(WidgetConfig::parse("image_gallery", &bad).is_err());
    }

    #[test]
    fn test_custom_widget_keeps_fields() {
        let value = json!({"anything": [1, 2, 3], "flag": true});
        let config = WidgetConfig::parse("partner_logos", &value).unwrap();
        assert_matches!(&config, WidgetConfig::Custom { widget_slug, .. } if widget_slug == "partner_logos");
        assert_eq!(config.to_value().unwrap(), value);
    }

    #[test]
    fn test_merge_is_shallow() {
        let existing = json!({"title": "Welcome", "subtitle": "Old"});
        let merged = merge_config("hero", &existing, &json!({"subtitle": "New"})).unwrap();
        assert_eq!(merged, json!({"title": "Welcome", "subtitle": "New"}));

        let existing = json!({"images": [{"url": "https://a.org/1.jpg"}], "columns": 4});
        let merged = merge_config("image_gallery", &existing, &json!({"images": []})).unwrap();
        assert_eq!(merged, json!({"images": [], "columns": 4}));
    }

    #[test]
    fn test_merge_rejects_non_object_patch() {
        assert!(merge_config("hero", &json!({}), &json!(null)).is_err());
    }

    #[test]
    fn test_merge_over_non_object_existing() {
        let merged = merge_config("text", &json!(null), &json!({"body": "Hi"})).unwrap();
        assert_eq!(merged, json!({"body": "Hi"}));
    }
}
