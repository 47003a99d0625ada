use serde::{Deserialize, Serialize};

use crate::defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_order: Option<i64>,
}

impl Link {
    pub fn is_pinned(&self) -> bool {
        self.pinned.unwrap_or(false)
    }

    pub fn has_embedded_icon(&self) -> bool {
        self.icon.as_deref().is_some_and(is_embedded_image)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStyle {
    #[default]
    Detailed,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Gemini,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEngine {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub title: String,
    pub nav_title: String,
    pub favicon: String,
    pub card_style: CardStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<AiConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_engines: Option<Vec<SearchEngine>>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        defaults::site_settings()
    }
}

/// The unit of synchronization between the dashboard and the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: SiteSettings,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SiteSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_config: Option<AiConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_engines: Option<Vec<SearchEngine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl SaveRequest {
    /// Settings as they should be persisted, with the top-level overrides folded in.
    pub fn effective_settings(&self) -> SiteSettings {
        let mut settings = self.settings.clone().unwrap_or_default();
        if let Some(ai_config) = &self.ai_config {
            settings.ai_config = Some(ai_config.clone());
        }
        if let Some(engines) = &self.search_engines {
            settings.search_engines = Some(engines.clone());
        }
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebDavConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub enabled: bool,
}

/// What gets written to the WebDAV server on backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupPayload {
    pub links: Vec<Link>,
    pub categories: Vec<Category>,
}

pub fn is_embedded_image(icon: &str) -> bool {
    icon.starts_with("data:image")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_uses_camel_case_on_the_wire() {
        let json = r#"{"id":"1","title":"GitHub","url":"https://github.com","categoryId":"dev","createdAt":5,"pinned":true,"pinnedOrder":2}"#;
        let link: Link = serde_json::from_str(json).unwrap();
        assert_eq!(link.category_id, "dev");
        assert_eq!(link.pinned_order, Some(2));
        assert!(link.is_pinned());

        let back = serde_json::to_value(&link).unwrap();
        assert_eq!(back["categoryId"], "dev");
        assert!(back.get("icon").is_none());
    }

    #[test]
    fn effective_settings_folds_overrides() {
        let req = SaveRequest {
            ai_config: Some(AiConfig {
                provider: AiProvider::Openai,
                api_key: "sk".into(),
                base_url: String::new(),
                model: "gpt-4o-mini".into(),
            }),
            search_engines: Some(vec![]),
            ..Default::default()
        };
        let settings = req.effective_settings();
        assert_eq!(settings.ai_config.unwrap().provider, AiProvider::Openai);
        assert_eq!(settings.search_engines, Some(vec![]));
        assert_eq!(settings.nav_title, "HaoNav");
    }

    #[test]
    fn partial_settings_fill_from_defaults() {
        let settings: SiteSettings = serde_json::from_str(r#"{"title":"Mine","cardStyle":"simple"}"#).unwrap();
        assert_eq!(settings.title, "Mine");
        assert_eq!(settings.card_style, CardStyle::Simple);
        assert_eq!(settings.nav_title, "HaoNav");
    }
}
