//! User settings persisted next to the session: backend credentials,
//! prompt template overrides and the last visited page.

use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{AppResult, ValidationError};
use crate::prompts::{DEFAULT_MODEL, DEFAULT_QUESTIONS_PROMPT, DEFAULT_RESUME_PROMPT};
use crate::storage::{keys, KeyValueStore};

/// Resolved settings. Missing values fall back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub questions_prompt: String,
    pub resume_prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            questions_prompt: DEFAULT_QUESTIONS_PROMPT.to_string(),
            resume_prompt: DEFAULT_RESUME_PROMPT.to_string(),
        }
    }
}

impl Settings {
    /// API key with all but the last four characters hidden.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(|key| {
            let chars: Vec<char> = key.chars().collect();
            let visible = chars.len().min(4);
            let hidden = chars.len() - visible;
            std::iter::repeat('*')
                .take(hidden)
                .chain(chars[hidden..].iter().copied())
                .collect()
        })
    }
}

/// Navigable pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Dashboard,
    Analyzer,
    Enhancement,
    Settings,
}

impl Page {
    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Analyzer => "analyzer",
            Page::Enhancement => "enhancement",
            Page::Settings => "settings",
        }
    }
}

impl FromStr for Page {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "analyzer" => Ok(Page::Analyzer),
            "enhancement" => Ok(Page::Enhancement),
            "settings" => Ok(Page::Settings),
            _ => Err(ValidationError::UnknownPage {
                page: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads and writes [`Settings`] and the current [`Page`].
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Resolve settings, applying defaults for missing or blank values.
    pub async fn load(&self) -> AppResult<Settings> {
        let defaults = Settings::default();
        Ok(Settings {
            api_key: self.get_non_blank(keys::API_KEY).await?,
            model: self
                .get_non_blank(keys::MODEL)
                .await?
                .unwrap_or(defaults.model),
            questions_prompt: self
                .get_non_blank(keys::QUESTIONS_PROMPT)
                .await?
                .unwrap_or(defaults.questions_prompt),
            resume_prompt: self
                .get_non_blank(keys::RESUME_PROMPT)
                .await?
                .unwrap_or(defaults.resume_prompt),
        })
    }

    /// Store the API key (trimmed; blank removes it) and model.
    pub async fn save_api_settings(&self, api_key: &str, model: Option<&str>) -> AppResult<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            self.store.remove(keys::API_KEY).await?;
        } else {
            self.store.set(keys::API_KEY, api_key).await?;
        }

        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL);
        self.store.set(keys::MODEL, model).await?;

        info!(model = %model, api_key_set = !api_key.is_empty(), "API settings saved");
        Ok(())
    }

    pub async fn save_questions_prompt(&self, template: &str) -> AppResult<()> {
        self.save_prompt(keys::QUESTIONS_PROMPT, "questions", template)
            .await
    }

    pub async fn save_resume_prompt(&self, template: &str) -> AppResult<()> {
        self.save_prompt(keys::RESUME_PROMPT, "resume", template).await
    }

    async fn save_prompt(&self, key: &str, name: &str, template: &str) -> AppResult<()> {
        let template = template.trim();
        if template.is_empty() {
            return Err(ValidationError::EmptyPromptTemplate {
                template: name.to_string(),
            }
            .into());
        }
        self.store.set(key, template).await?;
        info!(template = name, length = template.len(), "Prompt template saved");
        Ok(())
    }

    /// Last visited page; unknown or missing values resolve to the dashboard.
    pub async fn current_page(&self) -> AppResult<Page> {
        let page = self
            .store
            .get(keys::CURRENT_PAGE)
            .await?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        Ok(page)
    }

    pub async fn set_current_page(&self, page: Page) -> AppResult<()> {
        self.store.set(keys::CURRENT_PAGE, page.as_str()).await?;
        debug!(page = %page, "Current page saved");
        Ok(())
    }

    async fn get_non_blank(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self
            .store
            .get(key)
            .await?
            .filter(|value| !value.trim().is_empty()))
    }
}
