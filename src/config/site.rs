//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::content::ContentSettings;

/// Environment variable that overrides the content service endpoint
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";

/// Environment variable that overrides the content service access token
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub timezone: String,

    // Date / Time format
    pub date_format: String,
    pub time_format: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,

    // Home page
    #[serde(default)]
    pub home: HomeConfig,

    // Rendering
    /// Seconds a rendered page stays fresh
    pub revalidate: u64,
    /// Seconds an on-demand render may take before it is abandoned
    pub fallback_timeout: u64,
    pub reading_time: String,

    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling.".to_string(),
            language: "en_US".to_string(),
            timezone: "UTC".to_string(),

            date_format: "DD MMM YYYY".to_string(),
            time_format: "HH:mm".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),

            home: HomeConfig::default(),

            revalidate: 60 * 60,
            fallback_timeout: 10,
            reading_time: "4 min".to_string(),

            content: ContentConfig::default(),
            comments: CommentsConfig::default(),
            labels: LabelsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// `lang` attribute for the html element ("en_US" -> "en-US")
    pub fn html_lang(&self) -> String {
        self.language.replace('_', "-")
    }
}

/// Home page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub page_size: u32,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self { page_size: 2 }
    }
}

/// Content service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Repository name, used to derive the endpoint and for the preview toolbar
    pub repository: Option<String>,
    /// Full API endpoint, e.g. https://my-repo.cdn.prismic.io/api/v2
    pub endpoint: Option<String>,
    pub access_token: Option<String>,
    pub preview_toolbar: bool,
}

impl ContentConfig {
    /// Resolve endpoint and credential from the process environment and this file
    pub fn resolve(&self) -> Result<ContentSettings> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve with an explicit environment lookup
    ///
    /// Precedence: environment, then `endpoint`, then `repository`.
    pub fn resolve_with<F>(&self, env: F) -> Result<ContentSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = env(ENDPOINT_ENV)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.endpoint.clone())
            .or_else(|| {
                self.repository
                    .as_ref()
                    .map(|repo| format!("https://{}.cdn.prismic.io/api/v2", repo))
            })
            .with_context(|| {
                format!(
                    "No content endpoint configured: set content.endpoint, content.repository or {}",
                    ENDPOINT_ENV
                )
            })?;

        let access_token = env(ACCESS_TOKEN_ENV)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.access_token.clone());

        ContentSettings::new(&endpoint, access_token)
            .with_context(|| format!("Invalid content endpoint: {}", endpoint))
    }

    /// Repository name for the preview toolbar, when it should be shown
    pub fn toolbar_repository(&self) -> Option<&str> {
        if self.preview_toolbar {
            self.repository.as_deref()
        } else {
            None
        }
    }
}

/// Comment widget configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// GitHub repository ("owner/name"); no widget when unset
    pub repo: Option<String>,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: None,
            issue_term: "pathname".to_string(),
            theme: "github-dark".to_string(),
        }
    }
}

/// User-visible strings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    pub home: String,
    pub load_more: String,
    pub loading: String,
    pub edited_on: String,
    pub at: String,
    pub not_found: String,
    pub unavailable: String,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            home: "Home".to_string(),
            load_more: "Load more posts".to_string(),
            loading: "Loading...".to_string(),
            edited_on: "edited on".to_string(),
            at: "at".to_string(),
            not_found: "Post not found".to_string(),
            unavailable: "This post is temporarily unavailable".to_string(),
        }
    }
}
