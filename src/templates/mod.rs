//! Built-in templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Autoescaping stays on
//! for every `.html` template since titles and paragraphs come from the CMS.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("message.html", include_str!("theme/message.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/comments.html",
                include_str!("theme/partials/comments.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub lang: String,
    /// Repository for the content preview toolbar
    pub preview_repository: Option<String>,
    pub comments: Option<CommentsData>,
    pub labels: LabelsData,
}

impl SiteData {
    pub fn from_config(config: &SiteConfig) -> Self {
        let comments = config.comments.repo.as_ref().map(|repo| CommentsData {
            repo: repo.clone(),
            issue_term: config.comments.issue_term.clone(),
            theme: config.comments.theme.clone(),
        });

        Self {
            title: config.title.clone(),
            lang: config.html_lang(),
            preview_repository: config.content.toolbar_repository().map(str::to_string),
            comments,
            labels: LabelsData {
                home: config.labels.home.clone(),
                load_more: config.labels.load_more.clone(),
                loading: config.labels.loading.clone(),
                edited_on: config.labels.edited_on.clone(),
                at: config.labels.at.clone(),
            },
        }
    }
}

/// Comment widget parameters
#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelsData {
    pub home: String,
    pub load_more: String,
    pub loading: String,
    pub edited_on: String,
    pub at: String,
}

/// Body of a loading, not-found or unavailable page
#[derive(Debug, Clone, Serialize)]
pub struct MessageData {
    pub title: String,
    pub message: String,
    /// Reload the page after this many seconds
    pub refresh: Option<u32>,
}
