//! Post models and their mapping from service documents

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::client::without_access_token;
use super::document::{ContentBlockData, Document, PostData, PostSummaryData, SearchResponse};

/// A post as shown in the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl PostSummary {
    /// Map a summary document; `None` when it has no uid to route to
    pub fn from_document(doc: Document<PostSummaryData>) -> Option<Self> {
        let uid = routable_uid(doc.uid, &doc.id)?;
        Some(Self {
            uid,
            first_publication_date: doc.first_publication_date,
            title: doc.data.title.unwrap_or_default(),
            subtitle: doc.data.subtitle.unwrap_or_default(),
            author: doc.data.author.unwrap_or_default(),
        })
    }
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub content: Vec<ContentBlock>,
}

impl PostDetail {
    /// Map a full post document; `None` when it has no uid to route to
    pub fn from_document(doc: Document<PostData>) -> Option<Self> {
        let uid = routable_uid(doc.uid, &doc.id)?;
        let data = doc.data;
        Some(Self {
            uid,
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: data.title.unwrap_or_default(),
            banner_url: data.banner.and_then(|b| b.url).unwrap_or_default(),
            author: data.author.unwrap_or_default(),
            content: data
                .content
                .unwrap_or_default()
                .into_iter()
                .map(ContentBlock::from_data)
                .collect(),
        })
    }

    /// Whether the post was republished after its first publication
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        match self.last_publication_date {
            Some(last) if self.first_publication_date != Some(last) => Some(last),
            _ => None,
        }
    }
}

/// A heading followed by its paragraphs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: Vec<Paragraph>,
}

impl ContentBlock {
    fn from_data(data: ContentBlockData) -> Self {
        Self {
            heading: data.heading.unwrap_or_default(),
            body: data
                .body
                .unwrap_or_default()
                .into_iter()
                .map(|p| Paragraph {
                    text: p.text.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub text: String,
}

/// A page of post summaries plus the URL of the next page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostsPage {
    pub next_page: Option<String>,
    pub results: Vec<PostSummary>,
}

impl PostsPage {
    /// Map a search response, keeping the service's order
    pub fn from_response(response: SearchResponse<PostSummaryData>) -> Self {
        Self {
            next_page: response
                .next_page
                .filter(|url| !url.is_empty())
                .map(|url| without_access_token(&url)),
            results: response
                .results
                .into_iter()
                .filter_map(PostSummary::from_document)
                .collect(),
        }
    }
}

fn routable_uid(uid: Option<String>, id: &str) -> Option<String> {
    match uid {
        Some(uid) if !uid.is_empty() => Some(uid),
        _ => {
            tracing::warn!("Skipping document {} without uid", id);
            None
        }
    }
}
