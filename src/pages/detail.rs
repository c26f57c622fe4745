//! Post detail view

use serde::Serialize;

use crate::content::PostDetail;
use crate::helpers::{date_xml, section_anchor, DateFormatter};

/// A post, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub uid: String,
    pub title: String,
    pub banner_url: String,
    pub author: String,
    pub published: String,
    pub published_iso: String,
    pub reading_time: String,
    pub edited: Option<EditedView>,
    pub sections: Vec<SectionView>,
}

/// "edited on {date}, at {time}"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditedView {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionView {
    /// Unique within the post
    pub anchor: String,
    pub heading: String,
    pub paragraphs: Vec<String>,
}

impl PostView {
    pub fn build(post: &PostDetail, formatter: &DateFormatter, reading_time: &str) -> Self {
        let edited = post.edited_at().map(|at| EditedView {
            date: formatter.date(&at),
            time: formatter.time(&at),
        });

        let sections = post
            .content
            .iter()
            .enumerate()
            .map(|(i, block)| SectionView {
                anchor: section_anchor(i, &block.heading),
                heading: block.heading.clone(),
                paragraphs: block.body.iter().map(|p| p.text.clone()).collect(),
            })
            .collect();

        Self {
            uid: post.uid.clone(),
            title: post.title.clone(),
            banner_url: post.banner_url.clone(),
            author: post.author.clone(),
            published: formatter.optional_date(post.first_publication_date.as_ref()),
            published_iso: post
                .first_publication_date
                .as_ref()
                .map(date_xml)
                .unwrap_or_default(),
            reading_time: reading_time.to_string(),
            edited,
            sections,
        }
    }
}
