//! Content module - client, wire schema and post models

mod client;
pub mod document;
mod error;
mod post;
mod source;

pub use client::{query_string, ContentClient, ContentSettings, Predicate, QueryOptions};
pub use error::{ContentError, Result};
pub use post::{ContentBlock, Paragraph, PostDetail, PostSummary, PostsPage};
pub use source::{PostSource, POST_TYPE, SUMMARY_FIELDS};
