//! Post queries the pages are built from

use async_trait::async_trait;
use std::collections::HashSet;

use super::client::{ContentClient, Predicate, QueryOptions};
use super::document::{PostData, PostSummaryData, SearchResponse};
use super::error::Result;
use super::post::{PostDetail, PostsPage};

/// Document type of blog posts
pub const POST_TYPE: &str = "posts";

/// Fields fetched for the post list
pub const SUMMARY_FIELDS: [&str; 3] = ["posts.title", "posts.subtitle", "posts.author"];

/// Page size used when enumerating every post
const ENUMERATION_PAGE_SIZE: u32 = 100;

/// Where posts come from
#[async_trait]
pub trait PostSource: Send + Sync {
    /// First page of post summaries, in service order
    async fn first_posts(&self, page_size: u32) -> Result<PostsPage>;

    /// The page behind a `next_page` URL
    async fn next_posts(&self, next_page: &str) -> Result<PostsPage>;

    /// Uids of every post
    async fn post_slugs(&self) -> Result<Vec<String>>;

    /// A single post, `None` if no post has this uid
    async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>>;
}

#[async_trait]
impl PostSource for ContentClient {
    async fn first_posts(&self, page_size: u32) -> Result<PostsPage> {
        let options = QueryOptions {
            fetch: SUMMARY_FIELDS.iter().map(|f| f.to_string()).collect(),
            page_size: Some(page_size),
            page: None,
        };
        let response: SearchResponse<PostSummaryData> = self
            .query(&[Predicate::at("document.type", POST_TYPE)], &options)
            .await?;
        Ok(PostsPage::from_response(response))
    }

    async fn next_posts(&self, next_page: &str) -> Result<PostsPage> {
        let response: SearchResponse<PostSummaryData> = self.get_page(next_page).await?;
        Ok(PostsPage::from_response(response))
    }

    async fn post_slugs(&self) -> Result<Vec<String>> {
        let options = QueryOptions {
            fetch: SUMMARY_FIELDS.iter().map(|f| f.to_string()).collect(),
            page_size: Some(ENUMERATION_PAGE_SIZE),
            page: None,
        };
        let first: SearchResponse<PostSummaryData> = self
            .query(&[Predicate::at("document.type", POST_TYPE)], &options)
            .await?;

        let mut page = PostsPage::from_response(first);
        let mut slugs: Vec<String> = Vec::new();
        let mut visited = HashSet::new();
        loop {
            slugs.extend(page.results.into_iter().map(|p| p.uid));
            match page.next_page {
                Some(next) if visited.insert(next.clone()) => {
                    page = self.next_posts(&next).await?
                }
                Some(next) => {
                    tracing::warn!("Post pages loop back to {}; stopping enumeration", next);
                    break;
                }
                None => break,
            }
        }
        tracing::debug!("Enumerated {} post slugs", slugs.len());
        Ok(slugs)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<PostDetail>> {
        let doc = self.get_by_uid::<PostData>(POST_TYPE, slug).await?;
        Ok(doc.and_then(PostDetail::from_document))
    }
}
