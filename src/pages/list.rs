//! Post list with incremental loading

use serde::Serialize;

use crate::content::{PostSource, PostSummary, PostsPage};
use crate::helpers::{next_posts_path, post_path, snapshot_page_path, DateFormatter};

/// Where the browser fetches the list page after the one it shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListLinks {
    /// Through the server's `/api/posts/next` endpoint
    #[default]
    Live,
    /// Pre-generated `/api/posts/page-N.json` files
    Snapshot,
}

impl ListLinks {
    /// Link to the page after page `number`, whose service cursor is `cursor`
    pub fn next(self, number: usize, cursor: Option<&str>) -> Option<String> {
        let cursor = cursor?;
        Some(match self {
            ListLinks::Live => next_posts_path(cursor),
            ListLinks::Snapshot => snapshot_page_path(number + 1),
        })
    }
}

/// The posts shown so far and the cursor to the next page
///
/// Loading is append-only: results are never re-sorted or de-duplicated,
/// so a uid the service returns twice is listed twice.
#[derive(Debug, Clone)]
pub struct PostList {
    posts: Vec<PostSummary>,
    next_page: Option<String>,
    pages_loaded: usize,
}

impl PostList {
    pub fn new(initial: PostsPage) -> Self {
        Self {
            posts: initial.results,
            next_page: initial.next_page,
            pages_loaded: 1,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    /// Service cursor of the next page
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Number of pages shown, counting the first
    pub fn pages_loaded(&self) -> usize {
        self.pages_loaded
    }

    /// Whether the "load more" control should be shown
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Append a fetched page and advance the cursor
    pub fn append(&mut self, page: PostsPage) {
        self.posts.extend(page.results);
        self.next_page = page.next_page;
        self.pages_loaded += 1;
    }

    /// Fetch the next page and append it
    ///
    /// Returns whether anything was loaded. Failures are logged and leave
    /// the list and cursor as they were.
    pub async fn load_more<S>(&mut self, source: &S) -> bool
    where
        S: PostSource + ?Sized,
    {
        let Some(next_page) = self.next_page.clone() else {
            return false;
        };

        match source.next_posts(&next_page).await {
            Ok(page) => {
                tracing::debug!("Loaded {} more posts", page.results.len());
                self.append(page);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load more posts from {}: {}", next_page, e);
                false
            }
        }
    }

    pub fn view(&self, formatter: &DateFormatter, links: ListLinks) -> PostListView {
        let next = links.next(self.pages_loaded, self.next_page());
        PostListView::build(&self.posts, next, formatter)
    }
}

/// A post card, ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCardView {
    pub uid: String,
    pub href: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Formatted first publication date, empty when unknown
    pub published: String,
}

impl PostCardView {
    pub fn build(post: &PostSummary, formatter: &DateFormatter) -> Self {
        Self {
            uid: post.uid.clone(),
            href: post_path(&post.uid),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            published: formatter.optional_date(post.first_publication_date.as_ref()),
        }
    }
}

/// Cards plus the link to the next page; also the body of the load-more
/// endpoint and of the snapshot page files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostListView {
    pub posts: Vec<PostCardView>,
    pub next_page: Option<String>,
}

impl PostListView {
    pub fn build(posts: &[PostSummary], next_page: Option<String>, formatter: &DateFormatter) -> Self {
        Self {
            posts: posts
                .iter()
                .map(|p| PostCardView::build(p, formatter))
                .collect(),
            next_page,
        }
    }

    /// View of page `number` of the list
    pub fn from_page(
        page: &PostsPage,
        number: usize,
        formatter: &DateFormatter,
        links: ListLinks,
    ) -> Self {
        let next = links.next(number, page.next_page.as_deref());
        Self::build(&page.results, next, formatter)
    }
}
