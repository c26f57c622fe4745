//! List posts from the content service

use anyhow::Result;
use std::io::Write;

use crate::content::PostSource;
use crate::helpers::DateFormatter;
use crate::pages::{ListLinks, PostList};
use crate::Blog;

/// Print the first page of posts, or every page with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let client = blog.content_client()?;
    let formatter = DateFormatter::from_config(&blog.config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    print_posts(&client, blog.config.home.page_size, all, &formatter, &mut out).await
}

/// Write posts to `out`, loading further pages while `all` is set
pub async fn print_posts<S, W>(
    source: &S,
    page_size: u32,
    all: bool,
    formatter: &DateFormatter,
    out: &mut W,
) -> Result<()>
where
    S: PostSource + ?Sized,
    W: Write,
{
    let mut list = PostList::new(source.first_posts(page_size).await?);

    if all {
        while list.has_more() {
            if !list.load_more(source).await {
                anyhow::bail!("Stopped after {} posts: could not load the next page", list.posts().len());
            }
        }
    }

    writeln!(out, "Posts ({}):", list.posts().len())?;
    for card in list.view(formatter, ListLinks::Live).posts {
        writeln!(
            out,
            "  {} - {} by {} [{}]",
            if card.published.is_empty() { "-" } else { card.published.as_str() },
            card.title,
            card.author,
            card.href
        )?;
    }
    if let Some(next) = list.next_page() {
        writeln!(out, "More posts at {}", next)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentError, PostDetail, PostSummary, PostsPage};
    use async_trait::async_trait;

    struct TwoPages;

    fn summary(uid: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: None,
            title: uid.to_uppercase(),
            subtitle: String::new(),
            author: "Ana".to_string(),
        }
    }

    #[async_trait]
    impl PostSource for TwoPages {
        async fn first_posts(&self, _page_size: u32) -> crate::content::Result<PostsPage> {
            Ok(PostsPage {
                next_page: Some("page-2".to_string()),
                results: vec![summary("a"), summary("b")],
            })
        }

        async fn next_posts(&self, next_page: &str) -> crate::content::Result<PostsPage> {
            match next_page {
                "page-2" => Ok(PostsPage {
                    next_page: None,
                    results: vec![summary("c")],
                }),
                other => Err(ContentError::ForeignPage(other.to_string())),
            }
        }

        async fn post_slugs(&self) -> crate::content::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn post_by_slug(&self, _slug: &str) -> crate::content::Result<Option<PostDetail>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_first_page_only() {
        let mut out = Vec::new();
        print_posts(&TwoPages, 2, false, &DateFormatter::default(), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Posts (2):"));
        assert!(text.contains("More posts at page-2"));
    }

    #[tokio::test]
    async fn test_all_pages() {
        let mut out = Vec::new();
        print_posts(&TwoPages, 2, true, &DateFormatter::default(), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Posts (3):"));
        let a = text.find("A by").unwrap();
        let c = text.find("C by").unwrap();
        assert!(a < c);
        assert!(!text.contains("More posts"));
        assert!(text.contains("  - - A by Ana [/post/a]"));
    }
}
