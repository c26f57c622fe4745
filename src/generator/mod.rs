//! Generator module - builds pages from the content service and writes the
//! static snapshot

mod pages;

pub use pages::{PageBuilder, PageStatus, RenderedPage, Route};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

use crate::content::PostSource;
use crate::helpers::{is_safe_slug, snapshot_page_path};
use crate::pages::{ListLinks, PostList, PostListView};
use crate::Blog;

/// Post pages fetched concurrently during generation
const POST_FETCH_CONCURRENCY: usize = 8;

/// Summary of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub posts: usize,
    /// List pages after the first, written as JSON
    pub list_pages: usize,
    pub skipped: Vec<String>,
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    blog: Blog,
    pages: PageBuilder,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog, source: Arc<dyn PostSource>) -> Result<Self> {
        let pages = PageBuilder::new(&blog.config, source)?.with_links(ListLinks::Snapshot);
        Ok(Self {
            blog: blog.clone(),
            pages,
        })
    }

    /// Generate the entire site
    ///
    /// Any content service failure aborts the run.
    pub async fn generate(&self) -> Result<GenerateReport> {
        fs::create_dir_all(&self.blog.public_dir)?;

        let mut report = GenerateReport {
            assets: self.copy_static_assets()?,
            ..Default::default()
        };

        let list = self
            .pages
            .initial_list()
            .await
            .context("Failed to generate the post list")?;
        self.write_page(Path::new("index.html"), &self.pages.render_list(&list)?)?;
        report.list_pages = self.write_list_pages(&list).await?;

        let slugs = self
            .pages
            .source()
            .post_slugs()
            .await
            .context("Failed to enumerate posts")?;

        let (slugs, unsafe_slugs): (Vec<_>, Vec<_>) =
            slugs.into_iter().partition(|s| is_safe_slug(s));
        for slug in unsafe_slugs {
            tracing::warn!("Skipping post with unusable slug {:?}", slug);
            report.skipped.push(slug);
        }

        let pages = &self.pages;
        let built: Vec<(String, Result<RenderedPage>)> = stream::iter(slugs)
            .map(|slug| async move {
                let page = pages.build(&Route::Post(slug.clone())).await;
                (slug, page)
            })
            .buffer_unordered(POST_FETCH_CONCURRENCY)
            .collect()
            .await;

        for (slug, page) in built {
            let page = page.with_context(|| format!("Failed to generate post {}", slug))?;
            if page.status == PageStatus::NotFound {
                tracing::warn!("Post {} disappeared during generation", slug);
                report.skipped.push(slug);
                continue;
            }
            let output = Path::new("post").join(&slug).join("index.html");
            self.write_page(&output, &page.html)?;
            report.posts += 1;
        }

        let not_found = self.pages.render_not_found()?;
        self.write_page(Path::new("404.html"), &not_found)?;

        Ok(report)
    }

    /// Follow the list cursor and write every later page as JSON, so the
    /// load-more control works without a server
    async fn write_list_pages(&self, list: &PostList) -> Result<usize> {
        let mut cursor = list.next_page().map(str::to_string);
        let mut seen = HashSet::new();
        let mut number = list.pages_loaded();
        let mut written = 0;

        while let Some(next) = cursor {
            if !seen.insert(next.clone()) {
                anyhow::bail!("Post list pages loop back to {}", next);
            }
            number += 1;
            let page = self
                .pages
                .source()
                .next_posts(&next)
                .await
                .with_context(|| format!("Failed to fetch post list page {}", number))?;

            let view =
                PostListView::from_page(&page, number, self.pages.formatter(), ListLinks::Snapshot);
            let path = snapshot_page_path(number);
            self.write_page(Path::new(path.trim_start_matches('/')), &serde_json::to_string(&view)?)?;
            written += 1;

            cursor = page.next_page;
        }

        Ok(written)
    }

    fn write_page(&self, relative: &Path, contents: &str) -> Result<()> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, contents)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy static assets (images, styles, favicon) to the public directory
    fn copy_static_assets(&self) -> Result<usize> {
        let static_dir = &self.blog.static_dir;
        if !static_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(static_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            copied += 1;
        }

        Ok(copied)
    }
}
