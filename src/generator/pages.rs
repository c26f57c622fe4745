//! Fetch-and-render of individual routes

use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use tera::Context;

use crate::config::{LabelsConfig, SiteConfig};
use crate::content::{PostDetail, PostSource};
use crate::helpers::{post_path, DateFormatter, HOME_PATH};
use crate::pages::{ListLinks, PostList, PostView};
use crate::templates::{MessageData, SiteData, TemplateRenderer};

/// Seconds between reloads of the loading placeholder
const LOADING_REFRESH_SECS: u32 = 1;

/// A page route
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Post(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Post(slug) => post_path(slug),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    NotFound,
}

/// Rendered HTML and whether it represents existing content
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub status: PageStatus,
    pub html: String,
}

/// Builds pages from a post source
pub struct PageBuilder {
    source: Arc<dyn PostSource>,
    renderer: TemplateRenderer,
    formatter: DateFormatter,
    site: SiteData,
    labels: LabelsConfig,
    page_size: u32,
    reading_time: String,
    links: ListLinks,
}

impl PageBuilder {
    pub fn new(config: &SiteConfig, source: Arc<dyn PostSource>) -> Result<Self> {
        Ok(Self {
            source,
            renderer: TemplateRenderer::new()?,
            formatter: DateFormatter::from_config(config)?,
            site: SiteData::from_config(config),
            labels: config.labels.clone(),
            page_size: config.home.page_size,
            reading_time: config.reading_time.clone(),
            links: ListLinks::Live,
        })
    }

    /// Use `links` for the load-more control of the post list
    pub fn with_links(mut self, links: ListLinks) -> Self {
        self.links = links;
        self
    }

    pub fn links(&self) -> ListLinks {
        self.links
    }

    pub fn source(&self) -> &dyn PostSource {
        self.source.as_ref()
    }

    pub fn formatter(&self) -> &DateFormatter {
        &self.formatter
    }

    /// Fetch and render a route
    pub async fn build(&self, route: &Route) -> Result<RenderedPage> {
        match route {
            Route::Home => {
                let list = self.initial_list().await?;
                Ok(RenderedPage {
                    status: PageStatus::Ok,
                    html: self.render_list(&list)?,
                })
            }
            Route::Post(slug) => match self.source.post_by_slug(slug).await? {
                Some(post) => Ok(RenderedPage {
                    status: PageStatus::Ok,
                    html: self.render_post(&post)?,
                }),
                None => {
                    tracing::info!("No post with slug {}", slug);
                    Ok(RenderedPage {
                        status: PageStatus::NotFound,
                        html: self.render_not_found()?,
                    })
                }
            },
        }
    }

    /// First page of the post list
    pub async fn initial_list(&self) -> Result<PostList> {
        let page = self.source.first_posts(self.page_size).await?;
        Ok(PostList::new(page))
    }

    pub fn render_list(&self, list: &PostList) -> Result<String> {
        let mut context = self.base_context();
        context.insert("list", &list.view(&self.formatter, self.links));
        self.renderer.render("index.html", &context)
    }

    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let mut context = self.base_context();
        context.insert(
            "post",
            &PostView::build(post, &self.formatter, &self.reading_time),
        );
        self.renderer.render("post.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render_message(&self.labels.not_found, None)
    }

    /// Placeholder shown while a post is rendered on demand
    pub fn render_loading(&self) -> Result<String> {
        self.render_message(&self.labels.loading, Some(LOADING_REFRESH_SECS))
    }

    pub fn render_unavailable(&self) -> Result<String> {
        self.render_message(&self.labels.unavailable, None)
    }

    fn render_message(&self, message: &str, refresh: Option<u32>) -> Result<String> {
        let mut context = self.base_context();
        context.insert(
            "page",
            &MessageData {
                title: message.to_string(),
                message: message.to_string(),
                refresh,
            },
        );
        self.renderer.render("message.html", &context)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentBlock, ContentError, Paragraph, PostSummary, PostsPage};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    struct FixedSource {
        first: PostsPage,
        post: Option<PostDetail>,
    }

    #[async_trait]
    impl PostSource for FixedSource {
        async fn first_posts(&self, page_size: u32) -> crate::content::Result<PostsPage> {
            assert_eq!(page_size, 2);
            Ok(self.first.clone())
        }

        async fn next_posts(&self, next_page: &str) -> crate::content::Result<PostsPage> {
            Err(ContentError::ForeignPage(next_page.to_string()))
        }

        async fn post_slugs(&self) -> crate::content::Result<Vec<String>> {
            Ok(self.post.iter().map(|p| p.uid.clone()).collect())
        }

        async fn post_by_slug(&self, slug: &str) -> crate::content::Result<Option<PostDetail>> {
            Ok(self.post.clone().filter(|p| p.uid == slug))
        }
    }

    fn summary(uid: &str, title: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            first_publication_date: Some(Utc.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap()),
            title: title.to_string(),
            subtitle: "Sub".to_string(),
            author: "Ana".to_string(),
        }
    }

    fn detail() -> PostDetail {
        let first = Utc.with_ymd_and_hms(2022, 3, 15, 0, 0, 0).unwrap();
        PostDetail {
            uid: "hooks".to_string(),
            first_publication_date: Some(first),
            last_publication_date: Some(first),
            title: "Using hooks".to_string(),
            banner_url: "https://images.example.com/banner.png".to_string(),
            author: "Ana".to_string(),
            content: vec![ContentBlock {
                heading: "Intro".to_string(),
                body: vec![Paragraph {
                    text: "Hooks are <great>".to_string(),
                }],
            }],
        }
    }

    fn builder(config: &SiteConfig, first: PostsPage) -> PageBuilder {
        let source = FixedSource {
            first,
            post: Some(detail()),
        };
        PageBuilder::new(config, Arc::new(source)).unwrap()
    }

    #[tokio::test]
    async fn test_home_with_more_pages_has_button() {
        let page = PostsPage {
            next_page: Some("https://repo.cdn.prismic.io/api/v2/documents/search?page=2".to_string()),
            results: vec![summary("a", "First"), summary("b", "Second")],
        };
        let rendered = builder(&SiteConfig::default(), page)
            .build(&Route::Home)
            .await
            .unwrap();
        assert_eq!(rendered.status, PageStatus::Ok);
        assert!(rendered.html.contains("<title>Home | spacetraveling.</title>"));
        assert!(rendered.html.contains(r#"id="load-more""#));
        let first = rendered.html.find("First").unwrap();
        let second = rendered.html.find("Second").unwrap();
        assert!(first < second);
        assert!(rendered.html.contains("15 Mar 2022"));
    }

    #[tokio::test]
    async fn test_home_links_to_next_page() {
        let page = PostsPage {
            next_page: Some("https://repo.cdn.prismic.io/api/v2/documents/search?page=2".to_string()),
            results: vec![summary("a", "First")],
        };
        let live = builder(&SiteConfig::default(), page.clone())
            .build(&Route::Home)
            .await
            .unwrap();
        assert!(live.html.contains("next?page=https%3A%2F%2Frepo.cdn.prismic.io"));

        let snapshot = builder(&SiteConfig::default(), page)
            .with_links(ListLinks::Snapshot)
            .build(&Route::Home)
            .await
            .unwrap();
        assert!(snapshot.html.contains("page-2.json"));
        assert!(!snapshot.html.contains("documents%2Fsearch"));
    }

    #[tokio::test]
    async fn test_home_without_next_page_has_no_button() {
        let page = PostsPage {
            next_page: None,
            results: vec![summary("a", "First")],
        };
        let rendered = builder(&SiteConfig::default(), page)
            .build(&Route::Home)
            .await
            .unwrap();
        assert!(!rendered.html.contains(r#"id="load-more""#));
    }

    #[tokio::test]
    async fn test_post_page() {
        let mut config = SiteConfig::default();
        config.comments.repo = Some("someone/comments".to_string());
        let rendered = builder(&config, PostsPage::default())
            .build(&Route::Post("hooks".to_string()))
            .await
            .unwrap();
        assert_eq!(rendered.status, PageStatus::Ok);
        assert!(rendered.html.contains("<h1>Using hooks</h1>"));
        assert!(rendered.html.contains("Hooks are &lt;great&gt;"));
        assert!(rendered.html.contains("4 min"));
        assert!(!rendered.html.contains(r#"class="edited""#));
        assert!(rendered.html.contains(r#"issue-term="pathname""#));
        assert!(rendered.html.contains(r#"theme="github-dark""#));
    }

    #[tokio::test]
    async fn test_edited_post_has_one_annotation() {
        let mut post = detail();
        post.last_publication_date = Some(Utc.with_ymd_and_hms(2022, 3, 20, 14, 5, 0).unwrap());
        let html = builder(&SiteConfig::default(), PostsPage::default())
            .render_post(&post)
            .unwrap();
        assert_eq!(html.matches(r#"class="edited""#).count(), 1);
        assert!(html.contains("edited on 20 Mar 2022, at 14:05"));
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let rendered = builder(&SiteConfig::default(), PostsPage::default())
            .build(&Route::Post("missing".to_string()))
            .await
            .unwrap();
        assert_eq!(rendered.status, PageStatus::NotFound);
        assert!(rendered.html.contains("Post not found"));
        assert!(!rendered.html.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Post("hooks".to_string()).to_string(), "/post/hooks");
    }
}
