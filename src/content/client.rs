//! Client for the content service (Prismic API v2)

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

use super::document::{ApiRoot, Document, SearchResponse};
use super::error::{ContentError, Result};

/// Resolved endpoint and credential
///
/// Built once per process from configuration and passed to
/// [`ContentClient::new`]; read-only afterwards.
#[derive(Debug, Clone)]
pub struct ContentSettings {
    endpoint: Url,
    access_token: Option<String>,
}

impl ContentSettings {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim())?;
        Ok(Self {
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

/// A query predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals value
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({}, \"{}\")]", path, escaped)
            }
        }
    }
}

/// Render predicates as the `q` parameter
pub fn query_string(predicates: &[Predicate]) -> String {
    let inner: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner)
}

/// Options for a search query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Fields to fetch, e.g. `posts.title`; empty fetches everything
    pub fetch: Vec<String>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
}

/// Handle on the content service
#[derive(Debug, Clone)]
pub struct ContentClient {
    http: Client,
    settings: ContentSettings,
}

impl ContentClient {
    pub fn new(settings: ContentSettings) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &ContentSettings {
        &self.settings
    }

    /// Search documents matching all predicates
    pub async fn query<T: DeserializeOwned>(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<SearchResponse<T>> {
        let master_ref = self.master_ref().await?;
        let mut url = self.search_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", &master_ref);
            pairs.append_pair("q", &query_string(predicates));
            if !options.fetch.is_empty() {
                pairs.append_pair("fetch", &options.fetch.join(","));
            }
            if let Some(page_size) = options.page_size {
                pairs.append_pair("pageSize", &page_size.to_string());
            }
            if let Some(page) = options.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(token) = self.settings.access_token() {
                pairs.append_pair(ACCESS_TOKEN_PARAM, token);
            }
        }
        self.get_json(url).await
    }

    /// Fetch the document of `doc_type` whose uid is `uid`
    pub async fn get_by_uid<T: DeserializeOwned>(
        &self,
        doc_type: &str,
        uid: &str,
    ) -> Result<Option<Document<T>>> {
        let predicate = Predicate::at(&format!("my.{}.uid", doc_type), uid);
        let options = QueryOptions {
            page_size: Some(1),
            ..Default::default()
        };
        let response: SearchResponse<T> = self.query(&[predicate], &options).await?;
        Ok(response.results.into_iter().next())
    }

    /// Fetch a `next_page` URL returned by an earlier search
    pub async fn get_page<T: DeserializeOwned>(&self, page_url: &str) -> Result<SearchResponse<T>> {
        let mut url = Url::parse(page_url)?;
        if url.origin() != self.settings.endpoint.origin() {
            return Err(ContentError::ForeignPage(page_url.to_string()));
        }
        if let Some(token) = self.settings.access_token() {
            if !url.query_pairs().any(|(k, _)| k == ACCESS_TOKEN_PARAM) {
                url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
            }
        }
        self.get_json(url).await
    }

    /// Resolve the ref of the currently published content
    async fn master_ref(&self) -> Result<String> {
        let mut url = self.settings.endpoint.clone();
        if let Some(token) = self.settings.access_token() {
            url.query_pairs_mut().append_pair(ACCESS_TOKEN_PARAM, token);
        }
        let root: ApiRoot = self.get_json(url).await?;
        root.master_ref()
            .map(str::to_string)
            .ok_or(ContentError::MissingMasterRef)
    }

    fn search_url(&self) -> Result<Url> {
        let mut search = self.settings.endpoint.clone();
        search.set_query(None);
        search
            .path_segments_mut()
            .map_err(|_| ContentError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(["documents", "search"]);
        Ok(search)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", redact(&url));
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status,
                url: redact(&url),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Query parameter carrying the access token
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// A cursor URL without the access token the service echoes into it
///
/// `get_page` appends the token again, so the cursor can be handed to
/// browsers and printed.
pub(crate) fn without_access_token(page_url: &str) -> String {
    let Ok(mut url) = Url::parse(page_url) else {
        return page_url.to_string();
    };
    if !url.query_pairs().any(|(k, _)| k == ACCESS_TOKEN_PARAM) {
        return page_url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != ACCESS_TOKEN_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

/// URL with the access token hidden, for logs and errors
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == ACCESS_TOKEN_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
