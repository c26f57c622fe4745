use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content service returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Invalid content service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Page URL {0} does not belong to the configured content service")]
    ForeignPage(String),

    #[error("Content service exposes no master ref")]
    MissingMasterRef,

    #[error("Unexpected content service response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ContentError>;
