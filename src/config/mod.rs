//! Configuration module

mod site;

pub use site::SiteConfig;
pub use site::CommentsConfig;
pub use site::ContentConfig;
pub use site::HomeConfig;
pub use site::LabelsConfig;
pub use site::{ACCESS_TOKEN_ENV, ENDPOINT_ENV};
