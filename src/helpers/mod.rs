//! Helper functions for pages and templates

mod date;
mod url;

pub use date::*;
pub use self::url::*;
