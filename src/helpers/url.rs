//! URL helper functions

/// Route of the post list
pub const HOME_PATH: &str = "/";

/// Route of a post
///
/// # Examples
/// ```ignore
/// post_path("como-utilizar-hooks") // -> "/post/como-utilizar-hooks"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", slug)
}

/// Server endpoint returning the next page of the post list
pub const NEXT_POSTS_PATH: &str = "/api/posts/next";

/// Server link to the list page behind a service cursor
pub fn next_posts_path(cursor: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(cursor.as_bytes()).collect();
    format!("{}?page={}", NEXT_POSTS_PATH, encoded)
}

/// Pre-generated JSON file holding list page `number` (the home page is 1)
pub fn snapshot_page_path(number: usize) -> String {
    format!("/api/posts/page-{}.json", number)
}

/// Whether a slug can be used as a single path segment and directory name
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Anchor id of a content section
///
/// Position is part of the id so repeated headings stay distinct.
pub fn section_anchor(position: usize, heading: &str) -> String {
    let slug = slug::slugify(heading);
    if slug.is_empty() {
        format!("section-{}", position + 1)
    } else {
        format!("{}-{}", position + 1, slug)
    }
}
