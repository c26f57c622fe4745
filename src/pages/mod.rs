//! Page models: what the list and detail pages display

mod detail;
mod list;

pub use detail::{EditedView, PostView, SectionView};
pub use list::{ListLinks, PostCardView, PostList, PostListView};
