mod client;
mod models;
pub mod sources;

pub use client::JsonClient;
pub use models::{
    is_placeholder_image, placeholder_image, truncate_chars, Article, DEDUP_PREFIX_CHARS,
    NO_LINK, PLACEHOLDER_IMAGES,
};
pub use sources::{build_sources, fetch_or_empty, NewsSource};
