mod filter;
mod merge;

pub use filter::{apply_filters, CategoryFilter, ALL_CATEGORIES};
pub use merge::{concat_outcomes, dedup_by_title_prefix, merge, sort_newest_first};
