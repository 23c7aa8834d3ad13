pub mod aggregator;
pub mod config;
pub mod error;
pub mod news;
pub mod pipeline;
pub mod scheduler;

pub use aggregator::{Aggregator, CycleTrigger, FeedController, FetchState, UiEvent, ViewState};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use news::Article;
pub use pipeline::{apply_filters, CategoryFilter};
