mod controller;
mod cycle;

pub use controller::{CycleTrigger, FeedController, FetchState, UiEvent, ViewState};
pub use cycle::Aggregator;
