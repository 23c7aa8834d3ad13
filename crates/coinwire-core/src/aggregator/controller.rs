use chrono::{DateTime, Local};

use super::cycle::Aggregator;
use crate::news::Article;
use crate::pipeline::{apply_filters, CategoryFilter};
use crate::Result;

/// What asked for a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// First load after startup
    Initial,
    /// Recurring refresh timer
    Timer,
    /// User pressed refresh
    Manual,
}

/// Whether a fetch cycle is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
}

/// Events raised by the rendering boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    RefreshRequested,
    SearchChanged(String),
    FilterSelected(String),
}

/// What the rendering boundary should show
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewState<'a> {
    /// Nothing loaded yet and no failure
    Loading,
    /// Nothing to show because loading failed
    Error(&'a str),
    /// Articles exist but none pass the filters
    NoResults,
    Articles(&'a [Article]),
}

/// Owns the article list, the filter state and the single-flight guard.
///
/// All mutation happens on the caller's event loop; fetch cycles run
/// elsewhere and hand their result back through [`FeedController::complete_cycle`].
#[derive(Debug)]
pub struct FeedController {
    articles: Vec<Article>,
    visible: Vec<Article>,
    category: CategoryFilter,
    search: String,
    state: FetchState,
    loaded: bool,
    last_updated: Option<DateTime<Local>>,
    last_error: Option<String>,
}

impl Default for FeedController {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedController {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            visible: Vec::new(),
            category: CategoryFilter::All,
            search: String::new(),
            state: FetchState::Idle,
            loaded: false,
            last_updated: None,
            last_error: None,
        }
    }

    /// Try to move from Idle to Fetching. Returns false, dropping the
    /// request, when a cycle is already running.
    pub fn begin_cycle(&mut self, trigger: CycleTrigger) -> bool {
        match self.state {
            FetchState::Fetching => {
                tracing::debug!("Ignoring {:?} refresh: fetch already in progress", trigger);
                false
            }
            FetchState::Idle => {
                tracing::debug!("Starting fetch cycle ({:?})", trigger);
                self.state = FetchState::Fetching;
                true
            }
        }
    }

    /// Record a cycle's result and return to Idle.
    ///
    /// On success the list is replaced wholesale. On failure the previous
    /// list is kept and the error is exposed to the view.
    pub fn complete_cycle(&mut self, result: Result<Vec<Article>>) {
        self.state = FetchState::Idle;

        match result {
            Ok(articles) => {
                self.articles = articles;
                self.loaded = true;
                self.last_updated = Some(Local::now());
                self.last_error = None;
                self.refilter();
            }
            Err(e) => {
                tracing::error!("Fetch cycle failed: {}", e);
                self.last_error = Some("Unable to load news".to_string());
            }
        }
    }

    /// Run a cycle inline. Used by one-shot callers that own the controller
    /// for the duration of the fetch.
    pub async fn refresh(&mut self, aggregator: &Aggregator, trigger: CycleTrigger) -> bool {
        if !self.begin_cycle(trigger) {
            return false;
        }
        let result = aggregator.run_fetch_cycle().await;
        self.complete_cycle(result);
        true
    }

    /// Apply a UI event. Returns true when the caller should start a cycle.
    pub fn handle_event(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::RefreshRequested => self.begin_cycle(CycleTrigger::Manual),
            UiEvent::SearchChanged(text) => {
                self.search = text;
                self.refilter();
                false
            }
            UiEvent::FilterSelected(tag) => {
                self.category = CategoryFilter::parse(&tag);
                self.refilter();
                false
            }
        }
    }

    fn refilter(&mut self) {
        self.visible = apply_filters(&self.articles, &self.category, &self.search);
    }

    pub fn view_state(&self) -> ViewState<'_> {
        if !self.visible.is_empty() {
            return ViewState::Articles(&self.visible);
        }
        if let Some(ref error) = self.last_error {
            if self.articles.is_empty() {
                return ViewState::Error(error);
            }
        }
        if self.loaded {
            ViewState::NoResults
        } else {
            ViewState::Loading
        }
    }

    /// Full merged list from the last successful cycle
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Articles passing the current filters
    pub fn visible(&self) -> &[Article] {
        &self.visible
    }

    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.state == FetchState::Fetching
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
