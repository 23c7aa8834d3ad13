use std::sync::Arc;

use coinwire_core::pipeline::ALL_CATEGORIES;
use coinwire_core::{AppConfig, Article, CycleTrigger, FeedController, UiEvent};
use url::Url;

use crate::event::RefreshResult;
use crate::theme::Theme;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const HALF_PAGE: usize = 5;

/// Application mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Normal browsing mode
    Normal,
    /// Search input; holds the query to restore on cancel
    Search(String),
    /// Help overlay
    Help,
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// Articles, filters and fetch state
    pub feed: FeedController,
    /// Tags shown in the filter bar, "all" first
    pub filter_tags: Vec<String>,
    /// Index into `filter_tags`
    pub active_filter: usize,
    /// Currently selected card
    pub selected: usize,
    /// Search text being edited
    pub search_input: String,
    /// Current application mode
    pub mode: Mode,
    /// Whether the app should quit
    pub should_quit: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Pending key for multi-key sequences (e.g., 'gg')
    pub pending_key: Option<char>,
    spinner_frame: usize,
}

impl App {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let filter_tags = filter_tags_from(&config.ui.filter_tags);
        Self {
            config,
            theme: Theme::default(),
            feed: FeedController::new(),
            filter_tags,
            active_filter: 0,
            selected: 0,
            search_input: String::new(),
            mode: Mode::Normal,
            should_quit: false,
            status_message: None,
            pending_key: None,
            spinner_frame: 0,
        }
    }

    /// Get the currently selected article
    pub fn current_article(&self) -> Option<&Article> {
        self.feed.visible().get(self.selected)
    }

    pub fn visible_count(&self) -> usize {
        self.feed.visible().len()
    }

    pub fn move_down(&mut self) {
        if self.selected + 1 < self.visible_count() {
            self.selected += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn scroll_half_page_down(&mut self) {
        let last = self.visible_count().saturating_sub(1);
        self.selected = (self.selected + HALF_PAGE).min(last);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.selected = self.selected.saturating_sub(HALF_PAGE);
    }

    pub fn jump_to_top(&mut self) {
        self.selected = 0;
    }

    pub fn jump_to_bottom(&mut self) {
        self.selected = self.visible_count().saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
    }

    /// Ask for a fetch cycle. Returns true when the caller should spawn one;
    /// requests made while a cycle is running are dropped.
    pub fn request_refresh(&mut self, trigger: CycleTrigger) -> bool {
        let started = match trigger {
            CycleTrigger::Manual => self.feed.handle_event(UiEvent::RefreshRequested),
            CycleTrigger::Initial | CycleTrigger::Timer => self.feed.begin_cycle(trigger),
        };

        if started {
            self.set_status("Refreshing...");
        } else if trigger == CycleTrigger::Manual {
            self.set_status("Refresh already in progress");
        }
        started
    }

    /// Hand a finished cycle back to the controller
    pub fn apply_refresh(&mut self, result: RefreshResult) {
        let trigger = result.trigger();
        let mut result = result.into_cycle();
        if let Ok(ref mut articles) = result {
            mark_broken_images(articles);
        }

        let failed = result.is_err();
        tracing::debug!(?trigger, failed, "Applying fetch cycle result");
        self.feed.complete_cycle(result);
        self.clamp_selection();

        if failed {
            if self.feed.articles().is_empty() {
                self.clear_status();
            } else {
                self.set_status("Unable to load news, showing previous results");
            }
        } else {
            self.set_status(format!("Loaded {} articles", self.feed.articles().len()));
        }
    }

    /// Activate the filter tag at `index`
    pub fn select_filter(&mut self, index: usize) {
        let Some(tag) = self.filter_tags.get(index).cloned() else {
            return;
        };
        self.active_filter = index;
        self.feed.handle_event(UiEvent::FilterSelected(tag));
        self.selected = 0;
    }

    pub fn next_filter(&mut self) {
        if self.filter_tags.is_empty() {
            return;
        }
        self.select_filter((self.active_filter + 1) % self.filter_tags.len());
    }

    pub fn prev_filter(&mut self) {
        if self.filter_tags.is_empty() {
            return;
        }
        let len = self.filter_tags.len();
        self.select_filter((self.active_filter + len - 1) % len);
    }

    pub fn start_search(&mut self) {
        let previous = self.feed.search().to_string();
        self.search_input = previous.clone();
        self.mode = Mode::Search(previous);
    }

    /// Search updates live as the user types
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.update_search();
    }

    pub fn pop_search_char(&mut self) {
        self.search_input.pop();
        self.update_search();
    }

    fn update_search(&mut self) {
        self.feed
            .handle_event(UiEvent::SearchChanged(self.search_input.clone()));
        self.selected = 0;
    }

    pub fn confirm_search(&mut self) {
        self.mode = Mode::Normal;
        if !self.search_input.is_empty() {
            self.set_status(format!("{} matches", self.visible_count()));
        }
    }

    /// Leave search mode and restore the query from before editing
    pub fn cancel_search(&mut self) {
        if let Mode::Search(previous) = std::mem::replace(&mut self.mode, Mode::Normal) {
            self.search_input = previous;
            self.update_search();
        }
    }

    pub fn clear_search(&mut self) {
        if !self.feed.search().is_empty() {
            self.search_input.clear();
            self.update_search();
        }
    }

    pub fn show_help(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Link for the selected card, if it has one
    pub fn link_to_open(&self) -> Option<&str> {
        self.current_article()
            .filter(|article| article.has_link())
            .map(|article| article.url.as_str())
    }

    /// Advance the spinner while a cycle is running
    pub fn tick(&mut self) {
        if self.feed.is_fetching() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        }
    }

    pub fn spinner(&self) -> char {
        SPINNER[self.spinner_frame]
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Check if in input mode
    pub fn is_input_mode(&self) -> bool {
        matches!(self.mode, Mode::Search(_))
    }

    /// Clear pending key
    pub fn clear_pending_key(&mut self) {
        self.pending_key = None;
    }
}

/// Configured tags, deduplicated and lowercased, with "all" always first
fn filter_tags_from(configured: &[String]) -> Vec<String> {
    let mut tags = vec![ALL_CATEGORIES.to_string()];
    for tag in configured {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

/// Images are not drawn in the terminal; an image whose URL cannot be parsed
/// is reported as failed to load and swapped for a placeholder.
pub fn mark_broken_images(articles: &mut [Article]) {
    for article in articles.iter_mut() {
        if Url::parse(&article.image_url).is_err() {
            article.replace_broken_image();
        }
    }
}
