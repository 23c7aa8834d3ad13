use std::time::Duration;

use anyhow::Result;
use coinwire_core::{Article, CycleTrigger};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Event handler for terminal events
pub struct EventHandler {
    tick_rate: Duration,
}

/// Result of a background fetch cycle
#[derive(Debug)]
pub enum RefreshResult {
    /// Cycle completed; the merged, sorted and deduplicated list
    Success {
        trigger: CycleTrigger,
        articles: Vec<Article>,
    },
    /// Cycle aborted; previous articles stay on screen
    Failure {
        trigger: CycleTrigger,
        error: String,
    },
}

impl RefreshResult {
    pub fn from_cycle(trigger: CycleTrigger, result: coinwire_core::Result<Vec<Article>>) -> Self {
        match result {
            Ok(articles) => Self::Success { trigger, articles },
            Err(coinwire_core::Error::Cycle(error)) => Self::Failure { trigger, error },
            Err(e) => Self::Failure {
                trigger,
                error: e.to_string(),
            },
        }
    }

    pub fn trigger(&self) -> CycleTrigger {
        match self {
            Self::Success { trigger, .. } | Self::Failure { trigger, .. } => *trigger,
        }
    }

    /// Convert back into the shape the feed controller consumes
    pub fn into_cycle(self) -> coinwire_core::Result<Vec<Article>> {
        match self {
            Self::Success { articles, .. } => Ok(articles),
            Self::Failure { error, .. } => Err(coinwire_core::Error::Cycle(error)),
        }
    }
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    /// Poll for the next event
    pub fn next(&self) -> Result<Option<AppEvent>> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events, ignore release events
                    // (crossterm 0.27+ sends release events on some systems)
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Terminal was resized
    Resize(u16, u16),
    /// Tick event for periodic updates
    Tick,
}
