//! In-memory prediction source.
//!
//! Serves a fixed set of events for every window, with optional per-window
//! overrides and scripted failures keyed by window span in days. Every call is
//! recorded so tests can assert how often each window was fetched.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::EventSource;
use crate::api::{RawEvent, SearchWindow};
use crate::error::FetchError;

#[derive(Clone, Default)]
pub struct LocalSource {
    default: Option<Vec<RawEvent>>,
    by_span: HashMap<i64, Option<Vec<RawEvent>>>,
    calls: Arc<Mutex<Vec<SearchWindow>>>,
}

impl LocalSource {
    /// Source returning `events` for every window.
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            default: Some(events),
            ..Default::default()
        }
    }

    /// Source whose every fetch fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Serve `events` for windows spanning `days` days.
    pub fn with_window(mut self, days: i64, events: Vec<RawEvent>) -> Self {
        self.by_span.insert(days, Some(events));
        self
    }

    /// Fail fetches for windows spanning `days` days.
    pub fn with_failure(mut self, days: i64) -> Self {
        self.by_span.insert(days, None);
        self
    }

    /// Windows fetched so far, in call order.
    pub fn calls(&self) -> Vec<SearchWindow> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl EventSource for LocalSource {
    async fn fetch(&self, window: &SearchWindow) -> Result<Vec<RawEvent>, FetchError> {
        self.calls.lock().push(*window);

        let scripted = match self.by_span.get(&window.span_days()) {
            Some(entry) => entry.as_ref(),
            None => self.default.as_ref(),
        };

        scripted.cloned().ok_or_else(|| {
            FetchError::Transport(format!(
                "local source unavailable for {}..{}",
                window.start_date(),
                window.end_date()
            ))
        })
    }
}
