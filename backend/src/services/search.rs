//! Progressive search over widening windows and loosening thresholds.
//!
//! The controller walks a two-dimensional ladder: windows from shortest to
//! longest, and for each window the visibility tiers from strictest to
//! loosest. The first `(window, tier)` pair yielding at least `quota`
//! distinct visible events wins. When no pair does, the most recent raw
//! window result is used as a degraded answer.
//!
//! ```text
//! Searching(w, t) --quota met--> Satisfied --> Done
//!      |  tier exhausted: Searching(w+1, 0)
//!      v  all windows exhausted
//!  Exhausted --raw data seen--> Fallback --> Done
//!      \--nothing fetched-----------------> Done (empty)
//! ```
//!
//! The fallback keeps only future events when it has any, before cutting to
//! `fallback_limit`. Whatever set is chosen then goes through a future-only
//! re-filter and is cut to `top_n` events.

use chrono::{DateTime, Utc};

use crate::api::{GeographicLocation, RawEvent, SearchWindow, VisibilityThreshold};
use crate::config::SearchSettings;
use crate::error::FetchError;
use crate::services::astronomy::AstronomyProvider;
use crate::services::ranking::dedup_and_rank;
use crate::services::visibility::{has_resolvable_timestamp, is_future, VisibilityEvaluator};
use crate::source::EventSource;

/// Ladder definition and output bounds for one search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    /// Window horizons in days from now, increasing
    pub window_days: Vec<i64>,
    /// Visibility tiers, strictest first
    pub thresholds: Vec<VisibilityThreshold>,
    /// Minimum number of visible events that stops escalation
    pub quota: usize,
    /// Maximum number of events returned
    pub top_n: usize,
    /// Maximum number of raw events kept by the fallback
    pub fallback_limit: usize,
}

impl Default for SearchPlan {
    fn default() -> Self {
        SearchPlan::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for SearchPlan {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            window_days: settings.window_days.clone(),
            thresholds: settings.thresholds.clone(),
            quota: settings.quota,
            top_n: settings.top_n,
            fallback_limit: settings.fallback_limit,
        }
    }
}

/// How the final set was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The quota was met at this window and tier.
    Satisfied {
        window_days: i64,
        threshold: VisibilityThreshold,
    },
    /// No pair met the quota; unfiltered events from this window were used.
    Fallback { window_days: i64 },
    /// Nothing was ever fetched.
    Empty,
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Final events, chronological, at most `top_n`
    pub events: Vec<RawEvent>,
    /// Set when no future event survived and past events were published instead
    pub admitted_past_events: bool,
    pub windows_fetched: usize,
    pub windows_failed: usize,
}

/// Raw events of one successfully fetched window.
#[derive(Debug, Clone)]
struct WindowResult {
    window_index: usize,
    window_days: i64,
    events: Vec<RawEvent>,
}

enum SearchState {
    Searching {
        window_index: usize,
        threshold_index: usize,
    },
    Satisfied {
        window_days: i64,
        threshold: VisibilityThreshold,
        survivors: Vec<RawEvent>,
    },
    Exhausted,
    Fallback(WindowResult),
    Done(SearchOutcome, Vec<RawEvent>),
}

pub struct SearchController<'a> {
    source: &'a dyn EventSource,
    astronomy: &'a dyn AstronomyProvider,
    site: &'a GeographicLocation,
    plan: &'a SearchPlan,
}

impl<'a> SearchController<'a> {
    pub fn new(
        source: &'a dyn EventSource,
        astronomy: &'a dyn AstronomyProvider,
        site: &'a GeographicLocation,
        plan: &'a SearchPlan,
    ) -> Self {
        Self {
            source,
            astronomy,
            site,
            plan,
        }
    }

    /// Run the ladder with `now` as evaluation time. Never fails.
    pub async fn run(&self, now: DateTime<Utc>) -> SearchReport {
        let evaluator = VisibilityEvaluator::new(self.astronomy, self.site, now);
        let mut current: Option<WindowResult> = None;
        let mut last_raw: Option<WindowResult> = None;
        let mut windows_fetched = 0usize;
        let mut windows_failed = 0usize;

        let mut state = if self.plan.window_days.is_empty() || self.plan.thresholds.is_empty() {
            SearchState::Exhausted
        } else {
            SearchState::Searching {
                window_index: 0,
                threshold_index: 0,
            }
        };

        let (outcome, candidates) = loop {
            state = match state {
                SearchState::Searching {
                    window_index,
                    threshold_index,
                } => {
                    let window_days = self.plan.window_days[window_index];

                    // One fetch per window, shared by all tiers.
                    let cached = match current.take() {
                        Some(result) if result.window_index == window_index => result,
                        _ => {
                            let fetched = match SearchWindow::from_now(now, window_days) {
                                Some(window) => self.source.fetch(&window).await,
                                None => Err(FetchError::InvalidWindow { days: window_days }),
                            };
                            match fetched {
                                Ok(events) => {
                                    windows_fetched += 1;
                                    log::info!(
                                        "Fetched {} raw events for the {}-day window",
                                        events.len(),
                                        window_days
                                    );
                                    let result = WindowResult {
                                        window_index,
                                        window_days,
                                        events,
                                    };
                                    if !result.events.is_empty() {
                                        last_raw = Some(result.clone());
                                    }
                                    result
                                }
                                Err(e) => {
                                    windows_failed += 1;
                                    log::warn!(
                                        "Fetch failed for the {}-day window, skipping: {}",
                                        window_days,
                                        e
                                    );
                                    state = self.next_window(window_index);
                                    continue;
                                }
                            }
                        }
                    };

                    let threshold = self.plan.thresholds[threshold_index];
                    let visible = evaluator.filter(&cached.events, &threshold);
                    let survivors = dedup_and_rank(visible.into_iter().cloned());
                    log::debug!(
                        "{}-day window, tier {} ({}): {} visible",
                        window_days,
                        threshold_index,
                        threshold,
                        survivors.len()
                    );
                    current = Some(cached);

                    if survivors.len() >= self.plan.quota {
                        SearchState::Satisfied {
                            window_days,
                            threshold,
                            survivors,
                        }
                    } else if threshold_index + 1 < self.plan.thresholds.len() {
                        SearchState::Searching {
                            window_index,
                            threshold_index: threshold_index + 1,
                        }
                    } else {
                        self.next_window(window_index)
                    }
                }
                SearchState::Satisfied {
                    window_days,
                    threshold,
                    survivors,
                } => {
                    log::info!(
                        "Quota of {} met with {} events in the {}-day window at {}",
                        self.plan.quota,
                        survivors.len(),
                        window_days,
                        threshold
                    );
                    SearchState::Done(
                        SearchOutcome::Satisfied {
                            window_days,
                            threshold,
                        },
                        survivors,
                    )
                }
                SearchState::Exhausted => match last_raw.take() {
                    Some(raw) => SearchState::Fallback(raw),
                    None => {
                        log::warn!("No prediction data could be fetched for any window");
                        SearchState::Done(SearchOutcome::Empty, Vec::new())
                    }
                },
                SearchState::Fallback(raw) => {
                    log::warn!(
                        "Quota of {} not met in any window; falling back to {} raw events from the {}-day window",
                        self.plan.quota,
                        raw.events.len(),
                        raw.window_days
                    );
                    let mut degraded: Vec<RawEvent> = dedup_and_rank(raw.events)
                        .into_iter()
                        .filter(has_resolvable_timestamp)
                        .collect();
                    // Past events sort first; drop them before the trim when
                    // anything future is left.
                    if degraded.iter().any(|event| is_future(event, now)) {
                        degraded.retain(|event| is_future(event, now));
                    }
                    degraded.truncate(self.plan.fallback_limit);
                    SearchState::Done(
                        SearchOutcome::Fallback {
                            window_days: raw.window_days,
                        },
                        degraded,
                    )
                }
                SearchState::Done(outcome, events) => break (outcome, events),
            };
        };

        let (events, admitted_past_events) = restrict_to_future(candidates, now, self.plan.top_n);

        SearchReport {
            outcome,
            events,
            admitted_past_events,
            windows_fetched,
            windows_failed,
        }
    }

    fn next_window(&self, window_index: usize) -> SearchState {
        if window_index + 1 < self.plan.window_days.len() {
            SearchState::Searching {
                window_index: window_index + 1,
                threshold_index: 0,
            }
        } else {
            SearchState::Exhausted
        }
    }
}

/// Keep only events after `now`, then the first `top_n`.
///
/// When nothing is in the future but `candidates` is not empty, the
/// candidates are kept as they are and the returned flag is set.
pub fn restrict_to_future(
    candidates: Vec<RawEvent>,
    now: DateTime<Utc>,
    top_n: usize,
) -> (Vec<RawEvent>, bool) {
    let total = candidates.len();
    let future: Vec<RawEvent> = candidates
        .iter()
        .filter(|event| is_future(event, now))
        .cloned()
        .collect();

    let (mut chosen, admitted_past) = if future.is_empty() && total > 0 {
        log::warn!(
            "None of {} selected events is in the future; publishing them unfiltered",
            total
        );
        (candidates, true)
    } else {
        if future.len() < total {
            log::info!("Dropped {} past events from the selection", total - future.len());
        }
        (future, false)
    };

    chosen.truncate(top_n);
    (chosen, admitted_past)
}
