//! HTTP client for the LIneA occultation prediction service.
//!
//! The endpoint takes `start_date`/`end_date` query parameters and answers
//! either with a bare JSON array or with a paginated envelope
//! `{"count": .., "next": url|null, "results": [..]}`. Pages are followed
//! until `next` is null, `max_pages` is reached, or enough events dated after
//! the window start have been collected.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

use super::EventSource;
use crate::api::{RawEvent, SearchWindow};
use crate::config::SourceSettings;
use crate::error::FetchError;
use crate::services::visibility::is_future;

const USER_AGENT: &str = concat!("occultation-finder/", env!("CARGO_PKG_VERSION"));

/// One decoded response page.
#[derive(Debug, Default)]
pub struct Page {
    pub events: Vec<RawEvent>,
    pub has_next: bool,
}

pub struct LineaClient {
    client: reqwest::Client,
    settings: SourceSettings,
}

impl LineaClient {
    pub fn new(settings: &SourceSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    async fn fetch_page(&self, window: &SearchWindow, page: u32) -> Result<Page, FetchError> {
        let response = self
            .client
            .get(&self.settings.base_url)
            .query(&[
                ("start_date", window.start_date()),
                ("end_date", window.end_date()),
                ("page", page.to_string()),
                ("page_size", self.settings.page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let body: Value = response.json().await?;
        parse_page(body)
    }
}

#[async_trait]
impl EventSource for LineaClient {
    async fn fetch(&self, window: &SearchWindow) -> Result<Vec<RawEvent>, FetchError> {
        log::info!(
            "Fetching occultation predictions from {} to {}",
            window.start_date(),
            window.end_date()
        );
        paginate(&self.settings, window, |page| self.fetch_page(window, page)).await
    }
}

/// Collect pages `1..` from `fetch_page` until one of the stop rules holds:
/// no next page, `max_pages` reached, or `target_future_events` events dated
/// after `window.start` seen.
///
/// A failure on the first page fails the window; a failure on a later page
/// keeps what earlier pages returned.
pub async fn paginate<F, Fut>(
    settings: &SourceSettings,
    window: &SearchWindow,
    mut fetch_page: F,
) -> Result<Vec<RawEvent>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page, FetchError>>,
{
    let mut events: Vec<RawEvent> = Vec::new();
    let mut future_seen = 0usize;
    let mut page = 1u32;

    loop {
        let batch = match fetch_page(page).await {
            Ok(batch) => batch,
            Err(e) if page > 1 => {
                log::warn!("Page {} failed, keeping {} events: {}", page, events.len(), e);
                break;
            }
            Err(e) => return Err(e),
        };

        future_seen += batch
            .events
            .iter()
            .filter(|event| is_future(event, window.start))
            .count();
        events.extend(batch.events);

        if !batch.has_next
            || page >= settings.max_pages
            || future_seen >= settings.target_future_events
        {
            break;
        }
        page += 1;
    }

    log::info!(
        "Retrieved {} events ({} future) in {} page(s)",
        events.len(),
        future_seen,
        page
    );
    Ok(events)
}

/// Decode one response body into events plus a "more pages" flag.
///
/// Non-object entries in the result list are dropped.
pub fn parse_page(body: Value) -> Result<Page, FetchError> {
    let (items, has_next) = match body {
        Value::Array(items) => (items, false),
        Value::Object(mut envelope) => {
            let has_next = match envelope.get("next") {
                Some(Value::String(s)) => !s.is_empty(),
                Some(Value::Null) | None => false,
                Some(_) => true,
            };
            let items = ["results", "data"]
                .iter()
                .find_map(|key| match envelope.remove(*key) {
                    Some(Value::Array(items)) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| {
                    FetchError::Decode("response object has no 'results' array".to_string())
                })?;
            (items, has_next)
        }
        other => {
            return Err(FetchError::Decode(format!(
                "unexpected response type: {}",
                type_name(&other)
            )))
        }
    };

    let events = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect();

    Ok(Page { events, has_next })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_bare_array() {
        let page = parse_page(json!([{ "name": "a" }, { "name": "b" }])).unwrap();
        assert_eq!(page.events.len(), 2);
        assert!(!page.has_next);
    }

    #[test]
    fn test_parse_paginated_envelope() {
        let page = parse_page(json!({
            "count": 3,
            "next": "https://example.org/api/occultations?page=2",
            "previous": null,
            "results": [{ "name": "a" }]
        }))
        .unwrap();
        assert_eq!(page.events.len(), 1);
        assert!(page.has_next);
    }

    #[test]
    fn test_parse_last_page() {
        let page = parse_page(json!({ "next": null, "results": [] })).unwrap();
        assert!(page.events.is_empty());
        assert!(!page.has_next);
    }

    #[test]
    fn test_parse_data_key() {
        let page = parse_page(json!({ "data": [{ "name": "a" }] })).unwrap();
        assert_eq!(page.events.len(), 1);
    }

    #[test]
    fn test_parse_drops_non_objects() {
        let page = parse_page(json!([{ "name": "a" }, 3, "x", null])).unwrap();
        assert_eq!(page.events.len(), 1);
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        assert!(matches!(
            parse_page(json!({ "detail": "Not found." })),
            Err(FetchError::Decode(_))
        ));
        assert!(matches!(parse_page(json!("oops")), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_client_builds_from_default_settings() {
        assert!(LineaClient::new(&SourceSettings::default()).is_ok());
    }

    mod pagination {
        use super::*;
        use chrono::{TimeZone, Utc};
        use std::collections::VecDeque;

        fn window() -> SearchWindow {
            SearchWindow::from_now(Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap(), 90).unwrap()
        }

        fn settings(max_pages: u32, target_future_events: usize) -> SourceSettings {
            SourceSettings {
                max_pages,
                target_future_events,
                ..SourceSettings::default()
            }
        }

        /// A page of `future` events after the window start and `past` before it.
        fn page(future: usize, past: usize, has_next: bool) -> Result<Page, FetchError> {
            let future_events = (0..future).map(|i| json!({ "name": format!("f{}", i), "datetime": "2026-11-01T00:00:00Z" }));
            let past_events = (0..past).map(|i| json!({ "name": format!("p{}", i), "datetime": "2026-09-01T00:00:00Z" }));
            let events = future_events
                .chain(past_events)
                .map(|v| v.as_object().cloned().unwrap())
                .collect();
            Ok(Page { events, has_next })
        }

        fn failure() -> Result<Page, FetchError> {
            Err(FetchError::Status {
                status: 503,
                url: "https://example.org".to_string(),
            })
        }

        async fn run(
            settings: &SourceSettings,
            responses: Vec<Result<Page, FetchError>>,
        ) -> (Result<Vec<RawEvent>, FetchError>, Vec<u32>) {
            let mut responses: VecDeque<_> = responses.into();
            let mut requested = Vec::new();
            let result = paginate(settings, &window(), |page| {
                requested.push(page);
                let response = responses
                    .pop_front()
                    .unwrap_or_else(|| Err(FetchError::Transport("no more pages".to_string())));
                async move { response }
            })
            .await;
            (result, requested)
        }

        #[tokio::test]
        async fn test_stops_when_no_next_page() {
            let (result, requested) =
                run(&settings(20, 200), vec![page(2, 0, true), page(1, 1, false)]).await;
            assert_eq!(result.unwrap().len(), 4);
            assert_eq!(requested, vec![1, 2]);
        }

        #[tokio::test]
        async fn test_stops_at_max_pages() {
            let responses = (0..5).map(|_| page(1, 0, true)).collect();
            let (result, requested) = run(&settings(3, 200), responses).await;
            assert_eq!(result.unwrap().len(), 3);
            assert_eq!(requested, vec![1, 2, 3]);
        }

        #[tokio::test]
        async fn test_stops_once_enough_future_events_seen() {
            let responses = vec![page(2, 5, true), page(3, 0, true), page(3, 0, true)];
            let (result, requested) = run(&settings(20, 4), responses).await;
            assert_eq!(result.unwrap().len(), 10);
            assert_eq!(requested, vec![1, 2]);
        }

        #[tokio::test]
        async fn test_past_events_do_not_count_towards_target() {
            let responses = vec![page(0, 10, true), page(1, 0, false)];
            let (result, requested) = run(&settings(20, 5), responses).await;
            assert_eq!(result.unwrap().len(), 11);
            assert_eq!(requested, vec![1, 2]);
        }

        #[tokio::test]
        async fn test_later_page_failure_keeps_earlier_pages() {
            let responses = vec![page(2, 0, true), failure()];
            let (result, requested) = run(&settings(20, 200), responses).await;
            assert_eq!(result.unwrap().len(), 2);
            assert_eq!(requested, vec![1, 2]);
        }

        #[tokio::test]
        async fn test_first_page_failure_fails_window() {
            let (result, requested) = run(&settings(20, 200), vec![failure()]).await;
            assert!(matches!(result, Err(FetchError::Status { status: 503, .. })));
            assert_eq!(requested, vec![1]);
        }
    }
}
