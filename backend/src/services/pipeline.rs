//! One end-to-end finder run: search, normalize, publish.

use chrono::{DateTime, Utc};

use crate::api::GeographicLocation;
use crate::config::FinderConfig;
use crate::error::PipelineResult;
use crate::output::{EventSink, JsonFileSink};
use crate::services::astronomy::{AstronomyProvider, SiderustAstronomy};
use crate::services::normalizer::normalize_all;
use crate::services::search::{SearchController, SearchOutcome, SearchPlan};
use crate::source::{EventSource, LineaClient};

/// What a run did, for the operator log.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub outcome: SearchOutcome,
    pub published: usize,
    pub admitted_past_events: bool,
    pub windows_fetched: usize,
    pub windows_failed: usize,
}

pub struct OccultationFinder {
    source: Box<dyn EventSource>,
    astronomy: Box<dyn AstronomyProvider>,
    sink: Box<dyn EventSink>,
    site: GeographicLocation,
    plan: SearchPlan,
}

impl OccultationFinder {
    pub fn new(
        source: Box<dyn EventSource>,
        astronomy: Box<dyn AstronomyProvider>,
        sink: Box<dyn EventSink>,
        site: GeographicLocation,
        plan: SearchPlan,
    ) -> Self {
        Self {
            source,
            astronomy,
            sink,
            site,
            plan,
        }
    }

    /// Production wiring: LIneA client, built-in astronomy, JSON file output.
    pub fn from_config(config: &FinderConfig) -> PipelineResult<Self> {
        let site = config.site.location()?;
        let source = LineaClient::new(&config.source)?;
        Ok(Self::new(
            Box::new(source),
            Box::new(SiderustAstronomy::new()),
            Box::new(JsonFileSink::new(config.output.path.clone())),
            site,
            SearchPlan::from(&config.search),
        ))
    }

    /// Run once with `now` as evaluation time.
    ///
    /// The result is published even when empty; only a publishing failure
    /// is returned as an error.
    pub async fn run(&self, now: DateTime<Utc>) -> PipelineResult<RunSummary> {
        let controller = SearchController::new(
            self.source.as_ref(),
            self.astronomy.as_ref(),
            &self.site,
            &self.plan,
        );
        let report = controller.run(now).await;

        let normalized = normalize_all(&report.events);
        self.sink.replace(&normalized)?;

        log::info!(
            "Published {} events ({:?})",
            normalized.len(),
            report.outcome
        );

        Ok(RunSummary {
            outcome: report.outcome,
            published: normalized.len(),
            admitted_past_events: report.admitted_past_events,
            windows_fetched: report.windows_fetched,
            windows_failed: report.windows_failed,
        })
    }
}
