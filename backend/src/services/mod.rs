//! Service layer: the search-and-selection pipeline.
//!
//! Leaves first: astronomy and visibility decide per event, ranking collapses
//! and orders, search drives the escalation ladder, normalizer maps the
//! selection to the published schema, and pipeline ties one run together.

pub mod astronomy;
pub mod normalizer;
pub mod pipeline;
pub mod ranking;
pub mod search;
pub mod visibility;

pub use astronomy::{AstronomyProvider, SiderustAstronomy};
pub use pipeline::{OccultationFinder, RunSummary};
pub use search::{SearchController, SearchOutcome, SearchPlan, SearchReport};
pub use visibility::VisibilityEvaluator;
