//! # Occultation Finder
//!
//! Discovers upcoming stellar occultations observable from a fixed ground site
//! and publishes a short, ranked list of them.
//!
//! ## Pipeline
//!
//! 1. Raw predictions are fetched for a time window from a prediction source
//! 2. Each event is tested for visibility (future, target altitude, Sun altitude)
//! 3. Survivors are deduplicated and ordered chronologically
//! 4. Windows widen and thresholds loosen until a quota of events is found,
//!    with a degraded fallback when it never is
//! 5. The selection is normalized and written out as a single replace
//!
//! ## Architecture
//!
//! - [`api`]: Data model shared by every stage
//! - [`models`]: Timestamp handling and schema-tolerant field extraction
//! - [`services`]: Astronomy, visibility, ranking, search and normalization
//! - [`source`]: Prediction sources (LIneA HTTP API, in-memory)
//! - [`output`]: Result publishers (JSON file, in-memory)
//! - [`config`]: TOML configuration with environment overrides
//! - [`error`]: Error taxonomy

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod services;
pub mod source;
