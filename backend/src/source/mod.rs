//! Prediction sources.
//!
//! A source turns a [`SearchWindow`] into raw candidate events. The search
//! controller treats any [`FetchError`] as "no events for this window".

use async_trait::async_trait;

use crate::api::{RawEvent, SearchWindow};
use crate::error::FetchError;

pub mod linea;
pub mod local;

pub use linea::LineaClient;
pub use local::LocalSource;

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch every candidate event predicted inside `window`.
    async fn fetch(&self, window: &SearchWindow) -> Result<Vec<RawEvent>, FetchError>;
}
