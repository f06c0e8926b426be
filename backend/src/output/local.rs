//! In-memory sink keeping the last published batch.

use parking_lot::RwLock;
use std::sync::Arc;

use super::EventSink;
use crate::api::NormalizedEvent;
use crate::error::OutputError;

#[derive(Clone, Default)]
pub struct LocalSink {
    published: Arc<RwLock<Option<Vec<NormalizedEvent>>>>,
    replacements: Arc<RwLock<usize>>,
}

impl LocalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last published batch, `None` before the first publish.
    pub fn published(&self) -> Option<Vec<NormalizedEvent>> {
        self.published.read().clone()
    }

    /// Number of `replace` calls so far.
    pub fn replacements(&self) -> usize {
        *self.replacements.read()
    }
}

impl EventSink for LocalSink {
    fn replace(&self, events: &[NormalizedEvent]) -> Result<(), OutputError> {
        *self.published.write() = Some(events.to_vec());
        *self.replacements.write() += 1;
        Ok(())
    }
}
