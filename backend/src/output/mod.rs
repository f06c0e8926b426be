//! Publication of the final event list.
//!
//! A sink replaces the previously published result wholesale; there are no
//! partial or appended writes.

use crate::api::NormalizedEvent;
use crate::error::OutputError;

pub mod json_file;
pub mod local;

pub use json_file::JsonFileSink;
pub use local::LocalSink;

pub trait EventSink: Send + Sync {
    /// Replace the published result with `events`.
    fn replace(&self, events: &[NormalizedEvent]) -> Result<(), OutputError>;
}
