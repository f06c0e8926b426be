//! JSON document sink.
//!
//! The list is written to a sibling `.tmp` file and renamed over the target,
//! so readers see either the old document or the new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::EventSink;
use crate::api::NormalizedEvent;
use crate::error::OutputError;

#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "events.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl EventSink for JsonFileSink {
    fn replace(&self, events: &[NormalizedEvent]) -> Result<(), OutputError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let mut body = serde_json::to_vec_pretty(events)?;
        body.push(b'\n');

        let staging = self.staging_path();
        {
            let mut file = fs::File::create(&staging).map_err(|e| io_error(&staging, e))?;
            file.write_all(&body).map_err(|e| io_error(&staging, e))?;
            file.sync_all().map_err(|e| io_error(&staging, e))?;
        }
        fs::rename(&staging, &self.path).map_err(|e| io_error(&self.path, e))?;

        log::info!("Wrote {} events to {}", events.len(), self.path.display());
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> OutputError {
    OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}
