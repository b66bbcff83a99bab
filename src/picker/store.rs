//! Persisting the selected profile between invocations.
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::lib::fs::{read_state_file, write_state_file};

/// Where the selected profile survives between runs.
///
/// Failures are logged by the implementation and never surface.
pub trait SelectionStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, profile: Option<&str>);
}

#[derive(Debug, Clone, Default)]
pub struct MemorySelectionStore {
    profile: Option<String>,
}

impl MemorySelectionStore {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
        }
    }
}

impl SelectionStore for MemorySelectionStore {
    fn load(&self) -> Option<String> {
        self.profile.clone()
    }

    fn save(&mut self, profile: Option<&str>) {
        self.profile = profile.map(str::to_string);
    }
}

/// On-disk form of the selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionRecord {
    pub profile: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// JSON file store used by the CLI.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SelectionStore for FileSelectionStore {
    fn load(&self) -> Option<String> {
        match read_state_file::<SelectionRecord>(&self.path) {
            Ok(record) => record.and_then(|record| record.profile),
            Err(err) => {
                warn!(
                    target: "aws_profile_picker::picker",
                    reason = %err,
                    "Ignoring unreadable selection file"
                );
                None
            }
        }
    }

    fn save(&mut self, profile: Option<&str>) {
        let record = SelectionRecord {
            profile: profile.map(str::to_string),
            updated_at: Utc::now(),
        };
        if let Err(err) = write_state_file(&self.path, &record) {
            warn!(
                target: "aws_profile_picker::picker",
                reason = %err,
                "Failed to persist the selected profile"
            );
        }
    }
}
