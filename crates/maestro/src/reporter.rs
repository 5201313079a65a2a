//! Step Reporting
//!
//! Records every executed command as a named, timed scope. Scopes opened while
//! another scope is running become its children, so a Step's sub-commands
//! show up nested under the Step in the trail.
//!
//! Each scope also runs inside a `tracing` span named `step`, so installing a
//! subscriber (see [`crate::logging`]) mirrors the trail in the log output.

use crate::result::{MaestroError, MaestroResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Instant, SystemTime};
use tracing::Instrument;
use uuid::Uuid;

/// Status of a recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step is running
    Running,
    /// Step completed successfully
    Passed,
    /// Step completed with error
    Failed,
}

/// One reporting scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Unique step ID
    pub id: String,
    /// Enclosing step ID (if nested)
    pub parent_id: Option<String>,
    /// Human-readable label
    pub title: String,
    /// Nesting depth (0 = top level)
    pub depth: usize,
    /// Start timestamp (ms since reporter creation)
    pub start_ms: u64,
    /// Step duration
    pub duration_ms: Option<u64>,
    /// Step status
    pub status: StepStatus,
    /// Error message if failed
    pub error: Option<String>,
    /// Extra attributes attached while running
    pub attributes: HashMap<String, String>,
}

impl StepRecord {
    fn new(title: &str, parent_id: Option<String>, depth: usize, start_ms: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id,
            title: title.to_string(),
            depth,
            start_ms,
            duration_ms: None,
            status: StepStatus::Running,
            error: None,
            attributes: HashMap::new(),
        }
    }

    fn end(&mut self, end_ms: u64, error: Option<&MaestroError>) {
        self.duration_ms = Some(end_ms.saturating_sub(self.start_ms));
        match error {
            Some(err) => {
                self.status = StepStatus::Failed;
                self.error = Some(err.to_string());
            }
            None => self.status = StepStatus::Passed,
        }
    }

    /// Check if the step has finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status != StepStatus::Running
    }
}

#[derive(Debug)]
struct ReporterState {
    records: Vec<StepRecord>,
    /// Indices of currently open records, innermost last
    open: Vec<usize>,
}

/// Clonable handle to a run's step trail
#[derive(Debug, Clone)]
pub struct StepReporter {
    state: Arc<Mutex<ReporterState>>,
    started: Instant,
    test_name: Arc<str>,
}

impl Default for StepReporter {
    fn default() -> Self {
        Self::new("maestro")
    }
}

impl StepReporter {
    /// Create an empty reporter
    #[must_use]
    pub fn new(test_name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(ReporterState {
                records: Vec::new(),
                open: Vec::new(),
            })),
            started: Instant::now(),
            test_name: Arc::from(test_name),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ReporterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn begin(&self, title: &str) -> usize {
        let start_ms = self.elapsed_ms();
        let mut state = self.lock();
        let parent_id = state.open.last().map(|&i| state.records[i].id.clone());
        let depth = state.open.len();
        state
            .records
            .push(StepRecord::new(title, parent_id, depth, start_ms));
        let index = state.records.len() - 1;
        state.open.push(index);
        index
    }

    fn finish(&self, index: usize, error: Option<&MaestroError>) {
        let end_ms = self.elapsed_ms();
        let mut state = self.lock();
        state.records[index].end(end_ms, error);
        let position = state.open.iter().rposition(|&i| i == index);
        if let Some(pos) = position {
            state.open.truncate(pos);
        }
    }

    /// Run `body` inside a named reporting scope
    ///
    /// The scope is recorded as failed when `body` returns an error; the
    /// error itself is returned unchanged.
    pub async fn scope<T, F>(&self, title: &str, body: F) -> MaestroResult<T>
    where
        F: Future<Output = MaestroResult<T>>,
    {
        let index = self.begin(title);
        let span = tracing::info_span!("step", title = %title);
        let result = body.instrument(span).await;
        self.finish(index, result.as_ref().err());
        result
    }

    /// Attach an attribute to the innermost running step
    pub fn annotate(&self, key: &str, value: impl Into<String>) {
        let mut state = self.lock();
        let innermost = state.open.last().copied();
        if let Some(index) = innermost {
            state.records[index]
                .attributes
                .insert(key.to_string(), value.into());
        }
    }

    /// Copy of every record, in start order
    #[must_use]
    pub fn records(&self) -> Vec<StepRecord> {
        self.lock().records.clone()
    }

    /// Titles of every record, in start order
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.lock().records.iter().map(|r| r.title.clone()).collect()
    }

    /// Records directly nested under `parent_id`
    #[must_use]
    pub fn children_of(&self, parent_id: &str) -> Vec<StepRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect()
    }

    /// The innermost failed step, i.e. the command that triggered a failure
    #[must_use]
    pub fn failed_step(&self) -> Option<StepRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.status == StepStatus::Failed)
            .max_by_key(|r| r.depth)
            .cloned()
    }

    /// Snapshot the trail for export
    #[must_use]
    pub fn trail(&self) -> ReportTrail {
        let records = self.records();
        ReportTrail {
            metadata: TrailMetadata {
                trail_id: Uuid::new_v4().to_string(),
                test_name: self.test_name.to_string(),
                exported_at: SystemTime::now(),
                duration_ms: self.elapsed_ms(),
                step_count: records.len(),
                maestro_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            records,
        }
    }
}

/// Metadata for an exported trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailMetadata {
    /// Trail ID
    pub trail_id: String,
    /// Test name
    pub test_name: String,
    /// Export time
    pub exported_at: SystemTime,
    /// Milliseconds since the reporter was created
    pub duration_ms: u64,
    /// Number of records
    pub step_count: usize,
    /// Maestro version
    pub maestro_version: String,
}

/// Serializable step trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTrail {
    /// Trail metadata
    pub metadata: TrailMetadata,
    /// All records
    pub records: Vec<StepRecord>,
}

impl ReportTrail {
    /// Save trail to JSON file
    pub fn save_json(&self, path: &Path) -> MaestroResult<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, json)?;
        Ok(())
    }

    /// Load trail from JSON file
    pub fn load_json(path: &Path) -> MaestroResult<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
