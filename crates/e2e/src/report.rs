//! Machine-readable record of one run

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::diagnostics::Artifact;
use crate::error::E2eResult;
use crate::phase::{PhaseId, PhaseOutcome};

pub const REPORT_FILE: &str = "walkthrough-report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    PassedWithWarnings,
    Aborted,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Passed | RunStatus::PassedWithWarnings => 0,
            RunStatus::Aborted => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: PhaseId,
    #[serde(flatten)]
    pub outcome: PhaseOutcome,
    pub duration_ms: u64,
}

/// Ordered list of phase outcomes plus the evidence captured on the way
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub status: RunStatus,
    pub phases: Vec<PhaseRecord>,
    pub artifacts: Vec<Artifact>,
}

impl RunReport {
    pub fn new(base_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            base_url: base_url.into(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            status: RunStatus::Passed,
            phases: Vec::new(),
            artifacts: Vec::new(),
        }
    }

    pub fn record(&mut self, phase: PhaseId, outcome: PhaseOutcome, duration_ms: u64) {
        self.phases.push(PhaseRecord { phase, outcome, duration_ms });
    }

    /// Stamp the end time and derive the overall status
    pub fn finish(mut self, artifacts: Vec<Artifact>) -> Self {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self.artifacts = artifacts;
        self.status = if self.phases.iter().any(|r| r.outcome.is_aborted()) {
            RunStatus::Aborted
        } else if self.phases.iter().any(|r| r.outcome.is_warning()) {
            RunStatus::PassedWithWarnings
        } else {
            RunStatus::Passed
        };
        self
    }

    pub fn outcome_of(&self, phase: PhaseId) -> Option<&PhaseOutcome> {
        self.phases.iter().find(|r| r.phase == phase).map(|r| &r.outcome)
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    pub fn exit_code(&self) -> i32 {
        self.status.exit_code()
    }

    /// Write the report as pretty JSON into `output_dir`
    pub fn write(&self, output_dir: &Path) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Report written to: {}", path.display());
        Ok(path)
    }
}
