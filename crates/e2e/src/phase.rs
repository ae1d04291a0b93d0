//! Phase identities, failure policy and outcomes

use std::fmt;
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Every phase of the walkthrough, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    Launch,
    Authenticate,
    RotatePassword,
    AwaitDashboard,
    EnterStory,
    AwaitEditor,
    CharacterBible,
    Breadcrumbs,
}

/// What a failing phase does to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Failure aborts the whole run
    Hard,
    /// Failure is logged and the run continues
    BestEffort,
}

impl PhaseId {
    pub const SEQUENCE: [PhaseId; 8] = [
        PhaseId::Launch,
        PhaseId::Authenticate,
        PhaseId::RotatePassword,
        PhaseId::AwaitDashboard,
        PhaseId::EnterStory,
        PhaseId::AwaitEditor,
        PhaseId::CharacterBible,
        PhaseId::Breadcrumbs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseId::Launch => "launch",
            PhaseId::Authenticate => "authenticate",
            PhaseId::RotatePassword => "rotate_password",
            PhaseId::AwaitDashboard => "await_dashboard",
            PhaseId::EnterStory => "enter_story",
            PhaseId::AwaitEditor => "await_editor",
            PhaseId::CharacterBible => "character_bible",
            PhaseId::Breadcrumbs => "breadcrumbs",
        }
    }

    pub fn gate(&self) -> Gate {
        match self {
            PhaseId::Launch | PhaseId::AwaitDashboard | PhaseId::AwaitEditor => Gate::Hard,
            _ => Gate::BestEffort,
        }
    }

    pub fn is_hard_gate(&self) -> bool {
        self.gate() == Gate::Hard
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PhaseOutcome {
    Completed,

    /// Precondition absent; nothing to do
    Skipped { reason: String },

    /// Finished in a degraded way; the run continues
    Warning { message: String },

    /// The run stops here
    Aborted {
        reason: String,
        screenshot: Option<PathBuf>,
    },
}

impl PhaseOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        PhaseOutcome::Skipped { reason: reason.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        PhaseOutcome::Warning { message: message.into() }
    }

    pub fn aborted(reason: impl Into<String>, screenshot: Option<PathBuf>) -> Self {
        PhaseOutcome::Aborted {
            reason: reason.into(),
            screenshot,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, PhaseOutcome::Aborted { .. })
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, PhaseOutcome::Warning { .. })
    }

    /// Apply the phase's gate: best-effort phases never abort the run
    pub fn under(self, gate: Gate) -> Self {
        match (self, gate) {
            (PhaseOutcome::Aborted { reason, .. }, Gate::BestEffort) => PhaseOutcome::Warning { message: reason },
            (outcome, _) => outcome,
        }
    }
}
