//! The walkthrough phases
//!
//! Each phase body returns `E2eResult<PhaseOutcome>`. [`run_phase`] is the
//! only place an error leaves a phase, and it always leaves as an outcome:
//! `Aborted` for hard gates (with the gate's failure screenshot), `Warning`
//! for best-effort phases.

use tracing::{error, warn};

use crate::config::WalkthroughConfig;
use crate::diagnostics::{tags, Diagnostics};
use crate::error::E2eResult;
use crate::page::Page;
use crate::phase::{Gate, PhaseId, PhaseOutcome};

pub mod authenticate;
pub mod breadcrumbs;
pub mod characters;
pub mod dashboard;
pub mod editor;
pub mod launch;
pub mod rotate_password;
pub mod story;

/// Everything a phase may touch
pub struct PhaseContext<'a> {
    pub page: &'a dyn Page,
    pub config: &'a WalkthroughConfig,
    pub diagnostics: &'a Diagnostics,
}

impl<'a> PhaseContext<'a> {
    pub fn new(page: &'a dyn Page, config: &'a WalkthroughConfig, diagnostics: &'a Diagnostics) -> Self {
        Self { page, config, diagnostics }
    }
}

/// Run one phase and translate any error into its outcome
pub async fn run_phase(id: PhaseId, ctx: &PhaseContext<'_>) -> PhaseOutcome {
    let result: E2eResult<PhaseOutcome> = match id {
        PhaseId::Launch => launch::run(ctx).await,
        PhaseId::Authenticate => authenticate::run(ctx).await,
        PhaseId::RotatePassword => rotate_password::run(ctx).await,
        PhaseId::AwaitDashboard => dashboard::run(ctx).await,
        PhaseId::EnterStory => story::run(ctx).await,
        PhaseId::AwaitEditor => editor::run(ctx).await,
        PhaseId::CharacterBible => characters::run(ctx).await,
        PhaseId::Breadcrumbs => breadcrumbs::run(ctx).await,
    };

    match result {
        Ok(outcome) => outcome.under(id.gate()),
        Err(e) => match id.gate() {
            Gate::Hard => {
                error!(phase = id.as_str(), error = %e, "Phase failed");
                let screenshot = match failure_tag(id) {
                    Some(tag) => ctx.diagnostics.capture(ctx.page, tag).await,
                    None => None,
                };
                PhaseOutcome::aborted(e.to_string(), screenshot)
            }
            Gate::BestEffort => {
                warn!(phase = id.as_str(), error = %e, "Phase degraded");
                PhaseOutcome::warning(e.to_string())
            }
        },
    }
}

/// Screenshot tag recorded when a hard gate fails, whether by timeout or error
pub fn failure_tag(id: PhaseId) -> Option<&'static str> {
    match id {
        PhaseId::Launch => Some(tags::LAUNCH_FAIL),
        PhaseId::AwaitDashboard => Some(tags::DASHBOARD_FAIL),
        PhaseId::AwaitEditor => Some(tags::EDITOR_FAIL),
        _ => None,
    }
}

/// Collects non-fatal problems inside a multi-step phase
#[derive(Debug, Default)]
pub(crate) struct Warnings(Vec<String>);

impl Warnings {
    pub(crate) fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.0.push(message);
    }

    pub(crate) fn into_outcome(self) -> PhaseOutcome {
        if self.0.is_empty() {
            PhaseOutcome::Completed
        } else {
            PhaseOutcome::warning(self.0.join("; "))
        }
    }
}
