//! Walkthrough runner: owns the session and drives the phases in order

use std::panic::AssertUnwindSafe;
use std::time::Instant;
use futures::FutureExt;
use tracing::{error, info, info_span, warn, Instrument};

use crate::config::WalkthroughConfig;
use crate::diagnostics::Diagnostics;
use crate::error::E2eResult;
use crate::page::{Launcher, Page};
use crate::phase::{PhaseId, PhaseOutcome};
use crate::phases::{self, PhaseContext};
use crate::report::RunReport;

/// One linear verification run against a running application
pub struct Walkthrough {
    config: WalkthroughConfig,
    diagnostics: Diagnostics,
}

impl Walkthrough {
    pub fn new(config: WalkthroughConfig) -> E2eResult<Self> {
        let diagnostics = Diagnostics::new(&config.screenshot_dir)?;
        Ok(Self { config, diagnostics })
    }

    /// Launch a session, run every phase until one aborts, and close the
    /// session exactly once.
    pub async fn run<L: Launcher>(&self, launcher: &L) -> RunReport {
        let mut report = RunReport::new(&self.config.base_url);
        info!(url = %self.config.base_url, "Starting walkthrough");

        let started = Instant::now();
        let page = match launcher.launch().await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "Browser launch failed");
                report.record(
                    PhaseId::Launch,
                    PhaseOutcome::aborted(format!("browser launch failed: {}", e), None),
                    elapsed_ms(started),
                );
                return self.finish(report);
            }
        };

        let drive = AssertUnwindSafe(self.drive(&page, &mut report)).catch_unwind().await;
        if drive.is_err() {
            // Phases are recorded in sequence, so the panicking one is next
            let phase = PhaseId::SEQUENCE
                .get(report.phases.len())
                .copied()
                .unwrap_or(PhaseId::Breadcrumbs);
            error!(phase = phase.as_str(), "Phase panicked; tearing down session");
            report.record(phase, PhaseOutcome::aborted("phase panicked", None), 0);
        }

        if let Err(e) = page.close().await {
            warn!(error = %e, "Browser did not close cleanly");
        }

        self.finish(report)
    }

    async fn drive(&self, page: &dyn Page, report: &mut RunReport) {
        let ctx = PhaseContext::new(page, &self.config, &self.diagnostics);

        for id in PhaseId::SEQUENCE {
            let span = info_span!("phase", name = id.as_str());
            let started = Instant::now();
            let outcome = phases::run_phase(id, &ctx).instrument(span).await;
            let aborted = outcome.is_aborted();

            log_outcome(id, &outcome);
            report.record(id, outcome, elapsed_ms(started));

            if aborted {
                break;
            }
        }
    }

    fn finish(&self, report: RunReport) -> RunReport {
        let report = report.finish(self.diagnostics.artifacts());
        info!(
            status = ?report.status,
            phases = report.phases.len(),
            screenshots = report.artifacts.len(),
            duration_ms = report.duration_ms,
            "Walkthrough finished"
        );
        report
    }
}

fn log_outcome(id: PhaseId, outcome: &PhaseOutcome) {
    match outcome {
        PhaseOutcome::Completed => info!("✓ {}", id),
        PhaseOutcome::Skipped { reason } => info!("- {} skipped: {}", id, reason),
        PhaseOutcome::Warning { message } => warn!("! {} - {}", id, message),
        PhaseOutcome::Aborted { reason, .. } => error!("✗ {} - {}", id, reason),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
