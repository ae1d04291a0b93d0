//! Open the application and wait for it to mount

use tracing::{error, info};

use crate::diagnostics::tags;
use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let timeouts = &ctx.config.timeouts;

    if let Err(e) = ctx.page.goto(&ctx.config.base_url, timeouts.navigation()).await {
        error!(url = %ctx.config.base_url, error = %e, "Navigation failed");
        let screenshot = ctx.diagnostics.capture(ctx.page, tags::LAUNCH_FAIL).await;
        return Ok(PhaseOutcome::aborted(
            format!("navigation to {} failed: {}", ctx.config.base_url, e),
            screenshot,
        ));
    }

    if !ctx.page.wait_for(&markers::APP_ROOT, timeouts.app_root()).await? {
        error!("Root element not found");
        let screenshot = ctx.diagnostics.capture(ctx.page, tags::LAUNCH_FAIL).await;
        return Ok(PhaseOutcome::aborted("application root never mounted", screenshot));
    }

    info!("Application loaded");
    Ok(PhaseOutcome::Completed)
}
