//! First hard gate: the authenticated home view

use tracing::{error, info, warn};

use crate::diagnostics::tags;
use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;

    info!("Waiting for dashboard");
    if page
        .wait_for(&markers::DASHBOARD_HEADING, ctx.config.timeouts.dashboard())
        .await?
    {
        info!("Dashboard loaded");
        return Ok(PhaseOutcome::Completed);
    }

    let screenshot = ctx.diagnostics.capture(page, tags::DASHBOARD_FAIL).await;

    if page.is_visible(&markers::NEW_STORY_CTA).await? {
        warn!("Dashboard heading missing, empty-state call to action present");
        return Ok(PhaseOutcome::warning(
            "dashboard heading not found; recovered via empty-state marker",
        ));
    }

    error!("Dashboard not found");
    Ok(PhaseOutcome::aborted(
        "neither the dashboard heading nor the empty-state marker appeared",
        screenshot,
    ))
}
