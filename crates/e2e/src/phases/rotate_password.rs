//! Complete the forced password change

use tracing::{info, warn};

use crate::error::E2eResult;
use crate::markers::{self, CONFIRM_PASSWORD_INDEX, CURRENT_PASSWORD_INDEX, NEW_PASSWORD_INDEX, ROTATION_FIELD_COUNT};
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;

    if !page.is_visible(&markers::PASSWORD_UPDATE_REQUIRED).await? {
        return Ok(PhaseOutcome::skipped("password update not required"));
    }

    info!("Password update required");
    let found = page.count(&markers::PASSWORD_INPUT).await?;
    if found != ROTATION_FIELD_COUNT {
        warn!(found, "Unexpected password form layout");
        return Ok(PhaseOutcome::warning(format!(
            "expected {} password inputs, found {}; rotation skipped",
            ROTATION_FIELD_COUNT, found
        )));
    }

    let credentials = &ctx.config.credentials;
    page.fill(markers::PASSWORD_INPUT.nth(CURRENT_PASSWORD_INDEX), &credentials.password).await?;
    page.fill(markers::PASSWORD_INPUT.nth(NEW_PASSWORD_INDEX), &credentials.new_password).await?;
    page.fill(markers::PASSWORD_INPUT.nth(CONFIRM_PASSWORD_INDEX), &credentials.new_password).await?;
    page.click(markers::UPDATE_PASSWORD_BUTTON.first()).await?;
    info!("Password update submitted");

    if page
        .wait_for(&markers::DASHBOARD_HEADING, ctx.config.timeouts.rotation())
        .await?
    {
        Ok(PhaseOutcome::Completed)
    } else {
        Ok(PhaseOutcome::warning("dashboard did not appear after password update"))
    }
}
