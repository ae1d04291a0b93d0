//! Sign in when the login form is showing

use tracing::info;

use crate::error::E2eResult;
use crate::markers;
use crate::phase::PhaseOutcome;
use crate::phases::PhaseContext;

pub async fn run(ctx: &PhaseContext<'_>) -> E2eResult<PhaseOutcome> {
    let page = ctx.page;

    if page.count(&markers::EMAIL_INPUT).await? == 0 {
        info!("No login form, session already authenticated");
        return Ok(PhaseOutcome::skipped("already authenticated"));
    }

    info!("Login page detected");
    let credentials = &ctx.config.credentials;
    page.fill(markers::EMAIL_INPUT.first(), &credentials.email).await?;
    page.fill(markers::LOGIN_PASSWORD_INPUT.first(), &credentials.password).await?;
    page.click(markers::SIGN_IN_BUTTON.first()).await?;

    // Any of these means the sign-in request was answered
    let landed = page
        .wait_for_any(
            &[
                &markers::DASHBOARD_HEADING,
                &markers::PASSWORD_UPDATE_REQUIRED,
                &markers::NEW_STORY_CTA,
            ],
            ctx.config.timeouts.settle(),
        )
        .await?;

    Ok(match landed {
        Some(_) => PhaseOutcome::Completed,
        None => PhaseOutcome::warning("no post-login marker appeared after sign-in"),
    })
}
