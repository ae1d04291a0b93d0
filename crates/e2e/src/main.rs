//! Walkthrough entry point
//!
//! Exit status: 0 when every hard gate passed, 1 when the run aborted,
//! 2 when the harness itself could not run or report.

use std::path::PathBuf;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use bewritten_e2e::config::Browser;
use bewritten_e2e::playwright::PlaywrightLauncher;
use bewritten_e2e::{Walkthrough, WalkthroughConfig};

#[derive(Parser, Debug)]
#[command(name = "bewritten-walkthrough")]
#[command(about = "Browser walkthrough of the Bewritten app")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "BEWRITTEN_E2E_CONFIG", default_value = "walkthrough.toml")]
    config: PathBuf,

    /// URL of the running application
    #[arg(long, env = "BEWRITTEN_BASE_URL")]
    base_url: Option<String>,

    /// Login email
    #[arg(long, env = "BEWRITTEN_EMAIL")]
    email: Option<String>,

    /// Initial password
    #[arg(long, env = "BEWRITTEN_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Password set when a rotation is forced
    #[arg(long, env = "BEWRITTEN_NEW_PASSWORD", hide_env_values = true)]
    new_password: Option<String>,

    /// Directory for screenshots
    #[arg(long, env = "BEWRITTEN_SCREENSHOT_DIR")]
    screenshot_dir: Option<PathBuf>,

    /// Directory for the JSON report
    #[arg(short, long, env = "BEWRITTEN_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Viewport width
    #[arg(long)]
    viewport_width: Option<u32>,

    /// Viewport height
    #[arg(long)]
    viewport_height: Option<u32>,

    /// Do not probe the base URL before launching the browser
    #[arg(long)]
    skip_preflight: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, config: &mut WalkthroughConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
        if let Some(email) = self.email {
            config.credentials.email = email;
        }
        if let Some(password) = self.password {
            config.credentials.password = password;
        }
        if let Some(new_password) = self.new_password {
            config.credentials.new_password = new_password;
        }
        if let Some(dir) = self.screenshot_dir {
            config.screenshot_dir = dir;
        }
        if let Some(dir) = self.output {
            config.output_dir = dir;
        }
        if let Some(browser) = self.browser {
            config.browser.engine = browser;
        }
        if self.headed {
            config.browser.headless = false;
        }
        if let Some(width) = self.viewport_width {
            config.browser.viewport.width = width;
        }
        if let Some(height) = self.viewport_height {
            config.browser.viewport.height = height;
        }
        if self.skip_preflight {
            config.preflight = false;
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn launcher_for(config: &WalkthroughConfig) -> PlaywrightLauncher {
    let timeouts = &config.timeouts;
    let launcher = PlaywrightLauncher::new(config.browser.clone(), config.base_url.clone())
        .with_launch_timeout(timeouts.driver_launch())
        .with_action_timeout(timeouts.action())
        .with_typing_delay(std::time::Duration::from_millis(config.script.typing_delay_ms));

    if config.preflight {
        launcher.with_preflight(timeouts.preflight())
    } else {
        launcher
    }
}

async fn async_main(args: Args) -> anyhow::Result<i32> {
    let mut config = WalkthroughConfig::load(&args.config)?;
    args.apply(&mut config);
    config.validate()?;

    let output_dir = config.output_dir.clone();
    let launcher = launcher_for(&config);
    let walkthrough = Walkthrough::new(config)?;

    let report = walkthrough.run(&launcher).await;
    report.write(&output_dir)?;

    Ok(report.exit_code())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.json_logs);

    let code = match async_main(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };
    std::process::exit(code);
}
