//! Walkthrough configuration
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! and command-line flags (each backed by an environment variable).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};

/// Top-level walkthrough configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    /// URL of the running application
    pub base_url: String,

    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,

    /// Directory the JSON run report is written to
    pub output_dir: PathBuf,

    /// Probe the base URL over HTTP before launching the browser
    pub preflight: bool,

    pub credentials: Credentials,

    pub browser: BrowserConfig,

    pub timeouts: Timeouts,

    pub script: ScriptConfig,
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            screenshot_dir: PathBuf::from("verification"),
            output_dir: PathBuf::from("test-results"),
            preflight: true,
            credentials: Credentials::default(),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            script: ScriptConfig::default(),
        }
    }
}

impl WalkthroughConfig {
    /// Load configuration from a TOML file, or defaults if the file is missing
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.browser.viewport.width == 0 || self.browser.viewport.height == 0 {
            return Err(E2eError::Config("viewport dimensions must be non-zero".to_string()));
        }
        if self.credentials.email.is_empty() {
            return Err(E2eError::Config("credentials.email must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Login credentials. Each password is used at most once per run.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub email: String,

    /// Initial password, also the "current" field of the rotation form
    pub password: String,

    /// Password set by the rotation form
    pub new_password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "admin@bewritten.local".to_string(),
            password: "ChangeMeNow123!".to_string(),
            new_password: "NewPass1234!".to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("new_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280, height: 720 }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub engine: Browser,
    pub headless: bool,
    pub viewport: Viewport,

    /// Node executable used to host the Playwright driver
    pub node_binary: PathBuf,

    /// `node_modules` directory containing `playwright` (exported as NODE_PATH)
    pub node_modules: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            engine: Browser::Chromium,
            headless: true,
            viewport: Viewport::default(),
            node_binary: PathBuf::from("node"),
            node_modules: None,
        }
    }
}

/// Upper bounds for every wait in the walkthrough, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub navigation_ms: u64,
    pub app_root_ms: u64,
    pub dashboard_ms: u64,
    pub rotation_ms: u64,
    pub editor_ms: u64,
    /// Post-action waits that replace fixed sleeps
    pub settle_ms: u64,
    /// How long a hover-only control may take to appear
    pub hover_reveal_ms: u64,
    /// Bound on click/fill/type actions
    pub action_ms: u64,
    pub driver_launch_ms: u64,
    pub preflight_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            app_root_ms: 10_000,
            dashboard_ms: 10_000,
            rotation_ms: 10_000,
            editor_ms: 10_000,
            settle_ms: 5_000,
            hover_reveal_ms: 2_000,
            action_ms: 5_000,
            driver_launch_ms: 30_000,
            preflight_ms: 30_000,
        }
    }
}

impl Timeouts {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn app_root(&self) -> Duration {
        Duration::from_millis(self.app_root_ms)
    }

    pub fn dashboard(&self) -> Duration {
        Duration::from_millis(self.dashboard_ms)
    }

    pub fn rotation(&self) -> Duration {
        Duration::from_millis(self.rotation_ms)
    }

    pub fn editor(&self) -> Duration {
        Duration::from_millis(self.editor_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn hover_reveal(&self) -> Duration {
        Duration::from_millis(self.hover_reveal_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn driver_launch(&self) -> Duration {
        Duration::from_millis(self.driver_launch_ms)
    }

    pub fn preflight(&self) -> Duration {
        Duration::from_millis(self.preflight_ms)
    }
}

/// Inputs the walkthrough types into the app
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Name given to the character created when the bible is empty
    pub character_name: String,

    /// Text appended to the editor before adding a breadcrumb
    pub breadcrumb_text: String,

    /// Keyboard shortcut that opens the Character Bible
    pub characters_shortcut: String,

    /// Keyboard shortcut that returns to the editor
    pub editor_shortcut: String,

    /// Delay between simulated keystrokes
    pub typing_delay_ms: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            character_name: "Test Char".to_string(),
            breadcrumb_text: "Testing breadcrumbs.\n".to_string(),
            characters_shortcut: "Control+2".to_string(),
            editor_shortcut: "Control+1".to_string(),
            typing_delay_ms: 20,
        }
    }
}
