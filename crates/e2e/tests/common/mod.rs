//! Scripted in-memory page for walkthrough tests
//!
//! The fake models the DOM as a count of visible matches per marker name.
//! Clicks, key presses and hovers can trigger reactions that show or hide
//! markers, which is enough to replay the app's state transitions.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;

use bewritten_e2e::config::WalkthroughConfig;
use bewritten_e2e::diagnostics::Diagnostics;
use bewritten_e2e::marker::{Marker, Target};
use bewritten_e2e::markers;
use bewritten_e2e::{E2eError, E2eResult, Launcher, Page};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click(&'static str),
    Press(String),
    Hover(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Show(&'static str, usize),
    Hide(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    Fill(&'static str, usize, String),
    Click(&'static str, usize),
    Hover(&'static str, usize),
    Type(&'static str, usize, String),
    Press(String),
    Screenshot(PathBuf),
}

#[derive(Default)]
struct FakeState {
    present: HashMap<&'static str, usize>,
    reactions: HashMap<Trigger, Vec<Effect>>,
    failing_clicks: HashSet<&'static str>,
    failing_waits: HashSet<&'static str>,
    fail_goto: bool,
    panic_on_press: bool,
    calls: Vec<Call>,
    closes: usize,
}

#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<FakeState>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default().with(&markers::APP_ROOT, 1)
    }

    pub fn with(self, marker: &Marker, count: usize) -> Self {
        self.state.lock().present.insert(marker.name(), count);
        self
    }

    pub fn on_click(self, marker: &Marker, effects: &[Effect]) -> Self {
        self.react(Trigger::Click(marker.name()), effects)
    }

    pub fn on_press(self, key: &str, effects: &[Effect]) -> Self {
        self.react(Trigger::Press(key.to_string()), effects)
    }

    pub fn on_hover(self, marker: &Marker, effects: &[Effect]) -> Self {
        self.react(Trigger::Hover(marker.name()), effects)
    }

    fn react(self, trigger: Trigger, effects: &[Effect]) -> Self {
        self.state
            .lock()
            .reactions
            .entry(trigger)
            .or_default()
            .extend_from_slice(effects);
        self
    }

    pub fn failing_click(self, marker: &Marker) -> Self {
        self.state.lock().failing_clicks.insert(marker.name());
        self
    }

    /// Waiting on `marker` fails like a crashed driver, not a timeout
    pub fn failing_wait(self, marker: &Marker) -> Self {
        self.state.lock().failing_waits.insert(marker.name());
        self
    }

    pub fn failing_goto(self) -> Self {
        self.state.lock().fail_goto = true;
        self
    }

    pub fn panicking_press(self) -> Self {
        self.state.lock().panic_on_press = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn closes(&self) -> usize {
        self.state.lock().closes
    }

    pub fn fills(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Fill(..)))
            .collect()
    }

    pub fn clicked(&self, marker: &Marker) -> bool {
        self.calls()
            .iter()
            .any(|c| matches!(c, Call::Click(name, _) if *name == marker.name()))
    }

    fn visible_count(&self, marker: &Marker) -> usize {
        self.state.lock().present.get(marker.name()).copied().unwrap_or(0)
    }

    fn require(&self, target: Target<'_>) -> E2eResult<()> {
        if self.visible_count(target.marker) > target.index {
            Ok(())
        } else {
            Err(E2eError::MarkerNotFound(target.to_string()))
        }
    }

    fn fire(&self, trigger: Trigger) {
        let mut state = self.state.lock();
        let effects = state.reactions.get(&trigger).cloned().unwrap_or_default();
        for effect in effects {
            match effect {
                Effect::Show(name, count) => {
                    state.present.insert(name, count);
                }
                Effect::Hide(name) => {
                    state.present.remove(name);
                }
            }
        }
    }

    fn log(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> E2eResult<()> {
        self.log(Call::Goto(url.to_string()));
        if self.state.lock().fail_goto {
            return Err(E2eError::Timeout(format!("navigation to {}", url)));
        }
        Ok(())
    }

    async fn count(&self, marker: &Marker) -> E2eResult<usize> {
        Ok(self.visible_count(marker))
    }

    async fn is_visible(&self, marker: &Marker) -> E2eResult<bool> {
        Ok(self.visible_count(marker) > 0)
    }

    async fn wait_for(&self, marker: &Marker, timeout: Duration) -> E2eResult<bool> {
        if self.state.lock().failing_waits.contains(marker.name()) {
            return Err(E2eError::DriverClosed);
        }
        if self.visible_count(marker) > 0 {
            return Ok(true);
        }
        tokio::time::sleep(timeout).await;
        Ok(self.visible_count(marker) > 0)
    }

    async fn fill(&self, target: Target<'_>, value: &str) -> E2eResult<()> {
        self.require(target)?;
        self.log(Call::Fill(target.marker.name(), target.index, value.to_string()));
        Ok(())
    }

    async fn click(&self, target: Target<'_>) -> E2eResult<()> {
        let name = target.marker.name();
        self.log(Call::Click(name, target.index));
        if self.state.lock().failing_clicks.contains(name) {
            return Err(E2eError::Driver {
                op: "click".to_string(),
                reason: format!("element {} is detached", target),
            });
        }
        self.require(target)?;
        self.fire(Trigger::Click(name));
        Ok(())
    }

    async fn hover(&self, target: Target<'_>) -> E2eResult<()> {
        self.require(target)?;
        self.log(Call::Hover(target.marker.name(), target.index));
        self.fire(Trigger::Hover(target.marker.name()));
        Ok(())
    }

    async fn type_text(&self, target: Target<'_>, text: &str) -> E2eResult<()> {
        self.require(target)?;
        self.log(Call::Type(target.marker.name(), target.index, text.to_string()));
        Ok(())
    }

    async fn press(&self, key: &str) -> E2eResult<()> {
        if self.state.lock().panic_on_press {
            panic!("scripted panic on key press");
        }
        self.log(Call::Press(key.to_string()));
        self.fire(Trigger::Press(key.to_string()));
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        std::fs::write(path, b"\x89PNG fake")?;
        self.log(Call::Screenshot(path.to_path_buf()));
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.state.lock().closes += 1;
        Ok(())
    }
}

/// Hands out clones of one scripted page
pub struct FakeLauncher {
    page: FakePage,
    fail: bool,
}

impl FakeLauncher {
    pub fn new(page: &FakePage) -> Self {
        Self { page: page.clone(), fail: false }
    }

    pub fn failing(page: &FakePage) -> Self {
        Self { page: page.clone(), fail: true }
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    type Page = FakePage;

    async fn launch(&self) -> E2eResult<FakePage> {
        if self.fail {
            return Err(E2eError::PlaywrightNotFound);
        }
        Ok(self.page.clone())
    }
}

/// Configuration pointing screenshots and reports into `dir`
pub fn test_config(dir: &Path) -> WalkthroughConfig {
    let mut config = WalkthroughConfig::default();
    config.screenshot_dir = dir.join("verification");
    config.output_dir = dir.join("results");
    config.preflight = false;
    config
}

pub fn diagnostics(config: &WalkthroughConfig) -> Diagnostics {
    Diagnostics::new(&config.screenshot_dir).unwrap()
}

/// Names of the png files written into the screenshot directory
pub fn screenshots(config: &WalkthroughConfig) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(&config.screenshot_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension()? != "png" {
                return None;
            }
            Some(path.file_stem()?.to_string_lossy().to_string())
        })
        .collect();
    names.sort();
    names
}
