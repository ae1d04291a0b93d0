//! Screenshot capture and the artifact ledger

use std::path::{Path, PathBuf};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::E2eResult;
use crate::page::Page;

/// Screenshot tags, one per phase outcome that leaves evidence
pub mod tags {
    pub const LAUNCH_FAIL: &str = "launch_fail";
    pub const DASHBOARD_FAIL: &str = "dashboard_fail";
    pub const EDITOR_LOADED: &str = "editor_loaded";
    pub const EDITOR_FAIL: &str = "editor_fail";
    pub const CHAR_TAB_FAIL: &str = "char_tab_fail";
    pub const CHARACTER_EXPANDED: &str = "character_expanded";
    pub const CHAR_EXPAND_FAIL: &str = "char_expand_fail";
    pub const BREADCRUMB_ADDED: &str = "breadcrumb_added";
    pub const NO_BREADCRUMB_BTN: &str = "no_breadcrumb_btn";
}

/// A file written during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Captures screenshots into one directory and remembers what was written
pub struct Diagnostics {
    screenshot_dir: PathBuf,
    artifacts: Mutex<Vec<Artifact>>,
}

impl Diagnostics {
    /// Create the screenshot directory. A relative directory is anchored at
    /// the current working directory, since the browser driver runs elsewhere.
    pub fn new(screenshot_dir: impl Into<PathBuf>) -> E2eResult<Self> {
        let screenshot_dir = absolute(&screenshot_dir.into())?;
        std::fs::create_dir_all(&screenshot_dir)?;
        Ok(Self {
            screenshot_dir,
            artifacts: Mutex::new(Vec::new()),
        })
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{}.png", tag))
    }

    /// Take a screenshot tagged `tag`.
    ///
    /// Failures are logged and reported as `None`; evidence capture never
    /// changes a phase's outcome.
    pub async fn capture(&self, page: &dyn Page, tag: &str) -> Option<PathBuf> {
        let path = self.path_for(tag);
        if let Err(e) = page.screenshot(&path).await {
            warn!(tag, error = %e, "Screenshot failed");
            return None;
        }

        let sha256 = match hash_file(&path) {
            Ok(digest) => digest,
            Err(e) => {
                warn!(tag, error = %e, "Screenshot not readable after capture");
                return None;
            }
        };

        info!(tag, path = %path.display(), "Screenshot saved");
        self.artifacts.lock().push(Artifact {
            name: tag.to_string(),
            path: path.clone(),
            sha256,
        });
        Some(path)
    }

    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts.lock().clone()
    }
}

/// Resolve `path` against the current working directory if it is relative
pub(crate) fn absolute(path: &Path) -> E2eResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for_tag() {
        let dir = tempfile::tempdir().unwrap();
        let diagnostics = Diagnostics::new(dir.path().join("shots")).unwrap();
        assert!(diagnostics.screenshot_dir().is_dir());
        assert_eq!(
            diagnostics.path_for(tags::EDITOR_LOADED),
            dir.path().join("shots").join("editor_loaded.png")
        );
        assert!(diagnostics.artifacts().is_empty());
    }

    #[test]
    fn test_relative_dir_is_anchored_at_cwd() {
        let scratch = tempfile::Builder::new().prefix("shots").tempdir_in(".").unwrap();
        let relative = PathBuf::from(scratch.path().file_name().unwrap()).join("verification");
        assert!(relative.is_relative());

        let diagnostics = Diagnostics::new(&relative).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(diagnostics.screenshot_dir(), cwd.join(&relative));
        assert!(diagnostics.path_for(tags::DASHBOARD_FAIL).is_absolute());
        assert!(cwd.join(&relative).is_dir());
    }

    #[test]
    fn test_hash_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(
            hash_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
