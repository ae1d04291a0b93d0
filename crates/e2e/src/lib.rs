//! Bewritten E2E Walkthrough
//!
//! This crate drives a running Bewritten instance through one fixed,
//! hand-ordered user journey and reports which milestones appeared:
//! - Controls a headless browser through a long-lived Playwright driver
//! - Branches on observed UI markers (fresh login, forced rotation, empty dashboard)
//! - Captures screenshots as evidence at every failure and milestone
//! - Produces an ordered phase -> outcome report and an exit status
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Walkthrough (Rust)                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Walkthrough::run(launcher) -> RunReport                    │
//! │    ├── Launcher::launch() -> Page   (session, closed once)  │
//! │    ├── for phase in PhaseId::SEQUENCE                       │
//! │    │     run_phase(phase) -> PhaseOutcome                   │
//! │    │       Completed | Skipped | Warning | Aborted          │
//! │    │     stop on Aborted (hard gates only)                  │
//! │    └── Page::close()                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Phases                                                     │
//! │    launch ─► authenticate ─► rotate_password ─►             │
//! │    await_dashboard* ─► enter_story ─► await_editor* ─►      │
//! │    character_bible ─► breadcrumbs        (* hard gate)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PlaywrightPage ◄── JSON lines ──► node driver.js           │
//! │    replies: goto, count, visible, wait, fill, click, ...    │
//! │    events:  response, request_failed (logged only)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod marker;
pub mod markers;
pub mod page;
pub mod phase;
pub mod phases;
pub mod playwright;
pub mod preflight;
pub mod report;
pub mod runner;

pub use config::WalkthroughConfig;
pub use error::{E2eError, E2eResult};
pub use page::{Launcher, Page};
pub use phase::{PhaseId, PhaseOutcome};
pub use report::{RunReport, RunStatus};
pub use runner::Walkthrough;
