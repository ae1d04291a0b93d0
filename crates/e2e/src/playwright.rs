//! Playwright browser automation
//!
//! The browser lives in a long-running Node process executing [`DRIVER_SCRIPT`].
//! Rust writes one JSON command per line to its stdin and reads one JSON
//! message per line from its stdout. Messages are either replies to commands
//! or passive network events, which are logged and never answered.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command as TokioCommand};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BrowserConfig;
use crate::diagnostics::absolute;
use crate::error::{E2eError, E2eResult};
use crate::marker::{Marker, Target};
use crate::page::{Launcher, Page};
use crate::preflight;

/// Extra time granted to a reply beyond the command's own timeout
const REPLY_GRACE: Duration = Duration::from_secs(5);

/// How long the driver may take to exit on its own after `close`
const SHUTDOWN_WAIT: Duration = Duration::from_secs(5);

/// Bound on commands that carry no timeout of their own
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Node side of the driver protocol
pub const DRIVER_SCRIPT: &str = r#"
const { chromium, firefox, webkit } = require('playwright');
const readline = require('readline');

const emit = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
const describe = (e) => String((e && e.message) || e);
const [engineName, width, height, headless] = process.argv.slice(2);

(async () => {
  const engines = { chromium, firefox, webkit };
  const browser = await engines[engineName].launch({ headless: headless === 'true' });
  const context = await browser.newContext({
    viewport: { width: Number(width), height: Number(height) }
  });
  const page = await context.newPage();

  page.on('requestfailed', (request) => emit({
    kind: 'request_failed',
    url: request.url(),
    failure: request.failure() ? request.failure().errorText : null
  }));
  page.on('response', (response) => emit({
    kind: 'response',
    status: response.status(),
    url: response.url()
  }));

  const all = (c) => {
    let loc = page.locator(c.selectors[0]);
    for (const alt of c.selectors.slice(1)) {
      loc = loc.or(page.locator(alt));
    }
    return loc;
  };
  const pick = (c) => all(c).nth(c.nth || 0);

  const ops = {
    goto: async (c) => { await page.goto(c.url, { timeout: c.timeout_ms }); return null; },
    count: (c) => all(c).count(),
    visible: (c) => pick(c).isVisible(),
    wait: async (c) => {
      try {
        await pick(c).waitFor({ state: 'visible', timeout: c.timeout_ms });
        return true;
      } catch (e) {
        if (e && e.name === 'TimeoutError') return false;
        throw e;
      }
    },
    fill: async (c) => { await pick(c).fill(c.text, { timeout: c.timeout_ms }); return null; },
    click: async (c) => { await pick(c).click({ timeout: c.timeout_ms }); return null; },
    hover: async (c) => { await pick(c).hover({ timeout: c.timeout_ms }); return null; },
    type: async (c) => {
      await pick(c).pressSequentially(c.text, { delay: c.delay_ms, timeout: c.timeout_ms });
      return null;
    },
    press: async (c) => { await page.keyboard.press(c.key); return null; },
    screenshot: async (c) => { await page.screenshot({ path: c.path, fullPage: c.full_page }); return null; },
    close: async () => { await browser.close(); return null; }
  };

  emit({ kind: 'ready' });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    let cmd;
    try {
      cmd = JSON.parse(line);
    } catch (e) {
      emit({ kind: 'fatal', error: 'unparseable command: ' + describe(e) });
      continue;
    }
    try {
      const value = await ops[cmd.op](cmd);
      emit({ kind: 'reply', id: cmd.id, ok: true, value: value === undefined ? null : value });
    } catch (e) {
      emit({ kind: 'reply', id: cmd.id, ok: false, error: describe(e) });
    }
    if (cmd.op === 'close') break;
  }
  process.exit(0);
})().catch((e) => {
  emit({ kind: 'fatal', error: describe(e) });
  process.exit(1);
});
"#;

/// A command sent to the driver
#[derive(Debug, Clone, Serialize)]
pub struct DriverCommand {
    pub id: u64,
    #[serde(flatten)]
    pub op: DriverOp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DriverOp {
    Goto { url: String, timeout_ms: u64 },
    Count { selectors: Vec<String> },
    Visible { selectors: Vec<String>, nth: usize },
    Wait { selectors: Vec<String>, nth: usize, timeout_ms: u64 },
    Fill { selectors: Vec<String>, nth: usize, text: String, timeout_ms: u64 },
    Click { selectors: Vec<String>, nth: usize, timeout_ms: u64 },
    Hover { selectors: Vec<String>, nth: usize, timeout_ms: u64 },
    Type { selectors: Vec<String>, nth: usize, text: String, delay_ms: u64, timeout_ms: u64 },
    Press { key: String },
    Screenshot { path: PathBuf, full_page: bool },
    Close,
}

impl DriverOp {
    fn name(&self) -> &'static str {
        match self {
            DriverOp::Goto { .. } => "goto",
            DriverOp::Count { .. } => "count",
            DriverOp::Visible { .. } => "visible",
            DriverOp::Wait { .. } => "wait",
            DriverOp::Fill { .. } => "fill",
            DriverOp::Click { .. } => "click",
            DriverOp::Hover { .. } => "hover",
            DriverOp::Type { .. } => "type",
            DriverOp::Press { .. } => "press",
            DriverOp::Screenshot { .. } => "screenshot",
            DriverOp::Close => "close",
        }
    }

    /// How long the driver may take before the reply is considered lost
    fn reply_timeout(&self, grace: Duration) -> Duration {
        let own = match self {
            DriverOp::Goto { timeout_ms, .. }
            | DriverOp::Wait { timeout_ms, .. }
            | DriverOp::Fill { timeout_ms, .. }
            | DriverOp::Click { timeout_ms, .. }
            | DriverOp::Hover { timeout_ms, .. } => Duration::from_millis(*timeout_ms),
            DriverOp::Type { text, delay_ms, timeout_ms, .. } => {
                Duration::from_millis(*timeout_ms + delay_ms * text.chars().count() as u64)
            }
            _ => DEFAULT_COMMAND_TIMEOUT,
        };
        own + grace
    }
}

/// A message emitted by the driver
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverMessage {
    Ready,
    Reply {
        id: u64,
        ok: bool,
        #[serde(default)]
        value: serde_json::Value,
        #[serde(default)]
        error: Option<String>,
    },
    Response {
        status: u16,
        url: String,
    },
    RequestFailed {
        url: String,
        #[serde(default)]
        failure: Option<String>,
    },
    Fatal {
        error: String,
    },
}

/// Messages the reader task forwards to the requester
#[derive(Debug)]
enum Inbound {
    Ready,
    Reply { id: u64, result: Result<serde_json::Value, String> },
    Fatal(String),
}

/// Starts Playwright driver sessions
pub struct PlaywrightLauncher {
    config: BrowserConfig,
    base_url: String,
    launch_timeout: Duration,
    action_timeout: Duration,
    typing_delay: Duration,
    reply_grace: Duration,
    shutdown_wait: Duration,
    preflight_timeout: Option<Duration>,
}

impl PlaywrightLauncher {
    pub fn new(config: BrowserConfig, base_url: impl Into<String>) -> Self {
        Self {
            config,
            base_url: base_url.into(),
            launch_timeout: Duration::from_secs(30),
            action_timeout: Duration::from_secs(5),
            typing_delay: Duration::from_millis(20),
            reply_grace: REPLY_GRACE,
            shutdown_wait: SHUTDOWN_WAIT,
            preflight_timeout: None,
        }
    }

    pub fn with_launch_timeout(mut self, timeout: Duration) -> Self {
        self.launch_timeout = timeout;
        self
    }

    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    pub fn with_typing_delay(mut self, delay: Duration) -> Self {
        self.typing_delay = delay;
        self
    }

    /// Slack on top of each command's own timeout before its reply is abandoned
    pub fn with_reply_grace(mut self, grace: Duration) -> Self {
        self.reply_grace = grace;
        self
    }

    /// Time the driver gets to exit after `close` before it is signalled
    pub fn with_shutdown_wait(mut self, wait: Duration) -> Self {
        self.shutdown_wait = wait;
        self
    }

    /// Probe the base URL over HTTP before spawning the browser
    pub fn with_preflight(mut self, timeout: Duration) -> Self {
        self.preflight_timeout = Some(timeout);
        self
    }

    /// Check that Node can resolve the `playwright` package
    async fn check_playwright_installed(&self) -> E2eResult<()> {
        let mut cmd = TokioCommand::new(&self.config.node_binary);
        cmd.args(["-e", "require.resolve('playwright')"])
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(modules) = self.node_path() {
            cmd.env("NODE_PATH", modules);
        }

        match cmd.status().await {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    fn node_path(&self) -> Option<PathBuf> {
        self.config.node_modules.clone().or_else(|| {
            let local = std::env::current_dir().ok()?.join("node_modules");
            local.is_dir().then_some(local)
        })
    }

    async fn spawn(&self) -> E2eResult<PlaywrightPage> {
        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, DRIVER_SCRIPT)?;

        let viewport = self.config.viewport;
        info!(
            engine = self.config.engine.as_str(),
            width = viewport.width,
            height = viewport.height,
            headless = self.config.headless,
            "Launching browser"
        );

        let mut cmd = TokioCommand::new(&self.config.node_binary);
        cmd.arg(&script_path)
            .arg(self.config.engine.as_str())
            .arg(viewport.width.to_string())
            .arg(viewport.height.to_string())
            .arg(self.config.headless.to_string())
            .current_dir(script_dir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(modules) = self.node_path() {
            cmd.env("NODE_PATH", modules);
        }

        let mut child = cmd.spawn().map_err(|e| {
            E2eError::DriverStartup(format!(
                "Failed to spawn {}: {}",
                self.config.node_binary.display(),
                e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::DriverStartup("driver stdout unavailable".to_string()))?;
        let stderr = child.stderr.take();

        let (tx, mut rx) = mpsc::channel(64);
        let reader = tokio::spawn(read_driver_output(BufReader::new(stdout), tx));
        if let Some(stderr) = stderr {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "bewritten_e2e::driver", "{}", line);
                }
            });
        }

        match tokio::time::timeout(self.launch_timeout, rx.recv()).await {
            Ok(Some(Inbound::Ready)) => {}
            Ok(Some(Inbound::Fatal(error))) => return Err(E2eError::DriverStartup(error)),
            Ok(Some(other)) => {
                return Err(E2eError::DriverStartup(format!(
                    "expected ready message, got {:?}",
                    other
                )))
            }
            Ok(None) => return Err(E2eError::DriverClosed),
            Err(_) => {
                return Err(E2eError::Timeout(format!(
                    "browser launch ({} ms)",
                    self.launch_timeout.as_millis()
                )))
            }
        }

        Ok(PlaywrightPage {
            io: Mutex::new(DriverIo { stdin, replies: rx }),
            child: Mutex::new(child),
            next_id: AtomicU64::new(1),
            action_timeout: self.action_timeout,
            typing_delay: self.typing_delay,
            reply_grace: self.reply_grace,
            shutdown_wait: self.shutdown_wait,
            reader,
            _script_dir: script_dir,
        })
    }
}

#[async_trait]
impl Launcher for PlaywrightLauncher {
    type Page = PlaywrightPage;

    async fn launch(&self) -> E2eResult<PlaywrightPage> {
        if let Some(timeout) = self.preflight_timeout {
            preflight::wait_for_reachable(&self.base_url, timeout).await?;
        }
        self.check_playwright_installed().await?;
        self.spawn().await
    }
}

/// Demultiplex driver stdout: replies go to the requester, events are logged
async fn read_driver_output<R>(reader: BufReader<R>, tx: mpsc::Sender<Inbound>)
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut lines = reader.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let message: DriverMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(_) => {
                debug!(target: "bewritten_e2e::driver", "{}", line);
                continue;
            }
        };

        let inbound = match message {
            DriverMessage::Response { status, url } => {
                info!(target: "bewritten_e2e::network", status, url = %url, "response");
                continue;
            }
            DriverMessage::RequestFailed { url, failure } => {
                warn!(
                    target: "bewritten_e2e::network",
                    url = %url,
                    failure = failure.as_deref().unwrap_or("unknown"),
                    "request failed"
                );
                continue;
            }
            DriverMessage::Ready => Inbound::Ready,
            DriverMessage::Reply { id, ok, value, error } => Inbound::Reply {
                id,
                result: if ok {
                    Ok(value)
                } else {
                    Err(error.unwrap_or_else(|| "unknown driver error".to_string()))
                },
            },
            DriverMessage::Fatal { error } => Inbound::Fatal(error),
        };

        if tx.send(inbound).await.is_err() {
            break;
        }
    }
}

struct DriverIo {
    stdin: ChildStdin,
    replies: mpsc::Receiver<Inbound>,
}

/// Page handle backed by the Node driver
pub struct PlaywrightPage {
    io: Mutex<DriverIo>,
    child: Mutex<Child>,
    next_id: AtomicU64,
    action_timeout: Duration,
    typing_delay: Duration,
    reply_grace: Duration,
    shutdown_wait: Duration,
    reader: JoinHandle<()>,
    _script_dir: TempDir,
}

impl PlaywrightPage {
    /// Send one command and wait for its reply
    async fn request(&self, op: DriverOp) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let op_name = op.name();
        let reply_timeout = op.reply_timeout(self.reply_grace);
        let mut line = serde_json::to_string(&DriverCommand { id, op })?;
        line.push('\n');

        let mut io = self.io.lock().await;
        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let wait = async {
            loop {
                match io.replies.recv().await {
                    Some(Inbound::Reply { id: reply_id, result }) if reply_id == id => {
                        return result.map_err(|reason| E2eError::Driver {
                            op: op_name.to_string(),
                            reason,
                        });
                    }
                    Some(Inbound::Reply { id: stale, .. }) => {
                        debug!(stale, "Discarding reply to abandoned command");
                    }
                    Some(Inbound::Fatal(reason)) => {
                        return Err(E2eError::Driver { op: op_name.to_string(), reason });
                    }
                    Some(Inbound::Ready) => {}
                    None => return Err(E2eError::DriverClosed),
                }
            }
        };

        match tokio::time::timeout(reply_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(E2eError::Timeout(format!(
                "driver reply to {} ({} ms)",
                op_name,
                reply_timeout.as_millis()
            ))),
        }
    }

    fn action_timeout_ms(&self) -> u64 {
        self.action_timeout.as_millis() as u64
    }

    async fn stop_process(&self) {
        let mut child = self.child.lock().await;

        if tokio::time::timeout(self.shutdown_wait, child.wait()).await.is_ok() {
            return;
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = child.id() {
                warn!(pid, "Driver still running after close, sending SIGTERM");
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && tokio::time::timeout(Duration::from_millis(500), child.wait())
                        .await
                        .is_ok()
                {
                    return;
                }
            }
        }

        warn!("Killing driver process");
        let _ = child.kill().await;
    }
}

fn expect_bool(op: &str, value: serde_json::Value) -> E2eResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| E2eError::UnexpectedReply { op: op.to_string(), value })
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str, timeout: Duration) -> E2eResult<()> {
        info!(url, "Navigating");
        self.request(DriverOp::Goto {
            url: url.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
        .await?;
        Ok(())
    }

    async fn count(&self, marker: &Marker) -> E2eResult<usize> {
        let value = self.request(DriverOp::Count { selectors: marker.selectors() }).await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::UnexpectedReply { op: "count".to_string(), value })
    }

    async fn is_visible(&self, marker: &Marker) -> E2eResult<bool> {
        let value = self
            .request(DriverOp::Visible { selectors: marker.selectors(), nth: 0 })
            .await?;
        expect_bool("visible", value)
    }

    async fn wait_for(&self, marker: &Marker, timeout: Duration) -> E2eResult<bool> {
        debug!(marker = marker.name(), timeout_ms = timeout.as_millis() as u64, "Waiting");
        let value = self
            .request(DriverOp::Wait {
                selectors: marker.selectors(),
                nth: 0,
                timeout_ms: timeout.as_millis() as u64,
            })
            .await?;
        expect_bool("wait", value)
    }

    async fn fill(&self, target: Target<'_>, value: &str) -> E2eResult<()> {
        debug!(element = %target, "Filling");
        self.request(DriverOp::Fill {
            selectors: target.marker.selectors(),
            nth: target.index,
            text: value.to_string(),
            timeout_ms: self.action_timeout_ms(),
        })
        .await?;
        Ok(())
    }

    async fn click(&self, target: Target<'_>) -> E2eResult<()> {
        debug!(element = %target, "Clicking");
        self.request(DriverOp::Click {
            selectors: target.marker.selectors(),
            nth: target.index,
            timeout_ms: self.action_timeout_ms(),
        })
        .await?;
        Ok(())
    }

    async fn hover(&self, target: Target<'_>) -> E2eResult<()> {
        debug!(element = %target, "Hovering");
        self.request(DriverOp::Hover {
            selectors: target.marker.selectors(),
            nth: target.index,
            timeout_ms: self.action_timeout_ms(),
        })
        .await?;
        Ok(())
    }

    async fn type_text(&self, target: Target<'_>, text: &str) -> E2eResult<()> {
        debug!(element = %target, chars = text.chars().count(), "Typing");
        self.request(DriverOp::Type {
            selectors: target.marker.selectors(),
            nth: target.index,
            text: text.to_string(),
            delay_ms: self.typing_delay.as_millis() as u64,
            timeout_ms: self.action_timeout_ms(),
        })
        .await?;
        Ok(())
    }

    async fn press(&self, key: &str) -> E2eResult<()> {
        debug!(key, "Pressing");
        self.request(DriverOp::Press { key: key.to_string() }).await?;
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> E2eResult<()> {
        // The driver's working directory is its script dir, not ours
        let path = absolute(path)?;
        self.request(DriverOp::Screenshot { path, full_page: true }).await?;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        info!("Closing browser");
        let result = self.request(DriverOp::Close).await.map(|_| ());
        self.stop_process().await;
        self.reader.abort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_format() {
        let cmd = DriverCommand {
            id: 7,
            op: DriverOp::Fill {
                selectors: vec![r#"input[type="password"]"#.to_string()],
                nth: 2,
                text: "secret".to_string(),
                timeout_ms: 5000,
            },
        };
        assert_eq!(
            serde_json::to_value(&cmd).unwrap(),
            json!({
                "id": 7,
                "op": "fill",
                "selectors": ["input[type=\"password\"]"],
                "nth": 2,
                "text": "secret",
                "timeout_ms": 5000
            })
        );

        let close = DriverCommand { id: 8, op: DriverOp::Close };
        assert_eq!(serde_json::to_value(&close).unwrap(), json!({ "id": 8, "op": "close" }));
    }

    #[test]
    fn test_parse_driver_messages() {
        let reply: DriverMessage =
            serde_json::from_str(r#"{"kind":"reply","id":3,"ok":true,"value":2}"#).unwrap();
        assert_eq!(
            reply,
            DriverMessage::Reply { id: 3, ok: true, value: json!(2), error: None }
        );

        let failed: DriverMessage = serde_json::from_str(
            r#"{"kind":"request_failed","url":"http://localhost:3000/api/me","failure":"net::ERR_ABORTED"}"#,
        )
        .unwrap();
        assert_eq!(
            failed,
            DriverMessage::RequestFailed {
                url: "http://localhost:3000/api/me".to_string(),
                failure: Some("net::ERR_ABORTED".to_string()),
            }
        );

        let response: DriverMessage =
            serde_json::from_str(r#"{"kind":"response","status":404,"url":"http://x/y"}"#).unwrap();
        assert_eq!(response, DriverMessage::Response { status: 404, url: "http://x/y".to_string() });
    }

    #[test]
    fn test_reply_timeout_covers_typing_delay() {
        let op = DriverOp::Type {
            selectors: vec!["div".to_string()],
            nth: 0,
            text: "abcd".to_string(),
            delay_ms: 100,
            timeout_ms: 1000,
        };
        assert_eq!(op.reply_timeout(REPLY_GRACE), Duration::from_millis(1400) + REPLY_GRACE);
        assert_eq!(
            DriverOp::Close.reply_timeout(Duration::ZERO),
            DEFAULT_COMMAND_TIMEOUT
        );
    }

    #[test]
    fn test_driver_script_handles_every_op() {
        for op in [
            "goto", "count", "visible", "wait", "fill", "click", "hover", "type", "press",
            "screenshot", "close",
        ] {
            assert!(DRIVER_SCRIPT.contains(&format!("    {}: ", op)), "missing op {}", op);
        }
        assert!(DRIVER_SCRIPT.contains("'requestfailed'"));
        assert!(DRIVER_SCRIPT.contains("'response'"));
    }

    #[tokio::test]
    async fn test_reader_routes_replies_and_swallows_events() {
        let output = concat!(
            "{\"kind\":\"ready\"}\n",
            "{\"kind\":\"response\",\"status\":200,\"url\":\"http://localhost:3000/\"}\n",
            "not json at all\n",
            "{\"kind\":\"reply\",\"id\":1,\"ok\":false,\"error\":\"boom\"}\n",
        );
        let (tx, mut rx) = mpsc::channel(8);
        read_driver_output(BufReader::new(output.as_bytes()), tx).await;

        assert!(matches!(rx.recv().await, Some(Inbound::Ready)));
        match rx.recv().await {
            Some(Inbound::Reply { id, result }) => {
                assert_eq!(id, 1);
                assert_eq!(result.unwrap_err(), "boom");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert!(rx.recv().await.is_none());
    }
}
