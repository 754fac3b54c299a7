//! 告警通道
//! log: tracing 输出；outbox: JSON Lines 文件；command: 外部钩子程序

use crate::notify::message;
use crate::notify::Alert;
use crate::utils::{Result, WatchError};
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tracing::warn;

pub trait Channel {
    fn name(&self) -> &str;
    fn send(&self, alert: &Alert) -> Result<()>;
}

// ── log ─────────────────────────────────────────────────────────────────────

pub struct LogChannel;

impl Channel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn send(&self, alert: &Alert) -> Result<()> {
        warn!(
            client = %alert.client_id,
            status = %alert.status,
            reason = %alert.reason,
            "{}",
            message::subject(alert)
        );
        Ok(())
    }
}

// ── outbox ──────────────────────────────────────────────────────────────────

pub struct OutboxChannel {
    path: PathBuf,
}

impl OutboxChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Channel for OutboxChannel {
    fn name(&self) -> &str {
        "outbox"
    }

    fn send(&self, alert: &Alert) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let line = serde_json::to_string(alert)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

// ── command ─────────────────────────────────────────────────────────────────

/// 告警内容通过环境变量传给钩子程序
pub struct CommandChannel {
    program: String,
    args: Vec<String>,
}

impl CommandChannel {
    pub fn new(program: &str, args: &[String]) -> Self {
        Self {
            program: program.to_string(),
            args: args.to_vec(),
        }
    }
}

impl Channel for CommandChannel {
    fn name(&self) -> &str {
        "command"
    }

    fn send(&self, alert: &Alert) -> Result<()> {
        let out = Command::new(&self.program)
            .args(&self.args)
            .env("BACKUPWATCH_CLIENT", &alert.client_id)
            .env("BACKUPWATCH_STATUS", &alert.status)
            .env("BACKUPWATCH_REASON", &alert.reason)
            .env("BACKUPWATCH_SUBJECT", message::subject(alert))
            .env("BACKUPWATCH_MESSAGE", message::render_text(alert))
            .output()
            .map_err(|e| WatchError::Notify(format!("{} failed to start: {}", self.program, e)))?;

        if !out.status.success() {
            return Err(WatchError::Notify(format!(
                "{} exited with {}: {}",
                self.program,
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(())
    }
}
