//! 配置：TOML 文件 + 内置默认值
//! 由 main 构造一次，按引用传给各组件

use crate::utils::{Result, WatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "backupwatch.toml";

// ── 数据结构 ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub checker: CheckerConfig,
    pub alerts: AlertConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    pub base_directory: PathBuf,
    /// 文件名模板，`{date}` 替换为 YYYY-MM-DD
    pub log_file_pattern: String,
    pub success_marker: String,
    /// 必须恰好一个数字捕获组，取最后一次匹配
    pub error_pattern: String,
    pub look_back_days: u32,
    /// 回溯命中的旧日志即使成功也判为失败
    pub fail_on_stale: bool,
    pub jobs: usize,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("./client_logs/"),
            log_file_pattern: "CobianBackup_{date}.log".to_string(),
            success_marker: "O backup foi concluído com sucesso".to_string(),
            error_pattern: r"Erros:\s*(\d+)".to_string(),
            look_back_days: 0,
            fail_on_stale: false,
            jobs: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub enabled: bool,
    /// 通过 tracing 输出告警
    pub log: bool,
    /// 以 JSON Lines 追加写入的告警文件
    pub outbox: Option<PathBuf>,
    /// 外部钩子程序及其参数（邮件、机器人等由它负责）
    pub command: Option<Vec<String>>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log: true,
            outbox: None,
            command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ── 加载 ────────────────────────────────────────────────────────────────────

impl Config {
    /// 读取配置文件；文件不存在时使用默认值
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.checker;
        if c.success_marker.is_empty() {
            return Err(WatchError::Config("checker.success_marker must not be empty".to_string()));
        }
        if !c.log_file_pattern.contains("{date}") {
            return Err(WatchError::Config(format!(
                "checker.log_file_pattern '{}' has no {{date}} placeholder",
                c.log_file_pattern
            )));
        }
        if c.jobs == 0 {
            return Err(WatchError::Config("checker.jobs must be at least 1".to_string()));
        }
        if let Some(cmd) = &self.alerts.command {
            if cmd.is_empty() {
                return Err(WatchError::Config("alerts.command must name a program".to_string()));
            }
        }
        Ok(())
    }
}
