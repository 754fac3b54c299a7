pub mod channel;
pub mod message;

use crate::config::AlertConfig;
use crate::utils::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error};

pub use channel::{Channel, CommandChannel, LogChannel, OutboxChannel};

/// 系统级告警使用的客户端名
pub const SYSTEM_CLIENT: &str = "SYSTEM";
pub const SYSTEM_STATUS: &str = "CRITICAL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub client_id: String,
    pub status: String,
    pub reason: String,
    pub raised_at: DateTime<Local>,
}

impl Alert {
    pub fn new(client_id: &str, status: &str, reason: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            status: status.to_string(),
            reason: reason.to_string(),
            raised_at: Local::now(),
        }
    }
}

/// 每个通道的送达结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub channels: BTreeMap<String, bool>,
}

impl Delivery {
    /// 至少一个通道成功
    pub fn delivered(&self) -> bool {
        self.channels.values().any(|ok| *ok)
    }
}

pub trait Notifier {
    fn notify(&self, client_id: &str, status: &str, reason: &str) -> Result<Delivery>;
}

/// 告警关闭时使用
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, client_id: &str, status: &str, _reason: &str) -> Result<Delivery> {
        debug!(client = client_id, status, "alerts disabled, dropping");
        Ok(Delivery::default())
    }
}

/// 逐个通道发送，单个通道失败不影响其他通道
pub struct FanoutNotifier {
    channels: Vec<Box<dyn Channel>>,
}

impl FanoutNotifier {
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, client_id: &str, status: &str, reason: &str) -> Result<Delivery> {
        let alert = Alert::new(client_id, status, reason);
        let mut delivery = Delivery::default();

        for ch in &self.channels {
            let ok = match ch.send(&alert) {
                Ok(()) => true,
                Err(e) => {
                    error!(channel = ch.name(), client = client_id, "alert channel failed: {}", e);
                    false
                }
            };
            delivery.channels.insert(ch.name().to_string(), ok);
        }

        Ok(delivery)
    }
}

/// 按配置选择实现
pub fn build_notifier(config: &AlertConfig) -> Box<dyn Notifier> {
    if !config.enabled {
        return Box::new(NoopNotifier);
    }

    let mut channels: Vec<Box<dyn Channel>> = Vec::new();
    if config.log {
        channels.push(Box::new(LogChannel));
    }
    if let Some(path) = &config.outbox {
        channels.push(Box::new(OutboxChannel::new(path)));
    }
    if let Some(cmd) = &config.command {
        if let Some((program, args)) = cmd.split_first() {
            channels.push(Box::new(CommandChannel::new(program, args)));
        }
    }

    Box::new(FanoutNotifier::new(channels))
}
