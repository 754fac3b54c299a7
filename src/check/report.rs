//! 顶层报告结构体

use crate::utils::{CheckResult, FleetSummary};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetReport {
    pub target_date: NaiveDate,
    pub generated_at: String,
    pub summary: FleetSummary,
    pub results: Vec<CheckResult>,
    /// 编排本身是否完成（与客户端成败无关）
    pub completed: bool,
    pub error: Option<String>,
}

impl FleetReport {
    pub fn new(target_date: NaiveDate) -> Self {
        Self {
            target_date,
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S %z")
                .to_string(),
            summary: FleetSummary::default(),
            results: Vec::new(),
            completed: false,
            error: None,
        }
    }

    pub fn failed(target_date: NaiveDate, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(target_date)
        }
    }
}
