use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 单次备份的判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    PartialFailure,
    Failure,
    NotFound,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// 告警里使用的粗粒度状态标签
    pub fn status_label(self) -> &'static str {
        match self {
            Outcome::Success => "OK",
            Outcome::PartialFailure => "PARTIAL",
            Outcome::Failure => "FAILURE",
            Outcome::NotFound => "MISSING",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Success => write!(f, "SUCCESS"),
            Outcome::PartialFailure => write!(f, "PARTIAL FAILURE"),
            Outcome::Failure => write!(f, "FAILURE"),
            Outcome::NotFound => write!(f, "NOT FOUND"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub client_id: String,
    pub target_date: NaiveDate,
    pub outcome: Outcome,
    pub reason: String,
    pub log_path: Option<PathBuf>,
    pub found: bool,
    /// 实际读取的日志所属日期（回溯命中时早于 target_date）
    pub log_date: Option<NaiveDate>,
    pub stale: bool,
}

impl CheckResult {
    /// NotFound 结果：没有路径，found = false
    pub fn not_found(client_id: &str, target_date: NaiveDate, reason: impl Into<String>) -> Self {
        Self {
            client_id: client_id.to_string(),
            target_date,
            outcome: Outcome::NotFound,
            reason: reason.into(),
            log_path: None,
            found: false,
            log_date: None,
            stale: false,
        }
    }

    pub fn from_log(
        client_id: &str,
        target_date: NaiveDate,
        log_path: PathBuf,
        log_date: NaiveDate,
        outcome: Outcome,
        reason: String,
    ) -> Self {
        debug_assert!(outcome != Outcome::NotFound);
        Self {
            client_id: client_id.to_string(),
            target_date,
            outcome,
            reason,
            log_path: Some(log_path),
            found: true,
            log_date: Some(log_date),
            stale: log_date < target_date,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total_clients: usize,
    pub successes: usize,
    pub failures: usize,
    /// 至少一个通道确认送达的告警数
    pub alerts_sent: usize,
    pub alerts_attempted: usize,
    pub alerts_failed: usize,
}

impl FleetSummary {
    pub fn record(&mut self, result: &CheckResult) {
        self.total_clients += 1;
        if result.is_success() {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn not_found_has_no_path() {
        let r = CheckResult::not_found("acme", date("2024-05-02"), "gone");
        assert_eq!(r.outcome, Outcome::NotFound);
        assert!(!r.found);
        assert!(r.log_path.is_none());
        assert!(!r.stale);
    }

    #[test]
    fn older_log_is_stale() {
        let r = CheckResult::from_log(
            "acme",
            date("2024-05-02"),
            PathBuf::from("/x/acme/log"),
            date("2024-04-30"),
            Outcome::Success,
            "completed successfully".to_string(),
        );
        assert!(r.found);
        assert!(r.stale);
    }

    #[test]
    fn summary_counts_non_success_as_failure() {
        let mut s = FleetSummary::default();
        s.record(&CheckResult::not_found("a", date("2024-05-02"), "x"));
        s.record(&CheckResult::from_log(
            "b",
            date("2024-05-02"),
            PathBuf::from("/b"),
            date("2024-05-02"),
            Outcome::PartialFailure,
            "completed with 1 error(s) reported".to_string(),
        ));
        s.record(&CheckResult::from_log(
            "c",
            date("2024-05-02"),
            PathBuf::from("/c"),
            date("2024-05-02"),
            Outcome::Success,
            "completed successfully".to_string(),
        ));
        assert_eq!(s.total_clients, 3);
        assert_eq!(s.successes, 1);
        assert_eq!(s.failures, 2);
    }

    #[test]
    fn labels() {
        assert_eq!(Outcome::NotFound.status_label(), "MISSING");
        assert_eq!(Outcome::PartialFailure.to_string(), "PARTIAL FAILURE");
    }
}
