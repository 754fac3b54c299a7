//! 单个客户端的检查流程
//! resolve → read → classify，所有本地错误都转成 CheckResult

use crate::check::classifier::LogClassifier;
use crate::check::resolver::{PathResolver, DATE_FORMAT};
use crate::config::CheckerConfig;
use crate::utils::{CheckResult, Outcome, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct BackupCheckRunner {
    resolver: PathResolver,
    classifier: LogClassifier,
    look_back_days: u32,
    fail_on_stale: bool,
}

impl BackupCheckRunner {
    pub fn new(resolver: PathResolver, classifier: LogClassifier, look_back_days: u32) -> Self {
        Self {
            resolver,
            classifier,
            look_back_days,
            fail_on_stale: false,
        }
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self> {
        let resolver = PathResolver::new(&config.base_directory, &config.log_file_pattern);
        let classifier = LogClassifier::new(&config.success_marker, &config.error_pattern)?;
        Ok(Self::new(resolver, classifier, config.look_back_days).fail_on_stale(config.fail_on_stale))
    }

    pub fn fail_on_stale(mut self, enabled: bool) -> Self {
        self.fail_on_stale = enabled;
        self
    }

    pub fn base_directory(&self) -> &Path {
        self.resolver.base_directory()
    }

    /// 不会返回错误
    pub fn check(&self, client_id: &str, target_date: NaiveDate) -> CheckResult {
        let Some((log_date, path)) = self.locate(client_id, target_date) else {
            let result = CheckResult::not_found(
                client_id,
                target_date,
                format!("log file not found for date {}", target_date.format(DATE_FORMAT)),
            );
            warn!(client = client_id, reason = %result.reason, "backup log missing");
            return result;
        };

        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                let result = CheckResult::not_found(
                    client_id,
                    target_date,
                    format!("failed to read log file {}: {}", path.display(), e),
                );
                warn!(client = client_id, reason = %result.reason, "backup log unreadable");
                return result;
            }
        };

        let (mut outcome, mut reason) = self.classifier.classify_bytes(&bytes);

        if log_date < target_date {
            if self.fail_on_stale && outcome.is_success() {
                outcome = Outcome::Failure;
                reason = format!(
                    "latest log from {} is older than target date {}",
                    log_date.format(DATE_FORMAT),
                    target_date.format(DATE_FORMAT)
                );
            } else {
                reason = format!("{} (latest log is from {})", reason, log_date.format(DATE_FORMAT));
            }
        }

        let result = CheckResult::from_log(client_id, target_date, path, log_date, outcome, reason);
        info!(
            client = client_id,
            outcome = %result.outcome,
            stale = result.stale,
            reason = %result.reason,
            "backup checked"
        );
        result
    }

    fn locate(&self, client_id: &str, target_date: NaiveDate) -> Option<(NaiveDate, PathBuf)> {
        let exact = self.resolver.resolve(client_id, target_date);
        if exact.exists() {
            return Some((target_date, exact));
        }
        if self.look_back_days == 0 {
            return None;
        }
        // 检查当天时按今天回溯，历史日期则以该日期为起点
        if target_date == Local::now().date_naive() {
            self.resolver.find_recent(client_id, self.look_back_days)
        } else {
            self.resolver
                .find_recent_from(client_id, target_date, self.look_back_days)
        }
    }
}
