//! 全量巡检：列出客户端 → 逐个检查 → 汇总 → 对失败客户端各发一次告警
//!
//! 单个客户端的检查或告警出错不会中断整轮；只有枚举客户端失败这类
//! 编排级错误才会让本轮失败，此时尽力发送一条系统告警。

use crate::check::lister;
use crate::check::report::FleetReport;
use crate::check::runner::BackupCheckRunner;
use crate::notify::{Notifier, SYSTEM_CLIENT, SYSTEM_STATUS};
use crate::utils::{CheckResult, FleetSummary, Outcome, Result, WatchError};
use chrono::NaiveDate;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use tracing::{error, info, warn};

/// 单客户端检查的抽象，便于并行与测试替换
pub trait ClientCheck: Sync {
    /// 解析日志路径所用的根目录
    fn base_directory(&self) -> &Path;
    fn check(&self, client_id: &str, target_date: NaiveDate) -> CheckResult;
}

impl ClientCheck for BackupCheckRunner {
    fn base_directory(&self) -> &Path {
        BackupCheckRunner::base_directory(self)
    }

    fn check(&self, client_id: &str, target_date: NaiveDate) -> CheckResult {
        BackupCheckRunner::check(self, client_id, target_date)
    }
}

pub struct FleetCheckOrchestrator<'a> {
    checker: &'a dyn ClientCheck,
    notifier: &'a dyn Notifier,
    jobs: usize,
}

impl<'a> FleetCheckOrchestrator<'a> {
    pub fn new(checker: &'a dyn ClientCheck, notifier: &'a dyn Notifier) -> Self {
        Self {
            checker,
            notifier,
            jobs: 1,
        }
    }

    /// 并行检查的线程数；告警始终串行发送
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn run(&self, base_directory: &Path, target_date: NaiveDate) -> Result<FleetReport> {
        info!(date = %target_date, base = %base_directory.display(), "starting fleet check");

        // 列目录与解析路径必须基于同一个根目录
        let checker_base = self.checker.base_directory();
        if checker_base != base_directory {
            return Err(WatchError::Config(format!(
                "fleet base {} differs from the checker's base {}",
                base_directory.display(),
                checker_base.display()
            )));
        }

        let clients = lister::list_clients(base_directory)?;
        let results = self.check_all(&clients, target_date);

        let mut report = FleetReport::new(target_date);
        for result in &results {
            report.summary.record(result);
            if !result.is_success() {
                self.dispatch(result, &mut report.summary);
            }
        }
        report.results = results;
        report.completed = true;

        let s = &report.summary;
        info!(
            total = s.total_clients,
            successes = s.successes,
            failures = s.failures,
            alerts_sent = s.alerts_sent,
            "fleet check finished"
        );
        if s.failures > 0 {
            warn!("{} backup(s) failed", s.failures);
        }
        Ok(report)
    }

    /// 外层边界：任何编排级错误都转成失败报告，并尽力发一条系统告警
    pub fn run_guarded(&self, base_directory: &Path, target_date: NaiveDate) -> FleetReport {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.run(base_directory, target_date)));

        let err = match outcome {
            Ok(Ok(report)) => return report,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => {
                WatchError::Internal(format!("unexpected panic: {}", panic_message(payload.as_ref())))
                    .to_string()
            }
        };

        error!("fleet check aborted: {}", err);
        self.send_system_alert(&err);
        FleetReport::failed(target_date, err)
    }

    fn check_all(&self, clients: &[String], target_date: NaiveDate) -> Vec<CheckResult> {
        let checker = self.checker;

        if self.jobs <= 1 || clients.len() <= 1 {
            return clients
                .iter()
                .map(|c| check_isolated(checker, c, target_date))
                .collect();
        }

        let chunk_size = clients.len().div_ceil(self.jobs);
        std::thread::scope(|s| {
            let handles: Vec<_> = clients
                .chunks(chunk_size)
                .map(|part| {
                    let handle = s.spawn(move || {
                        part.iter()
                            .map(|c| check_isolated(checker, c, target_date))
                            .collect::<Vec<_>>()
                    });
                    (part, handle)
                })
                .collect();

            // 按分块顺序合并，保持客户端字典序
            handles
                .into_iter()
                .flat_map(|(part, handle)| merge_chunk(part, target_date, handle.join()))
                .collect()
        })
    }

    fn dispatch(&self, result: &CheckResult, summary: &mut FleetSummary) {
        let client = result.client_id.as_str();
        let status = result.outcome.status_label();
        summary.alerts_attempted += 1;

        let sent = catch_unwind(AssertUnwindSafe(|| {
            self.notifier.notify(client, status, &result.reason)
        }));

        match sent {
            Ok(Ok(delivery)) if delivery.delivered() => {
                summary.alerts_sent += 1;
                info!(client, status, "alert sent");
            }
            Ok(Ok(delivery)) => {
                summary.alerts_failed += 1;
                warn!(client, status, channels = ?delivery.channels, "alert not confirmed by any channel");
            }
            Ok(Err(e)) => {
                summary.alerts_failed += 1;
                error!(client, status, "alert dispatch failed: {}", e);
            }
            Err(payload) => {
                summary.alerts_failed += 1;
                error!(client, status, "alert dispatch panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }

    fn send_system_alert(&self, err: &str) {
        let reason = format!("backup check run failed: {}", err);
        let sent = catch_unwind(AssertUnwindSafe(|| {
            self.notifier.notify(SYSTEM_CLIENT, SYSTEM_STATUS, &reason)
        }));
        match sent {
            Ok(Ok(d)) if d.delivered() => info!("system alert sent"),
            Ok(Ok(_)) => warn!("system alert not confirmed by any channel"),
            Ok(Err(e)) => error!("system alert failed: {}", e),
            Err(payload) => error!("system alert panicked: {}", panic_message(payload.as_ref())),
        }
    }
}

fn check_isolated(checker: &dyn ClientCheck, client_id: &str, target_date: NaiveDate) -> CheckResult {
    match catch_unwind(AssertUnwindSafe(|| checker.check(client_id, target_date))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            error!(client = client_id, "check panicked: {}", msg);
            internal_failure(client_id, target_date, &msg)
        }
    }
}

/// 工作线程异常退出时，为该分块内每个客户端补一条失败结果
fn merge_chunk(
    part: &[String],
    target_date: NaiveDate,
    joined: std::thread::Result<Vec<CheckResult>>,
) -> Vec<CheckResult> {
    joined.unwrap_or_else(|payload| {
        let msg = format!("worker thread panicked: {}", panic_message(payload.as_ref()));
        error!("{}", msg);
        part.iter()
            .map(|c| internal_failure(c, target_date, &msg))
            .collect()
    })
}

fn internal_failure(client_id: &str, target_date: NaiveDate, msg: &str) -> CheckResult {
    CheckResult {
        outcome: Outcome::Failure,
        reason: format!("internal error while checking client: {}", msg),
        ..CheckResult::not_found(client_id, target_date, String::new())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
