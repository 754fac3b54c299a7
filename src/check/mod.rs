pub mod classifier;
pub mod lister;
pub mod orchestrator;
pub mod output;
pub mod report;
pub mod resolver;
pub mod runner;

use crate::config::{CheckerConfig, Config};
use crate::notify::{self, NoopNotifier, Notifier};
use crate::utils::Result;
use chrono::NaiveDate;
use classifier::LogClassifier;
use orchestrator::FleetCheckOrchestrator;
use runner::BackupCheckRunner;
use std::path::Path;

/// 全量巡检；返回编排是否完成（客户端失败不影响返回值）
pub fn run_fleet(
    config: &Config,
    target_date: NaiveDate,
    output_format: &str,
    alerts: bool,
) -> Result<bool> {
    output::check_format(output_format)?;

    let runner = BackupCheckRunner::from_config(&config.checker)?;
    let notifier: Box<dyn Notifier> = if alerts {
        notify::build_notifier(&config.alerts)
    } else {
        Box::new(NoopNotifier)
    };

    let report = FleetCheckOrchestrator::new(&runner, notifier.as_ref())
        .jobs(config.checker.jobs)
        .run_guarded(&config.checker.base_directory, target_date);

    output::display(&report, output_format)?;
    Ok(report.completed)
}

/// 单个客户端检查，不发送告警
pub fn run_client(
    config: &CheckerConfig,
    client_id: &str,
    target_date: NaiveDate,
    output_format: &str,
) -> Result<()> {
    output::check_format(output_format)?;

    let runner = BackupCheckRunner::from_config(config)?;
    let result = runner.check(client_id, target_date);
    output::display_result(&result, output_format)
}

/// 对任意文件做内容判定
pub fn run_classify(config: &CheckerConfig, file: &Path, output_format: &str) -> Result<()> {
    output::check_format(output_format)?;

    let classifier = LogClassifier::new(&config.success_marker, &config.error_pattern)?;
    let bytes = std::fs::read(file)?;
    let (outcome, reason) = classifier.classify_bytes(&bytes);

    match output_format {
        "json" => {
            let value = serde_json::json!({
                "file": file.display().to_string(),
                "outcome": outcome,
                "reason": reason,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        _ => println!("{}: {} - {}", file.display(), outcome, reason),
    }
    Ok(())
}
