//! 输出层：接收 FleetReport / CheckResult，渲染 text 或 json

use crate::check::report::FleetReport;
use crate::utils::{CheckResult, Outcome, Result, WatchError};
use serde::Serialize;
use std::fmt::Write;

/// 提前校验，避免跑完一轮才发现格式非法
pub fn check_format(format: &str) -> Result<()> {
    match format {
        "json" | "text" => Ok(()),
        other => Err(WatchError::Config(format!("unknown format: {}", other))),
    }
}

pub fn display(report: &FleetReport, format: &str) -> Result<()> {
    match format {
        "json" => display_json(report),
        "text" => {
            print!("{}", render_text(report));
            Ok(())
        }
        other => Err(WatchError::Config(format!("unknown format: {}", other))),
    }
}

pub fn display_result(result: &CheckResult, format: &str) -> Result<()> {
    match format {
        "json" => display_json(result),
        "text" => {
            let mut out = String::new();
            write_result(&mut out, result, true);
            print!("{}", out);
            Ok(())
        }
        other => Err(WatchError::Config(format!("unknown format: {}", other))),
    }
}

// ── JSON ────────────────────────────────────────────────────────────────────

fn display_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

// ── Text ────────────────────────────────────────────────────────────────────

pub fn render_text(report: &FleetReport) -> String {
    let mut out = String::new();

    section(&mut out, "BACKUP CHECK");
    let _ = writeln!(out, "  Target date  : {}", report.target_date);
    let _ = writeln!(out, "  Generated at : {}", report.generated_at);

    if !report.completed {
        let _ = writeln!(
            out,
            "  ⚠ run aborted: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
        return out;
    }

    section(&mut out, &format!("CLIENTS ({})", report.results.len()));
    if report.results.is_empty() {
        let _ = writeln!(out, "  (no client directories found)");
    }
    for r in &report.results {
        write_result(&mut out, r, false);
    }

    let s = &report.summary;
    section(&mut out, "SUMMARY");
    let _ = writeln!(out, "  Clients      : {}", s.total_clients);
    let _ = writeln!(out, "  Successful   : {}", s.successes);
    let _ = writeln!(out, "  Failed       : {}", s.failures);
    let _ = writeln!(
        out,
        "  Alerts       : {} sent / {} attempted",
        s.alerts_sent, s.alerts_attempted
    );
    if s.alerts_failed > 0 {
        let _ = writeln!(out, "  ⚠ {} alert(s) not confirmed", s.alerts_failed);
    }
    if s.failures == 0 {
        let _ = writeln!(out, "  All backups completed successfully");
    }

    out
}

fn write_result(out: &mut String, r: &CheckResult, detailed: bool) {
    let icon = match r.outcome {
        Outcome::Success => "●",
        Outcome::PartialFailure => "◐",
        Outcome::Failure => "✗",
        Outcome::NotFound => "?",
    };
    let stale = if r.stale { "  (stale)" } else { "" };
    let _ = writeln!(
        out,
        "  {} {:<20} {:<16} {}{}",
        icon,
        r.client_id,
        r.outcome.to_string(),
        r.reason,
        stale
    );

    if detailed {
        let _ = writeln!(out, "      Target date : {}", r.target_date);
        match (&r.log_path, r.log_date) {
            (Some(path), Some(date)) => {
                let _ = writeln!(out, "      Log file    : {}", path.display());
                let _ = writeln!(out, "      Log date    : {}", date);
            }
            _ => {
                let _ = writeln!(out, "      Log file    : (not found)");
            }
        }
    }
}

// ── 格式化工具 ───────────────────────────────────────────────────────────────

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", "─".repeat(60));
    let _ = writeln!(out, "  {}", title);
    let _ = writeln!(out, "{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn sample() -> FleetReport {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut report = FleetReport::new(date);
        let results = vec![
            CheckResult::from_log(
                "acme",
                date,
                PathBuf::from("/logs/acme/CobianBackup_2024-06-10.log"),
                date,
                Outcome::Success,
                "completed successfully".to_string(),
            ),
            CheckResult::not_found("globex", date, "log file not found for date 2024-06-10"),
        ];
        for r in &results {
            report.summary.record(r);
        }
        report.summary.alerts_attempted = 1;
        report.summary.alerts_sent = 1;
        report.results = results;
        report.completed = true;
        report
    }

    #[test]
    fn text_lists_clients_and_summary() {
        let text = render_text(&sample());
        assert!(text.contains("CLIENTS (2)"));
        assert!(text.contains("acme"));
        assert!(text.contains("NOT FOUND"));
        assert!(text.contains("Alerts       : 1 sent / 1 attempted"));
        assert!(!text.contains("All backups completed successfully"));
    }

    #[test]
    fn text_for_aborted_run() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let text = render_text(&FleetReport::failed(date, "disk on fire".to_string()));
        assert!(text.contains("run aborted: disk on fire"));
        assert!(!text.contains("SUMMARY"));
    }

    #[test]
    fn report_serializes_outcomes_snake_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["results"][1]["outcome"], "not_found");
        assert_eq!(json["results"][0]["target_date"], "2024-06-10");
        assert_eq!(json["summary"]["total_clients"], 2);
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(check_format("yaml").is_err());
        assert!(check_format("json").is_ok());
    }
}
