//! 日志内容判定
//! 输入：日志全文；输出：Outcome + 原因

use crate::utils::{Outcome, Result, WatchError};
use regex::Regex;

pub struct LogClassifier {
    success_marker: String,
    error_pattern: Regex,
}

impl LogClassifier {
    /// 正则必须恰好包含一个捕获组
    pub fn new(success_marker: &str, error_pattern: &str) -> Result<Self> {
        if success_marker.is_empty() {
            return Err(WatchError::Config("success marker must not be empty".to_string()));
        }

        let error_pattern = Regex::new(error_pattern)?;
        let groups = error_pattern.captures_len() - 1;
        if groups != 1 {
            return Err(WatchError::Config(format!(
                "error pattern must have exactly one capture group, found {}",
                groups
            )));
        }

        Ok(Self {
            success_marker: success_marker.to_string(),
            error_pattern,
        })
    }

    pub fn classify(&self, text: &str) -> (Outcome, String) {
        let has_success = text.contains(&self.success_marker);

        // 日志按时间追加，最后一次出现的计数为准；该次匹配未捕获到数字也算解析失败
        let error_count = match self.error_pattern.captures_iter(text).last() {
            None => 0,
            Some(caps) => {
                let raw = caps.get(1).map_or("", |m| m.as_str());
                match raw.trim().parse::<u64>() {
                    Ok(n) => n,
                    Err(e) => {
                        return (
                            Outcome::Failure,
                            format!("could not parse error count '{}': {}", raw, e),
                        )
                    }
                }
            }
        };

        match (has_success, error_count > 0) {
            (true, false) => (Outcome::Success, "completed successfully".to_string()),
            (true, true) => (
                Outcome::PartialFailure,
                format!("completed with {} error(s) reported", error_count),
            ),
            (false, true) => (
                Outcome::Failure,
                format!("failed with {} error(s) reported", error_count),
            ),
            (false, false) => (
                Outcome::Failure,
                "success marker not found in log".to_string(),
            ),
        }
    }

    /// 非法字节替换为 U+FFFD，不中断判定
    pub fn classify_bytes(&self, bytes: &[u8]) -> (Outcome, String) {
        self.classify(&String::from_utf8_lossy(bytes))
    }
}
