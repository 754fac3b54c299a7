//! 客户端日志路径推导
//! base / client_id / pattern({date} -> YYYY-MM-DD)

use chrono::{Days, Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Debug, Clone)]
pub struct PathResolver {
    base_directory: PathBuf,
    log_file_pattern: String,
}

impl PathResolver {
    pub fn new(base_directory: impl Into<PathBuf>, log_file_pattern: &str) -> Self {
        Self {
            base_directory: base_directory.into(),
            log_file_pattern: log_file_pattern.to_string(),
        }
    }

    /// 纯函数，不访问文件系统
    pub fn resolve(&self, client_id: &str, date: NaiveDate) -> PathBuf {
        let file_name = self
            .log_file_pattern
            .replace(DATE_PLACEHOLDER, &date.format(DATE_FORMAT).to_string());
        self.base_directory.join(client_id).join(file_name)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// 探测顺序：anchor, anchor-1, ..., anchor-max_days_back，按需生成
    pub fn candidates<'a>(
        &'a self,
        client_id: &'a str,
        anchor: NaiveDate,
        max_days_back: u32,
    ) -> impl Iterator<Item = (NaiveDate, PathBuf)> + 'a {
        (0..=u64::from(max_days_back))
            .map_while(move |i| anchor.checked_sub_days(Days::new(i)))
            .map(move |d| (d, self.resolve(client_id, d)))
    }

    /// 以今天为起点回溯查找，返回命中的日志及其日期
    pub fn find_recent(&self, client_id: &str, max_days_back: u32) -> Option<(NaiveDate, PathBuf)> {
        let today = Local::now().date_naive();
        self.find_recent_from(client_id, today, max_days_back)
    }

    /// 返回最近一个存在的日志及其日期
    pub fn find_recent_from(
        &self,
        client_id: &str,
        anchor: NaiveDate,
        max_days_back: u32,
    ) -> Option<(NaiveDate, PathBuf)> {
        self.candidates(client_id, anchor, max_days_back)
            .find(|(date, path)| {
                let hit = path.exists();
                debug!(client = client_id, %date, path = %path.display(), hit, "look-back candidate");
                hit
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn resolve_expands_date() {
        let r = PathResolver::new("/srv/logs", "CobianBackup_{date}.log");
        assert_eq!(
            r.resolve("acme", date("2024-03-07")),
            PathBuf::from("/srv/logs/acme/CobianBackup_2024-03-07.log")
        );
    }

    #[test]
    fn resolve_is_deterministic() {
        let r = PathResolver::new("/srv/logs", "{date}/run-{date}.txt");
        let a = r.resolve("globex", date("2023-12-31"));
        let b = r.resolve("globex", date("2023-12-31"));
        assert_eq!(a, b);
        assert_eq!(a, PathBuf::from("/srv/logs/globex/2023-12-31/run-2023-12-31.txt"));
    }

    #[test]
    fn candidates_most_recent_first() {
        let r = PathResolver::new("/b", "{date}.log");
        let dates: Vec<_> = r
            .candidates("x", date("2024-03-01"), 2)
            .map(|(d, _)| d.to_string())
            .collect();
        assert_eq!(dates, ["2024-03-01", "2024-02-29", "2024-02-28"]);
    }

    #[test]
    fn candidates_with_zero_window_hold_only_anchor() {
        let r = PathResolver::new("/b", "{date}.log");
        assert_eq!(r.candidates("x", date("2024-03-01"), 0).count(), 1);
    }

    #[test]
    fn find_recent_from_picks_newest_existing() {
        let tmp = TempDir::new().unwrap();
        let r = PathResolver::new(tmp.path(), "log_{date}.txt");
        fs::create_dir_all(tmp.path().join("acme")).unwrap();
        fs::write(r.resolve("acme", date("2024-03-05")), "old").unwrap();
        fs::write(r.resolve("acme", date("2024-03-08")), "newer").unwrap();

        let (d, p) = r.find_recent_from("acme", date("2024-03-10"), 5).unwrap();
        assert_eq!(d, date("2024-03-08"));
        assert_eq!(p, r.resolve("acme", date("2024-03-08")));
    }

    #[test]
    fn find_recent_from_respects_window() {
        let tmp = TempDir::new().unwrap();
        let r = PathResolver::new(tmp.path(), "log_{date}.txt");
        fs::create_dir_all(tmp.path().join("acme")).unwrap();
        fs::write(r.resolve("acme", date("2024-03-05")), "old").unwrap();

        assert!(r.find_recent_from("acme", date("2024-03-10"), 4).is_none());
        assert!(r.find_recent_from("acme", date("2024-03-10"), 5).is_some());
    }

    #[test]
    fn find_recent_absent_when_nothing_exists() {
        let tmp = TempDir::new().unwrap();
        let r = PathResolver::new(tmp.path(), "log_{date}.txt");
        assert!(r.find_recent("ghost", 7).is_none());
    }

    #[test]
    fn find_recent_sees_todays_log() {
        let tmp = TempDir::new().unwrap();
        let r = PathResolver::new(tmp.path(), "log_{date}.txt");
        let today = Local::now().date_naive();
        fs::create_dir_all(tmp.path().join("acme")).unwrap();
        fs::write(r.resolve("acme", today), "x").unwrap();
        assert_eq!(r.find_recent("acme", 0), Some((today, r.resolve("acme", today))));
    }

    #[test]
    fn huge_window_is_generated_lazily() {
        let r = PathResolver::new("/b", "{date}.log");
        let first: Vec<_> = r
            .candidates("x", date("2024-03-01"), u32::MAX)
            .take(2)
            .map(|(d, _)| d)
            .collect();
        assert_eq!(first, [date("2024-03-01"), date("2024-02-29")]);
    }

    #[test]
    fn huge_window_stops_at_first_hit() {
        let tmp = TempDir::new().unwrap();
        let r = PathResolver::new(tmp.path(), "log_{date}.txt");
        fs::create_dir_all(tmp.path().join("acme")).unwrap();
        fs::write(r.resolve("acme", date("2024-03-09")), "x").unwrap();

        let (d, _) = r.find_recent_from("acme", date("2024-03-10"), u32::MAX).unwrap();
        assert_eq!(d, date("2024-03-09"));
    }
}
