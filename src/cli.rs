use crate::utils::{Result, WatchError};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "backupwatch")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIME"), ")"))]
#[command(about = "Daily backup log verification for a fleet of clients", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(short, long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check every client and send alerts for failures
    Run {
        #[command(flatten)]
        target: TargetArgs,

        /// Number of clients checked in parallel
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Check only, never send alerts
        #[arg(long)]
        no_alerts: bool,
    },

    /// Check a single client without alerting
    #[command(arg_required_else_help = true)]
    Client {
        /// Client directory name
        client: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Classify a log file with the configured markers
    #[command(arg_required_else_help = true)]
    Classify {
        /// Log file to classify
        file: PathBuf,

        /// Output format (text or json)
        #[arg(short, long, default_value = "text")]
        output: String,
    },
}

#[derive(Args)]
pub struct TargetArgs {
    /// Date to check, YYYY-MM-DD (default: today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Base directory holding one sub-directory per client
    #[arg(short, long)]
    pub base: Option<PathBuf>,

    /// Days to look back when the target date's log is missing
    #[arg(short, long)]
    pub look_back: Option<u32>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    pub output: String,
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| WatchError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::parse_from([
            "backupwatch", "run", "--date", "2024-06-10", "--base", "/srv/logs", "-l", "2", "--no-alerts",
        ]);
        match cli.command {
            Commands::Run { target, no_alerts, jobs } => {
                assert_eq!(target.date, NaiveDate::from_ymd_opt(2024, 6, 10));
                assert_eq!(target.base, Some(PathBuf::from("/srv/logs")));
                assert_eq!(target.look_back, Some(2));
                assert!(no_alerts);
                assert!(jobs.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn rejects_bad_date() {
        assert!(Cli::try_parse_from(["backupwatch", "run", "--date", "10/06/2024"]).is_err());
        assert!(parse_date("2024-02-30").is_err());
    }
}
