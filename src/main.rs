mod check;
mod cli;
mod config;
mod notify;
mod utils;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// 返回 false 表示编排未完成
fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = Config::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        config.logging.level.as_str()
    };
    init_logging(level);

    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Run { target, jobs, no_alerts } => {
            apply_overrides(&mut config, target.base, target.look_back);
            if let Some(jobs) = jobs {
                config.checker.jobs = jobs.max(1);
            }
            let date = target.date.unwrap_or(today);
            Ok(check::run_fleet(&config, date, &target.output, !no_alerts)?)
        }
        Commands::Client { client, target } => {
            apply_overrides(&mut config, target.base, target.look_back);
            let date = target.date.unwrap_or(today);
            check::run_client(&config.checker, &client, date, &target.output)?;
            Ok(true)
        }
        Commands::Classify { file, output } => {
            check::run_classify(&config.checker, &file, &output)
                .with_context(|| format!("classifying {}", file.display()))?;
            Ok(true)
        }
    }
}

fn apply_overrides(config: &mut Config, base: Option<std::path::PathBuf>, look_back: Option<u32>) {
    if let Some(base) = base {
        config.checker.base_directory = base;
    }
    if let Some(days) = look_back {
        config.checker.look_back_days = days;
    }
}

fn init_logging(default_level: &str) {
    // RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
