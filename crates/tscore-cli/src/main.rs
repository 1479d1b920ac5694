//! temporal-score CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tracing::info_span;
use tracing::level_filters::LevelFilter;
use tscore_cli::cli::{Cli, LogFormatArg, LogLevelArg};
use tscore_cli::commands::run;
use tscore_cli::logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("temporal-score: error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let span = info_span!("temporal_score");
    let result = span.in_scope(|| run(&cli));
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            // Logs already share stderr with the message below.
            if cli.log_file.is_some() {
                tracing::error!("{error:#}");
            }
            if cli.debug {
                eprintln!("{error:?}");
            }
            eprintln!("temporal-score: error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
