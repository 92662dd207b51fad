//! # cfloc
//!
//! A CLI tool for measuring ColdFusion projects: comment lines, lines of
//! code and total lines, per file or in total.
//!
//! ## Usage
//!
//! ```bash
//! # Measure the current directory
//! cfloc .
//!
//! # One row per file
//! cfloc . --by-file
//!
//! # Output as JSON
//! cfloc . --output json
//!
//! # Filter files with glob patterns and custom suffixes
//! cfloc . --exclude "**/vendor/**" --suffixes ".cfc,.cfm,.cfml"
//!
//! # Four workers, give up after 30 seconds
//! cfloc . --jobs 4 --timeout 30
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Style;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cfloclib::data::{DEFAULT_DEADLINE, DEFAULT_POOL_SIZE};
use cfloclib::{CollectingSink, FilterConfig, MeasureOptions, MetricsTable, ProjectFiles, Sensor};

mod render;

use render::{output_mode, render_metrics};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("cfloc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Line metrics for ColdFusion sources: comments, code and totals")
        .arg(
            Arg::new("path")
                .help("Path to analyze (defaults to current directory)")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("include")
                .short('i')
                .long("include")
                .action(ArgAction::Append)
                .help("Include files matching glob pattern"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Exclude files matching glob pattern"),
        )
        .arg(
            Arg::new("suffixes")
                .short('s')
                .long("suffixes")
                .default_value(cfloclib::source::DEFAULT_SUFFIXES)
                .help("Comma-separated list of file suffixes to analyze"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_parser(value_parser!(usize))
                .help(format!("Number of worker threads [default: {DEFAULT_POOL_SIZE}]")),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64))
                .help(format!(
                    "Seconds to wait for all files before reporting partial results [default: {}]",
                    DEFAULT_DEADLINE.as_secs()
                )),
        )
        .arg(
            Arg::new("by-file")
                .short('f')
                .long("by-file")
                .action(ArgAction::SetTrue)
                .help("Show breakdown by file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .default_value("table")
                .value_parser(["table", "json", "text", "term"])
                .help("Output format (table picks colors when stdout is a terminal)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn collect_values<'a>(matches: &'a ArgMatches, id: &str) -> Vec<&'a str> {
    matches
        .get_many::<String>(id)
        .map(|vals| vals.map(String::as_str).collect())
        .unwrap_or_default()
}

fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let suffixes = matches
        .get_one::<String>("suffixes")
        .map(String::as_str)
        .unwrap_or(cfloclib::source::DEFAULT_SUFFIXES);

    Ok(FilterConfig::new()
        .with_suffixes(suffixes)?
        .include_many(&collect_values(matches, "include"))?
        .exclude_many(&collect_values(matches, "exclude"))?)
}

fn build_options(matches: &ArgMatches) -> MeasureOptions {
    let jobs = matches
        .get_one::<usize>("jobs")
        .copied()
        .unwrap_or(DEFAULT_POOL_SIZE);
    let deadline = matches
        .get_one::<u64>("timeout")
        .map(|secs| Duration::from_secs(*secs))
        .unwrap_or(DEFAULT_DEADLINE);
    MeasureOptions::new().pool_size(jobs).deadline(deadline)
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches
        .get_one::<PathBuf>("path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));
    let base: &Path = if path.is_file() {
        path.parent().unwrap_or(Path::new(""))
    } else {
        path.as_path()
    };

    let project = ProjectFiles::new(&path, build_filter(matches)?);
    info!(path = %path.display(), "measuring project");
    let sensor = Sensor::new(project, base).options(build_options(matches));

    let sink = CollectingSink::new();
    let report = sensor.execute(&sink)?.measure;
    debug!(?report, "measurement finished");

    let by_file = matches.get_flag("by-file");
    let table = MetricsTable::from_measures(&sink.per_file(), base, by_file);

    if report.skipped > 0 || report.abandoned > 0 {
        eprintln!(
            "{} {} file(s) skipped, {} file(s) not measured before the deadline",
            Style::new().yellow().apply_to("warning:"),
            report.skipped,
            report.abandoned
        );
    }

    let mode = output_mode(
        matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or("table"),
    );
    let rendered = render_metrics(&table, &report, mode)
        .map_err(|e| anyhow::anyhow!("failed to render output: {e}"))?;
    println!("{}", rendered.trim_end());

    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_valid() {
        build_command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let matches = build_command().get_matches_from(["cfloc"]);
        let options = build_options(&matches);

        assert_eq!(options.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(options.deadline, DEFAULT_DEADLINE);
        assert_eq!(
            matches.get_one::<PathBuf>("path"),
            Some(&PathBuf::from("."))
        );
    }

    #[test]
    fn test_explicit_jobs_and_timeout() {
        let matches = build_command().get_matches_from(["cfloc", "-j", "5", "--timeout", "7"]);
        let options = build_options(&matches);

        assert_eq!(options.pool_size, 5);
        assert_eq!(options.deadline, Duration::from_secs(7));
    }

    #[test]
    fn test_build_filter_rejects_bad_glob() {
        let matches = build_command().get_matches_from(["cfloc", "--include", "[bad"]);
        assert!(build_filter(&matches).is_err());
    }

    #[test]
    fn test_build_filter_custom_suffixes() {
        let matches = build_command().get_matches_from(["cfloc", "--suffixes", "cfml"]);
        let filter = build_filter(&matches).unwrap();
        assert_eq!(filter.suffixes, vec![".cfml"]);
    }
}
