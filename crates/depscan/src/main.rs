use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use log::{LevelFilter, debug};

use depscan::{config::Config, orchestrator::DependencyScanner, report::DependencyReport};

#[derive(Parser, Debug)]
#[command(name = "depscan")]
#[command(about = "Find third-party requirements and import cycles in a Python source tree")]
#[command(version)]
struct Cli {
    /// Directory containing the Python sources (defaults to the configured root)
    root: Option<PathBuf>,

    /// Directory receiving requirements.txt and the JSON report
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file used instead of the project depscan.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target Python version, e.g. py310
    #[arg(long)]
    target_version: Option<String>,

    /// Treat NAME as a local module even if no file defines it
    #[arg(long = "known-local", value_name = "NAME")]
    known_local: Vec<String>,

    /// Print the summary without writing any files
    #[arg(long)]
    no_write: bool,

    /// Exit with an error when circular dependencies are found
    #[arg(long)]
    fail_on_cycles: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref(), cli.root.as_deref())?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(target_version) = cli.target_version {
        config.target_version = target_version;
        config.python_version()?;
    }
    config.known_local.extend(cli.known_local);
    debug!("Configuration: {config:?}");

    let scanner = DependencyScanner::new(config)?;
    let results = scanner.scan()?;
    let report = DependencyReport::from_scan(&results, scanner.tables());

    let mut stdout = io::stdout().lock();
    if !cli.no_write {
        let requirements_path = scanner.config().requirements_path();
        let report_path = scanner.config().report_path();
        report.write_requirements(&requirements_path)?;
        report.write_json(&report_path)?;
        writeln!(
            stdout,
            "Wrote {} packages to {}",
            report.third_party_packages.len(),
            requirements_path.display()
        )?;
        writeln!(stdout, "Wrote dependency report to {}", report_path.display())?;
    }
    report
        .write_summary(&mut stdout)
        .context("Failed to write summary")?;

    if cli.fail_on_cycles && !report.circular_dependencies.is_empty() {
        bail!(
            "Found {} circular dependencies",
            report.circular_dependencies.len()
        );
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}
