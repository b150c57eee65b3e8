use anyhow::{Context, Result, bail};
use clap::Parser;
use overdue::enforcer::{Enforcer, EnforcerConfig};
use overdue::matcher::CompiledMatcher;
use overdue::models::{Config, Finding, Report};
use overdue::reporter::Selection;
use overdue::scanner::{FileScanner, ScanOptions};
use overdue::{cli, config, reporter};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let outcome = match cli.command {
        cli::Commands::Check(args) => scan_command(args, Selection::Violations),
        cli::Commands::List(args) => scan_command(args, Selection::All),
        cli::Commands::Init(args) => init_command(args).map(|()| true),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("overdue: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("Invalid log level: {}", config.log_level))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Scan the configured files; returns false when any annotation failed the check
fn scan_command(args: cli::ScanArgs, selection: Selection) -> Result<bool> {
    let source =
        config::config_source(args.config.as_deref()).context("Failed to read configuration")?;
    let mut config =
        config::load_config_at(source.as_deref()).context("Failed to read configuration")?;
    args.apply_to(&mut config);
    init_logging(&config)?;

    match source {
        Some(ref path) => tracing::debug!("using config {}", path.display()),
        None => tracing::debug!("no config file found, using defaults"),
    }
    tracing::debug!("using tags {:?}", config.tags);

    let matcher = CompiledMatcher::compile(&config.parsing_config())
        .context("Failed while creating matcher")?;
    let enforcer = Enforcer::new(EnforcerConfig {
        now: chrono::Utc::now(),
        strict: config.strict,
    });

    let scanner = FileScanner::new(&ScanOptions::from(&config))
        .context("Failed while creating file scanner")?;
    let files = scanner
        .collect_files(&config.files)
        .context("Failed while listing files")?;
    tracing::info!("scanning {} files", files.len());

    let parsed = scanner
        .scan_files(&files, &matcher)
        .context("Failed while parsing files")?;

    let files_scanned = parsed.len();
    let findings: Vec<Finding> = parsed
        .into_iter()
        .flat_map(|(file, annotations)| {
            annotations.into_iter().map(move |annotation| (file.clone(), annotation))
        })
        .map(|(file, annotation)| {
            let violation = enforcer.check(&annotation).err().map(|v| v.to_string());
            Finding {
                file,
                annotation,
                violation,
            }
        })
        .collect();

    let report = Report::new(findings, config.files.clone(), files_scanned);
    tracing::info!(
        "found {} annotations, {} failing",
        report.total_annotations,
        report.violation_count
    );

    reporter::generate_report(&report, args.format, selection, args.output.as_deref())
        .context("Failed to generate report")?;

    Ok(!report.has_violations())
}

fn init_command(args: cli::InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        bail!(
            "{} already exists, use --force to overwrite it",
            args.path.display()
        );
    }

    config::save_config(&Config::default(), &args.path)?;
    println!("Wrote {}", args.path.display());

    Ok(())
}
