use anyhow::{Context, Result};
use clap::Parser;
use compile_score::cli::{Cli, OutputFormat};
use compile_score::orchestrator::Orchestrator;
use compile_score::report::{format_duration_us, AggregateReport, UnitReport};
use compile_score::settings::Settings;
use compile_score::timeline::{self, Timeline};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; `--debug` raises the level to DEBUG
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve settings from the config file and command-line overrides
fn load_settings(args: &Cli) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if let Some(thresholds) = &args.manual_thresholds {
        settings.normalized_severity = false;
        settings.severities = thresholds.clone();
        settings
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid --manual-thresholds")?;
    }

    Ok(settings)
}

fn print_timeline(timeline: &Timeline, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(timeline)?),
        OutputFormat::Csv => {
            println!("start,duration,name_id,category");
            for event in &timeline.events {
                println!(
                    "{},{},{},{}",
                    event.start, event.duration, event.name_id, event.category
                );
            }
        }
        OutputFormat::Text => {
            println!(
                "{} events spanning {}",
                timeline.events.len(),
                format_duration_us(timeline.span())
            );
            for event in &timeline.events {
                println!(
                    "{:>12}  {:>12}  {:<24} #{}",
                    format_duration_us(u64::from(event.start)),
                    format_duration_us(u64::from(event.duration)),
                    event.category.label(),
                    event.name_id
                );
            }
        }
    }
    Ok(())
}

fn run_timeline(score_path: &Path, unit_index: usize, format: OutputFormat) -> Result<()> {
    let timeline = timeline::load_timeline(score_path, unit_index)
        .with_context(|| format!("Failed to read timeline for unit {}", unit_index))?;

    match timeline {
        Some(timeline) => print_timeline(&timeline, format),
        None => anyhow::bail!(
            "No timeline for unit {} next to {}",
            unit_index,
            score_path.display()
        ),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let settings = load_settings(&args)?;
    let score_path = args
        .score_file
        .clone()
        .unwrap_or_else(|| settings.score_path(&args.base_dir));

    if let Some(unit_index) = args.timeline {
        return run_timeline(&score_path, unit_index, args.format);
    }

    if !args.units && !args.category.is_gathered() {
        anyhow::bail!(
            "Category '{}' has no aggregates; use --units to rank translation units by it",
            args.category
        );
    }

    let mut orchestrator = Orchestrator::from_settings(&settings);
    orchestrator
        .reload(&score_path)
        .with_context(|| format!("Cannot classify {}", score_path.display()))?;

    if orchestrator.store().is_empty() && !score_path.exists() {
        eprintln!("No score file found at {}", score_path.display());
    }

    let store = orchestrator.store();
    let output = if args.units {
        let report = UnitReport::from_store(store, args.category, args.top);
        match args.format {
            OutputFormat::Text => report.to_text(),
            OutputFormat::Json => report.to_json()?,
            OutputFormat::Csv => report.to_csv(),
        }
    } else {
        let report =
            AggregateReport::from_store(store, orchestrator.policy(), args.category, args.top);
        match args.format {
            OutputFormat::Text => report.to_text(),
            OutputFormat::Json => report.to_json()?,
            OutputFormat::Csv => report.to_csv(),
        }
    };

    print!("{}", output);
    Ok(())
}
