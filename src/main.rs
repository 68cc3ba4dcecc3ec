use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use covx::collector::ReportCollector;
use covx::config::{Config, CONFIG_FILE};
use covx::project::Project;
use covx::summary;

#[derive(Parser)]
#[command(name = "covx")]
#[command(about = "Aggregates per-module coverage reports into a single summary page")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the root manifest (default: covx.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect module reports, copy them and write the summary page
    Report,

    /// Show discovered modules and their metrics without copying anything
    List,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    // Canonicalize config path to get absolute path, then get parent
    let config_path = std::fs::canonicalize(&config_path)
        .with_context(|| format!("Could not find config file: {}", config_path.display()))?;

    let root_dir = config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let config = Config::load(&config_path)
        .with_context(|| format!("Could not load {}", config_path.display()))?;

    let project = Project::discover(&root_dir, &config)?;

    match cli.command {
        Commands::Report => cmd_report(&config, &root_dir, &project),
        Commands::List => cmd_list(&config, &project),
    }
}

fn cmd_report(config: &Config, root_dir: &Path, project: &Project) -> Result<()> {
    let collector = ReportCollector::new(&config.reports, root_dir);
    let collected = collector.collect(Some(project))?;

    let output_root = root_dir.join(&config.reports.output_dir);
    let page = summary::write_summary(&config.project.name, &collected.records, &output_root)?;

    let report_count: usize = collected.records.iter().map(|r| r.reports.len()).sum();
    println!(
        "{} {} reports from {} modules",
        "Collected".green().bold(),
        report_count,
        collected.records.len()
    );
    println!(
        "{} Summary written: {}",
        "📊".cyan(),
        page.display().to_string().green()
    );

    if collected.warnings > 0 {
        println!(
            "{} {} warning(s) during collection, see output above",
            "!".yellow().bold(),
            collected.warnings
        );
    }

    Ok(())
}

fn cmd_list(config: &Config, project: &Project) -> Result<()> {
    let collector = ReportCollector::scan_only(&config.reports);
    let collected = collector.collect(Some(project))?;

    if collected.records.is_empty() {
        println!("No module coverage reports found.");
        return Ok(());
    }

    println!("{}", "Module coverage:".bold());
    for record in &collected.records {
        if record.reports.is_empty() {
            println!("  {} {}", record.module_name.cyan(), "no reports".dimmed());
            continue;
        }
        for entry in &record.reports {
            let metric = summary::format_metric(entry.metric);
            let metric = if entry.metric.is_some() {
                metric.green()
            } else {
                metric.dimmed()
            };
            println!(
                "  {} {} {}",
                record.module_name.cyan(),
                entry.kind.to_string().dimmed(),
                metric
            );
        }
    }

    if collected.warnings > 0 {
        println!(
            "{} {} warning(s) during collection",
            "!".yellow().bold(),
            collected.warnings
        );
    }

    Ok(())
}
