//! Tablet Catalog CLI
//!
//! Audits, queries, diffs and exports drawing-tablet catalog files.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tablet_catalog::config::CatalogConfig;
use tablet_catalog::import::read_catalog_with;
use tablet_catalog::units::imperial_hint;
use tablet_catalog::{diff, export, filter, sort, Enricher, Filter, Severity, SortCriterion, TabletRecord};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tablet-catalog")]
#[command(about = "Audit, query and export drawing-tablet catalogs")]
struct Cli {
    /// Extra config file layered over tablets.toml and the environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report data-quality problems
    Audit {
        /// Catalog file (JSON)
        file: PathBuf,
        /// Exit non-zero when any CRITICAL warning is found
        #[arg(long)]
        strict: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search, filter and sort records
    List {
        /// Catalog file (JSON)
        file: PathBuf,
        /// Free-text query over brand, model id and name
        #[arg(short, long, default_value = "")]
        query: String,
        /// FIELD:CONDITION:VALUE, or FIELD:range:LOW:HIGH
        #[arg(short, long = "filter")]
        filters: Vec<Filter>,
        /// FIELD[:asc|desc], highest priority first
        #[arg(short, long = "sort")]
        sorts: Vec<SortCriterion>,
    },

    /// Show every field of one record
    Show {
        /// Catalog file (JSON)
        file: PathBuf,
        /// Record identifier or model id
        id: String,
    },

    /// Compare a catalog against an earlier version of it
    Diff {
        /// Earlier catalog file
        baseline: PathBuf,
        /// Current catalog file
        current: PathBuf,
    },

    /// Write the canonical export document
    Export {
        /// Catalog file (JSON)
        file: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Include calculated fields
        #[arg(long)]
        include_calculated: bool,
        /// Include empty fields
        #[arg(long)]
        include_empty: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write a default config file here instead
        #[arg(long)]
        init: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = CatalogConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Audit { file, strict, json } => {
            let records = load(&file, &config)?;
            let report = config.audit.auditor().audit(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_clean() {
                println!("✅ {} records, no problems found", records.len());
            } else {
                println!("🔍 Audited {} records", records.len());
                println!();
                for warning in &report.warnings {
                    let icon = match warning.severity {
                        Severity::Critical => "❌",
                        Severity::Warning => "⚠️ ",
                    };
                    println!("{} {}", icon, warning);
                }
                println!();
                println!(
                    "📊 {} warnings: {} critical, {} warning",
                    report.stats.total, report.stats.critical, report.stats.warning
                );
                for (category, count) in &report.stats.by_category {
                    println!("   └─ {}: {}", category, count);
                }
            }

            Ok(if strict && report.has_critical() { 1 } else { 0 })
        }

        Commands::List {
            file,
            query,
            filters,
            sorts,
        } => {
            for condition in &filters {
                if let Err(e) = condition.validate() {
                    warn!("{}", e);
                }
            }
            for criterion in &sorts {
                if let Err(e) = criterion.validate() {
                    warn!("{}", e);
                }
            }

            let records = load(&file, &config)?;
            let matched = filter(&records, &query, &filters);
            let ordered = sort(matched, &sorts);

            for record in &ordered {
                println!(
                    "{:<38} {:<12} {:<16} {:<28} {}",
                    record.id(),
                    record.brand().unwrap_or(""),
                    record.model_id().unwrap_or(""),
                    record.model_name().unwrap_or(""),
                    record.model_type().unwrap_or("")
                );
            }
            println!();
            println!("📋 {} of {} records", ordered.len(), records.len());
            Ok(0)
        }

        Commands::Show { file, id } => {
            let records = load(&file, &config)?;
            let record = records
                .iter()
                .find(|r| r.id() == id)
                .or_else(|| records.iter().find(|r| r.model_id() == Some(id.as_str())))
                .with_context(|| format!("no record with id or model id '{}'", id))?;

            println!("📱 {}", record.label());
            println!();
            print_record(record, config.display.imperial_hints);
            Ok(0)
        }

        Commands::Diff { baseline, current } => {
            let baseline = load(&baseline, &config)?;
            let current = load(&current, &config)?;
            let changes = diff(&current, &baseline);

            if changes.is_empty() {
                println!("✅ No changes");
                return Ok(0);
            }

            for record in &changes.added {
                println!("➕ {}", record.label());
            }
            for modified in &changes.modified {
                println!("✏️  {} ({} fields)", modified.record.label(), modified.changes.len());
                for change in &modified.changes {
                    println!("   └─ {}", change);
                }
            }
            for record in &changes.removed {
                println!("➖ {}", record.label());
            }
            println!();
            println!(
                "📊 {} added, {} modified, {} removed",
                changes.added.len(),
                changes.modified.len(),
                changes.removed.len()
            );
            Ok(0)
        }

        Commands::Export {
            file,
            output,
            include_calculated,
            include_empty,
        } => {
            let records = load(&file, &config)?;
            let mut options = config.export.options();
            options.include_calculated |= include_calculated;
            options.include_empty |= include_empty;

            match output {
                Some(path) => {
                    let digest = export::write_catalog(&path, &records, &options)?;
                    println!("✅ Exported {} records to {}", records.len(), path.display());
                    println!("   sha256: {}", digest);
                }
                None => println!("{}", export::export_catalog(&records, &options)?),
            }
            Ok(0)
        }

        Commands::Config { init } => {
            match init {
                Some(path) => {
                    CatalogConfig::default().save(&path)?;
                    println!("✅ Wrote default configuration to {}", path.display());
                }
                None => {
                    print!("{}", toml::to_string_pretty(&config)?);
                    if let Some(user_path) = CatalogConfig::user_config_path() {
                        println!();
                        println!("# user config: {}", user_path.display());
                    }
                }
            }
            Ok(0)
        }
    }
}

fn load(path: &Path, config: &CatalogConfig) -> anyhow::Result<Vec<TabletRecord>> {
    let inputs = read_catalog_with(path, &config.import).with_context(|| format!("reading {}", path.display()))?;
    Ok(Enricher::new().enrich(&inputs))
}

fn print_record(record: &TabletRecord, imperial_hints: bool) {
    for (field, value) in record.fields() {
        if value.is_empty() {
            continue;
        }
        let unit = field.descriptor().unit.map(|u| format!(" {}", u)).unwrap_or_default();
        let marker = if field.is_calculated() { " (calculated)" } else { "" };
        let hint = if imperial_hints {
            imperial_hint(field, value).map(|h| format!("  ≈ {}", h)).unwrap_or_default()
        } else {
            String::new()
        };
        println!("  {:<26} {}{}{}{}", field.external_name(), value, unit, hint, marker);
    }
}
