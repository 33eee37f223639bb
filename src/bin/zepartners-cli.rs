//! CLI для zepartners
//!
//! Работает напрямую с файлом снапшота, без запущенного сервера:
//! регистрация партнёров из JSON, поиск по id, поиск ближайшего партнёра
//! и проверка целостности снапшота.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use zepartners::{init_logging, LoggingConfig, Partner, PartnerId, PartnerRegistry};

#[derive(Parser)]
#[command(name = "zepartners-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline tool for the zepartners snapshot file", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Путь к файлу снапшота
    #[arg(
        short,
        long,
        default_value = "partners.json",
        env = "ZEPARTNERS_SNAPSHOT_PATH"
    )]
    snapshot: PathBuf,
    /// Включить подробный вывод (debug)
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register partners from a JSON file (one object or an array)
    Register { file: PathBuf },
    /// Print the partner stored under an id
    Get { id: String },
    /// Print the nearest partner covering a point
    #[command(allow_negative_numbers = true)]
    Nearest { lng: f64, lat: f64 },
    /// Print the number of stored partners
    Count,
    /// Load the snapshot and print every diagnostic
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig {
        level: if cli.verbose { "debug" } else { "warn" }.to_string(),
        ..Default::default()
    };
    logging.console.with_target = cli.verbose;
    logging.console.to_stderr = true;
    let log_handle = init_logging(&logging)?;

    let result = run(cli);
    log_handle.shutdown();
    result
}

fn run(cli: Cli) -> Result<()> {
    let (registry, diagnostics) = PartnerRegistry::open(&cli.snapshot)
        .with_context(|| format!("Failed to open {}", cli.snapshot.display()))?;
    debug!(
        partners = registry.len(),
        diagnostics = diagnostics.len(),
        "Snapshot opened"
    );

    match cli.command {
        Commands::Register { file } => {
            let partners = read_partners(&file)?;
            let mut failed = 0;
            for partner in partners {
                let id = partner.id.clone();
                match registry.register(partner) {
                    Ok(id) => println!("created {id}"),
                    Err(e) if e.is_validation() => {
                        failed += 1;
                        eprintln!("rejected {id}: {e}");
                    }
                    // Остальные записи упадут так же: снапшот недоступен.
                    Err(e) => return Err(e).with_context(|| format!("Failed to register {id}")),
                }
            }
            if failed > 0 {
                bail!("{failed} partner(s) rejected");
            }
        }
        Commands::Get { id } => {
            let id = PartnerId::from(id);
            let partner = registry.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&partner)?);
            if !registry.is_indexed(&id) {
                eprintln!("note: {id} has an unparsable geometry and is never matched");
            }
        }
        Commands::Nearest { lng, lat } => {
            let partner = registry.nearest(lng, lat)?;
            println!("{}", serde_json::to_string_pretty(&partner)?);
        }
        Commands::Count => println!("{}", registry.len()),
        Commands::Check => {
            for diagnostic in &diagnostics {
                println!("{diagnostic}");
            }
            let stats = registry.index_stats();
            println!(
                "{} partner(s), {} indexed, {} diagnostic(s)",
                registry.len(),
                stats.indexed,
                diagnostics.len()
            );
            if !diagnostics.is_empty() {
                bail!("snapshot has diagnostics");
            }
        }
    }
    Ok(())
}

/// Читает один объект партнёра или массив объектов.
fn read_partners(path: &Path) -> Result<Vec<Partner>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let partners = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Partner>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(partners)
}
