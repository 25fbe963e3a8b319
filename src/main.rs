use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

mod api;
mod config;
mod error;
mod import;
mod models;
mod report;
mod spreadsheet;
mod upload;
mod users;

use api::SupabaseClient;
use config::{ApiConfig, ImportConfig};

#[derive(Parser)]
#[command(name = "cycle-import")]
#[command(about = "Import basal temperature and period days from a spreadsheet into Supabase", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the user, read the sheet and upload both tables
    Import {
        #[arg(long, env = "IMPORT_USER_EMAIL")]
        email: String,
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        #[arg(long, default_value = config::TEMPERATURE_TABLE)]
        temperature_table: String,
        #[arg(long, default_value = config::PERIOD_TABLE)]
        period_table: String,
    },
    /// Read the sheet without touching the network
    Preview {
        #[command(flatten)]
        source: SourceArgs,
        /// Write a markdown summary to this file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Resolve an email address to its user id
    Lookup {
        #[arg(long, env = "IMPORT_USER_EMAIL")]
        email: String,
    },
}

#[derive(Args)]
struct SourceArgs {
    #[arg(long, default_value = "Basaltemperatur Kopie.xlsx")]
    file: PathBuf,
    /// Worksheet name; the first sheet when omitted
    #[arg(long)]
    sheet: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            email,
            source,
            batch_size,
            temperature_table,
            period_table,
        } => {
            let client = SupabaseClient::new(api_config_or_exit());
            let config = ImportConfig {
                sheet: source.sheet,
                batch_size,
                temperature_table,
                period_table,
                ..ImportConfig::new(email, source.file)
            };

            let outcome = import::run_import(&client, &config).with_context(|| {
                format!("import from {} failed", config.spreadsheet.display())
            })?;

            println!("User ID: {}", outcome.user_id);
            println!(
                "Found {} temperature entries and {} period entries.",
                outcome.extracted.temperatures.len(),
                outcome.extracted.periods.len()
            );
            for result in [&outcome.temperatures, &outcome.periods] {
                match result {
                    Ok(summary) => println!(
                        "{}: {} entries uploaded in {} batches.",
                        summary.table, summary.uploaded, summary.batches
                    ),
                    Err(err) => println!("{}", err),
                }
            }

            if outcome.is_complete() {
                println!("Import complete.");
            } else {
                println!("Import finished with upload errors.");
            }
        }
        Commands::Preview { source, out } => {
            let entries = spreadsheet::read_entries(&source.file, source.sheet.as_deref())
                .with_context(|| format!("failed to read {}", source.file.display()))?;

            println!(
                "Found {} temperature entries and {} period entries.",
                entries.temperatures.len(),
                entries.periods.len()
            );

            if let Some(out) = out {
                let summary = report::build_summary(&source.file, &entries);
                std::fs::write(&out, summary)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Summary written to {}.", out.display());
            }
        }
        Commands::Lookup { email } => {
            let client = SupabaseClient::new(api_config_or_exit());
            let user_id = users::resolve_user_id(&client, &email)?;
            println!("User ID: {}", user_id);
        }
    }

    info!("done");
    Ok(())
}

fn api_config_or_exit() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|err| {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    })
}
