use std::sync::Arc;

use clap::{Parser, Subcommand};
use engine::{CurrencyPreference, Engine, MemoryStore, OutboxStatus};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

type AppResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Parser)]
#[command(name = "walletbook", about = "Local wallet ledger maintenance")]
struct Args {
    /// Optional settings file path (TOML, extension may be omitted).
    #[arg(long)]
    config: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print currency, wallet context and balances.
    Status,
    /// List outbox entries.
    Outbox {
        /// Include entries that are no longer pending.
        #[arg(long)]
        all: bool,
        /// Drop every entry after listing.
        #[arg(long)]
        clear: bool,
    },
    /// Wipe every wallet, transaction, preference and outbox entry.
    Reset {
        /// Required, the reset cannot be undone.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = Args::parse();
    let settings = settings::Settings::new(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "walletbook={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let engine = open_engine(&settings.database).await?;

    match args.command.unwrap_or(Command::Status) {
        Command::Status => status(&engine).await?,
        Command::Outbox { all, clear } => outbox(&engine, all, clear).await?,
        Command::Reset { yes } => {
            if !yes {
                eprintln!("refusing to reset without --yes");
                std::process::exit(2);
            }
            engine.reset_local_data().await?;
            println!("local data removed");
        }
    }

    Ok(())
}

async fn open_engine(config: &Database) -> AppResult<Engine> {
    let builder = match config {
        Database::Memory => {
            tracing::info!("using in-memory store");
            Engine::builder().store(Arc::new(MemoryStore::default()))
        }
        Database::Sqlite(path) => {
            tracing::info!(path = %path, "using sqlite store");
            let database = sea_orm::Database::connect(format!("sqlite:{path}?mode=rwc")).await?;
            Migrator::up(&database, None).await?;
            Engine::builder().database(database)
        }
    };
    Ok(builder.build().await?)
}

async fn status(engine: &Engine) -> AppResult<()> {
    let currency = engine.selected_currency().await?;
    let context = engine.resolve_wallet_context().await?;
    println!(
        "currency: {} ({})",
        currency.currency_code, currency.currency_symbol
    );
    println!("context:  {context}");

    let balances = engine.wallet_balances().await?;
    if balances.is_empty() {
        println!("no active wallets");
    }
    for entry in &balances {
        println!(
            "  {:<24} {:>16}",
            entry.wallet.name,
            format_amount(&currency, entry.balance)
        );
    }
    let total = engine.total_balance(&context).await?;
    println!("total:    {}", format_amount(&currency, total));

    let archived = engine.archived_wallets().await?;
    if !archived.is_empty() {
        println!("archived: {}", archived.len());
    }
    Ok(())
}

async fn outbox(engine: &Engine, all: bool, clear: bool) -> AppResult<()> {
    let entries = if all {
        engine.outbox_entries().await?
    } else {
        engine.pending_outbox().await?
    };
    for entry in &entries {
        println!(
            "{} {:<10} {:<6} {:<19} {} {}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.status.as_str(),
            entry.operation.as_str(),
            entry.entity.as_str(),
            entry.entity_id,
            serde_json::to_string(&entry.payload)?
        );
    }
    let pending = entries
        .iter()
        .filter(|e| e.status == OutboxStatus::Pending)
        .count();
    println!("{} entries, {pending} pending", entries.len());

    if clear {
        let removed = engine.clear_outbox().await?;
        println!("removed {removed} entries");
    }
    Ok(())
}

/// Render minor units with the currency's fraction digits.
fn format_amount(currency: &CurrencyPreference, minor: i64) -> String {
    let digits = u32::from(currency.fraction_digits());
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    if digits == 0 {
        return format!("{sign}{}{abs}", currency.currency_symbol);
    }
    let scale = 10_u64.pow(digits);
    format!(
        "{sign}{}{}.{:0width$}",
        currency.currency_symbol,
        abs / scale,
        abs % scale,
        width = digits as usize
    )
}
