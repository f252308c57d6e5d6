mod pool;
mod report;
mod upload;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "yardstock")]
#[command(about = "Bulk product upload for fabric vendors")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a price-per-yard value the way the product form does
    CheckPrice {
        /// Raw input, e.g. "₦1,500.00"
        raw: String,
    },
    /// Validate a quantity value the way the product form does
    CheckQuantity {
        /// Raw input, e.g. "1,000"
        raw: String,
    },
    /// Import a product CSV and match its image references against a folder
    Match {
        /// Product CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Folder holding the image pool
        #[arg(long)]
        images: PathBuf,
    },
    /// Import, match, and submit a product CSV as one batch
    Upload {
        /// Product CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Folder holding the image pool
        #[arg(long)]
        images: Option<PathBuf>,
        /// Submit even when some products have no images
        #[arg(long)]
        yes: bool,
        /// Stop at review and print the request payload instead of submitting
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = yardstock_core::load_app_config();
    init_tracing(config.as_ref().map_or("info", |c| c.log_level.as_str()));

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::CheckPrice { raw }) => {
            let price = yardstock_bulk::validate_price(&raw)?;
            println!("{price}");
        }
        Some(Commands::CheckQuantity { raw }) => {
            let quantity = yardstock_bulk::validate_quantity(&raw)?;
            println!("{quantity}");
        }
        Some(Commands::Match { csv, images }) => {
            upload::run_match(&csv, &images)?;
        }
        Some(Commands::Upload {
            csv,
            images,
            yes,
            dry_run,
        }) => {
            let config = config?;
            upload::run_upload(&config, &csv, images.as_deref(), yes, dry_run).await?;
        }
        None => println!("yardstock: run with --help to list commands"),
    }

    Ok(())
}
