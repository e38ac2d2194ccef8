//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{cost_cmd, import_cmd, watch_cmd};
use crate::storage::{CatalogDb, Config};

#[derive(Parser)]
#[command(name = "craftcost")]
#[command(author, version, about = "Crafting cost and ROI calculator for the trading post")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to the recipe catalog database (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Trading post API base URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the recipe catalog schema in a database file
    Init {
        /// Path to the database file
        path: PathBuf,
    },

    /// Bulk-load API dump files (one JSON object per line) into the catalog
    Import {
        /// Item dump file
        #[arg(long)]
        items: Option<PathBuf>,

        /// Recipe dump file
        #[arg(long)]
        recipes: Option<PathBuf>,

        /// Vendor dump file
        #[arg(long)]
        vendors: Option<PathBuf>,
    },

    /// Compute the crafting cost of one item
    Cost {
        /// Item name or numeric id
        item: String,

        /// Print the full priced ingredient breakdown
        #[arg(long, short)]
        detailed: bool,

        /// Give up on outstanding pricing tasks after this many seconds
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// Evaluate a watchlist file and write an ROI report
    Watch {
        /// Input file with one item name per line
        input: PathBuf,

        /// Output report path
        #[arg(long, short)]
        out: PathBuf,

        /// Minimum ROI percentage for a row to appear (overrides config)
        #[arg(long)]
        threshold: Option<i64>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    let mut config = Config::load_global()?;
    if let Some(db) = cli.db {
        config.database = Some(db);
    }
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Creating catalog schema at: {}", path.display()));
            let db = CatalogDb::create(&path)?;
            db.init_schema()?;
            output.success(&format!("Initialized catalog database at {}", path.display()));
        }

        Commands::Import {
            items,
            recipes,
            vendors,
        } => {
            output.verbose_ctx("import", "Loading dump files into the catalog");
            import_cmd::run(
                &output,
                &config,
                items.as_deref(),
                recipes.as_deref(),
                vendors.as_deref(),
            )?;
        }

        Commands::Cost {
            item,
            detailed,
            deadline,
        } => {
            output.verbose_ctx("cost", &format!("Pricing item: {}", item));
            cost_cmd::run(&output, &config, &item, detailed, deadline)?;
        }

        Commands::Watch {
            input,
            out,
            threshold,
        } => {
            output.verbose_ctx(
                "watch",
                &format!("Evaluating watchlist: {}", input.display()),
            );
            watch_cmd::run(&output, &config, &input, &out, threshold)?;
        }
    }

    Ok(())
}
