//! Recipe Inventory Analyzer
//!
//! Checks whether a location can produce a recipe with its on-hand inventory.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recipe_inventory::{AnalyzerConfig, InventoryAnalyzer, SqliteCatalog, db, import, sample};

#[derive(Parser)]
#[command(name = "recipe-inventory")]
#[command(about = "Check whether a location has the inventory to produce a recipe")]
struct Cli {
    /// Path to the SQLite catalog database
    #[arg(short, long, default_value = "recipe_inventory.db")]
    database: PathBuf,

    /// TOML file overriding analyzer settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Load sample catalog for testing (without an export)
    LoadSample,

    /// Import catalog snapshot files (*.json) from a directory
    Import {
        /// Directory containing snapshot files
        dir: PathBuf,

        /// Clear existing data before import
        #[arg(long)]
        clear: bool,
    },

    /// Analyze whether a location can produce a recipe
    Analyze {
        /// Recipe name (e.g., "Galley Burger")
        recipe: String,

        /// Location name (e.g., "San Diego")
        location: String,

        /// Target quantity to produce
        #[arg(short, long, default_value = "1")]
        quantity: f64,

        /// Target unit name (e.g., "each", "kg") or unit id
        #[arg(short, long)]
        unit: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze several recipes and quantities at one location
    Batch {
        /// Location name
        location: String,

        /// Recipe names (repeatable)
        #[arg(short, long = "recipe", required = true)]
        recipes: Vec<String>,

        /// Target quantities (repeatable)
        #[arg(short, long = "quantity", required = true)]
        quantities: Vec<f64>,

        /// Target unit name or id
        #[arg(short, long)]
        unit: Option<String>,
    },

    /// List all recipes in the catalog
    ListRecipes,

    /// List all locations in the catalog
    ListLocations,

    /// Show the unit names accepted by --unit
    Units,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    let catalog = SqliteCatalog::open(&cli.database)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::LoadSample => {
            sample::load_sample_data(&catalog.connection(), &config)?;
            println!("Sample data loaded successfully!");
        }

        Commands::Import { dir, clear } => {
            let conn = catalog.connection();
            if clear {
                println!("Clearing existing data...");
                db::clear_catalog(&conn)?;
            }

            let stats = import::import_directory(&conn, &dir)?;
            println!("{}", stats);
        }

        Commands::Analyze {
            recipe,
            location,
            quantity,
            unit,
            json,
        } => {
            let analyzer = InventoryAnalyzer::new(catalog, config);
            let report = analyzer
                .analyze(&recipe, &location, quantity, unit.as_deref())
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report);
            }
        }

        Commands::Batch {
            location,
            recipes,
            quantities,
            unit,
        } => {
            let analyzer = InventoryAnalyzer::new(catalog, config);
            let outcomes = analyzer
                .analyze_batch(&recipes, &location, &quantities, unit.as_deref())
                .await;

            println!(
                "{:<30} {:>10} {:>8} {:>7}",
                "Recipe", "Quantity", "Produce", "Issues"
            );
            println!("{}", "-".repeat(58));
            for outcome in outcomes {
                println!("{}", outcome);
            }
        }

        Commands::ListRecipes => {
            let recipes = db::list_recipes(&catalog.connection())?;
            if recipes.is_empty() {
                println!("No recipes in database. Run 'import' or 'load-sample' first.");
            } else {
                println!("{:<30} {:>10} {:<10}", "Recipe", "Yield", "Unit");
                println!("{}", "-".repeat(52));
                for r in recipes {
                    let unit = r.yield_unit.map(|u| u.name).unwrap_or_default();
                    println!("{:<30} {:>10} {:<10}", r.name, r.total_yield, unit);
                }
            }
        }

        Commands::ListLocations => {
            let locations = db::list_locations(&catalog.connection())?;
            if locations.is_empty() {
                println!("No locations in database. Run 'import' or 'load-sample' first.");
            } else {
                for l in locations {
                    let place = match (l.city, l.state) {
                        (Some(city), Some(state)) => format!(" ({}, {})", city, state),
                        (Some(city), None) => format!(" ({})", city),
                        _ => String::new(),
                    };
                    println!("  {}{}", l.name, place);
                }
            }
        }

        Commands::Units => {
            for (name, id) in &config.units {
                println!("  {:<10} {}", name, id);
            }
        }
    }

    Ok(())
}
