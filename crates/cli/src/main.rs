//! Pricetree CLI - ptree command

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pricetree_cli::config;
use std::path::PathBuf;

mod cmd;
mod util;

/// Pricetree - category selection and vendor price trees
#[derive(Parser)]
#[command(name = "ptree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Override api.base_url for this invocation
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the config file and data directory
    Init,
    /// Manage the master category catalog
    #[command(subcommand)]
    Catalog(CatalogCommands),
    /// Manage vendors
    #[command(subcommand)]
    Vendor(VendorCommands),
    /// Show the category tree under a root
    Tree {
        /// Root category id
        #[arg(long)]
        root: String,
        /// Show check states from this vendor's active leaves
        #[arg(long)]
        vendor: Option<String>,
        /// Expand a category (repeatable)
        #[arg(long = "expand", value_name = "ID")]
        expand: Vec<String>,
        /// Expand every category
        #[arg(long)]
        all: bool,
    },
    /// Change a vendor's selection and sync its active leaves
    Sync {
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        root: String,
        /// Select a category with its subtree and ancestors (repeatable)
        #[arg(long = "select", value_name = "ID")]
        select: Vec<String>,
        /// Deselect a category and its subtree (repeatable)
        #[arg(long = "deselect", value_name = "ID")]
        deselect: Vec<String>,
        /// Toggle a category (repeatable)
        #[arg(long = "toggle", value_name = "ID")]
        toggle: Vec<String>,
        /// Start from an empty selection instead of the stored one
        #[arg(long)]
        clear: bool,
        /// Print the resulting selection without syncing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show a vendor's price nodes
    Nodes {
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        root: String,
        /// Flat list ordered by level instead of a tree
        #[arg(long)]
        flat: bool,
    },
    /// Edit vendor pricing
    #[command(subcommand)]
    Price(PriceCommands),
    /// Manage per-category pricing sheets
    #[command(subcommand)]
    Sheet(SheetCommands),
    /// Run the API server
    Serve {
        /// Override server.bind
        #[arg(long)]
        bind: Option<String>,
        /// Override store.data_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Replace the catalog with records from a JSON array file
    Import {
        file: PathBuf,
    },
    /// List the children of a category (top level by default)
    Ls {
        #[arg(long)]
        parent: Option<String>,
    },
}

#[derive(Subcommand)]
enum VendorCommands {
    /// Register a vendor
    Add {
        id: String,
        name: String,
    },
    /// List vendors
    Ls,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
}

#[derive(Subcommand)]
enum PriceCommands {
    /// Edit one node of a vendor tree
    Set {
        #[arg(long)]
        vendor: String,
        #[arg(long)]
        root: String,
        /// Category id of the node
        category: String,
        #[arg(long, conflicts_with = "clear_price")]
        price: Option<f64>,
        #[arg(long)]
        clear_price: bool,
        #[arg(long)]
        terms: Option<String>,
        #[arg(long)]
        visible_to_user: Option<bool>,
        #[arg(long)]
        visible_to_vendor: Option<bool>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
}

#[derive(Subcommand)]
enum SheetCommands {
    /// List a vendor's rows in a sheet
    Ls {
        sheet: String,
        #[arg(long)]
        vendor: String,
    },
    /// Add a row, or replace one with --row
    Put {
        sheet: String,
        #[arg(long)]
        vendor: String,
        /// Cells as a JSON object
        #[arg(long)]
        cells: String,
        #[arg(long)]
        row: Option<String>,
    },
    /// Delete a row
    Rm {
        sheet: String,
        #[arg(long)]
        vendor: String,
        row: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get one value
    Get { key: String },
    /// Set one value
    Set { key: String, value: String },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load()?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    let _log_guard = util::init_logging(&config.logging, matches!(cli.command, Commands::Serve { .. }))?;

    match cli.command {
        Commands::Init => cmd::init::run(&config).await,
        Commands::Catalog(CatalogCommands::Import { file }) => cmd::catalog::run_import(&config, &file).await,
        Commands::Catalog(CatalogCommands::Ls { parent }) => cmd::catalog::run_ls(&config, parent).await,
        Commands::Vendor(VendorCommands::Add { id, name }) => cmd::vendor::run_add(&config, &id, &name).await,
        Commands::Vendor(VendorCommands::Ls) => cmd::vendor::run_ls(&config).await,
        Commands::Tree { root, vendor, expand, all } => {
            cmd::tree::run(&config, root.into(), vendor.as_deref(), &expand, all).await
        }
        Commands::Sync { vendor, root, select, deselect, toggle, clear, dry_run } => {
            let edits = cmd::sync::SelectionEdits { select, deselect, toggle, clear };
            cmd::sync::run(&config, &vendor, root.into(), edits, dry_run).await
        }
        Commands::Nodes { vendor, root, flat } => cmd::nodes::run(&config, &vendor, root.into(), flat).await,
        Commands::Price(PriceCommands::Set {
            vendor,
            root,
            category,
            price,
            clear_price,
            terms,
            visible_to_user,
            visible_to_vendor,
            status,
        }) => {
            let edit = cmd::price::build_edit(
                price,
                clear_price,
                terms,
                visible_to_user,
                visible_to_vendor,
                status.map(|s| match s {
                    StatusArg::Active => pricetree_store::PricingStatus::Active,
                    StatusArg::Inactive => pricetree_store::PricingStatus::Inactive,
                }),
            );
            cmd::price::run_set(&config, &vendor, root.into(), category.into(), edit).await
        }
        Commands::Sheet(SheetCommands::Ls { sheet, vendor }) => cmd::sheet::run_ls(&config, &sheet, &vendor).await,
        Commands::Sheet(SheetCommands::Put { sheet, vendor, cells, row }) => {
            cmd::sheet::run_put(&config, &sheet, &vendor, &cells, row.as_deref()).await
        }
        Commands::Sheet(SheetCommands::Rm { sheet, vendor, row }) => {
            cmd::sheet::run_rm(&config, &sheet, &vendor, &row).await
        }
        Commands::Serve { bind, data_dir } => cmd::serve::run(config, bind, data_dir).await,
        Commands::Config(ConfigCommands::List) => cmd::config::run_list().await,
        Commands::Config(ConfigCommands::Get { key }) => cmd::config::run_get(&key).await,
        Commands::Config(ConfigCommands::Set { key, value }) => cmd::config::run_set(&key, &value).await,
        Commands::Config(ConfigCommands::Path { create }) => cmd::config::run_path(create).await,
        Commands::Config(ConfigCommands::Example) => cmd::config::run_example().await,
    }
}
