//! Command line definition

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "catalog-console", version, about = "Admin console for the product catalog")]
pub struct Cli {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings that override the config file
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// JSON config file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog service base URL
    #[arg(long, global = true, env = "CATALOG_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CATALOG_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Quiet period before a search is sent, in milliseconds
    #[arg(long, global = true, env = "CATALOG_SEARCH_DELAY_MS")]
    pub search_delay_ms: Option<u64>,

    /// Session cookie as `name=value`
    #[arg(long, global = true, env = "CATALOG_SESSION_COOKIE", hide_env_values = true)]
    pub session_cookie: Option<String>,

    /// Also write logs to a daily file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print categories, sizes and products
    Show,

    #[command(subcommand)]
    Category(CategoryCommand),

    #[command(subcommand)]
    Size(SizeCommand),

    #[command(subcommand)]
    Product(ProductCommand),

    /// Type to search products; each line replaces the search box
    Search,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    List,
    Create {
        name: String,
    },
    Rename {
        id: i64,
        name: String,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum SizeCommand {
    /// List sizes in display order
    List,
    Create {
        name: String,
    },
    /// Rename and/or move a size; moving onto a taken order swaps the two
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        order: Option<u32>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProductCommand {
    List,
    Create {
        name: String,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        /// Image file to upload with the product
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Sizes that can still be added to a product
    Available {
        product: i64,
    },
    AddSize {
        product: i64,
        size: i64,
        #[arg(long)]
        price: Decimal,
        #[arg(long, default_value_t = 0)]
        stock: u32,
    },
    UpdateSize {
        product: i64,
        size: i64,
        #[arg(long)]
        price: Option<Decimal>,
        #[arg(long)]
        stock: Option<u32>,
    },
    RemoveSize {
        product: i64,
        size: i64,
    },
}
