//! Command-line argument definitions for the data store operator tool
//!
//! The CLI is a thin operator surface over the library: checking and
//! applying updates, listing registered stores, reprocessing and backing
//! up single stores.

use crate::config::{CompressionAlgorithm, StoreConfig};
use crate::constants::registries;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Operator tool for versioned LCA data stores
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lca-datastore",
    version,
    about = "Inspect, update and reprocess versioned LCA data stores",
    long_about = "Operator tool for life-cycle inventory and impact assessment data stores. \
                  Checks for pending data updates, applies them, lists registered stores and \
                  recompiles or backs up individual stores."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding registries and store files
    ///
    /// Defaults to LCA_DATASTORE_DIR, or the platform data directory.
    #[arg(long = "data-dir", value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Compression for processed arrays: snappy, zstd, lz4 or none
    #[arg(
        long,
        value_name = "ALGORITHM",
        global = true,
        value_parser = CompressionAlgorithm::from_name
    )]
    pub compression: Option<CompressionAlgorithm>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Show which data updates still need to be applied
    Status,
    /// Apply one named update, or every pending update
    Update(UpdateArgs),
    /// List registered stores
    List(ListArgs),
    /// Recompile one store from its intermediate data
    Process(StoreArgs),
    /// Write a timestamped backup of one store
    Backup(StoreArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct UpdateArgs {
    /// Name of the update to apply
    #[arg(value_name = "NAME", required_unless_present = "all", conflicts_with = "all")]
    pub name: Option<String>,

    /// Apply every pending update
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    /// Only list stores of this kind
    #[arg(value_enum)]
    pub kind: Option<KindArg>,
}

#[derive(Debug, Clone, Parser)]
pub struct StoreArgs {
    #[arg(value_enum)]
    pub kind: KindArg,

    /// Registered store name
    pub name: String,
}

/// Store kinds addressable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Database,
    Method,
    Weighting,
    Normalization,
}

impl KindArg {
    pub fn all() -> [KindArg; 4] {
        [
            KindArg::Method,
            KindArg::Weighting,
            KindArg::Normalization,
            KindArg::Database,
        ]
    }

    /// Registry holding stores of this kind
    pub fn registry(&self) -> &'static str {
        match self {
            KindArg::Database => registries::DATABASES,
            KindArg::Method => registries::METHODS,
            KindArg::Weighting => registries::WEIGHTINGS,
            KindArg::Normalization => registries::NORMALIZATIONS,
        }
    }
}

impl Args {
    /// Log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Environment configuration with command-line overrides applied
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(compression) = self.compression {
            config = config.with_compression(compression);
        }
        config
    }
}
