//! # Facetry CLI Module
//!
//! This module implements the CLI interface for Facetry.
//!
//! ## Available Commands
//!
//! - `validate` - Bootstrap the catalog and report validation failures
//! - `inspect` - Show the specification of one type
//! - `status` - Show model metrics
//! - `export` - Export the metamodel to a file
//! - `verify` - Check an export against the catalog
//! - `hash` - Compute BLAKE3 cryptographic hash of the metamodel

mod commands;

use clap::{Parser, Subcommand};
use facetry_core::MetamodelError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Facetry - metamodel introspection and facet composition
///
/// Reads a catalog of type descriptions, builds a faceted specification for
/// every type, and validates the model as a whole.
#[derive(Parser, Debug)]
#[command(name = "facetry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the type catalog (TOML or JSON)
    #[arg(short = 'C', long, global = true, default_value = "catalog.toml")]
    pub catalog: PathBuf,

    /// Path to the engine configuration (TOML)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap the catalog and report validation failures
    Validate,

    /// Show the specification of one type
    Inspect {
        /// Type name as declared in the catalog
        type_name: String,
    },

    /// Show model metrics
    Status,

    /// Export the metamodel
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (canonical, json)
        #[arg(short = 't', long, default_value = "canonical")]
        format: String,
    },

    /// Verify a canonical export against the catalog
    Verify {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compute BLAKE3 cryptographic hash of the metamodel
    Hash,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), MetamodelError> {
    let source = Source {
        catalog: &cli.catalog,
        config: cli.config.as_deref(),
    };
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Validate) => cmd_validate(&source, json_mode),
        Some(Commands::Inspect { type_name }) => cmd_inspect(&source, json_mode, &type_name),
        Some(Commands::Status) => cmd_status(&source, json_mode),
        Some(Commands::Export { output, format }) => cmd_export(&source, &output, &format),
        Some(Commands::Verify { input }) => cmd_verify(&source, json_mode, &input),
        Some(Commands::Hash) => cmd_hash(&source, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&source, json_mode)
        }
    }
}
