//! # Facetry
//!
//! The main binary for the Facetry metamodel engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │            apps/facetry (THE BINARY)         │
//! │                                              │
//! │   ┌──────────────┐      ┌────────────────┐   │
//! │   │  CLI (clap)  │ ───► │ catalog / TOML │   │
//! │   └──────┬───────┘      └────────────────┘   │
//! │          ▼                                   │
//! │   ┌──────────────┐                           │
//! │   │ facetry-core │                           │
//! │   │ (THE LOGIC)  │                           │
//! │   └──────────────┘                           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! facetry -C catalog.toml validate
//! facetry -C catalog.toml inspect Customer
//! facetry -C catalog.toml export -o model.fmmx
//! facetry -C catalog.toml verify -i model.fmmx
//! ```

use clap::Parser;
use facetry::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // FACETRY_LOG_FORMAT=json switches to JSON log lines.
    let log_format = std::env::var("FACETRY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "facetry=debug,facetry_core=debug"
    } else {
        "facetry=info,facetry_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Facetry startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┌─┐┌─┐┌┬┐┬─┐┬ ┬
  ├┤ ├─┤│  ├┤  │ ├┬┘└┬┘
  └  ┴ ┴└─┘└─┘ ┴ ┴└─ ┴   v{}

  Reflect • Compose • Validate
"#,
        env!("CARGO_PKG_VERSION")
    );
}
