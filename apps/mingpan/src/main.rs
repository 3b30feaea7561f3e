//! # Mingpan - Chart Annotation Server
//!
//! The main binary for the Mingpan rule engine.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for chart annotation and rule table checks
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │               apps/mingpan (THE BINARY)           │
//! │                                                   │
//! │   ┌─────────────┐   ┌─────────────┐   ┌────────┐  │
//! │   │    CLI      │   │  HTTP API   │   │ config │  │
//! │   │   (clap)    │   │   (axum)    │   │ (toml) │  │
//! │   └──────┬──────┘   └──────┬──────┘   └───┬────┘  │
//! │          └─────────────────┼──────────────┘       │
//! │                            ▼                      │
//! │                   ┌────────────────┐              │
//! │                   │  mingpan-core  │              │
//! │                   │  (THE LOGIC)   │              │
//! │                   └────────────────┘              │
//! └───────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! mingpan server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! mingpan bazi --year 庚午 --month 辛巳 --day 丙子 --hour 癸巳
//! mingpan hour --day-master 丙 --hour 10
//! mingpan ziwei -f astrolabe.json --age 32 --target-year 2026
//! mingpan rules -f bazi_rule_tables.json
//! ```

mod cli;

use clap::Parser;
use mingpan::config::{AppConfig, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // The config decides the log format, so it is loaded before tracing is up;
    // its error and override warnings are reported once tracing is.
    let loaded = AppConfig::load(&cli.config).map(|mut config| {
        let warnings = config.apply_env();
        (config, warnings)
    });
    let log_format = loaded
        .as_ref()
        .map_or(LogFormat::Text, |(config, _)| config.logging.format);
    init_tracing(log_format, cli.verbose);

    let config = match loaded {
        Ok((config, warnings)) => {
            for warning in warnings {
                tracing::warn!("{}", warning);
            }
            config
        }
        Err(e) => {
            tracing::error!("Error loading {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat, verbose: bool) {
    let default_filter = if verbose {
        "mingpan=debug,mingpan_core=debug,tower_http=debug"
    } else {
        "mingpan=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Print the Mingpan startup banner.
fn print_banner() {
    println!(
        r#"
  ███╗   ███╗██╗███╗   ██╗ ██████╗ ██████╗  █████╗ ███╗   ██╗
  ████╗ ████║██║████╗  ██║██╔════╝ ██╔══██╗██╔══██╗████╗  ██║
  ██╔████╔██║██║██╔██╗ ██║██║  ███╗██████╔╝███████║██╔██╗ ██║
  ██║╚██╔╝██║██║██║╚██╗██║██║   ██║██╔═══╝ ██╔══██║██║╚██╗██║
  ██║ ╚═╝ ██║██║██║ ╚████║╚██████╔╝██║     ██║  ██║██║ ╚████║
  ╚═╝     ╚═╝╚═╝╚═╝  ╚═══╝ ╚═════╝ ╚═╝     ╚═╝  ╚═╝╚═╝  ╚═══╝

  命盘 Chart Annotation v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
