//! # Mingpan CLI Module
//!
//! This module implements the CLI interface for Mingpan.
//!
//! ## Available Commands
//!
//! - `bazi` - Annotate a BaZi chart (from flags or a record file)
//! - `hour` - Derive an hour pillar from the Day Master and clock hour
//! - `ziwei` - Report on a pre-computed Zi Wei Dou Shu astrolabe
//! - `rules` - Validate a rule table document
//! - `server` - Start the HTTP server

mod commands;

use clap::{Parser, Subcommand};
use mingpan::config::AppConfig;
use mingpan_core::MingpanError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Mingpan - BaZi and Zi Wei Dou Shu chart annotation
///
/// Annotates pre-computed charts with Ten-God roles, hidden stems, NaYin,
/// void branches and twelve-stage labels.
#[derive(Parser, Debug)]
#[command(name = "mingpan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short = 'c', long, global = true, default_value = "mingpan.toml")]
    pub config: PathBuf,

    /// Rule table document (overrides the configuration)
    #[arg(short = 'r', long, global = true)]
    pub rules: Option<PathBuf>,

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
    /// Annotate a BaZi chart
    Bazi {
        /// Year pillar, e.g. 甲子
        #[arg(long, requires_all = ["month", "day", "hour"], conflicts_with = "file")]
        year: Option<String>,

        /// Month pillar
        #[arg(long)]
        month: Option<String>,

        /// Day pillar
        #[arg(long)]
        day: Option<String>,

        /// Hour pillar
        #[arg(long)]
        hour: Option<String>,

        /// Day Master (defaults to the day stem)
        #[arg(long)]
        day_master: Option<String>,

        /// Chart record (JSON) to enhance
        #[arg(short, long, required_unless_present = "year")]
        file: Option<PathBuf>,

        /// Write the enhanced record to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Derive the hour pillar
    Hour {
        /// Day Master (day stem)
        #[arg(short, long)]
        day_master: String,

        /// Clock hour, 0-23
        #[arg(short = 'H', long)]
        hour: u32,
    },

    /// Report on a Zi Wei Dou Shu astrolabe
    Ziwei {
        /// Astrolabe (JSON) produced by a star-placement tool
        #[arg(short, long)]
        file: PathBuf,

        /// Age for the major fortune
        #[arg(short, long)]
        age: Option<i32>,

        /// Gregorian year for the flow-year analysis
        #[arg(short = 'y', long)]
        target_year: Option<i32>,

        /// Star to locate
        #[arg(short, long)]
        star: Option<String>,

        /// Palace to inspect, e.g. 命宫
        #[arg(long)]
        house: Option<String>,
    },

    /// Validate a rule table document
    Rules {
        /// Document to check (defaults to the configured table)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the configuration)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and the loaded configuration.
pub async fn execute(cli: Cli, mut config: AppConfig) -> Result<(), MingpanError> {
    if let Some(rules) = cli.rules {
        config.rules.path = Some(rules);
    }
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Bazi {
            year,
            month,
            day,
            hour,
            day_master,
            file,
            output,
        }) => {
            let tables = config.rule_tables();
            let source = match file {
                Some(file) => ChartSource::File(file),
                None => ChartSource::Pillars {
                    year: year.unwrap_or_default(),
                    month: month.unwrap_or_default(),
                    day: day.unwrap_or_default(),
                    hour: hour.unwrap_or_default(),
                    day_master,
                },
            };
            cmd_bazi(&tables, json_mode, source, output.as_deref())
        }
        Some(Commands::Hour { day_master, hour }) => cmd_hour(json_mode, &day_master, hour),
        Some(Commands::Ziwei {
            file,
            age,
            target_year,
            star,
            house,
        }) => {
            let tables = config.rule_tables();
            let query = ZiweiQuery {
                age,
                target_year,
                star,
                house,
            };
            cmd_ziwei(&tables, &file, &query)
        }
        Some(Commands::Rules { file }) => cmd_rules(&config, json_mode, file.as_deref()),
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(&config).await
        }
        None => {
            // No subcommand - report on the configured rule table
            cmd_rules(&config, json_mode, None)
        }
    }
}
