//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::plant::{AddArgs, ListArgs, UpdateArgs};
use super::session::Session;
use super::{logger, plant, query};

#[derive(Parser)]
#[command(name = "botaniq")]
#[command(author, version, about = "Local-first plant care tracker")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "BOTANIQ_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true, env = "BOTANIQ_TODAY")]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and a default config
    Init,

    /// Add a plant
    ///
    /// Examples:
    ///   botaniq add "Boston Fern" --location Bathroom --water high
    ///   botaniq add Cactus -l "Window Sill" --water low --type indoor
    Add(AddArgs),

    /// List plants
    List(ListArgs),

    /// Show plant details and care history
    Show {
        /// Plant ID
        id: String,
    },

    /// Change plant fields
    Update(UpdateArgs),

    /// Remove a plant and its history
    Remove {
        /// Plant ID
        id: String,
    },

    /// Record a watering
    Water {
        /// Plant ID
        id: String,

        /// Notes for the care history
        #[arg(long, short, default_value = "")]
        notes: String,
    },

    /// Record a fertilizing
    Fertilize {
        /// Plant ID
        id: String,

        /// Notes for the care history
        #[arg(long, short, default_value = "")]
        notes: String,
    },

    /// Recompute health statuses now
    Scan,

    /// Show collection counts
    Stats,

    /// Show plants due for watering soonest
    Upcoming {
        /// Number of plants to show (default from config)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Keep scanning health on an interval and print changes
    Watch {
        /// Seconds between scans (default from config)
        #[arg(long, short)]
        interval: Option<u64>,

        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Show the effective configuration
    Config,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    if logger::init(output.is_verbose()).is_err() {
        output.verbose("Logger already installed");
    }
    output.verbose("Botaniq starting");

    let session = Session::new(cli.data_dir, cli.today);

    match cli.command {
        Commands::Init => {
            let garden = session.init_garden(&output)?;
            if output.is_json() {
                output.json(&serde_json::json!({
                    "dataDir": garden.data_dir(),
                    "configFile": garden.config().path(),
                }));
            } else {
                output.confirm(&format!(
                    "Initialized botaniq data directory at {}",
                    garden.data_dir().display()
                ));
            }
        }

        Commands::Add(args) => {
            output.verbose_ctx("add", &format!("Adding plant: {}", args.name));
            plant::add(&session, &output, args)?
        }
        Commands::List(args) => plant::list(&session, &output, args)?,
        Commands::Show { id } => plant::show(&session, &output, &id)?,
        Commands::Update(args) => plant::update(&session, &output, args)?,
        Commands::Remove { id } => plant::remove(&session, &output, &id)?,
        Commands::Water { id, notes } => plant::water(&session, &output, &id, &notes)?,
        Commands::Fertilize { id, notes } => plant::fertilize(&session, &output, &id, &notes)?,

        Commands::Scan => query::scan(&session, &output)?,
        Commands::Stats => query::stats(&session, &output)?,
        Commands::Upcoming { limit } => query::upcoming(&session, &output, limit)?,
        Commands::Watch { interval, duration } => {
            output.verbose_ctx(
                "watch",
                &format!("interval={:?}, duration={:?}", interval, duration),
            );
            query::watch(&session, &output, interval, duration)?
        }
        Commands::Config => query::config(&session, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "botaniq",
            "water",
            "p-123",
            "--today",
            "2023-04-01",
            "-f",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.today, Some("2023-04-01".parse().unwrap()));
        assert!(matches!(cli.command, Commands::Water { ref id, .. } if id == "p-123"));
    }

    #[test]
    fn rejects_unknown_care_level() {
        let result = Cli::try_parse_from(["botaniq", "add", "Fern", "-l", "Hall", "--water", "lots"]);
        assert!(result.is_err());
    }
}
