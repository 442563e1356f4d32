//! Command line argument parsing for the Forest CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::catalog::item::ActivityId;
use crate::profile::UserId;

/// Forest - content-based recommendations for movies, performances and exhibitions
#[derive(Parser, Debug, Clone)]
#[command(name = "forest")]
#[command(about = "Content-based recommendations for movies, performances and exhibitions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct ForestArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl ForestArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            _ => "debug",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend items to a user
    Recommend(RecommendArgs),

    /// Build the item corpus and show its statistics
    #[command(name = "inspect-corpus")]
    InspectCorpus(InspectCorpusArgs),

    /// Load and validate a configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Arguments for recommending items
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Item catalog file (JSON object keyed by content type)
    #[arg(long, value_name = "ITEMS_FILE")]
    pub items: PathBuf,

    /// Profile file (JSON array of preference records)
    #[arg(long, value_name = "PROFILES_FILE")]
    pub profiles: PathBuf,

    /// User to recommend for
    #[arg(short, long)]
    pub user: UserId,

    /// Number of items to return (default: from configuration)
    #[arg(short = 'n', long)]
    pub count: Option<usize>,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "FOREST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show scores next to each item
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for inspecting the corpus
#[derive(Parser, Debug, Clone)]
pub struct InspectCorpusArgs {
    /// Item catalog file (JSON object keyed by content type)
    #[arg(long, value_name = "ITEMS_FILE")]
    pub items: PathBuf,

    /// Configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE", env = "FOREST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Show the normalized text of this item
    #[arg(long, value_name = "ACTIVITY_ID")]
    pub item: Option<ActivityId>,
}

/// Arguments for validating a configuration file
#[derive(Parser, Debug, Clone)]
pub struct ValidateConfigArgs {
    /// Configuration file (JSON)
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: PathBuf,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = ForestArgs::try_parse_from(["forest", "validate-config", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.default_log_filter(), "warn");

        let args =
            ForestArgs::try_parse_from(["forest", "-vvv", "validate-config", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 3);
        assert_eq!(args.default_log_filter(), "debug");

        let args =
            ForestArgs::try_parse_from(["forest", "--quiet", "validate-config", "c.json"]).unwrap();
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.default_log_filter(), "error");
    }

    #[test]
    fn test_recommend_args() {
        let args = ForestArgs::try_parse_from([
            "forest",
            "--format",
            "json",
            "recommend",
            "--items",
            "items.json",
            "--profiles",
            "profiles.json",
            "--user",
            "42",
            "-n",
            "5",
            "--explain",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        if let Command::Recommend(recommend) = args.command {
            assert_eq!(recommend.user, 42);
            assert_eq!(recommend.count, Some(5));
            assert!(recommend.explain);
            assert_eq!(recommend.items, PathBuf::from("items.json"));
        } else {
            panic!("Expected Recommend command");
        }
    }

    #[test]
    fn test_recommend_requires_user() {
        assert!(
            ForestArgs::try_parse_from([
                "forest",
                "recommend",
                "--items",
                "items.json",
                "--profiles",
                "profiles.json",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_inspect_corpus_args() {
        let args = ForestArgs::try_parse_from([
            "forest",
            "inspect-corpus",
            "--items",
            "items.json",
            "--item",
            "7",
        ])
        .unwrap();

        if let Command::InspectCorpus(inspect) = args.command {
            assert_eq!(inspect.item, Some(7));
        } else {
            panic!("Expected InspectCorpus command");
        }
    }
}
