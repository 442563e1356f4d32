//! Output formatting for CLI commands.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::item::ActivityId;
use crate::cli::args::{ForestArgs, OutputFormat};
use crate::config::ForestConfig;
use crate::content::ContentType;
use crate::error::Result;
use crate::profile::UserId;
use crate::recommender::Recommendation;

/// Result types that have a human-readable rendering.
pub trait HumanOutput {
    /// Write the human-readable form.
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Result of a recommendation request.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub user_id: UserId,
    pub requested: usize,
    pub recommendations: Vec<Recommendation>,
    /// Show scores in human output.
    #[serde(skip)]
    pub explain: bool,
}

/// Item count of one category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCount {
    pub content_type: ContentType,
    pub count: usize,
}

/// Statistics of a built corpus.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusSummary {
    pub total_items: usize,
    pub categories: Vec<CategoryCount>,
    pub skipped_records: Vec<String>,
    pub vocabulary_size: usize,
    pub built_at: DateTime<Utc>,
    pub item: Option<ItemDetail>,
}

/// Normalized form of one item.
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemDetail {
    pub activity_id: ActivityId,
    pub content_type: ContentType,
    pub text: String,
    pub nonzero_terms: usize,
}

/// Result of validating a configuration file.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigValidation {
    pub path: String,
    pub config: ForestConfig,
}

impl HumanOutput for RecommendationResult {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.recommendations.is_empty() {
            return writeln!(out, "No recommendations available for user {}", self.user_id);
        }
        for (rank, recommendation) in self.recommendations.iter().enumerate() {
            if self.explain {
                writeln!(
                    out,
                    "{:>3}. {:<8} {:<12} final={:.4} similarity={:.4} {}",
                    rank + 1,
                    recommendation.activity_id,
                    recommendation.content_type,
                    recommendation.final_score,
                    recommendation.similarity,
                    recommendation.title
                )?;
            } else {
                writeln!(out, "{}", recommendation.activity_id)?;
            }
        }
        Ok(())
    }
}

impl HumanOutput for CorpusSummary {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Items: {}", self.total_items)?;
        for category in &self.categories {
            writeln!(out, "  {:<12} {}", category.content_type, category.count)?;
        }
        writeln!(out, "Vocabulary size: {}", self.vocabulary_size)?;
        writeln!(out, "Built at: {}", self.built_at.to_rfc3339())?;
        if !self.skipped_records.is_empty() {
            writeln!(out, "Skipped records: {}", self.skipped_records.len())?;
            for reason in &self.skipped_records {
                writeln!(out, "  - {reason}")?;
            }
        }
        if let Some(item) = &self.item {
            writeln!(out)?;
            writeln!(out, "Item {} ({})", item.activity_id, item.content_type)?;
            writeln!(out, "  text: {}", item.text)?;
            writeln!(out, "  terms: {}", item.nonzero_terms)?;
        }
        Ok(())
    }
}

impl HumanOutput for ConfigValidation {
    fn write_human(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Configuration is valid: {}", self.path)?;
        writeln!(
            out,
            "  weights: similarity={} preference={}",
            self.config.ranking.similarity_weight, self.config.ranking.preference_weight
        )?;
        for content_type in ContentType::ALL {
            writeln!(
                out,
                "  ratio {:<12} {}",
                content_type,
                self.config.ranking.ratio(content_type)
            )?;
        }
        writeln!(out, "  default count: {}", self.config.default_total_count)
    }
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &ForestArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, message, result, args)
}

/// Write a result in the specified format.
pub fn write_result<T>(
    out: &mut dyn Write,
    message: &str,
    result: &T,
    args: &ForestArgs,
) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                writeln!(out, "{message}")?;
                writeln!(out)?;
            }
            result.write_human(out)?;
        }
        OutputFormat::Json => {
            let json = if args.pretty {
                serde_json::to_string_pretty(result)?
            } else {
                serde_json::to_string(result)?
            };
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
