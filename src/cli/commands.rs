//! Command implementations for the Forest CLI.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::builder::ItemCorpusBuilder;
use crate::catalog::provider::JsonFileItemProvider;
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ForestConfig;
use crate::error::{ForestError, Result};
use crate::profile::provider::JsonFileProfileProvider;
use crate::recommender::Recommender;

/// Execute a CLI command.
pub fn execute_command(args: ForestArgs) -> Result<()> {
    match &args.command {
        Command::Recommend(recommend_args) => recommend(recommend_args, &args),
        Command::InspectCorpus(inspect_args) => inspect_corpus(inspect_args, &args),
        Command::ValidateConfig(validate_args) => validate_config(validate_args, &args),
    }
}

/// Load the configuration file if one is given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<ForestConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading configuration");
            ForestConfig::from_file(path)
        }
        None => Ok(ForestConfig::default()),
    }
}

/// Recommend items to a user.
fn recommend(args: &RecommendArgs, cli_args: &ForestArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let recommender = Recommender::new(
        Arc::new(JsonFileItemProvider::new(&args.items)),
        Arc::new(JsonFileProfileProvider::new(&args.profiles)),
        config,
    )?;
    let count = args
        .count
        .unwrap_or_else(|| recommender.default_total_count());

    let recommendations = match recommender.try_recommend(args.user, count) {
        Ok(recommendations) => recommendations,
        Err(e) if e.is_recoverable() => {
            warn!(user_id = args.user, error = %e, "no recommendations available");
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    output_result(
        "Recommendations",
        &RecommendationResult {
            user_id: args.user,
            requested: count,
            recommendations,
            explain: args.explain,
        },
        cli_args,
    )
}

/// Build the corpus and report its statistics.
fn inspect_corpus(args: &InspectCorpusArgs, cli_args: &ForestArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let builder = ItemCorpusBuilder::new(
        Arc::new(JsonFileItemProvider::new(&args.items)),
        config.vectorizer,
    )?;
    let corpus = builder.build()?;

    let item = match args.item {
        Some(activity_id) => {
            let item = corpus.get(activity_id).ok_or_else(|| {
                ForestError::other(format!("item {activity_id} is not in the corpus"))
            })?;
            Some(ItemDetail {
                activity_id,
                content_type: item.content_type,
                text: item.text.clone(),
                nonzero_terms: item
                    .feature_vector
                    .as_ref()
                    .map_or(0, |vector| {
                        vector.to_dense().data.iter().filter(|v| **v != 0.0).count()
                    }),
            })
        }
        None => None,
    };

    output_result(
        "Corpus",
        &CorpusSummary {
            total_items: corpus.len(),
            categories: corpus
                .counts()
                .into_iter()
                .map(|(content_type, count)| CategoryCount {
                    content_type,
                    count,
                })
                .collect(),
            skipped_records: corpus.skipped().iter().map(ToString::to_string).collect(),
            vocabulary_size: corpus.vectorizer().vocabulary_size(),
            built_at: corpus.built_at(),
            item,
        },
        cli_args,
    )
}

/// Load and validate a configuration file.
fn validate_config(args: &ValidateConfigArgs, cli_args: &ForestArgs) -> Result<()> {
    let config = ForestConfig::from_file(&args.config_file)?;
    output_result(
        "Configuration",
        &ConfigValidation {
            path: args.config_file.display().to_string(),
            config,
        },
        cli_args,
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use clap::Parser;
    use tempfile::TempDir;

    use super::*;

    fn write_fixtures(dir: &TempDir) {
        fs::write(
            dir.path().join("items.json"),
            r#"{
                "movie": [{"activity_id": 1, "title": "Gravity", "keywords": "SF, 우주"}],
                "performance": [{"activity_id": 2, "keywords": ["뮤지컬", "사랑"]}]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("profiles.json"),
            r#"[{"user_id": 5, "movie_preference": 10, "like_words": "[\"SF\"]"}]"#,
        )
        .unwrap();
    }

    fn run(dir: &TempDir, argv: &[&str]) -> Result<()> {
        let mut full = vec!["forest".to_string(), "--quiet".to_string()];
        full.extend(argv.iter().map(|arg| arg.replace("$DIR", &dir.path().to_string_lossy())));
        execute_command(ForestArgs::try_parse_from(full).unwrap())
    }

    #[test]
    fn test_recommend_command() {
        let dir = TempDir::new().unwrap();
        write_fixtures(&dir);

        run(
            &dir,
            &[
                "recommend",
                "--items",
                "$DIR/items.json",
                "--profiles",
                "$DIR/profiles.json",
                "--user",
                "5",
            ],
        )
        .unwrap();

        // Unknown users get an empty result, not an error.
        run(
            &dir,
            &[
                "recommend",
                "--items",
                "$DIR/items.json",
                "--profiles",
                "$DIR/profiles.json",
                "--user",
                "6",
            ],
        )
        .unwrap();
    }

    #[test]
    fn test_inspect_corpus_command() {
        let dir = TempDir::new().unwrap();
        write_fixtures(&dir);

        run(&dir, &["inspect-corpus", "--items", "$DIR/items.json", "--item", "1"]).unwrap();
        assert!(
            run(&dir, &["inspect-corpus", "--items", "$DIR/items.json", "--item", "99"]).is_err()
        );
    }

    #[test]
    fn test_validate_config_command() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forest.json");
        ForestConfig::default().to_file(&path).unwrap();
        run(&dir, &["validate-config", "$DIR/forest.json"]).unwrap();

        fs::write(&path, r#"{"default_total_count": 0}"#).unwrap();
        assert!(matches!(
            run(&dir, &["validate-config", "$DIR/forest.json"]),
            Err(ForestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_config_defaults() {
        assert_eq!(load_config(None).unwrap(), ForestConfig::default());
    }
}
