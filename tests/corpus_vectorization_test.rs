//! Integration tests for corpus building, vectorization and similarity.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use forest::catalog::normalizer::ItemTextNormalizer;
use forest::prelude::*;

fn items() -> InMemoryItemProvider {
    InMemoryItemProvider::new()
        .with_items(
            ContentType::Movie,
            vec![
                RawItem::new()
                    .with("activity_id", 1)
                    .with("title", "Interstellar")
                    .with("genre_nm", "SF")
                    .with("director", "Christopher Nolan")
                    .with("keywords", "우주, 블랙홀"),
                RawItem::new()
                    .with("activity_id", 2)
                    .with("title", "Parasite")
                    .with("genre_nm", "드라마")
                    .with("keywords", "가족"),
            ],
        )
        .with_items(
            ContentType::Performance,
            vec![
                RawItem::new()
                    .with("activity_id", 3)
                    .with("title", "Mamma Mia")
                    .with("genre", "뮤지컬")
                    .with("cast", vec!["최정원", "신영숙"]),
            ],
        )
        .with_items(
            ContentType::Exhibition,
            vec![RawItem::new().with("activity_id", 4).with("keywords", "우주, 사진")],
        )
}

fn corpus() -> Result<Corpus> {
    ItemCorpusBuilder::new(Arc::new(items()), VectorizerConfig::default())?.build()
}

#[test]
fn test_corpus_vectors_share_one_space() -> Result<()> {
    let corpus = corpus()?;
    let space = corpus.vectorizer().space_id();

    assert_eq!(corpus.len(), 4);
    for item in corpus.items() {
        let vector = item.feature_vector.as_ref().unwrap();
        assert_eq!(vector.space(), space);
        assert_eq!(vector.dimension(), corpus.vectorizer().vocabulary_size());
    }

    Ok(())
}

#[test]
fn test_vocabulary_contains_bigrams() -> Result<()> {
    let corpus = corpus()?;
    let terms = corpus.vectorizer().vocabulary_terms();

    assert!(terms.contains(&"interstellar"));
    assert!(terms.contains(&"christopher nolan"));
    assert!(terms.contains(&"우주"));

    Ok(())
}

#[test]
fn test_title_is_weighted_by_repetition() -> Result<()> {
    let normalizer = ItemTextNormalizer::new()?;
    let raw = RawItem::new()
        .with("title", "Parasite")
        .with("keywords", "가족");
    assert_eq!(normalizer.normalize(&raw), "parasite parasite 가족");

    Ok(())
}

#[test]
fn test_profile_projection_matches_related_items() -> Result<()> {
    let corpus = corpus()?;
    let profile = UserProfile::new(1).with_keywords(["우주", "unseen-term"]);
    let user = UserProfileVectorizer::new().vectorize(&profile, corpus.vectorizer())?;

    let vectors: Vec<FeatureVector> = corpus
        .items()
        .iter()
        .filter_map(|item| item.feature_vector.clone())
        .collect();
    let scores = SimilarityScorer::new().score(&user, &vectors)?;

    assert_eq!(scores.len(), 4);
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    // Interstellar and the space photography exhibition mention 우주.
    assert!(scores[0] > 0.0);
    assert!(scores[3] > 0.0);
    assert_eq!(scores[1], 0.0);
    assert_eq!(scores[2], 0.0);

    Ok(())
}

#[test]
fn test_manual_user_vector_dimension_mismatch() -> Result<()> {
    let corpus = corpus()?;
    let vectors: Vec<FeatureVector> = corpus
        .items()
        .iter()
        .filter_map(|item| item.feature_vector.clone())
        .collect();

    let user: FeatureVector = Vector::new(vec![1.0; 3]).into();
    let result = SimilarityScorer::new().score(&user, &vectors);
    assert!(matches!(
        result,
        Err(ForestError::VectorDimensionMismatch { expected: 3, .. })
    ));

    Ok(())
}

#[test]
fn test_vectors_from_unrelated_fits_are_rejected() -> Result<()> {
    let first = corpus()?;
    let second = corpus()?;

    // Same catalog, same width, different fits.
    let profile = UserProfile::new(1).with_keywords(["우주"]);
    let user = UserProfileVectorizer::new().vectorize(&profile, first.vectorizer())?;
    let vectors: Vec<FeatureVector> = second
        .items()
        .iter()
        .filter_map(|item| item.feature_vector.clone())
        .collect();

    assert!(matches!(
        SimilarityScorer::new().score(&user, &vectors),
        Err(ForestError::VectorDimensionMismatch { .. })
    ));

    Ok(())
}

#[test]
fn test_transform_before_fit_is_fatal() -> Result<()> {
    let vectorizer = TfIdfVectorizer::new(VectorizerConfig::default())?;
    let err = vectorizer.transform("우주").unwrap_err();
    assert!(matches!(err, ForestError::NotFitted));
    assert!(!err.is_recoverable());

    Ok(())
}

#[test]
fn test_catalog_invalidation_refits() -> Result<()> {
    let profiles = InMemoryProfileProvider::new().with_profile(UserProfile::new(1));
    let recommender = Recommender::new(
        Arc::new(items()),
        Arc::new(profiles),
        ForestConfig::default(),
    )?;

    let first = recommender.corpus()?;
    assert_eq!(recommender.cache().version(), 0);
    assert_eq!(recommender.invalidate_catalog(), 1);
    let second = recommender.corpus()?;

    assert_ne!(first.vectorizer().space_id(), second.vectorizer().space_id());
    assert!(second.built_at() >= first.built_at());

    Ok(())
}

#[test]
fn test_json_file_providers_end_to_end() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let items_path = dir.path().join("items.json");
    let profiles_path = dir.path().join("profiles.json");

    fs::write(
        &items_path,
        r#"{
            "movie": [
                {"activity_id": 1, "title": "Interstellar", "genre_nm": "SF", "keywords": "우주"},
                {"activity_id": "2", "title": "Parasite", "genre_nm": "드라마"}
            ],
            "performance": [
                {"activity_id": 3, "title": "Mamma Mia", "genre": "뮤지컬", "cast": ["최정원"]}
            ],
            "exhibition": [
                {"activity_id": 4, "keywords": ["우주", "사진"], "type": "exhibition"}
            ]
        }"#,
    )?;
    fs::write(
        &profiles_path,
        r#"[
            {"user_id": 9, "movie_preference": 8, "performance_preference": 2,
             "exhibition_preference": 6, "movie_genre_preference": "[\"SF\"]",
             "like_words": "우주", "created_at": "2024-01-01T00:00:00Z"}
        ]"#,
    )?;

    let recommender = Recommender::new(
        Arc::new(JsonFileItemProvider::new(&items_path)),
        Arc::new(JsonFileProfileProvider::new(&profiles_path)),
        ForestConfig::default(),
    )?;

    // Quotas for five: two movies, one performance, one exhibition.
    let ids = recommender.get_recommendations(9, 5);
    assert_eq!(ids.len(), 4);
    assert_eq!(ids[0], 1);
    assert!(recommender.get_recommendations(10, 5).is_empty());

    Ok(())
}

#[test]
fn test_json_file_providers_skip_bad_records() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let items_path = dir.path().join("items.json");
    let profiles_path = dir.path().join("profiles.json");

    fs::write(
        &items_path,
        r#"{
            "movie": [{"activity_id": 1, "keywords": "sf, 우주"}, "garbage"],
            "performance": [{"activity_id": 2, "keywords": "뮤지컬, 사랑"}],
            "exhibition": [{"activity_id": 1, "keywords": "우주"}]
        }"#,
    )?;
    fs::write(
        &profiles_path,
        r#"[
            {"user_id": 1, "movie_preference": 9, "like_words": "sf",
             "created_at": "2024-01-01T00:00:00Z"},
            {"user_id": 2, "like_words": "뮤지컬", "created_at": "2024-05-01 12:00:00"},
            {"like_words": "no user"}
        ]"#,
    )?;

    let recommender = Recommender::new(
        Arc::new(JsonFileItemProvider::new(&items_path)),
        Arc::new(JsonFileProfileProvider::new(&profiles_path)),
        ForestConfig::default(),
    )?;

    let corpus = recommender.corpus()?;
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.skipped().len(), 1);

    assert_eq!(recommender.get_recommendations(1, 5), vec![1, 2]);
    assert_eq!(recommender.get_recommendations(2, 5), vec![2, 1]);

    Ok(())
}
