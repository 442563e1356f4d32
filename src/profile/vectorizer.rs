//! Projection of user profiles into the corpus vector space.

use tracing::debug;

use crate::content::ContentType;
use crate::error::Result;
use crate::profile::UserProfile;
use crate::vector::FeatureVector;
use crate::vector::tfidf::TfIdfVectorizer;

/// Turns a [`UserProfile`] into a dense vector using an already fitted
/// vectorizer. It never fits a vocabulary of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserProfileVectorizer;

impl UserProfileVectorizer {
    /// Create a profile vectorizer.
    pub fn new() -> Self {
        Self
    }

    /// Text of a profile: genre preferences of every category in canonical
    /// order, then the keywords.
    pub fn profile_text(&self, profile: &UserProfile) -> String {
        ContentType::ALL
            .iter()
            .flat_map(|content_type| profile.genres(*content_type))
            .chain(&profile.keywords)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Project a profile through the fitted vectorizer.
    ///
    /// An empty profile yields a zero vector. Fails with
    /// [`ForestError::NotFitted`](crate::error::ForestError::NotFitted) when
    /// the vectorizer has not been fitted.
    pub fn vectorize(
        &self,
        profile: &UserProfile,
        vectorizer: &TfIdfVectorizer,
    ) -> Result<FeatureVector> {
        let text = self.profile_text(profile);
        let vector = vectorizer.transform(&text)?;
        debug!(
            user_id = profile.user_id,
            terms = vector.nnz(),
            dimension = vector.dimension(),
            "vectorized user profile"
        );
        Ok(FeatureVector::Dense(vector.to_dense()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForestError;
    use crate::vector::tfidf::VectorizerConfig;

    fn fitted() -> TfIdfVectorizer {
        let mut vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
        vectorizer
            .fit(&["sf 우주".to_string(), "뮤지컬 사랑".to_string()])
            .unwrap();
        vectorizer
    }

    #[test]
    fn test_profile_text_order() {
        let profile = UserProfile::new(1)
            .with_keywords(["love"])
            .with_genres(ContentType::Exhibition, ["modern"])
            .with_genres(ContentType::Movie, ["sf", "drama"]);

        assert_eq!(
            UserProfileVectorizer::new().profile_text(&profile),
            "sf drama modern love"
        );
    }

    #[test]
    fn test_vector_shares_corpus_space() {
        let vectorizer = fitted();
        let profile = UserProfile::new(1).with_keywords(["SF", "unseen"]);

        let vector = UserProfileVectorizer::new()
            .vectorize(&profile, &vectorizer)
            .unwrap();
        assert!(matches!(vector, FeatureVector::Dense(_)));
        assert_eq!(vector.dimension(), vectorizer.vocabulary_size());
        assert_eq!(vector.space(), vectorizer.space_id());
        assert!(!vector.to_dense().is_zero());
    }

    #[test]
    fn test_empty_profile_is_zero_vector() {
        let vector = UserProfileVectorizer::new()
            .vectorize(&UserProfile::new(1), &fitted())
            .unwrap();
        assert!(vector.to_dense().is_zero());
    }

    #[test]
    fn test_unfitted_vectorizer_is_rejected() {
        let vectorizer = TfIdfVectorizer::new(VectorizerConfig::default()).unwrap();
        assert!(matches!(
            UserProfileVectorizer::new().vectorize(&UserProfile::new(1), &vectorizer),
            Err(ForestError::NotFitted)
        ));
    }
}
