use std::cmp::Ordering;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogItem, Dataset, MetadataFetch, Recommendation},
    services::providers::MetadataProvider,
};

const MAX_RECOMMENDATIONS: usize = 5;

const OVERVIEW_DISABLED: &str = "Overview not available.";
const OVERVIEW_TIMEOUT: &str = "Could not fetch details (timeout).";
const OVERVIEW_MISSING: &str = "No description available.";

/// Ranks catalog items against a queried title and assembles display records
///
/// Constructed once with the loaded dataset and a metadata provider, then
/// shared read-only across requests. All ranking state is precomputed; the
/// only I/O is the optional enrichment fetch per result.
pub struct RecommendationEngine {
    dataset: Arc<Dataset>,
    provider: Arc<dyn MetadataProvider>,
    placeholder_poster_url: String,
}

impl RecommendationEngine {
    pub fn new(
        dataset: Arc<Dataset>,
        provider: Arc<dyn MetadataProvider>,
        placeholder_poster_url: String,
    ) -> Self {
        Self {
            dataset,
            provider,
            placeholder_poster_url,
        }
    }

    /// Returns up to 5 movies most similar to `title`, most similar first
    ///
    /// Propagates `NotFound` for an unknown title; enrichment problems never
    /// surface as errors, only as fallback fields on individual results.
    pub async fn recommend(&self, title: &str, enrich: bool) -> AppResult<Vec<Recommendation>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        let index = self.dataset.catalog().resolve_index(title)?;
        let ranked = self.rank_similar(index);

        tracing::info!(
            title = %title,
            candidates = ranked.len(),
            enrich,
            "Ranked similar titles"
        );

        let fetches = self.fetch_details_batch(&ranked, enrich).await;

        let results = ranked
            .iter()
            .zip(fetches)
            .map(|(&(other_index, _), fetch)| self.build_result(other_index, fetch))
            .collect();

        Ok(results)
    }

    /// Ranks every other catalog item by its similarity to `index`
    ///
    /// The queried item is excluded by identity, not by dropping the top
    /// entry, so a row whose self-similarity is not maximal still excludes
    /// the right item. The sort is stable: equal scores keep ascending
    /// catalog order, and NaN scores compare as equal.
    fn rank_similar(&self, index: usize) -> Vec<(usize, f32)> {
        let row = self.dataset.similarity().row(index);

        let mut ranked: Vec<(usize, f32)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other_index, _)| other_index != index)
            .collect();

        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(MAX_RECOMMENDATIONS);
        ranked
    }

    /// Fetches metadata for the selected items, joined back in rank order
    ///
    /// The up-to-5 calls are independent, so they run concurrently. A
    /// panicked task degrades to a failed fetch rather than failing the
    /// request.
    async fn fetch_details_batch(
        &self,
        ranked: &[(usize, f32)],
        enrich: bool,
    ) -> Vec<MetadataFetch> {
        if !enrich {
            return vec![MetadataFetch::Disabled; ranked.len()];
        }

        let mut tasks = Vec::with_capacity(ranked.len());
        for &(other_index, _) in ranked {
            let provider = Arc::clone(&self.provider);
            let movie_id = self.dataset.catalog().item(other_index).id;
            tasks.push(tokio::spawn(
                async move { provider.fetch_details(movie_id).await },
            ));
        }

        let mut fetches = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(fetch) => fetches.push(fetch),
                Err(e) => {
                    tracing::error!(error = %e, "Metadata fetch task failed");
                    fetches.push(MetadataFetch::Failed(e.to_string()));
                }
            }
        }
        fetches
    }

    /// Builds one result record, substituting fallbacks by fetch outcome
    fn build_result(&self, index: usize, fetch: MetadataFetch) -> Recommendation {
        let item = self.dataset.catalog().item(index);

        match fetch {
            MetadataFetch::Fetched(details) => Recommendation {
                title: details.title.unwrap_or_else(|| item.title.clone()),
                poster_url: details
                    .poster_url
                    .unwrap_or_else(|| self.placeholder_poster_url.clone()),
                rating: details.rating,
                overview: details
                    .overview
                    .unwrap_or_else(|| OVERVIEW_MISSING.to_string()),
            },
            MetadataFetch::Disabled => self.fallback_result(item, OVERVIEW_DISABLED.to_string()),
            MetadataFetch::TimedOut => self.fallback_result(item, OVERVIEW_TIMEOUT.to_string()),
            MetadataFetch::Failed(detail) => self.fallback_result(item, detail),
        }
    }

    fn fallback_result(&self, item: &CatalogItem, overview: String) -> Recommendation {
        Recommendation {
            title: item.title.clone(),
            poster_url: self.placeholder_poster_url.clone(),
            rating: None,
            overview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Catalog, MovieDetails, MovieId, SimilarityMatrix};
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    const PLACEHOLDER: &str = "https://via.placeholder.com/150";

    fn item(id: u64, title: &str) -> CatalogItem {
        CatalogItem {
            id: MovieId(id),
            title: title.to_string(),
        }
    }

    /// Catalog A/B/C with row A = [1.0, 0.9, 0.2]
    fn small_dataset() -> Arc<Dataset> {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "B"), item(3, "C")]);
        let similarity = SimilarityMatrix::new(vec![
            vec![1.0, 0.9, 0.2],
            vec![0.9, 1.0, 0.4],
            vec![0.2, 0.4, 1.0],
        ])
        .unwrap();
        Arc::new(Dataset::new(catalog, similarity).unwrap())
    }

    fn seven_item_dataset() -> Arc<Dataset> {
        let items = (1..=7).map(|n| item(n, &format!("M{}", n))).collect();
        // Row for M1: best match M4, then M2, M6, M7, M3; M5 ranks last.
        let rows = vec![
            vec![1.0, 0.8, 0.3, 0.9, 0.1, 0.7, 0.5],
            vec![0.8, 1.0, 0.2, 0.6, 0.3, 0.4, 0.5],
            vec![0.3, 0.2, 1.0, 0.1, 0.6, 0.2, 0.4],
            vec![0.9, 0.6, 0.1, 1.0, 0.2, 0.3, 0.7],
            vec![0.1, 0.3, 0.6, 0.2, 1.0, 0.5, 0.2],
            vec![0.7, 0.4, 0.2, 0.3, 0.5, 1.0, 0.6],
            vec![0.5, 0.5, 0.4, 0.7, 0.2, 0.6, 1.0],
        ];
        let catalog = Catalog::new(items);
        Arc::new(Dataset::new(catalog, SimilarityMatrix::new(rows).unwrap()).unwrap())
    }

    fn engine_with(dataset: Arc<Dataset>, provider: MockMetadataProvider) -> RecommendationEngine {
        RecommendationEngine::new(dataset, Arc::new(provider), PLACEHOLDER.to_string())
    }

    #[tokio::test]
    async fn test_recommend_disabled_orders_by_similarity() {
        // No expectations: the provider must never be reached when disabled.
        let engine = engine_with(small_dataset(), MockMetadataProvider::new());

        let results = engine.recommend("A", false).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "B");
        assert_eq!(results[1].title, "C");
    }

    #[tokio::test]
    async fn test_recommend_disabled_uses_fallback_fields() {
        let engine = engine_with(small_dataset(), MockMetadataProvider::new());

        let results = engine.recommend("A", false).await.unwrap();

        for result in &results {
            assert_eq!(result.poster_url, PLACEHOLDER);
            assert_eq!(result.rating, None);
            assert_eq!(result.overview, OVERVIEW_DISABLED);
        }
    }

    #[tokio::test]
    async fn test_recommend_is_deterministic() {
        let engine = engine_with(small_dataset(), MockMetadataProvider::new());

        let first = engine.recommend("A", false).await.unwrap();
        let second = engine.recommend("A", false).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_recommend_truncates_to_five() {
        let engine = engine_with(seven_item_dataset(), MockMetadataProvider::new());

        let results = engine.recommend("M1", false).await.unwrap();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["M4", "M2", "M6", "M7", "M3"]);
    }

    #[tokio::test]
    async fn test_recommend_never_includes_queried_title() {
        let engine = engine_with(seven_item_dataset(), MockMetadataProvider::new());

        for queried in ["M1", "M3", "M7"] {
            let results = engine.recommend(queried, false).await.unwrap();
            assert!(results.iter().all(|r| r.title != queried));
        }
    }

    #[tokio::test]
    async fn test_recommend_tie_break_keeps_catalog_order() {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "B"), item(3, "C"), item(4, "D")]);
        let similarity = SimilarityMatrix::new(vec![
            vec![1.0, 0.5, 0.5, 0.5],
            vec![0.5, 1.0, 0.5, 0.5],
            vec![0.5, 0.5, 1.0, 0.5],
            vec![0.5, 0.5, 0.5, 1.0],
        ])
        .unwrap();
        let dataset = Arc::new(Dataset::new(catalog, similarity).unwrap());
        let engine = engine_with(dataset, MockMetadataProvider::new());

        let results = engine.recommend("B", false).await.unwrap();

        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C", "D"]);
    }

    #[tokio::test]
    async fn test_recommend_unknown_title_is_not_found() {
        let engine = engine_with(small_dataset(), MockMetadataProvider::new());

        let err = engine.recommend("Missing", true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recommend_empty_title_is_invalid_input() {
        let engine = engine_with(small_dataset(), MockMetadataProvider::new());

        let err = engine.recommend("   ", true).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_recommend_enriched_uses_fetched_metadata() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_details()
            .with(eq(MovieId(2)))
            .returning(|_| {
                MetadataFetch::Fetched(MovieDetails {
                    title: Some("B (Remastered)".to_string()),
                    poster_url: Some("https://image.tmdb.org/t/p/w500/b.jpg".to_string()),
                    rating: Some(8.1),
                    overview: Some("A sequel.".to_string()),
                })
            });
        provider
            .expect_fetch_details()
            .with(eq(MovieId(3)))
            .returning(|_| {
                MetadataFetch::Fetched(MovieDetails {
                    title: None,
                    poster_url: None,
                    rating: None,
                    overview: None,
                })
            });

        let engine = engine_with(small_dataset(), provider);
        let results = engine.recommend("A", true).await.unwrap();

        assert_eq!(results[0].title, "B (Remastered)");
        assert_eq!(
            results[0].poster_url,
            "https://image.tmdb.org/t/p/w500/b.jpg"
        );
        assert_eq!(results[0].rating, Some(8.1));
        assert_eq!(results[0].overview, "A sequel.");

        // Absent response fields fall back per-field.
        assert_eq!(results[1].title, "C");
        assert_eq!(results[1].poster_url, PLACEHOLDER);
        assert_eq!(results[1].rating, None);
        assert_eq!(results[1].overview, OVERVIEW_MISSING);
    }

    #[tokio::test]
    async fn test_recommend_timeout_degrades_single_result() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_details()
            .with(eq(MovieId(2)))
            .returning(|_| MetadataFetch::TimedOut);
        provider
            .expect_fetch_details()
            .with(eq(MovieId(3)))
            .returning(|_| {
                MetadataFetch::Fetched(MovieDetails {
                    title: Some("C".to_string()),
                    poster_url: Some("https://image.tmdb.org/t/p/w500/c.jpg".to_string()),
                    rating: Some(6.4),
                    overview: Some("Fine.".to_string()),
                })
            });

        let engine = engine_with(small_dataset(), provider);
        let results = engine.recommend("A", true).await.unwrap();

        assert_eq!(results[0].title, "B");
        assert_eq!(results[0].rating, None);
        assert_eq!(results[0].overview, OVERVIEW_TIMEOUT);

        // The neighbor's failure leaves this result untouched.
        assert_eq!(results[1].title, "C");
        assert_eq!(results[1].rating, Some(6.4));
    }

    #[tokio::test]
    async fn test_recommend_failure_carries_detail_text() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_fetch_details()
            .returning(|_| MetadataFetch::Failed("API returned status 401: invalid key".into()));

        let engine = engine_with(small_dataset(), provider);
        let results = engine.recommend("A", true).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "B");
        assert_eq!(results[0].overview, "API returned status 401: invalid key");
        assert_eq!(results[0].poster_url, PLACEHOLDER);
    }
}
