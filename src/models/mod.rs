use serde::{Deserialize, Serialize};

pub mod catalog;

pub use catalog::{Catalog, CatalogItem, Dataset, MovieId, SimilarityMatrix};

/// A single recommendation card returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub poster_url: String,
    /// TMDB vote average; `None` when enrichment was disabled or failed
    pub rating: Option<f64>,
    pub overview: String,
}

/// Display metadata from a successful enrichment fetch
///
/// Absent response fields stay `None`; the recommendation engine decides the
/// substitute for each one.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub title: Option<String>,
    /// Fully resolved poster URL (base + path), when the response carried one
    pub poster_url: Option<String>,
    pub rating: Option<f64>,
    pub overview: Option<String>,
}

/// Outcome of one enrichment attempt
///
/// This is the whole error model for enrichment: a fetch never raises, it
/// classifies. Which variant came back decides whether the catalog title is
/// substituted for display, so a movie legitimately titled "API Error" is
/// never misclassified as a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFetch {
    /// 2xx response with a parsable JSON body
    Fetched(MovieDetails),
    /// Enrichment turned off for this request; no network access happened
    Disabled,
    /// The request exceeded the configured timeout
    TimedOut,
    /// Any other network or HTTP failure, with detail text
    Failed(String),
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw API response from GET /movie/{id}
///
/// Every field is optional: TMDB omits fields freely and the fallback
/// behavior is decided downstream.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovieDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub overview: Option<String>,
}
