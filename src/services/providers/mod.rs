/// Movie metadata provider abstraction
///
/// The recommendation engine only needs display metadata keyed by movie id;
/// this trait keeps the external source (TMDB in production, stubs in tests)
/// pluggable behind one seam.
use crate::models::{MetadataFetch, MovieId};

pub mod tmdb;

/// Trait for movie metadata providers
///
/// `fetch_details` is infallible by type: timeouts, transport failures and
/// bad statuses all come back as `MetadataFetch` variants, so a degraded
/// network can never fail a recommendation request.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetch display metadata for a single movie
    async fn fetch_details(&self, movie_id: MovieId) -> MetadataFetch;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
