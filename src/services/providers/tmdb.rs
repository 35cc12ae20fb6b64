/// TMDB metadata provider
///
/// One GET per movie id against the TMDB details endpoint, authenticated by
/// an API key in the query string. Bounded by a per-request timeout, no
/// retries, no caching: a single failed attempt yields a fallback outcome
/// immediately.
use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::{
    models::{ApiMovieDetails, MetadataFetch, MovieDetails, MovieId},
    services::providers::MetadataProvider,
};

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    poster_base_url: String,
    timeout: Duration,
}

impl TmdbProvider {
    pub fn new(
        api_key: String,
        api_url: String,
        poster_base_url: String,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            poster_base_url,
            timeout,
        }
    }

    /// Converts the raw API response, resolving the poster path against the
    /// image base URL. Absent fields stay absent; substitution is the
    /// engine's call.
    fn convert_api_response(&self, details: ApiMovieDetails) -> MovieDetails {
        MovieDetails {
            title: details.title,
            poster_url: details
                .poster_path
                .map(|path| format!("{}{}", self.poster_base_url, path)),
            rating: details.vote_average,
            overview: details.overview,
        }
    }

    fn classify_error(&self, movie_id: MovieId, error: reqwest::Error) -> MetadataFetch {
        if error.is_timeout() {
            tracing::warn!(
                movie_id = %movie_id,
                provider = "tmdb",
                "Metadata request timed out"
            );
            return MetadataFetch::TimedOut;
        }

        tracing::warn!(
            movie_id = %movie_id,
            error = %error,
            provider = "tmdb",
            "Metadata request failed"
        );
        MetadataFetch::Failed(error.to_string())
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_details(&self, movie_id: MovieId) -> MetadataFetch {
        let url = format!("{}/movie/{}", self.api_url, movie_id);

        let response = match self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return self.classify_error(movie_id, e),
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                movie_id = %movie_id,
                status = %status,
                provider = "tmdb",
                "Metadata request returned error status"
            );
            return MetadataFetch::Failed(format!("API returned status {}: {}", status, body));
        }

        match response.json::<ApiMovieDetails>().await {
            Ok(details) => {
                tracing::debug!(
                    movie_id = %movie_id,
                    provider = "tmdb",
                    "Metadata fetched"
                );
                MetadataFetch::Fetched(self.convert_api_response(details))
            }
            Err(e) => self.classify_error(movie_id, e),
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
