use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use crate::models::{Catalog, CatalogItem, Dataset, SimilarityMatrix};

/// Loads the catalog and similarity matrix from disk and binds them together
///
/// Both files must come from the same precomputation run; `Dataset::new`
/// rejects a size mismatch so they cannot drift apart silently.
pub fn load_dataset(catalog_path: &Path, similarity_path: &Path) -> anyhow::Result<Dataset> {
    let catalog_file = File::open(catalog_path)
        .with_context(|| format!("Failed to open catalog file {}", catalog_path.display()))?;
    let items: Vec<CatalogItem> = serde_json::from_reader(BufReader::new(catalog_file))
        .with_context(|| format!("Failed to parse catalog file {}", catalog_path.display()))?;

    anyhow::ensure!(!items.is_empty(), "catalog file contains no items");

    let similarity_file = File::open(similarity_path).with_context(|| {
        format!(
            "Failed to open similarity matrix file {}",
            similarity_path.display()
        )
    })?;
    let rows: Vec<Vec<f32>> = serde_json::from_reader(BufReader::new(similarity_file))
        .with_context(|| {
            format!(
                "Failed to parse similarity matrix file {}",
                similarity_path.display()
            )
        })?;

    let dataset = Dataset::new(Catalog::new(items), SimilarityMatrix::new(rows)?)?;

    tracing::info!(
        titles = dataset.catalog().len(),
        "Catalog and similarity matrix loaded"
    );

    Ok(dataset)
}
