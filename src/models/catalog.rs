use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// TMDB numeric identifier for a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One recommendable movie: the external metadata id and the display title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogItem {
    pub id: MovieId,
    pub title: String,
}

/// The fixed, ordered list of recommendable movies
///
/// Positions are the row/column indices of the similarity matrix. A title →
/// position map is built once at construction; for duplicate titles the first
/// occurrence wins.
pub struct Catalog {
    items: Vec<CatalogItem>,
    title_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut title_index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            title_index.entry(item.title.clone()).or_insert(position);
        }
        Self { items, title_index }
    }

    /// Resolves an exact title to its catalog position
    pub fn resolve_index(&self, title: &str) -> AppResult<usize> {
        self.title_index
            .get(title)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("Title not in catalog: {}", title)))
    }

    pub fn item(&self, index: usize) -> &CatalogItem {
        &self.items[index]
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Precomputed pairwise similarity scores between catalog items
///
/// `row(i)[j]` scores item j against item i. Scores are an opaque ranking
/// key (higher = more similar); symmetry comes from the precomputation and
/// is not checked here.
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    pub fn new(rows: Vec<Vec<f32>>) -> anyhow::Result<Self> {
        let size = rows.len();
        for (index, row) in rows.iter().enumerate() {
            anyhow::ensure!(
                row.len() == size,
                "similarity matrix is not square: row {} has {} entries, expected {}",
                index,
                row.len(),
                size
            );
        }
        Ok(Self { rows })
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.rows[index]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Catalog and similarity matrix bound together
///
/// The only constructor checks that both sides agree in size, so a catalog
/// can never be paired with a matrix it was not computed from. Loaded once at
/// startup and held read-only behind an `Arc` for the process lifetime.
pub struct Dataset {
    catalog: Catalog,
    similarity: SimilarityMatrix,
}

impl Dataset {
    pub fn new(catalog: Catalog, similarity: SimilarityMatrix) -> anyhow::Result<Self> {
        anyhow::ensure!(
            catalog.len() == similarity.len(),
            "catalog has {} items but similarity matrix has {} rows",
            catalog.len(),
            similarity.len()
        );
        Ok(Self { catalog, similarity })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, title: &str) -> CatalogItem {
        CatalogItem {
            id: MovieId(id),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_resolve_index_exact_match() {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "B"), item(3, "C")]);
        assert_eq!(catalog.resolve_index("B").unwrap(), 1);
    }

    #[test]
    fn test_resolve_index_unknown_title() {
        let catalog = Catalog::new(vec![item(1, "A")]);
        let err = catalog.resolve_index("Missing").unwrap_err();
        assert!(matches!(err, crate::error::AppError::NotFound(_)));
    }

    #[test]
    fn test_resolve_index_is_case_sensitive() {
        let catalog = Catalog::new(vec![item(1, "Inception")]);
        assert!(catalog.resolve_index("inception").is_err());
    }

    #[test]
    fn test_duplicate_titles_first_match_wins() {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "Dup"), item(3, "Dup")]);
        assert_eq!(catalog.resolve_index("Dup").unwrap(), 1);
    }

    #[test]
    fn test_movie_id_display() {
        assert_eq!(format!("{}", MovieId(19995)), "19995");
    }

    #[test]
    fn test_similarity_matrix_rejects_non_square() {
        let result = SimilarityMatrix::new(vec![vec![1.0, 0.5], vec![0.5]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_similarity_matrix_row_access() {
        let matrix = SimilarityMatrix::new(vec![vec![1.0, 0.2], vec![0.2, 1.0]]).unwrap();
        assert_eq!(matrix.row(1), &[0.2, 1.0]);
    }

    #[test]
    fn test_dataset_rejects_length_mismatch() {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "B")]);
        let matrix = SimilarityMatrix::new(vec![vec![1.0]]).unwrap();
        assert!(Dataset::new(catalog, matrix).is_err());
    }

    #[test]
    fn test_dataset_accepts_aligned_pair() {
        let catalog = Catalog::new(vec![item(1, "A"), item(2, "B")]);
        let matrix = SimilarityMatrix::new(vec![vec![1.0, 0.3], vec![0.3, 1.0]]).unwrap();
        let dataset = Dataset::new(catalog, matrix).unwrap();
        assert_eq!(dataset.catalog().len(), 2);
        assert_eq!(dataset.similarity().len(), 2);
    }
}
