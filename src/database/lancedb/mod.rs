// LanceDB vector database module
// Handles vector storage and similarity search for product documents

pub mod vector_store;

use serde::{Deserialize, Serialize};

pub use vector_store::VectorIndex;

/// A searchable unit derived from one catalog product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Unique identifier for this document
    pub id: String,
    /// Free-text content the embedding is generated from
    pub content: String,
    /// Product fields stored alongside the embedding
    pub metadata: ProductMetadata,
}

/// Product fields persisted next to each embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMetadata {
    /// Product display name
    pub name: String,
    /// Catalog category id the product was ingested from
    pub category: String,
    /// Display name of the category
    pub category_translated: String,
    /// Sub-category within the catalog
    pub sub_category: String,
    /// Product image URL
    pub image: String,
    /// Product page URL
    pub link: String,
    /// Star rating, 0.0 when the source row had none
    pub ratings: f32,
    /// Price as original-currency numeric text
    pub actual_price: String,
}

/// One similarity search hit, best matches first.
#[derive(Debug, Clone, Serialize)]
pub struct ProductMatch {
    #[serde(flatten)]
    pub metadata: ProductMetadata,
    /// Best-effort score derived from the index distance; callers must
    /// not assume calibration.
    pub relevance_score: f32,
}
