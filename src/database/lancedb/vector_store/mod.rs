#[cfg(test)]
mod tests;

use super::{IndexedDocument, ProductMatch, ProductMetadata};
use crate::ShopError;
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Name of the product collection inside the LanceDB directory.
const TABLE_NAME: &str = "products";

/// Persistent vector index over product documents.
pub struct VectorIndex {
    connection: Connection,
    table_name: String,
    dimension: usize,
}

impl VectorIndex {
    /// Open (or create) the index directory and connect to it.
    #[inline]
    pub async fn open(db_path: &Path, dimension: usize) -> Result<Self, ShopError> {
        debug!("Opening vector index at {:?}", db_path);

        std::fs::create_dir_all(db_path).map_err(|e| {
            ShopError::Database(format!("Failed to create vector index directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self {
            connection,
            table_name: TABLE_NAME.to_string(),
            dimension,
        })
    }

    /// Remove the persisted index directory and recreate it empty.
    ///
    /// Destructive: any open handle becomes unusable and must be reopened.
    #[inline]
    pub fn wipe(db_path: &Path) -> Result<(), ShopError> {
        if db_path.exists() {
            info!("Removing persisted vector index at {:?}", db_path);
            std::fs::remove_dir_all(db_path).map_err(|e| {
                ShopError::Database(format!("Failed to remove vector index: {}", e))
            })?;
        }

        std::fs::create_dir_all(db_path).map_err(|e| {
            ShopError::Database(format!("Failed to recreate vector index directory: {}", e))
        })?;

        Ok(())
    }

    /// Number of documents in the collection; 0 when the table has never
    /// been created.
    #[inline]
    pub async fn count(&self) -> Result<u64, ShopError> {
        if !self.table_exists().await? {
            return Ok(0);
        }

        let table = self.open_table().await?;
        let count = table
            .count_rows(None)
            .await
            .map_err(|e| ShopError::Database(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }

    /// Store documents with their embedding vectors, creating the table
    /// on first use.
    #[inline]
    pub async fn add_documents(
        &self,
        documents: &[IndexedDocument],
        vectors: &[Vec<f32>],
    ) -> Result<(), ShopError> {
        if documents.is_empty() {
            debug!("No documents to store");
            return Ok(());
        }

        if documents.len() != vectors.len() {
            return Err(ShopError::Database(format!(
                "Document/vector count mismatch: {} vs {}",
                documents.len(),
                vectors.len()
            )));
        }

        self.ensure_table().await?;

        let record_batch = self.create_record_batch(documents, vectors)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);

        let table = self.open_table().await?;
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to insert documents: {}", e)))?;

        debug!("Stored {} documents", documents.len());
        Ok(())
    }

    /// Similarity search, optionally restricted to one category.
    #[inline]
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        category: Option<&str>,
    ) -> Result<Vec<ProductMatch>, ShopError> {
        debug!("Searching vector index with limit {}", limit);

        if !self.table_exists().await? {
            return Ok(Vec::new());
        }

        let table = self.open_table().await?;

        let mut query = table
            .vector_search(query_vector)
            .map_err(|e| ShopError::Database(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit);

        if let Some(category) = category {
            query = query.only_if(format!("category = '{}'", category.replace('\'', "''")));
        }

        let mut results = query
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to execute search: {}", e)))?;

        let mut matches = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to read result stream: {}", e)))?
        {
            matches.extend(parse_match_batch(&batch)?);
        }

        debug!("Search returned {} matches", matches.len());
        Ok(matches)
    }

    async fn table_exists(&self) -> Result<bool, ShopError> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to list tables: {}", e)))?;

        Ok(table_names.contains(&self.table_name))
    }

    async fn ensure_table(&self) -> Result<(), ShopError> {
        if self.table_exists().await? {
            return Ok(());
        }

        info!("Creating {} table with {} dimensions", self.table_name, self.dimension);

        self.connection
            .create_empty_table(&self.table_name, self.schema())
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to create table: {}", e)))?;

        Ok(())
    }

    async fn open_table(&self) -> Result<lancedb::Table, ShopError> {
        self.connection
            .open_table(&self.table_name)
            .execute()
            .await
            .map_err(|e| ShopError::Database(format!("Failed to open table: {}", e)))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.dimension as i32,
                ),
                false,
            ),
            Field::new("content", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("category_translated", DataType::Utf8, false),
            Field::new("sub_category", DataType::Utf8, false),
            Field::new("image", DataType::Utf8, false),
            Field::new("link", DataType::Utf8, false),
            Field::new("ratings", DataType::Float32, false),
            Field::new("actual_price", DataType::Utf8, false),
            Field::new("indexed_at", DataType::Utf8, false),
        ]))
    }

    fn create_record_batch(
        &self,
        documents: &[IndexedDocument],
        vectors: &[Vec<f32>],
    ) -> Result<RecordBatch, ShopError> {
        let len = documents.len();

        let mut ids = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut names = Vec::with_capacity(len);
        let mut categories = Vec::with_capacity(len);
        let mut categories_translated = Vec::with_capacity(len);
        let mut sub_categories = Vec::with_capacity(len);
        let mut images = Vec::with_capacity(len);
        let mut links = Vec::with_capacity(len);
        let mut ratings = Vec::with_capacity(len);
        let mut actual_prices = Vec::with_capacity(len);
        let mut indexed_ats = Vec::with_capacity(len);

        let now = chrono::Utc::now().to_rfc3339();
        for document in documents {
            ids.push(document.id.as_str());
            contents.push(document.content.as_str());
            names.push(document.metadata.name.as_str());
            categories.push(document.metadata.category.as_str());
            categories_translated.push(document.metadata.category_translated.as_str());
            sub_categories.push(document.metadata.sub_category.as_str());
            images.push(document.metadata.image.as_str());
            links.push(document.metadata.link.as_str());
            ratings.push(document.metadata.ratings);
            actual_prices.push(document.metadata.actual_price.as_str());
            indexed_ats.push(now.clone());
        }

        let mut flat_values = Vec::with_capacity(len * self.dimension);
        for vector in vectors {
            if vector.len() != self.dimension {
                return Err(ShopError::Database(format!(
                    "Vector dimension mismatch: expected {}, got {}",
                    self.dimension,
                    vector.len()
                )));
            }
            flat_values.extend_from_slice(vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| ShopError::Database(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(names)),
            Arc::new(StringArray::from(categories)),
            Arc::new(StringArray::from(categories_translated)),
            Arc::new(StringArray::from(sub_categories)),
            Arc::new(StringArray::from(images)),
            Arc::new(StringArray::from(links)),
            Arc::new(Float32Array::from(ratings)),
            Arc::new(StringArray::from(actual_prices)),
            Arc::new(StringArray::from(indexed_ats)),
        ];

        RecordBatch::try_new(self.schema(), arrays)
            .map_err(|e| ShopError::Database(format!("Failed to create record batch: {}", e)))
    }
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, ShopError> {
    batch
        .column_by_name(name)
        .ok_or_else(|| ShopError::Database(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ShopError::Database(format!("Invalid {} column type", name)))
}

fn parse_match_batch(batch: &RecordBatch) -> Result<Vec<ProductMatch>, ShopError> {
    let names = string_column(batch, "name")?;
    let categories = string_column(batch, "category")?;
    let categories_translated = string_column(batch, "category_translated")?;
    let sub_categories = string_column(batch, "sub_category")?;
    let images = string_column(batch, "image")?;
    let links = string_column(batch, "link")?;
    let actual_prices = string_column(batch, "actual_price")?;

    let ratings = batch
        .column_by_name("ratings")
        .ok_or_else(|| ShopError::Database("Missing ratings column".to_string()))?
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| ShopError::Database("Invalid ratings column type".to_string()))?;

    // The distance column is only present on vector search results
    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    let mut matches = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let metadata = ProductMetadata {
            name: names.value(row).to_string(),
            category: categories.value(row).to_string(),
            category_translated: categories_translated.value(row).to_string(),
            sub_category: sub_categories.value(row).to_string(),
            image: images.value(row).to_string(),
            link: links.value(row).to_string(),
            ratings: ratings.value(row),
            actual_price: actual_prices.value(row).to_string(),
        };

        // Best-effort score: 1 - distance when reported, placeholder otherwise
        let relevance_score = distances
            .flatten()
            .map_or(1.0, |d| {
                if d.is_null(row) { 1.0 } else { 1.0 - d.value(row) }
            });

        matches.push(ProductMatch {
            metadata,
            relevance_score,
        });
    }

    Ok(matches)
}
