// Indexer module
// Orchestrates catalog ingestion into the vector index and query-time search


use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::catalog::{CatalogStore, Product, translate_category};
use crate::config::IngestConfig;
use crate::database::lancedb::{IndexedDocument, ProductMatch, ProductMetadata, VectorIndex};
use crate::embeddings::{EmbeddingModel, QuotaSignature};
use crate::{Result, ShopError};

/// Default number of search results when the caller does not specify one.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Ingestion tuning knobs.
#[derive(Debug, Clone)]
pub struct IngestSettings {
    /// Documents per embedding submission
    pub batch_size: usize,
    /// Sampling cap per category
    pub per_category_limit: usize,
    /// Pause between successful batches, throttling the provider
    pub inter_batch_delay: Duration,
    /// Extended pause before the single retry of a rate-limited batch
    pub rate_limit_backoff: Duration,
}

impl From<&IngestConfig> for IngestSettings {
    #[inline]
    fn from(config: &IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            per_category_limit: config.per_category_limit,
            inter_batch_delay: Duration::from_secs(config.inter_batch_delay_secs),
            rate_limit_backoff: Duration::from_secs(config.rate_limit_backoff_secs),
        }
    }
}

/// Outcome of one embedding batch during an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Embedded and stored
    Indexed { documents: usize },
    /// Rate-limited and dropped after the single retry also failed;
    /// a later rebuild may succeed
    SkippedRecoverable { reason: String },
    /// Dropped without retry on a non-quota failure
    SkippedFatal { reason: String },
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub categories_indexed: usize,
    pub categories_skipped: usize,
    pub documents_indexed: usize,
    pub documents_dropped: usize,
    pub batches: Vec<BatchOutcome>,
}

/// Failure of a single batch submission.
#[derive(Debug)]
enum BatchError {
    Embedding(crate::embeddings::EmbeddingError),
    Store(ShopError),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Embedding(e) => write!(f, "{e}"),
            BatchError::Store(e) => write!(f, "{e}"),
        }
    }
}

/// Vector store manager: owns the persistent index lifecycle
/// (load-or-create, ingestion, search, rebuild) and the retry policy
/// around the embedding provider.
pub struct CatalogIndexer {
    catalog: Arc<CatalogStore>,
    embedder: Arc<dyn EmbeddingModel>,
    quota: QuotaSignature,
    settings: IngestSettings,
    db_path: PathBuf,
    index: Option<VectorIndex>,
}

impl CatalogIndexer {
    #[inline]
    pub fn new(
        catalog: Arc<CatalogStore>,
        embedder: Arc<dyn EmbeddingModel>,
        quota: QuotaSignature,
        settings: IngestSettings,
        db_path: PathBuf,
    ) -> Self {
        Self {
            catalog,
            embedder,
            quota,
            settings,
            db_path,
            index: None,
        }
    }

    /// True once an index is open and serving searches.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    /// Number of documents in the index, 0 when not initialized.
    #[inline]
    pub async fn count(&self) -> Result<u64> {
        match &self.index {
            Some(index) => index.count().await,
            None => Ok(0),
        }
    }

    /// Load the persisted index, or build it from the catalog when it is
    /// absent or empty. Building blocks for the whole ingestion run and
    /// may take minutes.
    ///
    /// Returns `None` when an existing populated index was loaded (no
    /// ingestion performed), or the ingestion report otherwise. Calling
    /// this on an already-loaded manager is a no-op.
    #[inline]
    pub async fn initialize(&mut self) -> Result<Option<IngestReport>> {
        if let Some(index) = &self.index {
            let count = index.count().await.unwrap_or(0);
            if count > 0 {
                debug!("Vector store already loaded with {} products", count);
                return Ok(None);
            }
        }

        match VectorIndex::open(&self.db_path, self.embedder.dimension()).await {
            Ok(index) => {
                match index.count().await {
                    Ok(count) if count > 0 => {
                        info!("Vector store loaded with {} products", count);
                        self.index = Some(index);
                        return Ok(None);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Could not read existing vector store count: {}", e);
                    }
                }
                self.index = Some(index);
            }
            Err(e) => {
                warn!("Could not load existing vector store: {}", e);
                VectorIndex::wipe(&self.db_path)?;
                let index = VectorIndex::open(&self.db_path, self.embedder.dimension()).await?;
                self.index = Some(index);
            }
        }

        info!("Creating new vector store");
        let report = self.ingest_all().await?;
        Ok(Some(report))
    }

    /// Destroy the persisted index and re-ingest the whole catalog.
    ///
    /// Destructive and non-atomic: an interruption after the wipe leaves
    /// no index behind until the next run.
    #[inline]
    pub async fn rebuild(&mut self) -> Result<IngestReport> {
        info!("Rebuilding vector store");

        self.index = None;
        VectorIndex::wipe(&self.db_path)?;

        let index = VectorIndex::open(&self.db_path, self.embedder.dimension()).await?;
        self.index = Some(index);

        self.ingest_all().await
    }

    /// Semantic product search, optionally restricted to one category.
    ///
    /// Returns an empty list when the manager was never initialized.
    #[inline]
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ProductMatch>> {
        let Some(index) = &self.index else {
            return Ok(Vec::new());
        };

        let query_vector = self.embedder.embed_query(query).await.map_err(|e| {
            ShopError::Embedding(format!("Failed to embed search query: {e}"))
        })?;

        index.search(&query_vector, limit, category).await
    }

    /// Build documents from the full catalog and write them to the index
    /// in rate-limited batches.
    async fn ingest_all(&self) -> Result<IngestReport> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| ShopError::Database("Vector index is not open".to_string()))?;

        let mut report = IngestReport::default();
        let documents = self.collect_documents(&mut report);

        info!("Total documents: {}", documents.len());
        info!("Generating embeddings in batches (respecting rate limits)");

        let batch_size = self.settings.batch_size.max(1);
        let total_batches = documents.len().div_ceil(batch_size);

        for (batch_num, batch) in documents.chunks(batch_size).enumerate() {
            info!(
                "Processing batch {}/{} ({} documents)",
                batch_num + 1,
                total_batches,
                batch.len()
            );

            match self.submit_batch(index, batch).await {
                Ok(()) => {
                    report.documents_indexed += batch.len();
                    report.batches.push(BatchOutcome::Indexed {
                        documents: batch.len(),
                    });

                    if batch_num + 1 < total_batches {
                        debug!(
                            "Waiting {:?} before next batch",
                            self.settings.inter_batch_delay
                        );
                        sleep(self.settings.inter_batch_delay).await;
                    }
                }
                Err(e) => {
                    error!("Error in batch {}: {}", batch_num + 1, e);

                    let rate_limited = matches!(
                        &e,
                        BatchError::Embedding(embed_err) if self.quota.matches(embed_err)
                    );

                    if rate_limited {
                        warn!(
                            "Rate limit reached, waiting {:?} before retry",
                            self.settings.rate_limit_backoff
                        );
                        sleep(self.settings.rate_limit_backoff).await;

                        match self.submit_batch(index, batch).await {
                            Ok(()) => {
                                info!("Batch {} completed after retry", batch_num + 1);
                                report.documents_indexed += batch.len();
                                report.batches.push(BatchOutcome::Indexed {
                                    documents: batch.len(),
                                });
                            }
                            Err(retry_err) => {
                                error!("Retry failed: {}", retry_err);
                                report.documents_dropped += batch.len();
                                report.batches.push(BatchOutcome::SkippedRecoverable {
                                    reason: retry_err.to_string(),
                                });
                            }
                        }
                    } else {
                        report.documents_dropped += batch.len();
                        report.batches.push(BatchOutcome::SkippedFatal {
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            "Ingestion finished: {} documents indexed, {} dropped",
            report.documents_indexed, report.documents_dropped
        );
        Ok(report)
    }

    /// Sample the catalog into indexable documents. Categories that are
    /// missing, empty, or fail to load are skipped, not fatal.
    fn collect_documents(&self, report: &mut IngestReport) -> Vec<IndexedDocument> {
        let categories = self.catalog.available_categories();
        info!("Processing {} categories", categories.len());

        let mut documents = Vec::new();
        for category in &categories {
            let products = match self.catalog.load_category(category) {
                Ok(Some(products)) if !products.is_empty() => products,
                Ok(_) => {
                    report.categories_skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!("Error processing category {}: {}", category, e);
                    report.categories_skipped += 1;
                    continue;
                }
            };

            let translated = translate_category(category);
            for product in products.iter().take(self.settings.per_category_limit) {
                documents.push(build_document(product, category, &translated));
            }
            report.categories_indexed += 1;
        }

        documents
    }

    async fn submit_batch(
        &self,
        index: &VectorIndex,
        batch: &[IndexedDocument],
    ) -> std::result::Result<(), BatchError> {
        let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();

        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(BatchError::Embedding)?;

        index
            .add_documents(batch, &vectors)
            .await
            .map_err(BatchError::Store)?;

        Ok(())
    }
}

fn build_document(product: &Product, category: &str, translated: &str) -> IndexedDocument {
    IndexedDocument {
        id: Uuid::new_v4().to_string(),
        content: format!("{} - Category: {}", product.name, translated),
        metadata: ProductMetadata {
            name: product.name.clone(),
            category: category.to_string(),
            category_translated: translated.to_string(),
            sub_category: product.sub_category.clone(),
            image: product.image.clone(),
            link: product.link.clone(),
            ratings: product.ratings.unwrap_or(0.0),
            actual_price: product
                .actual_price
                .clone()
                .unwrap_or_else(|| "0".to_string()),
        },
    }
}
