#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

/// Integration tests for the ingestion/search pipeline with realistic data
use async_trait::async_trait;
use shop_search::catalog::CatalogStore;
use shop_search::database::lancedb::VectorIndex;
use shop_search::embeddings::{EmbeddingError, EmbeddingModel, QuotaSignature};
use shop_search::indexer::{CatalogIndexer, IngestSettings};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

const DIM: usize = 16;

const CSV_HEADER: &str =
    "name,main_category,sub_category,image,link,ratings,no_of_ratings,discount_price,actual_price\n";

/// Deterministic text-derived embedding: identical text maps to the
/// identical vector, so querying with a document's content finds it.
fn embed_text(text: &str) -> Vec<f32> {
    let mut seed: u64 = 1469598103934665603;
    for byte in text.bytes() {
        seed ^= u64::from(byte);
        seed = seed.wrapping_mul(1099511628211);
    }
    (0..DIM)
        .map(|i| ((seed.wrapping_mul(i as u64 + 1) % 10007) as f32 * 0.01).sin())
        .collect()
}

struct DeterministicEmbedder {
    batch_calls: AtomicUsize,
}

impl DeterministicEmbedder {
    fn new() -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl EmbeddingModel for DeterministicEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(embed_text(text))
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

fn write_catalog(dir: &Path) {
    let electronics = format!(
        "{CSV_HEADER}\
boAt Rockerz 450 Bluetooth Headphone,Electronics,Headphones,https://img.example.com/rockerz.jpg,https://shop.example.com/rockerz,4.1,\"27,938\",\"₹1,499\",\"₹3,990\"\n\
Sony WH-1000XM4 Wireless Headphones,Electronics,Headphones,https://img.example.com/sony.jpg,https://shop.example.com/sony,4.6,\"11,202\",\"₹19,990\",\"₹29,990\"\n\
Dell Inspiron 15 Laptop,Electronics,Laptops,https://img.example.com/dell.jpg,https://shop.example.com/dell,4.2,\"3,311\",\"₹42,990\",\"₹58,990\"\n"
    );
    fs::write(dir.join("All Electronics.csv"), electronics).expect("should write catalog");

    let toys = format!(
        "{CSV_HEADER}\
LEGO Classic Bricks Box,Toys,Building Sets,https://img.example.com/lego.jpg,https://shop.example.com/lego,4.7,\"8,450\",\"₹1,999\",\"₹2,499\"\n\
Rubik's Cube 3x3,Toys,Puzzles,https://img.example.com/cube.jpg,https://shop.example.com/cube,4.4,\"12,040\",\"₹199\",\"₹299\"\n"
    );
    fs::write(dir.join("Toys and Games.csv"), toys).expect("should write catalog");
}

fn settings() -> IngestSettings {
    IngestSettings {
        batch_size: 500,
        per_category_limit: 50,
        inter_batch_delay: Duration::ZERO,
        rate_limit_backoff: Duration::ZERO,
    }
}

fn build_indexer(catalog_dir: &Path, db_path: &Path) -> (Arc<DeterministicEmbedder>, CatalogIndexer) {
    let embedder = Arc::new(DeterministicEmbedder::new());
    let indexer = CatalogIndexer::new(
        Arc::new(CatalogStore::new(catalog_dir)),
        Arc::clone(&embedder) as Arc<dyn EmbeddingModel>,
        QuotaSignature::default(),
        settings(),
        db_path.to_path_buf(),
    );
    (embedder, indexer)
}

#[tokio::test]
async fn pipeline_ingests_and_serves_search() {
    let catalog_dir = TempDir::new().expect("should create catalog dir");
    write_catalog(catalog_dir.path());
    let db_dir = TempDir::new().expect("should create db dir");
    let db_path = db_dir.path().join("vectors");

    let (embedder, mut indexer) = build_indexer(catalog_dir.path(), &db_path);

    let report = indexer
        .initialize()
        .await
        .expect("should initialize")
        .expect("fresh store should ingest");

    assert_eq!(report.categories_indexed, 2);
    assert_eq!(report.documents_indexed, 5);
    assert_eq!(embedder.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(indexer.count().await.expect("should count"), 5);

    // Query with a document's exact content: that product comes first.
    // "All Electronics" is indexed under its display name "Eletrônicos".
    let matches = indexer
        .search(
            "Sony WH-1000XM4 Wireless Headphones - Category: Eletrônicos",
            None,
            3,
        )
        .await
        .expect("should search");

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].metadata.name, "Sony WH-1000XM4 Wireless Headphones");
    assert_eq!(matches[0].metadata.category, "All Electronics");
    assert_eq!(matches[0].metadata.category_translated, "Eletrônicos");
    assert_eq!(matches[0].metadata.actual_price, "₹29,990");

    // Category filter restricts results to the requested category
    let toys_only = indexer
        .search("building bricks for kids", Some("Toys and Games"), 10)
        .await
        .expect("should search");

    assert_eq!(toys_only.len(), 2);
    assert!(
        toys_only
            .iter()
            .all(|m| m.metadata.category == "Toys and Games")
    );
}

#[tokio::test]
async fn persisted_store_is_reused_across_managers() {
    let catalog_dir = TempDir::new().expect("should create catalog dir");
    write_catalog(catalog_dir.path());
    let db_dir = TempDir::new().expect("should create db dir");
    let db_path = db_dir.path().join("vectors");

    let (first_embedder, mut first) = build_indexer(catalog_dir.path(), &db_path);
    first
        .initialize()
        .await
        .expect("should initialize")
        .expect("fresh store should ingest");
    assert_eq!(first_embedder.batch_calls.load(Ordering::SeqCst), 1);
    drop(first);

    // A new manager over the same directory loads without any
    // embedding calls
    let (second_embedder, mut second) = build_indexer(catalog_dir.path(), &db_path);
    let report = second.initialize().await.expect("should initialize");

    assert!(report.is_none());
    assert_eq!(second_embedder.batch_calls.load(Ordering::SeqCst), 0);
    assert_eq!(second.count().await.expect("should count"), 5);
}

#[tokio::test]
async fn rebuild_replaces_the_persisted_collection() {
    let catalog_dir = TempDir::new().expect("should create catalog dir");
    write_catalog(catalog_dir.path());
    let db_dir = TempDir::new().expect("should create db dir");
    let db_path = db_dir.path().join("vectors");

    let (_embedder, mut indexer) = build_indexer(catalog_dir.path(), &db_path);
    indexer
        .initialize()
        .await
        .expect("should initialize")
        .expect("fresh store should ingest");

    // Grow the catalog; the existing store does not reflect it until a
    // rebuild re-ingests everything
    let cameras = format!(
        "{CSV_HEADER}\
Canon EOS 1500D DSLR,Electronics,Cameras,https://img.example.com/canon.jpg,https://shop.example.com/canon,4.5,\"2,204\",\"₹33,990\",\"₹41,995\"\n"
    );
    fs::write(catalog_dir.path().join("Cameras.csv"), cameras).expect("should write catalog");

    assert_eq!(indexer.count().await.expect("should count"), 5);

    let report = indexer.rebuild().await.expect("should rebuild");
    assert_eq!(report.categories_indexed, 3);
    assert_eq!(report.documents_indexed, 6);
    assert_eq!(indexer.count().await.expect("should count"), 6);

    let matches = indexer
        .search("Canon EOS 1500D DSLR - Category: Câmeras", Some("Cameras"), 5)
        .await
        .expect("should search");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].metadata.name, "Canon EOS 1500D DSLR");
}

#[tokio::test]
async fn wiped_directory_loses_all_documents() {
    let catalog_dir = TempDir::new().expect("should create catalog dir");
    write_catalog(catalog_dir.path());
    let db_dir = TempDir::new().expect("should create db dir");
    let db_path = db_dir.path().join("vectors");

    let (_embedder, mut indexer) = build_indexer(catalog_dir.path(), &db_path);
    indexer
        .initialize()
        .await
        .expect("should initialize")
        .expect("fresh store should ingest");
    drop(indexer);

    VectorIndex::wipe(&db_path).expect("should wipe");

    let index = VectorIndex::open(&db_path, DIM)
        .await
        .expect("should reopen");
    assert_eq!(index.count().await.expect("should count"), 0);
}
