use super::*;
use tempfile::TempDir;
use uuid::Uuid;

const DIM: usize = 8;

fn axis_vector(axis: usize) -> Vec<f32> {
    let mut vector = vec![0.0; DIM];
    vector[axis % DIM] = 1.0;
    vector
}

fn make_document(name: &str, category: &str) -> IndexedDocument {
    IndexedDocument {
        id: Uuid::new_v4().to_string(),
        content: format!("{} - Category: {}", name, category),
        metadata: ProductMetadata {
            name: name.to_string(),
            category: category.to_string(),
            category_translated: category.to_string(),
            sub_category: "General".to_string(),
            image: "https://img.example.com/p.jpg".to_string(),
            link: "https://shop.example.com/p".to_string(),
            ratings: 4.2,
            actual_price: "1499".to_string(),
        },
    }
}

#[tokio::test]
async fn fresh_index_is_empty() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    assert_eq!(index.count().await.expect("should count"), 0);
}

#[tokio::test]
async fn search_without_table_returns_empty() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let matches = index
        .search(&axis_vector(0), 5, None)
        .await
        .expect("should search");
    assert!(matches.is_empty());
}

#[tokio::test]
async fn add_documents_and_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents = vec![
        make_document("Wireless Buds", "Headphones"),
        make_document("Thin Laptop", "Laptops"),
    ];
    let vectors = vec![axis_vector(0), axis_vector(1)];

    index
        .add_documents(&documents, &vectors)
        .await
        .expect("should add documents");

    assert_eq!(index.count().await.expect("should count"), 2);
}

#[tokio::test]
async fn search_orders_by_similarity() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents = vec![
        make_document("Wireless Buds", "Headphones"),
        make_document("Thin Laptop", "Laptops"),
        make_document("Gaming Mouse", "Accessories"),
    ];
    let vectors = vec![axis_vector(0), axis_vector(1), axis_vector(2)];

    index
        .add_documents(&documents, &vectors)
        .await
        .expect("should add documents");

    let matches = index
        .search(&axis_vector(1), 3, None)
        .await
        .expect("should search");

    assert_eq!(matches.len(), 3);
    assert_eq!(matches[0].metadata.name, "Thin Laptop");
    assert_eq!(matches[0].metadata.ratings, 4.2);
}

#[tokio::test]
async fn search_respects_limit() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents: Vec<IndexedDocument> = (0..6)
        .map(|i| make_document(&format!("Product {i}"), "Headphones"))
        .collect();
    let vectors: Vec<Vec<f32>> = (0..6).map(axis_vector).collect();

    index
        .add_documents(&documents, &vectors)
        .await
        .expect("should add documents");

    let matches = index
        .search(&axis_vector(0), 4, None)
        .await
        .expect("should search");
    assert_eq!(matches.len(), 4);
}

#[tokio::test]
async fn category_filter_restricts_matches() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents = vec![
        make_document("Wireless Buds", "Headphones"),
        make_document("Over-Ear Cans", "Headphones"),
        make_document("Thin Laptop", "Laptops"),
    ];
    let vectors = vec![axis_vector(0), axis_vector(1), axis_vector(2)];

    index
        .add_documents(&documents, &vectors)
        .await
        .expect("should add documents");

    let matches = index
        .search(&axis_vector(2), 10, Some("Headphones"))
        .await
        .expect("should search");

    assert_eq!(matches.len(), 2);
    assert!(
        matches
            .iter()
            .all(|m| m.metadata.category == "Headphones")
    );
}

#[tokio::test]
async fn mismatched_vector_count_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents = vec![make_document("Wireless Buds", "Headphones")];
    let result = index.add_documents(&documents, &[]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn mismatched_vector_dimension_is_an_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let index = VectorIndex::open(temp_dir.path(), DIM)
        .await
        .expect("should open index");

    let documents = vec![make_document("Wireless Buds", "Headphones")];
    let result = index.add_documents(&documents, &[vec![1.0, 2.0]]).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn wipe_discards_persisted_documents() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let db_path = temp_dir.path().join("vectors");

    {
        let index = VectorIndex::open(&db_path, DIM)
            .await
            .expect("should open index");
        index
            .add_documents(
                &[make_document("Wireless Buds", "Headphones")],
                &[axis_vector(0)],
            )
            .await
            .expect("should add documents");
        assert_eq!(index.count().await.expect("should count"), 1);
    }

    VectorIndex::wipe(&db_path).expect("should wipe index");

    let index = VectorIndex::open(&db_path, DIM)
        .await
        .expect("should reopen index");
    assert_eq!(index.count().await.expect("should count"), 0);
}
