use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{self, AppState};
use crate::assistant::Assistant;
use crate::catalog::{CatalogStore, display_price};
use crate::config::{Config, get_config_dir};
use crate::database::lancedb::VectorIndex;
use crate::embeddings::{EmbeddingModel, GeminiEmbedder, QuotaSignature};
use crate::indexer::{BatchOutcome, CatalogIndexer, IngestReport, IngestSettings};
use crate::llm::{ChatModel, GeminiChatModel};
use crate::prompts::PromptStore;

fn load_config() -> Result<Config> {
    let config_dir = get_config_dir().context("Failed to resolve configuration directory")?;
    Config::load(config_dir)
}

fn build_indexer(config: &Config) -> Result<(Arc<CatalogStore>, CatalogIndexer)> {
    let api_key = config
        .gemini
        .api_key()
        .context("Failed to resolve the Gemini API key")?;

    let catalog = Arc::new(CatalogStore::new(config.data_dir()));
    let embedder: Arc<dyn EmbeddingModel> =
        Arc::new(GeminiEmbedder::new(&config.gemini, api_key));
    let quota = QuotaSignature::new(config.ingest.quota_markers.clone());

    let indexer = CatalogIndexer::new(
        Arc::clone(&catalog),
        embedder,
        quota,
        IngestSettings::from(&config.ingest),
        config.vector_db_path(),
    );

    Ok((catalog, indexer))
}

fn print_report(report: &IngestReport) {
    println!("Categories indexed: {}", report.categories_indexed);
    println!("Categories skipped: {}", report.categories_skipped);
    println!("Documents indexed: {}", report.documents_indexed);
    if report.documents_dropped > 0 {
        println!("Documents dropped: {}", report.documents_dropped);
        for outcome in &report.batches {
            match outcome {
                BatchOutcome::Indexed { .. } => {}
                BatchOutcome::SkippedRecoverable { reason } => {
                    println!("  Batch dropped after rate-limit retry: {reason}");
                }
                BatchOutcome::SkippedFatal { reason } => {
                    println!("  Batch dropped: {reason}");
                }
            }
        }
    }
}

/// Start the HTTP API server, initializing the vector store first.
#[inline]
pub async fn serve_api(port_override: Option<u16>) -> Result<()> {
    let config = load_config()?;
    let (catalog, mut indexer) = build_indexer(&config)?;

    info!("Initializing vector store (this may take several minutes on first run)");
    if let Some(report) = indexer.initialize().await? {
        info!(
            "Vector store built: {} documents indexed, {} dropped",
            report.documents_indexed, report.documents_dropped
        );
    }

    let api_key = config
        .gemini
        .api_key()
        .context("Failed to resolve the Gemini API key")?;
    let chat: Arc<dyn ChatModel> = Arc::new(GeminiChatModel::new(&config.gemini, api_key));
    let prompts = Arc::new(PromptStore::new(config.prompts_dir()));
    let assistant = Assistant::new(chat, prompts, Arc::clone(&catalog));

    let state = Arc::new(AppState {
        catalog,
        indexer: RwLock::new(indexer),
        assistant,
    });

    let app = api::build_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let port = port_override.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Build the vector store once, ahead of serving.
#[inline]
pub async fn init_store() -> Result<()> {
    let config = load_config()?;
    let (_catalog, mut indexer) = build_indexer(&config)?;

    println!("Initializing vector store");
    println!("This process loads products, generates embeddings, and creates the vector database");
    println!("Estimated time: 5-10 minutes");

    match indexer.initialize().await? {
        Some(report) => {
            println!("Vector store initialized successfully");
            print_report(&report);
        }
        None => {
            println!(
                "Vector store already populated with {} products, nothing to do",
                indexer.count().await?
            );
        }
    }

    println!("Semantic search is now available");
    Ok(())
}

/// Destroy and rebuild the vector store from scratch.
#[inline]
pub async fn rebuild_store() -> Result<()> {
    let config = load_config()?;
    let (_catalog, mut indexer) = build_indexer(&config)?;

    println!("Rebuilding vector store from scratch");
    let report = indexer.rebuild().await?;

    println!("Vector store rebuilt successfully");
    print_report(&report);
    Ok(())
}

/// One-off semantic search from the command line.
#[inline]
pub async fn run_search(query: &str, category: Option<&str>, limit: usize) -> Result<()> {
    let config = load_config()?;
    let (_catalog, mut indexer) = build_indexer(&config)?;

    indexer.initialize().await?;

    let matches = indexer.search(query, category, limit).await?;

    if matches.is_empty() {
        println!("No products matched '{query}'.");
        return Ok(());
    }

    println!("Found {} products:", matches.len());
    println!();
    for product in &matches {
        println!("{} ({})", product.metadata.name, product.metadata.category_translated);
        println!("   Price: {}", display_price(&product.metadata.actual_price));
        if product.metadata.ratings > 0.0 {
            println!("   Rating: {:.1}", product.metadata.ratings);
        }
        println!("   Link: {}", product.metadata.link);
        println!();
    }

    Ok(())
}

/// Show catalog and vector store status.
#[inline]
pub async fn show_status() -> Result<()> {
    let config = load_config()?;

    let catalog = CatalogStore::new(config.data_dir());
    let categories = catalog.available_categories();

    println!("Catalog directory: {}", config.data_dir().display());
    println!("Categories with data: {}", categories.len());
    for category in &categories {
        println!("  {category}");
    }

    let index = VectorIndex::open(
        &config.vector_db_path(),
        config.gemini.embedding_dimension as usize,
    )
    .await?;
    let count = index.count().await?;

    println!();
    println!("Vector store: {}", config.vector_db_path().display());
    if count > 0 {
        println!("Indexed products: {count}");
    } else {
        println!("Vector store is empty. Run 'shop-search init' to build it.");
    }

    Ok(())
}

/// Print the active configuration as TOML.
#[inline]
pub fn show_config() -> Result<()> {
    let config = load_config()?;

    println!("Configuration file: {}", config.config_file_path().display());
    println!();
    println!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render configuration")?
    );

    Ok(())
}
