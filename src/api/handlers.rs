use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;
use tracing::{error, info};

use super::dto::{
    CategoryEntry, GenerateRequest, GenerateResponse, HealthResponse, PageParams, ProductPage,
    ProductView, RebuildResponse, SearchParams, SearchResponse,
};
use super::error::ApiError;
use super::state::AppState;
use crate::catalog::translate_category;

/// GET / - health check
#[inline]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Shop search backend is running",
    })
}

/// GET /categories - catalog categories with display names
#[inline]
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryEntry>> {
    let categories = state
        .catalog
        .available_categories()
        .into_iter()
        .map(|id| CategoryEntry {
            name: translate_category(&id),
            id,
        })
        .collect();

    Json(categories)
}

/// GET /products/{category} - paginated product listing
#[inline]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<ProductPage>, ApiError> {
    if params.page_size == 0 {
        return Err(ApiError::BadRequest("page_size must be positive".into()));
    }

    let products = state
        .catalog
        .load_category(&category)?
        .ok_or_else(|| ApiError::NotFound(format!("Category '{category}' not found")))?;

    let total_products = products.len();
    let total_pages = total_products.div_ceil(params.page_size);
    let page = params.page.max(1);

    let start = (page - 1) * params.page_size;
    let page_products: Vec<ProductView> = products
        .iter()
        .skip(start)
        .take(params.page_size)
        .map(ProductView::from)
        .collect();

    Ok(Json(ProductPage {
        products: page_products,
        page,
        page_size: params.page_size,
        total_pages,
        total_products,
    }))
}

/// POST /vector-store/rebuild - destroy and re-ingest the vector store
#[inline]
pub async fn rebuild(State(state): State<Arc<AppState>>) -> Result<Json<RebuildResponse>, ApiError> {
    info!("Rebuild requested over the API");

    // Write lock: no searches or concurrent rebuilds while the
    // persisted directory is being wiped and re-ingested
    let mut indexer = state.indexer.write().await;
    let report = indexer.rebuild().await.map_err(|e| {
        error!("Rebuild failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(RebuildResponse {
        status: "success",
        message: "Vector store rebuilt successfully".to_string(),
        documents_indexed: report.documents_indexed,
        documents_dropped: report.documents_dropped,
    }))
}

/// GET /vector-store/search - direct semantic search
#[inline]
pub async fn semantic_search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let indexer = state.indexer.read().await;
    let results = indexer
        .search(&params.query, params.category.as_deref(), params.limit)
        .await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

/// POST /generate - LLM-backed shopping recommendation
#[inline]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if request.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt cannot be empty".into()));
    }

    let recommendation = state
        .assistant
        .recommend(&request.prompt, request.budget)
        .await
        .map_err(|e| {
            error!("Generate failed: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(GenerateResponse {
        response: recommendation.response,
        detected_budget: recommendation.detected_budget,
        queried_categories: recommendation.queried_categories,
    }))
}
