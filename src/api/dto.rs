use serde::{Deserialize, Serialize};

use crate::catalog::{Product, display_price};
use crate::database::lancedb::ProductMatch;
use crate::indexer::DEFAULT_SEARCH_LIMIT;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
}

/// Product as presented over the API, with the price converted to the
/// display currency.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub name: String,
    pub main_category: String,
    pub sub_category: String,
    pub image: String,
    pub link: String,
    pub ratings: Option<f32>,
    pub no_of_ratings: Option<String>,
    pub discount_price: Option<String>,
    pub actual_price: String,
}

impl From<&Product> for ProductView {
    #[inline]
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            main_category: product.main_category.clone(),
            sub_category: product.sub_category.clone(),
            image: product.image.clone(),
            link: product.link.clone(),
            ratings: product.ratings,
            no_of_ratings: product.no_of_ratings.clone(),
            discount_price: product.discount_price.clone(),
            actual_price: display_price(product.actual_price.as_deref().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_products: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: usize,
    pub page_size: usize,
}

impl Default for PageParams {
    #[inline]
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub category: Option<String>,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<ProductMatch>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    pub status: &'static str,
    pub message: String,
    pub documents_indexed: usize,
    pub documents_dropped: usize,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub budget: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub response: String,
    pub detected_budget: Option<f64>,
    pub queried_categories: Vec<String>,
}
