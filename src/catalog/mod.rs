
mod translations;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::{Result, ShopError};

pub use translations::translate_category;

/// Files at or below this size are treated as empty placeholders.
const MIN_DATA_FILE_BYTES: u64 = 100;

/// Once more than this many categories are cached, the whole cache is
/// cleared before the next insert. Not an LRU; the source data is small
/// enough that a full reload is acceptable.
const CACHE_CAPACITY: usize = 5;

/// Number of products included in an LLM context summary.
const SUMMARY_LIMIT: usize = 30;

/// Catalog prices are INR; the storefront displays BRL.
pub const INR_TO_BRL: f64 = 0.066;

/// One product row from a category CSV file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub main_category: String,
    pub sub_category: String,
    pub image: String,
    pub link: String,
    #[serde(deserialize_with = "lenient_f32")]
    pub ratings: Option<f32>,
    pub no_of_ratings: Option<String>,
    pub discount_price: Option<String>,
    pub actual_price: Option<String>,
}

/// The ratings column contains free text in some exports; anything that
/// does not parse as a number becomes `None`.
fn lenient_f32<'de, D>(deserializer: D) -> std::result::Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse::<f32>().ok()))
}

/// On-demand loader for per-category product CSV files.
pub struct CatalogStore {
    data_dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Vec<Product>>>>,
}

impl CatalogStore {
    #[inline]
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// List category ids whose backing file holds real data.
    #[inline]
    pub fn available_categories(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut categories: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().is_none_or(|ext| ext != "csv") {
                    return None;
                }
                let size = entry.metadata().ok()?.len();
                if size <= MIN_DATA_FILE_BYTES {
                    return None;
                }
                path.file_stem().map(|s| s.to_string_lossy().into_owned())
            })
            .collect();

        categories.sort();
        categories
    }

    /// Load the products of one category, reading the CSV on first access.
    ///
    /// Returns `None` when no file exists for the category, and an empty
    /// collection when the file is an undersized placeholder. Rows that
    /// fail to parse are skipped with a warning.
    #[inline]
    pub fn load_category(&self, category: &str) -> Result<Option<Arc<Vec<Product>>>> {
        {
            let cache = self
                .cache
                .lock()
                .map_err(|_| ShopError::Catalog("Catalog cache lock poisoned".to_string()))?;
            if let Some(products) = cache.get(category) {
                return Ok(Some(Arc::clone(products)));
            }
        }

        let path = self.data_dir.join(format!("{category}.csv"));
        if !path.exists() {
            return Ok(None);
        }

        let size = fs::metadata(&path)
            .map_err(|e| ShopError::Catalog(format!("Failed to stat {}: {}", path.display(), e)))?
            .len();
        if size <= MIN_DATA_FILE_BYTES {
            debug!("Category {} has a placeholder file, treating as empty", category);
            return Ok(Some(Arc::new(Vec::new())));
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| ShopError::Catalog(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut products = Vec::new();
        for row in reader.deserialize::<Product>() {
            match row {
                Ok(product) => products.push(product),
                Err(e) => {
                    warn!("Skipping unparseable row in {}: {}", path.display(), e);
                }
            }
        }

        let products = Arc::new(products);

        let mut cache = self
            .cache
            .lock()
            .map_err(|_| ShopError::Catalog("Catalog cache lock poisoned".to_string()))?;
        if cache.len() > CACHE_CAPACITY {
            debug!("Catalog cache over capacity, clearing all entries");
            cache.clear();
        }
        cache.insert(category.to_string(), Arc::clone(&products));

        Ok(Some(products))
    }

    /// Render a plain-text product summary for LLM context, optionally
    /// filtered to products at or below `max_price` (in display currency).
    ///
    /// Returns `None` when the category is missing or nothing matches.
    #[inline]
    pub fn products_summary(&self, category: &str, max_price: Option<f64>) -> Result<Option<String>> {
        let Some(products) = self.load_category(category)? else {
            return Ok(None);
        };

        let max_price_inr = max_price.map(|p| p / INR_TO_BRL);

        let matching: Vec<&Product> = products
            .iter()
            .filter(|p| {
                max_price_inr.is_none_or(|limit| {
                    clean_price(p.actual_price.as_deref().unwrap_or_default()) <= limit
                })
            })
            .take(SUMMARY_LIMIT)
            .collect();

        if matching.is_empty() {
            return Ok(None);
        }

        let mut summary = format!("Available products in category '{category}':\n");
        for product in matching {
            let price_inr = clean_price(product.actual_price.as_deref().unwrap_or_default());
            let price_brl = price_inr * INR_TO_BRL;
            let rating = product
                .ratings
                .map_or_else(|| "N/A".to_string(), |r| format!("{r:.1}"));
            let image = if product.image.is_empty() {
                "N/A"
            } else {
                product.image.as_str()
            };
            summary.push_str(&format!(
                "- Name: {} | Price: R$ {:.2} | Rating: {} | Image: {}\n",
                product.name, price_brl, rating, image
            ));
        }

        Ok(Some(summary))
    }

    /// Render the `- id: display name` list fed into the analysis prompt.
    #[inline]
    pub fn categories_with_names(&self) -> String {
        self.available_categories()
            .iter()
            .map(|cat| format!("- {}: {}", cat, translate_category(cat)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extract a numeric value from a noisy price string ("₹1,499.00" and
/// friends). Returns 0.0 when nothing numeric can be found.
#[inline]
pub fn clean_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let cleaned = cleaned.replace(',', "");
    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Format a source-currency price string for display.
#[inline]
pub fn display_price(raw: &str) -> String {
    format!("R$ {:.2}", clean_price(raw) * INR_TO_BRL)
}
