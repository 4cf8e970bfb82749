// Query orchestrator
// Chains LLM classification, catalog lookups, and LLM response generation


use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::{CatalogStore, translate_category};
use crate::llm::ChatModel;
use crate::prompts::{PromptStore, render};
use crate::{Result, ShopError};

/// At most this many classified categories are queried for context.
const MAX_QUERIED_CATEGORIES: usize = 5;

/// Budget and category classification extracted from a user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryAnalysis {
    pub budget: Option<f64>,
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    budget: Option<f64>,
    #[serde(default)]
    categories: Vec<String>,
}

/// Final answer produced for one user prompt.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub response: String,
    pub detected_budget: Option<f64>,
    pub queried_categories: Vec<String>,
}

/// Orchestrates the analyze → lookup → respond chain.
pub struct Assistant {
    chat: Arc<dyn ChatModel>,
    prompts: Arc<PromptStore>,
    catalog: Arc<CatalogStore>,
}

impl Assistant {
    #[inline]
    pub fn new(
        chat: Arc<dyn ChatModel>,
        prompts: Arc<PromptStore>,
        catalog: Arc<CatalogStore>,
    ) -> Self {
        Self {
            chat,
            prompts,
            catalog,
        }
    }

    /// Classify a user prompt into a budget and candidate categories.
    /// Categories the catalog does not know are dropped.
    #[inline]
    pub async fn analyze(&self, prompt: &str) -> Result<QueryAnalysis> {
        let template = self.prompts.load("category_analysis")?;
        let rendered = render(
            &template,
            &[
                ("query", prompt),
                (
                    "available_categories",
                    &self.catalog.categories_with_names(),
                ),
            ],
        );

        let reply = self.chat.generate(&rendered).await?;
        let mut analysis = parse_analysis(&reply)?;

        let available = self.catalog.available_categories();
        analysis.categories.retain(|c| available.contains(c));

        debug!(
            "Query classified: budget={:?}, categories={:?}",
            analysis.budget, analysis.categories
        );
        Ok(analysis)
    }

    /// Produce a natural-language recommendation for a user prompt.
    ///
    /// An explicit `budget_override` wins over the budget detected during
    /// analysis. When no category yields matching products, a friendly
    /// no-results response is returned without a second LLM call.
    #[inline]
    pub async fn recommend(
        &self,
        prompt: &str,
        budget_override: Option<f64>,
    ) -> Result<Recommendation> {
        let analysis = self.analyze(prompt).await?;
        let max_price = budget_override.or(analysis.budget);

        let mut context = String::new();
        for category in analysis.categories.iter().take(MAX_QUERIED_CATEGORIES) {
            if let Some(summary) = self.catalog.products_summary(category, max_price)? {
                context.push_str(&summary);
                context.push('\n');
            }
        }

        if context.trim().is_empty() {
            info!("No products found for prompt, skipping response generation");
            return Ok(Recommendation {
                response: format!(
                    "Sorry, we couldn't find any products matching **{prompt}** right now. \
                     Try refining your search or browsing our categories."
                ),
                detected_budget: max_price,
                queried_categories: analysis.categories,
            });
        }

        let budget_info = max_price
            .map(|p| format!(" (budget up to R$ {p:.2})"))
            .unwrap_or_default();
        let relevant_category_name = analysis
            .categories
            .first()
            .map_or_else(|| "our categories".to_string(), |c| translate_category(c));

        let template = self.prompts.load("response_generation")?;
        let rendered = render(
            &template,
            &[
                ("query", prompt),
                ("context", &context),
                ("budget_info", &budget_info),
                ("relevant_category_name", &relevant_category_name),
            ],
        );

        let response = self.chat.generate(&rendered).await?;

        Ok(Recommendation {
            response,
            detected_budget: max_price,
            queried_categories: analysis.categories,
        })
    }
}

/// Parse the classification reply, tolerating Markdown code fences
/// around the JSON body.
fn parse_analysis(raw: &str) -> Result<QueryAnalysis> {
    let cleaned = strip_code_fences(raw);
    let parsed: RawAnalysis = serde_json::from_str(cleaned)
        .map_err(|e| ShopError::Llm(format!("Failed to parse analysis response: {e}")))?;

    Ok(QueryAnalysis {
        budget: parsed.budget,
        categories: parsed.categories,
    })
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}
