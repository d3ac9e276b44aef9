use crate::enrichment::EnrichmentClient;
use crate::model::{RecipeFilter, RecipeId, RecipeRecord};
use crate::providers::LlmProvider;
use crate::reconcile::reconcile;
use crate::source::{RecipeSource, SourceClient};
use futures::future::join_all;
use log::{debug, error};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fetches recipes and decorates them with model estimates.
///
/// Every stage degrades instead of failing: a broken source yields no
/// records, a broken provider yields records without estimates.
pub struct RecipePipeline {
    source: SourceClient,
    enricher: Option<EnrichmentClient>,
}

impl RecipePipeline {
    pub fn new(source: Box<dyn RecipeSource>, provider: Arc<dyn LlmProvider>) -> Self {
        RecipePipeline {
            source: SourceClient::new(source),
            enricher: Some(EnrichmentClient::new(provider)),
        }
    }

    /// A pipeline that returns source records as they are
    pub fn without_enrichment(source: Box<dyn RecipeSource>) -> Self {
        RecipePipeline {
            source: SourceClient::new(source),
            enricher: None,
        }
    }

    pub fn source(&self) -> &SourceClient {
        &self.source
    }

    pub fn is_enriching(&self) -> bool {
        self.enricher.is_some()
    }

    /// Recipes matching `filter`, enriched when possible
    pub async fn get_enriched_list(&self, filter: &RecipeFilter) -> Vec<RecipeRecord> {
        let records = self.source.fetch_many(filter).await;
        if records.is_empty() {
            debug!("No recipes for {:?}, skipping enrichment", filter);
            return records;
        }
        self.enrich(records).await
    }

    /// One recipe, enriched when possible
    pub async fn get_enriched_one(&self, id: &RecipeId) -> Option<RecipeRecord> {
        let record = self.source.fetch_one(id).await?;
        self.enrich(vec![record]).await.into_iter().next()
    }

    /// Several recipes fetched and enriched concurrently, in the order of
    /// `ids`. Ids that resolve to nothing are left out without affecting the
    /// others.
    pub async fn get_enriched_many(&self, ids: &[RecipeId]) -> Vec<RecipeRecord> {
        join_all(ids.iter().map(|id| self.get_enriched_one(id)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    async fn enrich(&self, records: Vec<RecipeRecord>) -> Vec<RecipeRecord> {
        let Some(enricher) = &self.enricher else {
            return records;
        };
        if records.is_empty() {
            return records;
        }

        match enricher.enrich(&records).await {
            Ok(raw) => reconcile(&raw, records),
            Err(e) => {
                error!("{}, returning recipes without estimates", e);
                records
            }
        }
    }
}

/// Tracks which request is the latest for a view.
///
/// Callers take a ticket before starting a request and drop the result if
/// the ticket is no longer current when it settles. In-flight requests are
/// never aborted. [`crate::Recetario::search_recipes`] uses one for text
/// searches; embedding UIs can keep one per view.
#[derive(Debug, Default)]
pub struct RequestGeneration(AtomicU64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket
    pub fn begin(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.0.load(Ordering::SeqCst) == ticket
    }
}
