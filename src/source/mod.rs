mod instructions;
mod mealdb;
mod rpc;

pub use instructions::{parse_instructions, to_steps};
pub use mealdb::MealDbSource;
pub use rpc::RpcSource;

use crate::config::{AppConfig, Backend};
use crate::error::{RecetarioError, Result};
use crate::model::{ConfEntry, RecipeFilter, RecipeId, RecipeRecord};
use crate::submission::{NewRecipe, SubmitOutcome};
use async_trait::async_trait;
use log::{debug, error};
use std::time::Duration;

/// A backend able to list and look up recipes, normalized to [`RecipeRecord`]
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Backend name used in logs ("mealdb", "rpc")
    fn backend_name(&self) -> &str;

    /// Recipes matching `filter`. No matching rows is `Ok(vec![])`.
    async fn fetch_many(&self, filter: &RecipeFilter) -> Result<Vec<RecipeRecord>>;

    /// One recipe with its ingredients and steps
    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<RecipeRecord>>;

    /// Selectable values of a kind ("categoria", "dificultad", "unidad", "region")
    async fn list_options(&self, kind: &str, subkind: Option<&str>) -> Result<Vec<ConfEntry>>;

    /// Store a user-submitted recipe
    async fn insert_recipe(&self, _recipe: &NewRecipe) -> Result<SubmitOutcome> {
        Err(RecetarioError::Unsupported(self.backend_name().to_string()))
    }
}

/// Build the configured backend
pub fn create_source(config: &AppConfig) -> Result<Box<dyn RecipeSource>> {
    let timeout = Duration::from_secs(config.timeout);
    match config.source.backend {
        Backend::Mealdb => Ok(Box::new(MealDbSource::new(&config.source, timeout))),
        Backend::Rpc => Ok(Box::new(RpcSource::new(&config.source, timeout)?)),
    }
}

/// Wraps a [`RecipeSource`] so that fetch failures degrade to "no data".
///
/// Every failure is logged; callers only ever see empty lists or `None`.
pub struct SourceClient {
    source: Box<dyn RecipeSource>,
}

impl SourceClient {
    pub fn new(source: Box<dyn RecipeSource>) -> Self {
        Self { source }
    }

    pub fn backend_name(&self) -> &str {
        self.source.backend_name()
    }

    pub async fn fetch_many(&self, filter: &RecipeFilter) -> Vec<RecipeRecord> {
        match self.source.fetch_many(filter).await {
            Ok(records) => {
                debug!(
                    "{} returned {} recipes for {:?}",
                    self.backend_name(),
                    records.len(),
                    filter
                );
                records
            }
            Err(e) => {
                error!("Error fetching recipes from {}: {}", self.backend_name(), e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_one(&self, id: &RecipeId) -> Option<RecipeRecord> {
        match self.source.fetch_one(id).await {
            Ok(record) => {
                if record.is_none() {
                    debug!("{} has no recipe with id {}", self.backend_name(), id);
                }
                record
            }
            Err(e) => {
                error!(
                    "Error fetching recipe {} from {}: {}",
                    id,
                    self.backend_name(),
                    e
                );
                None
            }
        }
    }

    pub async fn list_options(&self, kind: &str, subkind: Option<&str>) -> Vec<ConfEntry> {
        match self.source.list_options(kind, subkind).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(
                    "Error listing '{}' options from {}: {}",
                    kind,
                    self.backend_name(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Submission failures are surfaced, unlike reads
    pub fn inner(&self) -> &dyn RecipeSource {
        self.source.as_ref()
    }
}
