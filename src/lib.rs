pub mod config;
pub mod enrichment;
pub mod error;
pub mod favorites;
pub mod model;
pub mod pantry;
pub mod pipeline;
pub mod providers;
pub mod reconcile;
pub mod source;
pub mod storage;
pub mod submission;
pub mod suggest;

pub use config::AppConfig;
pub use enrichment::{EnrichmentClient, EnrichmentRequest};
pub use error::{RecetarioError, Result};
pub use favorites::{FavoriteSet, FAVORITES_KEY};
pub use model::{
    ConfEntry, EnrichmentFields, Ingredient, PantryItem, RecipeFilter, RecipeId, RecipeRecord,
    Step,
};
pub use pantry::{Pantry, PANTRY_KEY};
pub use pipeline::{RecipePipeline, RequestGeneration};
pub use providers::{LlmProvider, ProviderFactory};
pub use reconcile::{reconcile, sanitize};
pub use source::{RecipeSource, SourceClient};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Persistence};
pub use submission::{submit_recipe, NewIngredient, NewRecipe, NewStep, SubmitOutcome};
pub use suggest::{suggest_recipe, RecipeSuggestion};

use log::{debug, warn};
use source::create_source;
use std::sync::Arc;
use std::time::Duration;

const USER_AGENT: &str = concat!("recetario/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client settings for backends and providers
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to a default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// Everything the application needs, wired from one configuration.
///
/// Recipe reads go through the enrichment pipeline; favorites and pantry
/// share one local store.
pub struct Recetario {
    pipeline: RecipePipeline,
    favorites: FavoriteSet,
    pantry: Pantry,
    suggester: Option<Arc<dyn LlmProvider>>,
    searches: RequestGeneration,
}

impl Recetario {
    /// Build the configured source, store and default provider. The provider
    /// is shared by enrichment and pantry suggestions; if it cannot be
    /// created both are disabled and browsing still works.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let source = create_source(config)?;
        let persistence = Arc::new(Persistence::new(Arc::new(FileStore::new(
            config.storage.path.clone(),
        ))));
        let timeout = Duration::from_secs(config.timeout);

        let provider: Option<Arc<dyn LlmProvider>> =
            match ProviderFactory::get_default_provider(&config.ai, timeout) {
                Ok(provider) => Some(Arc::from(provider)),
                Err(e) => {
                    warn!("Enrichment and pantry suggestions disabled: {}", e);
                    None
                }
            };

        let pipeline = match &provider {
            Some(provider) => RecipePipeline::new(source, provider.clone()),
            None => RecipePipeline::without_enrichment(source),
        };
        Ok(Self::new(pipeline, persistence, provider))
    }

    pub fn new(
        pipeline: RecipePipeline,
        persistence: Arc<Persistence>,
        suggester: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Recetario {
            pipeline,
            favorites: FavoriteSet::new(persistence.clone()),
            pantry: Pantry::new(persistence),
            suggester,
            searches: RequestGeneration::new(),
        }
    }

    pub fn pipeline(&self) -> &RecipePipeline {
        &self.pipeline
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn pantry(&self) -> &Pantry {
        &self.pantry
    }

    pub async fn list_recipes(&self, filter: &RecipeFilter) -> Vec<RecipeRecord> {
        self.pipeline.get_enriched_list(filter).await
    }

    /// Like [`Recetario::list_recipes`], but `None` when a later call
    /// started before this one settled, as when a search box is retyped
    pub async fn search_recipes(&self, filter: &RecipeFilter) -> Option<Vec<RecipeRecord>> {
        let ticket = self.searches.begin();
        let records = self.pipeline.get_enriched_list(filter).await;
        if self.searches.is_current(ticket) {
            Some(records)
        } else {
            debug!("Dropping results for superseded search {:?}", filter);
            None
        }
    }

    pub async fn recipe(&self, id: &RecipeId) -> Option<RecipeRecord> {
        self.pipeline.get_enriched_one(id).await
    }

    /// Favorite recipes, enriched, in the order they were added
    pub async fn favorite_recipes(&self) -> Vec<RecipeRecord> {
        self.pipeline.get_enriched_many(&self.favorites.ids()).await
    }

    pub async fn options(&self, kind: &str, subkind: Option<&str>) -> Vec<ConfEntry> {
        self.pipeline.source().list_options(kind, subkind).await
    }

    /// Suggest a recipe from the current pantry contents
    pub async fn suggest(&self, instructions: Option<&str>) -> RecipeSuggestion {
        match &self.suggester {
            Some(provider) => {
                suggest_recipe(
                    provider.as_ref(),
                    &self.pantry.ingredient_summary(),
                    instructions,
                )
                .await
            }
            None => RecipeSuggestion::placeholder(),
        }
    }

    pub async fn submit(&self, recipe: &NewRecipe) -> Result<SubmitOutcome> {
        submit_recipe(self.pipeline.source().inner(), recipe).await
    }
}
