use crate::model::{scalar_to_string, Step};
use crate::providers::{build_pantry_prompt, LlmProvider};
use crate::reconcile::sanitize;
use crate::source::to_steps;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NOT_AVAILABLE: &str = "N/A";

/// A recipe proposed by the model from the pantry contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestion {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub video: Option<String>,
    /// Numbered steps in a single string, e.g. "0. Pica la cebolla. 1. ..."
    pub instructions: String,
    pub time: String,
    pub difficulty: String,
    pub calories: String,
    pub proteins: String,
    pub is_favourite: bool,
    pub area: String,
}

impl RecipeSuggestion {
    /// Shown when the model could not produce a usable suggestion
    pub fn placeholder() -> Self {
        RecipeSuggestion {
            title: "Receta con tus ingredientes".to_string(),
            description: "No pudimos generar una receta en este momento. Probá de nuevo en unos minutos o cambiá los ingredientes.".to_string(),
            image: None,
            video: None,
            instructions: String::new(),
            time: NOT_AVAILABLE.to_string(),
            difficulty: NOT_AVAILABLE.to_string(),
            calories: NOT_AVAILABLE.to_string(),
            proteins: NOT_AVAILABLE.to_string(),
            is_favourite: false,
            area: NOT_AVAILABLE.to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }

    pub fn steps(&self) -> Vec<Step> {
        to_steps(&self.instructions)
    }

    /// Project the known fields of a model answer. Anything but a JSON
    /// object with a title is rejected.
    pub fn from_model_output(raw: &str) -> Option<Self> {
        let sanitized = sanitize(raw);
        let value: Value = match serde_json::from_str(&sanitized) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to parse suggestion response: {}", e);
                error!("Sanitized response that caused the error: {}", sanitized);
                return None;
            }
        };
        if !value.is_object() {
            error!("Suggestion response is not an object: {}", value);
            return None;
        }

        let text = |key: &str| scalar_to_string(&value[key]);
        let estimate = |key: &str| text(key).unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Some(RecipeSuggestion {
            title: text("title")?,
            description: text("description").unwrap_or_default(),
            image: text("image"),
            video: text("video"),
            instructions: text("instructions").unwrap_or_default(),
            time: estimate("time"),
            difficulty: estimate("difficulty"),
            calories: estimate("calories"),
            proteins: estimate("proteins"),
            is_favourite: false,
            area: text("area").unwrap_or_else(|| "Variada".to_string()),
        })
    }
}

/// Ask the model for a recipe using `ingredients` (a pantry summary).
///
/// Never fails: provider and parse errors yield the placeholder.
pub async fn suggest_recipe(
    provider: &dyn LlmProvider,
    ingredients: &str,
    instructions: Option<&str>,
) -> RecipeSuggestion {
    let prompt = build_pantry_prompt(ingredients, instructions);
    debug!(
        "Requesting pantry suggestion from {} for: {}",
        provider.provider_name(),
        ingredients
    );

    match provider.complete(&prompt).await {
        Ok(raw) => RecipeSuggestion::from_model_output(&raw).unwrap_or_else(RecipeSuggestion::placeholder),
        Err(e) => {
            error!("Error generating pantry suggestion: {}", e);
            RecipeSuggestion::placeholder()
        }
    }
}
