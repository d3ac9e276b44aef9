use crate::model::RecipeRecord;
use serde::Serialize;

/// Prompt asking for per-recipe nutrition, difficulty and time estimates.
///
/// Loaded from `enrichment_prompt.txt` at compile time. Contains a
/// `{{RECIPES}}` placeholder replaced by [`build_enrichment_prompt`].
pub const ENRICHMENT_PROMPT: &str = include_str!("enrichment_prompt.txt");

/// Prompt asking for a whole recipe built from pantry ingredients.
///
/// Contains `{{INGREDIENTS}}` and `{{INSTRUCTIONS}}` placeholders replaced by
/// [`build_pantry_prompt`].
pub const PANTRY_PROMPT: &str = include_str!("pantry_prompt.txt");

#[derive(Serialize)]
struct PromptRecipe<'a> {
    id: &'a str,
    name: &'a str,
    ingredients: Vec<String>,
    steps: Vec<&'a str>,
}

impl<'a> From<&'a RecipeRecord> for PromptRecipe<'a> {
    fn from(record: &'a RecipeRecord) -> Self {
        PromptRecipe {
            id: record.id.as_str(),
            name: &record.name,
            ingredients: record
                .ingredients
                .iter()
                .map(|i| {
                    [i.quantity.as_str(), i.unit.as_str(), i.name.as_str()]
                        .iter()
                        .filter(|part| !part.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect(),
            steps: record.steps.iter().map(|s| s.description.as_str()).collect(),
        }
    }
}

/// Embed the ids, ingredients and steps of `records` into the enrichment prompt
pub fn build_enrichment_prompt(records: &[RecipeRecord]) -> String {
    let recipes: Vec<PromptRecipe> = records.iter().map(PromptRecipe::from).collect();
    // Serializing borrowed strings and vectors of strings cannot fail
    let embedded = serde_json::to_string(&recipes).unwrap_or_else(|_| "[]".to_string());
    ENRICHMENT_PROMPT.replace("{{RECIPES}}", &embedded)
}

/// Fill the pantry prompt with the ingredient summary and optional instructions
pub fn build_pantry_prompt(ingredients: &str, instructions: Option<&str>) -> String {
    let instructions = instructions
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or("Ninguna especificada");
    PANTRY_PROMPT
        .replace("{{INGREDIENTS}}", ingredients)
        .replace("{{INSTRUCTIONS}}", instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Ingredient, Step};

    #[test]
    fn test_prompts_are_embedded() {
        assert!(ENRICHMENT_PROMPT.contains("{{RECIPES}}"));
        assert!(ENRICHMENT_PROMPT.contains("prepTime"));
        assert!(PANTRY_PROMPT.contains("{{INGREDIENTS}}"));
        assert!(PANTRY_PROMPT.contains("isFavourite"));
    }

    #[test]
    fn test_enrichment_prompt_embeds_ids_and_ingredients() {
        let mut record = RecipeRecord::new("52772", "Teriyaki Chicken Casserole");
        record.ingredients.push(Ingredient {
            name: "soy sauce".to_string(),
            quantity: "3/4".to_string(),
            unit: "cup".to_string(),
        });
        record.steps.push(Step {
            order: 1,
            title: None,
            description: "Preheat oven to 350.".to_string(),
        });

        let prompt = build_enrichment_prompt(&[record, RecipeRecord::new(7i64, "Locro")]);
        assert!(!prompt.contains("{{RECIPES}}"));
        assert!(prompt.contains(r#""id":"52772""#));
        assert!(prompt.contains(r#""id":"7""#));
        assert!(prompt.contains("3/4 cup soy sauce"));
        assert!(prompt.contains("Preheat oven to 350."));
    }

    #[test]
    fn test_pantry_prompt_defaults_instructions() {
        let prompt = build_pantry_prompt("2 huevos, 1 cebolla", Some("  "));
        assert!(prompt.contains("2 huevos, 1 cebolla"));
        assert!(prompt.contains("Ninguna especificada"));

        let prompt = build_pantry_prompt("arroz", Some("sin horno"));
        assert!(prompt.contains("sin horno"));
    }
}
