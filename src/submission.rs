use crate::error::{RecetarioError, Result};
use crate::source::RecipeSource;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use url::Url;
use validator::{Validate, ValidationError};

const SUCCESS_CODE: &str = "00";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewIngredient {
    #[validate(custom = "not_blank")]
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewStep {
    pub number: u32,
    #[serde(default)]
    pub title: String,
    #[validate(custom = "not_blank")]
    pub description: String,
}

/// A recipe entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewRecipe {
    #[validate(
        custom = "not_blank",
        length(max = 100, message = "Recipe name cannot exceed 100 characters")
    )]
    pub name: String,
    #[validate(custom = "not_blank")]
    pub description: String,
    #[validate(range(min = 1, message = "Portions must be greater than 0"))]
    pub portions: i32,
    /// Preparation time as entered, e.g. "01:00"
    #[validate(custom = "not_blank")]
    pub time: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(custom = "web_url")]
    pub video_url: Option<String>,
    #[serde(default)]
    #[validate(custom = "web_url")]
    pub image_url: Option<String>,
    pub difficulty: String,
    pub region: String,
    pub category: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one ingredient is required"))]
    #[validate]
    pub ingredients: Vec<NewIngredient>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one step is required"))]
    #[validate]
    pub steps: Vec<NewStep>,
}

/// Backend verdict on a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    #[serde(rename = "codResult")]
    pub code: String,
    #[serde(rename = "mjeResult", default)]
    pub message: String,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

impl NewRecipe {
    /// Named parameters of the insert procedure
    pub(crate) fn to_rpc_params(&self) -> Value {
        json!({
            "nombre": self.name,
            "descripcion": self.description,
            "cant_porcion": self.portions,
            "tiempo": self.time,
            "notas": self.notes,
            "url_video": self.video_url,
            "url_imagen": self.image_url,
            "dificultad": self.difficulty,
            "region": self.region,
            "categoria": self.category,
            "ingredientes": self
                .ingredients
                .iter()
                .map(|i| json!({"nombre": i.name, "cantidad": i.quantity, "unidad": i.unit}))
                .collect::<Vec<_>>(),
            "pasos": self
                .steps
                .iter()
                .map(|s| json!({"nombre": s.title, "numero": s.number, "descripcion": s.description}))
                .collect::<Vec<_>>(),
        })
    }
}

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", "This field is required"));
    }
    Ok(())
}

/// Blank optional URLs count as absent
fn web_url(value: &str) -> std::result::Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || Url::parse(value).is_ok() {
        return Ok(());
    }
    Err(rule("url", "Not a valid URL"))
}

/// Validate and store a new recipe.
///
/// Unlike recipe reads, every failure here is returned to the caller so the
/// form can show it.
pub async fn submit_recipe(source: &dyn RecipeSource, recipe: &NewRecipe) -> Result<SubmitOutcome> {
    recipe.validate()?;

    let outcome = source.insert_recipe(recipe).await.map_err(|e| {
        error!("Error saving recipe '{}': {}", recipe.name, e);
        if matches!(
            e,
            RecetarioError::Submission(_) | RecetarioError::Unsupported(_)
        ) {
            e
        } else {
            RecetarioError::Submission(e.to_string())
        }
    })?;

    if !outcome.is_success() {
        error!(
            "Backend rejected recipe '{}': {} {}",
            recipe.name, outcome.code, outcome.message
        );
        return Err(RecetarioError::Submission(outcome.message));
    }

    info!("Saved recipe '{}'", recipe.name);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationErrorsKind;

    fn valid_recipe() -> NewRecipe {
        NewRecipe {
            name: "Empanadas tucumanas".to_string(),
            description: "Empanadas de carne cortada a cuchillo".to_string(),
            portions: 12,
            time: "01:30".to_string(),
            notes: None,
            video_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
            image_url: None,
            difficulty: "Media".to_string(),
            region: "Tucumán".to_string(),
            category: "Entrada".to_string(),
            ingredients: vec![NewIngredient {
                name: "carne".to_string(),
                quantity: 500.0,
                unit: "g".to_string(),
            }],
            steps: vec![NewStep {
                number: 1,
                title: "Relleno".to_string(),
                description: "Cortar la carne a cuchillo.".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_recipe_passes() {
        assert!(valid_recipe().validate().is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut recipe = valid_recipe();
        recipe.name = "x".repeat(101);
        recipe.description = "  ".to_string();
        recipe.portions = 0;
        recipe.time = String::new();
        recipe.image_url = Some("not a url".to_string());
        recipe.ingredients[0].name = " ".to_string();
        recipe.steps.clear();

        let errors = recipe.validate().unwrap_err();
        assert_eq!(errors.errors().len(), 7);

        let fields = errors.field_errors();
        assert_eq!(fields["name"][0].code, "length");
        assert_eq!(fields["description"][0].code, "required");
        assert_eq!(fields["portions"][0].code, "range");
        assert_eq!(fields["image_url"][0].code, "url");
        assert_eq!(
            fields["steps"][0].message.as_deref(),
            Some("At least one step is required")
        );
        assert!(!fields.contains_key("video_url"));

        // Per-ingredient errors are nested under the list
        match &errors.errors()["ingredients"] {
            ValidationErrorsKind::List(items) => {
                assert!(items[&0].field_errors().contains_key("name"))
            }
            other => panic!("expected nested ingredient errors, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_name_is_required_not_too_long() {
        let mut recipe = valid_recipe();
        recipe.name = "   ".to_string();

        let errors = recipe.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["name"].len(), 1);
        assert_eq!(fields["name"][0].code, "required");
    }

    #[test]
    fn test_blank_step_description() {
        let mut recipe = valid_recipe();
        recipe.steps[0].description = "\t".to_string();
        assert!(recipe.steps[0].validate().is_err());
        assert!(recipe.validate().unwrap_err().errors().contains_key("steps"));
    }

    #[test]
    fn test_blank_optional_urls_are_allowed() {
        let mut recipe = valid_recipe();
        recipe.video_url = Some("   ".to_string());
        recipe.image_url = Some(String::new());
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_rpc_params_use_backend_names() {
        let params = valid_recipe().to_rpc_params();
        assert_eq!(params["nombre"], "Empanadas tucumanas");
        assert_eq!(params["cant_porcion"], 12);
        assert_eq!(params["ingredientes"][0]["unidad"], "g");
        assert_eq!(params["pasos"][0]["numero"], 1);
        assert!(params["notas"].is_null());
    }
}
