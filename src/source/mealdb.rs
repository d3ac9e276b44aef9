use super::{to_steps, RecipeSource};
use crate::config::SourceConfig;
use crate::error::{RecetarioError, Result};
use crate::http_client;
use crate::model::{scalar_to_string, ConfEntry, Ingredient, RecipeFilter, RecipeId, RecipeRecord};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// The REST API numbers ingredient slots 1 through 20
const INGREDIENT_SLOTS: usize = 20;

const NO_PARAMS: &[(&str, &str)] = &[];
const AREA_LIST: &[(&str, &str)] = &[("a", "list")];

/// Public REST recipe API answering `{"meals": [...]}`
pub struct MealDbSource {
    client: Client,
    base_url: String,
    area: String,
}

impl MealDbSource {
    pub fn new(config: &SourceConfig, timeout: Duration) -> Self {
        MealDbSource {
            client: http_client(timeout),
            base_url: config.mealdb_url.trim_end_matches('/').to_string(),
            area: config.area.clone(),
        }
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, area: String) -> Self {
        MealDbSource {
            client: Client::new(),
            base_url,
            area,
        }
    }

    async fn get_json(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, endpoint))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecetarioError::UnexpectedResponse(format!(
                "{} answered {}: {}",
                endpoint, status, body
            )));
        }

        let body: Value = response.json().await?;
        debug!("{} response: {:?}", endpoint, body);
        Ok(body)
    }

    /// The `meals` array of a response; `null` means no matches
    async fn get_meals(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Vec<Value>> {
        let body = self.get_json(endpoint, params).await?;
        match body.get("meals") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(meals)) => Ok(meals.clone()),
            Some(other) => Err(RecetarioError::UnexpectedResponse(format!(
                "'meals' is not a list: {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl RecipeSource for MealDbSource {
    fn backend_name(&self) -> &str {
        "mealdb"
    }

    async fn fetch_many(&self, filter: &RecipeFilter) -> Result<Vec<RecipeRecord>> {
        // The API filters on one criterion per request; the rest is applied locally
        let (endpoint, params, implied_category, implied_region) = if let Some(text) = filter.text()
        {
            ("search.php", vec![("s", text), ("a", self.area.as_str())], None, None)
        } else if let Some(category) = filter.category() {
            ("filter.php", vec![("c", category)], Some(category), None)
        } else if let Some(region) = filter.region() {
            ("filter.php", vec![("a", region)], None, Some(region))
        } else {
            (
                "filter.php",
                vec![("a", self.area.as_str())],
                None,
                Some(self.area.as_str()),
            )
        };

        let meals = self.get_meals(endpoint, &params).await?;

        Ok(meals
            .iter()
            .filter_map(normalize_meal)
            .map(|mut record| {
                if record.category.is_empty() {
                    if let Some(category) = implied_category {
                        record.category = category.to_string();
                    }
                }
                if record.region.is_none() {
                    record.region = implied_region.map(str::to_string);
                }
                record
            })
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<RecipeRecord>> {
        let meals = self.get_meals("lookup.php", &[("i", id.as_str())]).await?;
        Ok(meals.first().and_then(normalize_meal))
    }

    async fn list_options(&self, kind: &str, _subkind: Option<&str>) -> Result<Vec<ConfEntry>> {
        let (endpoint, params, list_key, name_key, id_key) = match kind {
            "categoria" | "category" => (
                "categories.php",
                NO_PARAMS,
                "categories",
                "strCategory",
                Some("idCategory"),
            ),
            "region" | "area" => ("list.php", AREA_LIST, "meals", "strArea", None),
            _ => return Ok(Vec::new()),
        };

        let body = self.get_json(endpoint, params).await?;
        let items = body
            .get(list_key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let visible = scalar_to_string(&item[name_key])?;
                let id = id_key
                    .and_then(|key| scalar_to_string(&item[key]))
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(index as i64 + 1);
                Some(ConfEntry {
                    id,
                    visible,
                    hidden: None,
                    kind: kind.to_string(),
                    subkind: None,
                })
            })
            .collect())
    }
}

/// Map one `meals[]` entry onto the canonical record
pub(crate) fn normalize_meal(meal: &Value) -> Option<RecipeRecord> {
    let id = RecipeId::from_value(&meal["idMeal"])?;
    let mut record = RecipeRecord::new(id, scalar_to_string(&meal["strMeal"]).unwrap_or_default());

    record.category = scalar_to_string(&meal["strCategory"]).unwrap_or_default();
    record.region = scalar_to_string(&meal["strArea"]);
    record.image_url = scalar_to_string(&meal["strMealThumb"]);
    record.video_url = scalar_to_string(&meal["strYoutube"]);

    for slot in 1..=INGREDIENT_SLOTS {
        let Some(name) = scalar_to_string(&meal[format!("strIngredient{}", slot)]) else {
            continue;
        };
        let measure = scalar_to_string(&meal[format!("strMeasure{}", slot)]).unwrap_or_default();
        let (quantity, unit) = split_measure(&measure);
        record.ingredients.push(Ingredient {
            name,
            quantity,
            unit,
        });
    }

    if let Some(instructions) = scalar_to_string(&meal["strInstructions"]) {
        record.steps = to_steps(&instructions);
    }

    Some(record)
}

/// Split a free-text measure like "1 1/2 cups" or "200g" into quantity and unit
pub(crate) fn split_measure(measure: &str) -> (String, String) {
    let measure = measure.trim();
    let mut quantity = Vec::new();
    let mut rest = measure;

    for token in measure.split_whitespace() {
        if !token.chars().all(is_quantity_char) {
            break;
        }
        quantity.push(token);
        rest = rest.trim_start()[token.len()..].trim_start();
    }

    if quantity.is_empty() {
        // "200g": quantity glued to its unit
        let split = measure
            .char_indices()
            .find(|(_, c)| !is_quantity_char(*c))
            .map(|(i, _)| i)
            .unwrap_or(measure.len());
        if split > 0 {
            return (
                measure[..split].to_string(),
                measure[split..].trim().to_string(),
            );
        }
        return (String::new(), measure.to_string());
    }

    (quantity.join(" "), rest.to_string())
}

fn is_quantity_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '/' | '.' | ',' | '½' | '¼' | '¾' | '⅓' | '⅔' | '⅛')
}
