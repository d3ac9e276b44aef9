use super::{to_steps, RecipeSource};
use crate::config::SourceConfig;
use crate::error::{RecetarioError, Result};
use crate::http_client;
use crate::model::{
    non_blank, scalar_to_string, ConfEntry, Ingredient, RecipeFilter, RecipeId, RecipeRecord, Step,
};
use crate::submission::{NewRecipe, SubmitOutcome};
use async_trait::async_trait;
use config::ConfigError;
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

const LIST_RECIPES: &str = "sp_listar_receta";
const RECIPE_DETAIL: &str = "obtener_receta_detallada";
const LIST_OPTIONS: &str = "sp_listar_confdatos";
const INSERT_RECIPE: &str = "sp_insertar_receta";

/// Relational backend exposing named remote procedures over HTTP
pub struct RpcSource {
    client: Client,
    rpc_url: String,
    api_key: Option<String>,
}

impl RpcSource {
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self> {
        let base_url = config
            .rpc_url
            .as_deref()
            .and_then(|url| non_blank(Some(url)))
            .ok_or_else(|| ConfigError::NotFound("source.rpc_url".to_string()))?;

        Ok(RpcSource {
            client: http_client(timeout),
            rpc_url: format!("{}/rest/v1/rpc", base_url.trim_end_matches('/')),
            api_key: config.rpc_api_key.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, api_key: Option<String>) -> Self {
        RpcSource {
            client: Client::new(),
            rpc_url: format!("{}/rest/v1/rpc", base_url),
            api_key,
        }
    }

    async fn call(&self, procedure: &str, params: Value) -> Result<Value> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.rpc_url, procedure))
            .json(&params);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("{} answered {}: {}", procedure, status, body);

        if !status.is_success() {
            return Err(RecetarioError::Rpc {
                procedure: procedure.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl RecipeSource for RpcSource {
    fn backend_name(&self) -> &str {
        "rpc"
    }

    async fn fetch_many(&self, filter: &RecipeFilter) -> Result<Vec<RecipeRecord>> {
        let rows = self
            .call(
                LIST_RECIPES,
                json!({
                    "p_dificultad": filter.difficulty(),
                    "p_categoria": filter.category(),
                    "p_region": filter.region(),
                    "p_cant_porcion": filter.portions(),
                }),
            )
            .await?;

        let rows = match rows {
            Value::Array(rows) => rows,
            other => {
                warn!("{} did not return a list: {}", LIST_RECIPES, other);
                return Ok(Vec::new());
            }
        };

        // Text search is not a procedure parameter, so it is applied here
        Ok(rows
            .iter()
            .filter_map(normalize_row)
            .filter(|record| filter.matches(record))
            .collect())
    }

    async fn fetch_one(&self, id: &RecipeId) -> Result<Option<RecipeRecord>> {
        let Some(numeric_id) = id.as_number() else {
            debug!("{} is not a numeric recipe id", id);
            return Ok(None);
        };

        let data = self
            .call(RECIPE_DETAIL, json!({ "p_id_receta": numeric_id }))
            .await?;

        let row = match &data {
            Value::Array(rows) => rows.first(),
            Value::Object(_) => Some(&data),
            _ => None,
        };
        Ok(row.and_then(normalize_row))
    }

    async fn list_options(&self, kind: &str, subkind: Option<&str>) -> Result<Vec<ConfEntry>> {
        let data = self
            .call(
                LIST_OPTIONS,
                json!({ "p_tipo": kind, "p_subtipo": subkind }),
            )
            .await?;

        match data {
            Value::Null => Ok(Vec::new()),
            other => Ok(serde_json::from_value(other)?),
        }
    }

    async fn insert_recipe(&self, recipe: &NewRecipe) -> Result<SubmitOutcome> {
        let data = self.call(INSERT_RECIPE, recipe.to_rpc_params()).await?;

        let outcome = match data {
            Value::Array(rows) => rows.into_iter().next(),
            Value::Object(map) => Some(Value::Object(map)),
            _ => None,
        }
        .ok_or_else(|| RecetarioError::Submission("empty response from backend".to_string()))?;
        Ok(serde_json::from_value(outcome)?)
    }
}

/// Map one procedure row onto the canonical record
pub(crate) fn normalize_row(row: &Value) -> Option<RecipeRecord> {
    let id = RecipeId::from_value(&row["id_receta"]).or_else(|| RecipeId::from_value(&row["id"]))?;
    let mut record = RecipeRecord::new(id, scalar_to_string(&row["nombre"]).unwrap_or_default());

    record.description = scalar_to_string(&row["descripcion"]);
    record.category = scalar_to_string(&row["categoria"]).unwrap_or_default();
    record.region = scalar_to_string(&row["region"]);
    record.difficulty = scalar_to_string(&row["dificultad"]);
    record.image_url =
        scalar_to_string(&row["url_imagen"]).or_else(|| scalar_to_string(&row["imagen"]));
    record.video_url =
        scalar_to_string(&row["url_video"]).or_else(|| scalar_to_string(&row["video"]));
    record.portions = scalar_to_string(&row["cant_porcion"]).and_then(|p| p.parse().ok());
    record.notes = scalar_to_string(&row["notas"]);
    record.prep_time = scalar_to_string(&row["tiempo"]);
    record.ingredients = list_field(&row["ingredientes"])
        .iter()
        .filter_map(normalize_ingredient)
        .collect();
    record.steps = normalize_steps(&list_field(&row["pasos"]));

    Some(record)
}

// Lists may arrive as arrays or as JSON text holding an array
fn list_field(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(text) => match serde_json::from_str(text) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn normalize_ingredient(value: &Value) -> Option<Ingredient> {
    match value {
        Value::Object(_) => Some(Ingredient {
            name: scalar_to_string(&value["nombre"])?,
            quantity: scalar_to_string(&value["cantidad"]).unwrap_or_default(),
            unit: scalar_to_string(&value["unidad"]).unwrap_or_default(),
        }),
        other => scalar_to_string(other).map(|name| Ingredient {
            name,
            ..Default::default()
        }),
    }
}

fn normalize_steps(values: &[Value]) -> Vec<Step> {
    // A single free-text entry is split into sentences like REST instructions
    if let [Value::String(text)] = values {
        return to_steps(text);
    }

    let mut steps: Vec<Step> = values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let fallback_order = index as u32 + 1;
            match value {
                Value::Object(_) => Some(Step {
                    order: value["numero"]
                        .as_u64()
                        .map(|n| n as u32)
                        .unwrap_or(fallback_order),
                    title: scalar_to_string(&value["nombre"]),
                    description: scalar_to_string(&value["descripcion"])?,
                }),
                other => scalar_to_string(other).map(|description| Step {
                    order: fallback_order,
                    title: None,
                    description,
                }),
            }
        })
        .collect();
    steps.sort_by_key(|step| step.order);
    steps
}
