use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Recipe identifier in its canonical string form.
///
/// Backends disagree on the id type (the REST API uses strings, the RPC
/// backend integers), so both are accepted on input and rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        RecipeId(id.into().trim().to_string())
    }

    /// Normalize an arbitrary JSON value into an id, if it looks like one
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(RecipeId::new(s.as_str())),
            Value::Number(n) => Some(RecipeId(integral_text(n))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric form, for backends keyed by integers
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

// 52772.0 and 52772 name the same recipe
fn integral_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                return (f as i64).to_string();
            }
        }
    }
    n.to_string()
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecipeId {
    fn from(id: &str) -> Self {
        RecipeId::new(id)
    }
}

impl From<String> for RecipeId {
    fn from(id: String) -> Self {
        RecipeId::new(id)
    }
}

impl From<i64> for RecipeId {
    fn from(id: i64) -> Self {
        RecipeId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecipeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        RecipeId::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid recipe id: {}", value)))
    }
}

/// One line of a recipe's ingredient list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ingredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
}

/// One preparation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
}

/// Canonical recipe shape shared by every backend.
///
/// `calories`, `proteins` and `prep_time` are only filled by enrichment;
/// consumers must treat them as unknown while absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub id: RecipeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proteins: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
}

impl RecipeRecord {
    /// Bare record with only identity and name set
    pub fn new(id: impl Into<RecipeId>, name: impl Into<String>) -> Self {
        RecipeRecord {
            id: id.into(),
            name: name.into(),
            description: None,
            category: String::new(),
            region: None,
            difficulty: None,
            image_url: None,
            video_url: None,
            portions: None,
            notes: None,
            ingredients: Vec::new(),
            steps: Vec::new(),
            calories: None,
            proteins: None,
            prep_time: None,
        }
    }

    /// Copy every enrichment field that is present, keeping the rest
    pub fn apply_enrichment(&mut self, fields: &EnrichmentFields) {
        if let Some(calories) = &fields.calories {
            self.calories = Some(calories.clone());
        }
        if let Some(proteins) = &fields.proteins {
            self.proteins = Some(proteins.clone());
        }
        if let Some(difficulty) = &fields.difficulty {
            self.difficulty = Some(difficulty.clone());
        }
        if let Some(prep_time) = &fields.prep_time {
            self.prep_time = Some(prep_time.clone());
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.calories.is_some() || self.proteins.is_some() || self.prep_time.is_some()
    }
}

/// The known fields of one enrichment entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentFields {
    pub calories: Option<String>,
    pub proteins: Option<String>,
    pub difficulty: Option<String>,
    pub prep_time: Option<String>,
}

/// Criteria for a recipe listing. Empty strings count as "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub text: Option<String>,
    pub category: Option<String>,
    pub region: Option<String>,
    pub difficulty: Option<String>,
    pub portions: Option<u32>,
}

impl RecipeFilter {
    pub fn text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    pub fn region(&self) -> Option<&str> {
        non_blank(self.region.as_deref())
    }

    pub fn difficulty(&self) -> Option<&str> {
        non_blank(self.difficulty.as_deref())
    }

    pub fn portions(&self) -> Option<u32> {
        self.portions.filter(|p| *p > 0)
    }

    /// Whether `record` satisfies every criterion the record can be judged on.
    /// Criteria whose field is missing on the record do not exclude it.
    pub fn matches(&self, record: &RecipeRecord) -> bool {
        if let Some(text) = self.text() {
            if !record.name.to_lowercase().contains(&text.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category() {
            if !record.category.is_empty() && !record.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(region) = self.region() {
            if let Some(record_region) = &record.region {
                if !record_region.eq_ignore_ascii_case(region) {
                    return false;
                }
            }
        }
        if let Some(difficulty) = self.difficulty() {
            if let Some(record_difficulty) = &record.difficulty {
                if !record_difficulty.eq_ignore_ascii_case(difficulty) {
                    return false;
                }
            }
        }
        if let (Some(portions), Some(record_portions)) = (self.portions(), record.portions) {
            if portions != record_portions {
                return false;
            }
        }
        true
    }
}

/// An entry of the user's pantry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: String,
    pub name: String,
    pub quantity: String,
    #[serde(default, alias = "unity")]
    pub unit: String,
}

/// Configuration datum (category, difficulty, unit or region choice)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfEntry {
    #[serde(rename = "idConfDato", default)]
    pub id: i64,
    #[serde(rename = "datovisible")]
    pub visible: String,
    #[serde(rename = "datonovisible", default)]
    pub hidden: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "subtipo", default)]
    pub subkind: Option<String>,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Render a scalar JSON value as text. Null, blank strings and
/// non-scalars yield `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
