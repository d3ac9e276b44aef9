//! Turning free-text model output into enrichment fields on recipe records.
//!
//! The model is asked for a bare JSON array but routinely wraps it in code
//! fences or answers with prose. Nothing here fails: text that cannot be
//! understood leaves the records as they were.

use crate::model::{scalar_to_string, EnrichmentFields, RecipeId, RecipeRecord};
use log::{debug, error, info};
use serde_json::Value;

const FENCE_TOKEN: &[u8] = b"json";

const ID_KEYS: &[&str] = &["id", "idMeal", "id_receta"];
const CALORIES_KEYS: &[&str] = &["calories", "calorias"];
const PROTEINS_KEYS: &[&str] = &["proteins", "proteinas"];
const DIFFICULTY_KEYS: &[&str] = &["difficulty", "dificulty", "dificultad"];
const PREP_TIME_KEYS: &[&str] = &["prepTime", "time", "tiempo"];

/// One parsed entry of the model's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentEntry {
    pub id: Option<RecipeId>,
    pub fields: EnrichmentFields,
}

/// Remove code-fence artifacts: every backtick and every `json` token,
/// case-insensitively.
///
/// Removal repeats until nothing changes, so `sanitize(sanitize(x)) == sanitize(x)`
/// even for text like "jsjsonon".
pub fn sanitize(raw: &str) -> String {
    let mut current = raw.trim().to_string();
    loop {
        let next = strip_fence_token(&current.replace('`', ""));
        let next = next.trim().to_string();
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_fence_token(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut start = 0;
    let mut i = 0;
    while i + FENCE_TOKEN.len() <= bytes.len() {
        if bytes[i..i + FENCE_TOKEN.len()].eq_ignore_ascii_case(FENCE_TOKEN) {
            out.push_str(&text[start..i]);
            i += FENCE_TOKEN.len();
            start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&text[start..]);
    out
}

/// Parse model output into entries. Unparseable or non-array output yields
/// no entries and is logged along with the offending text.
pub fn parse_enrichment(raw: &str) -> Vec<EnrichmentEntry> {
    let sanitized = sanitize(raw);
    if sanitized.is_empty() {
        debug!("Empty enrichment response");
        return Vec::new();
    }

    let parsed: Value = match serde_json::from_str(&sanitized) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to parse enrichment response: {}", e);
            error!("Sanitized response that caused the error: {}", sanitized);
            return Vec::new();
        }
    };

    let Value::Array(items) = parsed else {
        error!("Enrichment response is not a list: {}", parsed);
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let entry = project_entry(item);
            if entry.is_none() {
                debug!("Skipping enrichment entry that is not an object: {}", item);
            }
            entry
        })
        .collect()
}

/// Keep only the known fields of one entry, discarding everything else
fn project_entry(item: &Value) -> Option<EnrichmentEntry> {
    if !item.is_object() {
        return None;
    }

    let id = ID_KEYS
        .iter()
        .find_map(|key| item.get(*key).and_then(RecipeId::from_value));

    Some(EnrichmentEntry {
        id,
        fields: EnrichmentFields {
            calories: first_scalar(item, CALORIES_KEYS),
            proteins: first_scalar(item, PROTEINS_KEYS),
            difficulty: first_scalar(item, DIFFICULTY_KEYS),
            prep_time: first_scalar(item, PREP_TIME_KEYS),
        },
    })
}

fn first_scalar(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| item.get(*key).and_then(scalar_to_string))
}

/// Merge parsed entries onto `records` by id, keeping order and length.
///
/// The first entry with a matching id wins. Records without a match keep
/// their fields untouched.
pub fn merge(entries: &[EnrichmentEntry], mut records: Vec<RecipeRecord>) -> Vec<RecipeRecord> {
    for record in records.iter_mut() {
        match entries
            .iter()
            .find(|entry| entry.id.as_ref() == Some(&record.id))
        {
            Some(entry) => record.apply_enrichment(&entry.fields),
            None => info!("No enrichment found for recipe with id {}", record.id),
        }
    }
    records
}

/// Sanitize, parse and merge model output onto `records`. Never fails.
pub fn reconcile(raw: &str, records: Vec<RecipeRecord>) -> Vec<RecipeRecord> {
    let entries = parse_enrichment(raw);
    if entries.is_empty() {
        return records;
    }
    merge(&entries, records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[&str]) -> Vec<RecipeRecord> {
        ids.iter()
            .map(|id| RecipeRecord::new(*id, format!("Recipe {}", id)))
            .collect()
    }

    #[test]
    fn test_sanitize_strips_fences() {
        assert_eq!(sanitize("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(sanitize("```JSON [] ```"), "[]");
        assert_eq!(sanitize("`{}`"), "{}");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for raw in [
            "```json\n[{\"id\":\"1\"}]\n```",
            "jsjsonon",
            "JsOn`json`",
            "  plain text  ",
            "",
        ] {
            let once = sanitize(raw);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", raw);
        }
        assert_eq!(sanitize("jsjsonon"), "");
    }

    #[test]
    fn test_parse_accepts_legacy_field_names() {
        let entries = parse_enrichment(
            r#"[{"idMeal": 52772, "calories": 450, "proteins": "30g", "dificulty": "Media", "time": "30 min", "extra": true}]"#,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, Some(RecipeId::new("52772")));
        assert_eq!(entries[0].fields.calories.as_deref(), Some("450"));
        assert_eq!(entries[0].fields.difficulty.as_deref(), Some("Media"));
        assert_eq!(entries[0].fields.prep_time.as_deref(), Some("30 min"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_enrichment(r#"{"id": "1", "calories": "100 kcal"}"#).is_empty());
        assert!(parse_enrichment("Lo siento, no puedo ayudar con eso.").is_empty());
        assert!(parse_enrichment("").is_empty());
    }

    #[test]
    fn test_parse_skips_non_object_items() {
        let entries = parse_enrichment(r#"[1, "two", null, {"id": "3"}]"#);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, Some(RecipeId::new("3")));
        assert_eq!(entries[0].fields, EnrichmentFields::default());
    }

    #[test]
    fn test_first_match_wins() {
        let raw = r#"[{"id": "1", "calories": "100 kcal"}, {"id": "1", "calories": "999 kcal"}]"#;
        let merged = reconcile(raw, records(&["1"]));
        assert_eq!(merged[0].calories.as_deref(), Some("100 kcal"));
    }

    #[test]
    fn test_duplicate_input_ids_matched_independently() {
        let raw = r#"[{"id": "5", "proteins": "20g"}]"#;
        let merged = reconcile(raw, records(&["5", "6", "5"]));
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].proteins.as_deref(), Some("20g"));
        assert!(merged[1].proteins.is_none());
        assert_eq!(merged[2].proteins.as_deref(), Some("20g"));
    }

    #[test]
    fn test_numeric_and_string_ids_match() {
        let raw = r#"[{"id": 7, "calories": "380 kcal"}]"#;
        let merged = reconcile(raw, records(&["7"]));
        assert_eq!(merged[0].calories.as_deref(), Some("380 kcal"));
    }

    #[test]
    fn test_integral_float_ids_match() {
        let raw = r#"[{"id": 52772.0, "calories": "450 kcal"}]"#;
        let merged = reconcile(raw, records(&["52772"]));
        assert_eq!(merged[0].calories.as_deref(), Some("450 kcal"));
    }

    #[test]
    fn test_null_fields_do_not_overwrite() {
        let mut input = records(&["1"]);
        input[0].difficulty = Some("Fácil".to_string());

        let merged = reconcile(
            r#"[{"id": "1", "difficulty": null, "calories": "  "}]"#,
            input.clone(),
        );
        assert_eq!(merged, input);
    }
}
