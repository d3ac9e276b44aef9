use recetario::{reconcile, sanitize, RecipeRecord};

fn record(id: &str) -> RecipeRecord {
    RecipeRecord::new(id, format!("Recipe {}", id))
}

#[test]
fn test_fenced_answer_is_merged() {
    let raw = "```json\n[{\"id\":\"52772\",\"calories\":\"450 kcal\",\"proteins\":\"30g\",\"difficulty\":\"Media\",\"prepTime\":\"30 min\"}]\n```";
    let merged = reconcile(raw, vec![record("52772")]);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].calories.as_deref(), Some("450 kcal"));
    assert_eq!(merged[0].proteins.as_deref(), Some("30g"));
    assert_eq!(merged[0].difficulty.as_deref(), Some("Media"));
    assert_eq!(merged[0].prep_time.as_deref(), Some("30 min"));
}

#[test]
fn test_prose_answer_leaves_records_untouched() {
    let input = vec![record("1"), record("2")];
    let merged = reconcile("Lo siento, no puedo ayudar con eso.", input.clone());
    assert_eq!(merged, input);
}

#[test]
fn test_only_matched_records_change() {
    let mut second = record("2");
    second.difficulty = Some("Difícil".to_string());
    let input = vec![record("1"), second.clone()];

    let merged = reconcile(
        r#"[{"id": "1", "calories": "200 kcal", "proteins": "8g"}]"#,
        input,
    );

    assert_eq!(merged[0].calories.as_deref(), Some("200 kcal"));
    assert_eq!(merged[1], second);
}

#[test]
fn test_order_and_count_are_preserved() {
    let input: Vec<RecipeRecord> = ["3", "1", "2"].iter().map(|id| record(id)).collect();
    let merged = reconcile(
        r#"[{"id": "2", "calories": "1"}, {"id": "3", "calories": "3"}, {"id": "99", "calories": "9"}]"#,
        input,
    );

    let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "1", "2"]);
    assert_eq!(merged[0].calories.as_deref(), Some("3"));
    assert!(merged[1].calories.is_none());
    assert_eq!(merged[2].calories.as_deref(), Some("1"));
}

#[test]
fn test_unexpected_fields_are_discarded() {
    let merged = reconcile(
        r#"[{"id": "1", "name": "Overwritten?", "calories": {"value": 300}, "proteins": "9g"}]"#,
        vec![record("1")],
    );
    assert_eq!(merged[0].name, "Recipe 1");
    assert!(merged[0].calories.is_none());
    assert_eq!(merged[0].proteins.as_deref(), Some("9g"));
}

#[test]
fn test_sanitize_twice_equals_once() {
    for raw in ["```json\n[]\n```", "``JSON``{}", "jsJSONon [1]", "no fences"] {
        assert_eq!(sanitize(&sanitize(raw)), sanitize(raw));
    }
}
