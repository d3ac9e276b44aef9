use mockito::{Matcher, Server};
use recetario::source::RpcSource;
use recetario::{
    submit_recipe, NewIngredient, NewRecipe, NewStep, RecetarioError, RecipeFilter, RecipeId,
    RecipeSource, SourceClient,
};
use serde_json::json;

fn source(url: String) -> RpcSource {
    RpcSource::with_base_url(url, Some("anon-key".to_string()))
}

fn new_recipe() -> NewRecipe {
    NewRecipe {
        name: "Locro".to_string(),
        description: "Guiso criollo de maíz y zapallo".to_string(),
        portions: 6,
        time: "03:00".to_string(),
        notes: Some("Ideal para el 25 de mayo".to_string()),
        video_url: None,
        image_url: Some("https://img.example.com/locro.jpg".to_string()),
        difficulty: "Media".to_string(),
        region: "Norte".to_string(),
        category: "Plato principal".to_string(),
        ingredients: vec![NewIngredient {
            name: "maíz blanco".to_string(),
            quantity: 500.0,
            unit: "g".to_string(),
        }],
        steps: vec![NewStep {
            number: 1,
            title: "Remojo".to_string(),
            description: "Remojar el maíz la noche anterior.".to_string(),
        }],
    }
}

#[tokio::test]
async fn test_list_sends_named_parameters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/rpc/sp_listar_receta")
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .match_body(Matcher::Json(json!({
            "p_dificultad": "Media",
            "p_categoria": null,
            "p_region": "Norte",
            "p_cant_porcion": null
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"id_receta": 12, "nombre": "Locro", "dificultad": "Media", "region": "Norte"},
                {"id_receta": 15, "nombre": "Humita en chala", "dificultad": "Media", "region": "Norte"}
            ]"#,
        )
        .create_async()
        .await;

    let filter = RecipeFilter {
        text: Some("humita".to_string()),
        difficulty: Some("Media".to_string()),
        region: Some("Norte".to_string()),
        ..Default::default()
    };
    let records = source(server.url()).fetch_many(&filter).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, RecipeId::new("15"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_detail_accepts_single_object() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/rpc/obtener_receta_detallada")
        .match_body(Matcher::Json(json!({ "p_id_receta": 12 })))
        .with_status(200)
        .with_body(
            json!({
                "id": 12,
                "nombre": "Locro",
                "tiempo": "03:00",
                "ingredientes": [{"nombre": "maíz blanco", "cantidad": 500, "unidad": "g"}],
                "pasos": [{"numero": 1, "nombre": "Remojo", "descripcion": "Remojar el maíz."}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let record = source(server.url())
        .fetch_one(&RecipeId::new("12"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.name, "Locro");
    assert_eq!(record.ingredients[0].unit, "g");
    assert_eq!(record.steps[0].title.as_deref(), Some("Remojo"));
}

#[tokio::test]
async fn test_non_numeric_id_skips_the_call() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let record = source(server.url())
        .fetch_one(&RecipeId::new("52772a"))
        .await
        .unwrap();
    assert!(record.is_none());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rpc_error_degrades_through_client() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/rpc/sp_listar_confdatos")
        .with_status(404)
        .with_body(r#"{"message": "function not found"}"#)
        .create_async()
        .await;

    let direct = source(server.url()).list_options("unidad", None).await;
    assert!(matches!(direct, Err(RecetarioError::Rpc { status: 404, .. })));

    let client = SourceClient::new(Box::new(source(server.url())));
    assert!(client.list_options("unidad", None).await.is_empty());
}

#[tokio::test]
async fn test_list_options() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/rpc/sp_listar_confdatos")
        .match_body(Matcher::Json(json!({ "p_tipo": "unidad", "p_subtipo": null })))
        .with_status(200)
        .with_body(
            r#"[
                {"idConfDato": 1, "datovisible": "gramos", "datonovisible": "g", "tipo": "unidad", "subtipo": null},
                {"idConfDato": 2, "datovisible": "litros", "datonovisible": "l", "tipo": "unidad", "subtipo": null}
            ]"#,
        )
        .create_async()
        .await;

    let options = source(server.url()).list_options("unidad", None).await.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[0].hidden.as_deref(), Some("g"));
}

#[tokio::test]
async fn test_submit_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/rpc/sp_insertar_receta")
        .match_body(Matcher::PartialJson(json!({
            "nombre": "Locro",
            "cant_porcion": 6,
            "ingredientes": [{"nombre": "maíz blanco", "unidad": "g"}]
        })))
        .with_status(200)
        .with_body(r#"[{"codResult": "00", "mjeResult": "Receta insertada"}]"#)
        .create_async()
        .await;

    let outcome = submit_recipe(&source(server.url()), &new_recipe()).await.unwrap();
    assert!(outcome.is_success());
    assert_eq!(outcome.message, "Receta insertada");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_submit_rejected_by_backend() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/rpc/sp_insertar_receta")
        .with_status(200)
        .with_body(r#"{"codResult": "99", "mjeResult": "La receta ya existe"}"#)
        .create_async()
        .await;

    let result = submit_recipe(&source(server.url()), &new_recipe()).await;
    match result {
        Err(RecetarioError::Submission(message)) => assert_eq!(message, "La receta ya existe"),
        other => panic!("expected submission error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_submit_invalid_recipe_makes_no_call() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let mut recipe = new_recipe();
    recipe.steps.clear();
    recipe.portions = -1;

    let result = submit_recipe(&source(server.url()), &recipe).await;
    match result {
        Err(RecetarioError::Validation(errors)) => {
            assert_eq!(errors.errors().len(), 2);
            assert!(errors.field_errors().contains_key("portions"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    mock.assert_async().await;
}
