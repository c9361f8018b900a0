mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{message, TestApp};

async fn catalogue() -> TestApp {
    let app = TestApp::with_accounts().await;
    app.insert_animal(1, "Rex", "perro", "2024-01-10", "disponible").await;
    app.insert_animal(2, "Michi", "gato", "2024-02-01", "disponible").await;
    app.insert_animal(3, "Luna", "perro", "2024-03-05", "disponible").await;
    app.insert_animal(4, "Toby", "perro", "2024-02-20", "reservado").await;
    app.insert_animal(5, "Sombra", "gato", "2023-12-01", "no_disponible").await;
    app
}

fn names(body: &Value) -> Vec<&str> {
    body["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["nombre"].as_str()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn listing_filters_by_type_newest_intake_first() -> Result<()> {
    let app = catalogue().await;

    let (status, body) = app.get("/api/animales?tipo=perro", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Luna", "Toby", "Rex"]);
    assert_eq!(body["total"], json!(3));
    assert!(body["data"]
        .as_array()
        .is_some_and(|rows| rows.iter().all(|r| r["tipo"] == json!("perro"))));
    Ok(())
}

#[tokio::test]
async fn blank_criteria_impose_nothing() -> Result<()> {
    let app = catalogue().await;

    let (_, body) = app.get("/api/animales?tipo=&search=%20", None).await?;
    assert_eq!(body["total"], json!(5));
    assert_eq!(names(&body), vec!["Luna", "Toby", "Michi", "Rex", "Sombra"]);
    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_and_combines_with_filters() -> Result<()> {
    let app = catalogue().await;

    let (_, body) = app.get("/api/animales?search=LU&tipo=perro", None).await?;
    assert_eq!(names(&body), vec!["Luna"]);

    let (_, body) = app.get("/api/animales?search=lu&tipo=gato", None).await?;
    assert_eq!(body["total"], json!(0));
    Ok(())
}

#[tokio::test]
async fn listing_rows_carry_counts() -> Result<()> {
    let app = catalogue().await;
    app.insert_request(1, common::USER_ID, 3, "pendiente").await;
    app.insert_request(2, common::OTHER_USER_ID, 3, "rechazada").await;

    let (_, body) = app.get("/api/animales?tipo=perro", None).await?;
    assert_eq!(body["data"][0]["nombre"], json!("Luna"));
    assert_eq!(body["data"][0]["total_solicitudes"], json!(2));
    assert_eq!(body["data"][0]["total_fotos"], json!(0));
    Ok(())
}

#[tokio::test]
async fn stats_exclude_withdrawn_animals() -> Result<()> {
    let app = catalogue().await;

    let (status, body) = app.get("/api/animales/stats", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"total": 4, "disponibles": 3, "adoptados": 0, "reservados": 1, "perros": 3, "gatos": 1})
    );
    Ok(())
}

#[tokio::test]
async fn detail_includes_similar_available_animals() -> Result<()> {
    let app = catalogue().await;

    let (status, body) = app.get("/api/animales/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["animal"]["nombre"], json!("Rex"));
    assert_eq!(body["data"]["animal"]["fotos"], json!([]));
    let similar: Vec<&str> = body["data"]["similares"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["nombre"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(similar, vec!["Luna"]);

    let (status, body) = app.get("/api/animales/99", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Animal no encontrado");

    let (status, _) = app.get("/api/animales/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn admin_creates_updates_and_withdraws_an_animal() -> Result<()> {
    let app = catalogue().await;
    let admin = app.admin_token();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/animales",
            Some(&admin),
            Some(json!({"nombre": "Canela", "tipo": "perro", "sexo": "hembra", "tamanio": "pequeño", "edad_anos": "1", "peso": "4,5"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(message(&body), "Animal creado exitosamente");
    assert_eq!(body["data"]["estado"], json!("disponible"));
    assert_eq!(body["data"]["peso"], json!(4.5));
    let id = body["data"]["id_animal"].as_i64().unwrap_or_default();
    assert!(id > 5);

    let (status, body) = app
        .send(Method::PUT, &format!("/api/animales/{}", id), Some(&admin), Some(json!({"raza": "beagle"})))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["raza"], json!("beagle"));
    assert_eq!(body["data"]["nombre"], json!("Canela"));

    let (status, _) = app
        .send(Method::PATCH, &format!("/api/animales/{}/status", id), Some(&admin), Some(json!({"estado": "perdido"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::DELETE, &format!("/api/animales/{}", id), Some(&admin), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/api/animales/{}", id), None).await?;
    assert_eq!(body["data"]["animal"]["estado"], json!("no_disponible"));
    Ok(())
}

#[tokio::test]
async fn create_reports_missing_fields() -> Result<()> {
    let app = catalogue().await;

    let (status, body) = app
        .send(Method::POST, "/api/animales", Some(&app.admin_token()), Some(json!({"nombre": "Sin tipo"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "Nombre, tipo, sexo y tamaño son obligatorios");
    Ok(())
}

#[tokio::test]
async fn public_get_and_admin_put_share_a_path() -> Result<()> {
    let app = catalogue().await;

    let (status, _) = app
        .send(Method::PUT, "/api/animales/1", Some(&app.user_token()), Some(json!({"nombre": "X"})))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::PUT, "/api/animales/1", None, Some(json!({"nombre": "X"}))).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/animales/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn out_of_range_age_is_rejected_and_listing_survives() -> Result<()> {
    let app = catalogue().await;
    let admin = app.admin_token();
    let base = json!({"nombre": "Gigante", "tipo": "perro", "sexo": "macho", "tamanio": "grande"});

    for (field, value) in [("edad_anos", json!(3_000_000_000i64)), ("edad_meses", json!(-1)), ("peso", json!(12_345))] {
        let mut body = base.clone();
        body[field] = value;
        let (status, reply) = app.send(Method::POST, "/api/animales", Some(&admin), Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} -> {}", field, reply);
    }

    let (status, reply) = app
        .send(Method::PUT, "/api/animales/1", Some(&admin), Some(json!({"edad_anos": "3000000000"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&reply), "El campo edad_anos debe ser un número entero no negativo");

    let (status, body) = app.get("/api/animales", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], json!(5));
    Ok(())
}
