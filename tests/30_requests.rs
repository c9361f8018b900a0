mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{message, TestApp, OTHER_USER_ID, USER_ID};

async fn shelter() -> TestApp {
    let app = TestApp::with_accounts().await;
    app.insert_animal(1, "Rex", "perro", "2024-01-10", "disponible").await;
    app.insert_animal(2, "Toby", "perro", "2024-02-20", "reservado").await;
    app
}

#[tokio::test]
async fn non_owner_cannot_read_a_request() -> Result<()> {
    let app = shelter().await;
    app.insert_request(10, USER_ID, 1, "pendiente").await;

    let (status, body) = app.get("/api/solicitudes/10", Some(&app.other_user_token())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(message(&body), "No tienes permiso para acceder a este recurso");

    let (status, body) = app.get("/api/solicitudes/10", Some(&app.user_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["animal"]["nombre"], json!("Rex"));
    assert!(body["data"].get("usuario").is_none());

    let (status, body) = app.get("/api/solicitudes/10", Some(&app.admin_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["usuario"]["id_usuario"], json!(USER_ID));
    Ok(())
}

#[tokio::test]
async fn request_lifecycle() -> Result<()> {
    let app = shelter().await;
    let user = app.user_token();
    let body = json!({"id_animal": 1, "motivo": "Vivo en casa con patio", "tiene_patio": true});

    let (status, created) = app.send(Method::POST, "/api/solicitudes", Some(&user), Some(body.clone())).await?;
    assert_eq!(status, StatusCode::CREATED, "{}", created);
    assert_eq!(created["data"]["estado"], json!("pendiente"));
    let id = created["data"]["id_solicitud"].as_i64().unwrap_or_default();

    let (status, dup) = app.send(Method::POST, "/api/solicitudes", Some(&user), Some(body)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&dup), "Ya tienes una solicitud activa para este animal");

    let (_, mine) = app.get("/api/solicitudes/mis-solicitudes", Some(&user)).await?;
    assert_eq!(mine["total"], json!(1));

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/solicitudes/{}", id), Some(&app.other_user_token()), None)
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &format!("/api/solicitudes/{}", id), Some(&user), None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, again) = app.send(Method::DELETE, &format!("/api/solicitudes/{}", id), Some(&user), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&again), "Solo se pueden cancelar solicitudes pendientes");
    Ok(())
}

#[tokio::test]
async fn unavailable_animal_cannot_be_requested() -> Result<()> {
    let app = shelter().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/solicitudes",
            Some(&app.user_token()),
            Some(json!({"id_animal": 2, "motivo": "Me encanta"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "El animal no está disponible para adopción");
    Ok(())
}

#[tokio::test]
async fn approval_reserves_and_adoption_completes() -> Result<()> {
    let app = shelter().await;
    let admin = app.admin_token();
    app.insert_request(10, USER_ID, 1, "pendiente").await;
    app.insert_request(11, OTHER_USER_ID, 1, "en_revision").await;

    let (_, listed) = app.get("/api/solicitudes?estado=en_revision", Some(&admin)).await?;
    assert_eq!(listed["total"], json!(1));
    assert_eq!(listed["data"][0]["usuario"]["id_usuario"], json!(OTHER_USER_ID));

    let (status, _) = app
        .send(Method::POST, "/api/adopciones", Some(&admin), Some(json!({"id_solicitud": 10})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(Method::PATCH, "/api/solicitudes/10/status", Some(&admin), Some(json!({"estado": "cancelada"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, reviewed) = app
        .send(
            Method::PATCH,
            "/api/solicitudes/10/status",
            Some(&admin),
            Some(json!({"estado": "aprobada", "observaciones_admin": "Visita realizada"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["data"]["estado"], json!("aprobada"));
    assert!(reviewed["data"]["fecha_respuesta"].is_string());

    let (_, animal) = app.get("/api/animales/1", None).await?;
    assert_eq!(animal["data"]["animal"]["estado"], json!("reservado"));

    let (status, adoption) = app
        .send(Method::POST, "/api/adopciones", Some(&admin), Some(json!({"id_solicitud": 10})))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", adoption);
    assert_eq!(adoption["data"]["id_usuario"], json!(USER_ID));

    let (status, _) = app
        .send(Method::POST, "/api/adopciones", Some(&admin), Some(json!({"id_solicitud": 10})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, animal) = app.get("/api/animales/1", None).await?;
    assert_eq!(animal["data"]["animal"]["estado"], json!("adoptado"));

    let (_, mine) = app.get("/api/adopciones/mis-adopciones", Some(&app.user_token())).await?;
    assert_eq!(mine["total"], json!(1));
    assert_eq!(mine["data"][0]["animal"]["nombre"], json!("Rex"));

    let (_, profile) = app.get("/api/auth/profile", Some(&app.user_token())).await?;
    assert_eq!(profile["data"]["stats"]["solicitudes_aprobadas"], json!(1));
    assert_eq!(profile["data"]["stats"]["total_adopciones"], json!(1));
    Ok(())
}
