mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{message, TestApp};

#[tokio::test]
async fn unknown_route_uses_error_envelope() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/api/no-existe", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Ruta no encontrada"}));
    Ok(())
}

#[tokio::test]
async fn banner_and_health() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, _) = app.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn contact_messages_reach_the_inbox() -> Result<()> {
    let app = TestApp::with_accounts().await;
    let admin = app.admin_token();

    let (status, body) = app
        .send(Method::POST, "/api/contacto", None, Some(json!({"nombre": "Ana", "email": "no-es-email", "mensaje": "Hola"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/contacto",
            None,
            Some(json!({"nombre": "Ana", "email": "ana@gmail.com", "asunto": "Voluntariado", "mensaje": "Quiero ayudar"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["leido"], json!(false));
    let id = body["data"]["id_mensaje"].as_i64().unwrap_or_default();

    let (status, _) = app.get("/api/contacto", Some(&app.user_token())).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PATCH, &format!("/api/contacto/{}/leido", id), Some(&admin), None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, inbox) = app.get("/api/contacto", Some(&admin)).await?;
    assert_eq!(inbox["total"], json!(1));
    assert_eq!(inbox["data"][0]["leido"], json!(true));

    let (status, body) = app.send(Method::PATCH, "/api/contacto/999/leido", Some(&admin), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "Mensaje no encontrado");
    Ok(())
}

#[tokio::test]
async fn donations_are_recorded_and_summed() -> Result<()> {
    let app = TestApp::with_accounts().await;
    let user = app.user_token();

    let (status, body) = app
        .send(Method::POST, "/api/donaciones", Some(&user), Some(json!({"monto": 0, "metodo_pago": "tarjeta"})))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "El monto debe ser mayor a 0");

    for monto in [json!(10.25), json!("20,50")] {
        let (status, body) = app
            .send(Method::POST, "/api/donaciones", Some(&user), Some(json!({"monto": monto, "metodo_pago": "tarjeta"})))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }

    let (_, mine) = app.get("/api/donaciones/mis-donaciones", Some(&user)).await?;
    assert_eq!(mine["total"], json!(2));

    let (status, all) = app.get("/api/donaciones", Some(&app.admin_token())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["data"]["total_recaudado"], json!(30.75));
    assert_eq!(all["data"]["donaciones"][0]["usuario"]["email"], json!("juan@gmail.com"));
    Ok(())
}

#[tokio::test]
async fn donation_amounts_are_checked_after_rounding() -> Result<()> {
    let app = TestApp::with_accounts().await;
    let user = app.user_token();

    for (monto, expected) in [
        (json!(0.001), "El monto debe ser mayor a 0"),
        (json!("0,004"), "El monto debe ser mayor a 0"),
        (json!(-5), "El monto debe ser mayor a 0"),
        (json!("NaN"), "El monto debe ser mayor a 0"),
        (json!(100_000_000), "El monto supera el máximo permitido"),
        (json!(1e300), "El monto supera el máximo permitido"),
    ] {
        let (status, body) = app
            .send(Method::POST, "/api/donaciones", Some(&user), Some(json!({"monto": monto, "metodo_pago": "tarjeta"})))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "monto {}", monto);
        assert_eq!(message(&body), expected);
    }

    let (status, body) = app
        .send(Method::POST, "/api/donaciones", Some(&user), Some(json!({"monto": 0.005, "metodo_pago": "tarjeta"})))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["monto"], json!(0.01));

    let (_, mine) = app.get("/api/donaciones/mis-donaciones", Some(&user)).await?;
    assert_eq!(mine["total"], json!(1));
    Ok(())
}
