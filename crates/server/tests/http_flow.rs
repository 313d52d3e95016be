use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use server::routes::{self, ServerState};

fn app() -> Router {
    routes::build_router(ServerState::in_memory(), tower_http::cors::CorsLayer::very_permissive())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(v) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

async fn create_plano(app: &Router, nome: &str, codigo: &str) -> anyhow::Result<Value> {
    let (status, body) = send(app, "POST", "/api/planos", Some(json!({"nome": nome, "codigoRegistroAns": codigo}))).await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Ok(body)
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let (status, body) = send(&app(), "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn plano_crud_and_conflicts() -> anyhow::Result<()> {
    let app = app();
    let plano = create_plano(&app, "Plano Bronze", "ANS-100001").await?;
    let id = plano["id"].as_str().unwrap_or_default().to_string();
    assert_eq!(plano["codigoRegistroAns"], "ANS-100001");
    assert!(plano["deletedAt"].is_null());

    let (status, body) = send(&app, "POST", "/api/planos", Some(json!({"nome": "Plano Bronze", "codigoRegistroAns": "ANS-100001"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ConflictError");

    let (status, body) = send(&app, "PUT", &format!("/api/planos/{id}"), Some(json!({"nome": "Plano Bronze Plus"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nome"], "Plano Bronze Plus");

    let (status, body) = send(&app, "GET", "/api/planos", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", &format!("/api/planos/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/planos/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFoundError");
    assert_eq!(body["message"], "Plano não encontrado");
    Ok(())
}

#[tokio::test]
async fn validation_errors_list_every_field() -> anyhow::Result<()> {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/beneficiarios", Some(json!({"cpf": "123"}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "ValidationError");
    let fields: Vec<&str> = body["details"]
        .as_array()
        .map(|d| d.iter().filter_map(|v| v["field"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(fields, vec!["nomeCompleto", "cpf", "dataNascimento", "planoId"]);
    Ok(())
}

#[tokio::test]
async fn malformed_body_and_unknown_ids() -> anyhow::Result<()> {
    let app = app();
    let req = Request::builder()
        .method("POST")
        .uri("/api/planos")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body(), usize::MAX).await?)?;
    assert_eq!(body["details"][0], json!({"field": "_", "rule": "invalid_json"}));

    let (status, _) = send(&app, "GET", "/api/beneficiarios/42", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/api/planos/{}", Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn beneficiary_lifecycle_guards_plan_delete() -> anyhow::Result<()> {
    let app = app();
    let plano = create_plano(&app, "Plano Prata", "ANS-100002").await?;
    let plano_id = plano["id"].as_str().unwrap_or_default().to_string();

    let (status, b) = send(
        &app,
        "POST",
        "/api/beneficiarios",
        Some(json!({"nomeCompleto": "Maria Silva", "cpf": "22233344456", "dataNascimento": "1990-03-15", "planoId": plano_id})),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED, "{b}");
    assert_eq!(b["status"], "ATIVO");
    assert_eq!(b["dataNascimento"], "1990-03-15");
    let b_id = b["id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send(
        &app,
        "POST",
        "/api/beneficiarios",
        Some(json!({"nomeCompleto": "Outra", "cpf": "11144477735", "dataNascimento": "1990-03-15", "planoId": Uuid::new_v4()})),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Plano inexistente");
    assert_eq!(body["details"][0]["field"], "planoId");

    let (status, body) = send(&app, "DELETE", &format!("/api/planos/{plano_id}?hard=true"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "ConflictError");

    let (status, body) = send(&app, "GET", &format!("/api/beneficiarios?plano_id={plano_id}&status=ATIVO"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, _) = send(&app, "DELETE", &format!("/api/beneficiarios/{b_id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/api/beneficiarios/{b_id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/planos/{plano_id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn listing_paginates_and_rejects_bad_query() -> anyhow::Result<()> {
    let app = app();
    let plano = create_plano(&app, "Plano Ouro", "ANS-100003").await?;
    for i in 0..12 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/beneficiarios",
            Some(json!({"nomeCompleto": format!("Pessoa {i:02}"), "cpf": format!("{:011}", i + 1), "dataNascimento": "2000-01-01", "planoId": plano["id"]})),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/beneficiarios?page=2&limit=5", None).await?;
    assert_eq!(status, StatusCode::OK);
    let nomes: Vec<&str> = body
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["nomeCompleto"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(nomes, vec!["Pessoa 05", "Pessoa 06", "Pessoa 07", "Pessoa 08", "Pessoa 09"]);

    let (status, body) = send(&app, "GET", "/api/beneficiarios?page=abc", None).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"][0]["rule"], "invalid_query");
    Ok(())
}

#[tokio::test]
async fn delete_with_unreadable_query_gets_json_error() -> anyhow::Result<()> {
    let app = app();
    let plano = create_plano(&app, "Plano Diamante", "ANS-100004").await?;
    let id = plano["id"].as_str().unwrap_or_default().to_string();

    for uri in [format!("/api/planos/{id}?hard=a&hard=b"), format!("/api/beneficiarios/{id}?hard=a&hard=b")] {
        let (status, body) = send(&app, "DELETE", &uri, None).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["details"][0], json!({"field": "_", "rule": "invalid_query"}));
    }

    let (status, _) = send(&app, "GET", &format!("/api/planos/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
