//! End-to-end tests against the full router over the in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use escala_server::db::MemoryStore;
use escala_server::{build_router, AppState};

fn app() -> Router {
    build_router(AppState::new(Arc::new(MemoryStore::new())), false)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, uri: &str, body: Value, key: &str) -> String {
    let (status, body) = send(app, "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{uri}: {body}");
    body[key]["id"].as_str().unwrap().to_string()
}

fn member(cpf: &str) -> Value {
    json!({
        "nome": "Ana",
        "cpf": cpf,
        "email": "ana@igreja.org",
        "senha": "segredo"
    })
}

#[tokio::test]
async fn category_create_then_duplicate() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/categorias", Some(json!({"name": "Louvor"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Categoria criada com sucesso");
    assert_eq!(body["categoria"]["nome"], "Louvor");
    assert!(body["categoria"]["id"].is_string());

    let (status, body) = send(&app, "POST", "/api/categorias", Some(json!({"nome": "Louvor"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["codigo"], 409);
    assert_eq!(body["erro"], "Já existe uma categoria com esse nome");

    let (status, body) = send(&app, "GET", "/api/categorias", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tonality_uses_tom_field() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/tonalidades", Some(json!({"tom": "C#m"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["tonalidade"]["tom"], "C#m");
    assert!(body["tonalidade"].get("nome").is_none());
}

#[tokio::test]
async fn named_entity_lifecycle() {
    let app = app();
    let id = create(&app, "/api/tipos-eventos", json!({"nome": "Culto"}), "tipo_evento").await;
    let item = format!("/api/tipos-eventos/{id}");

    let (status, body) = send(&app, "PUT", &item, Some(json!({"nome": "Culto"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tipo_evento"]["nome"], "Culto");

    let (status, body) = send(&app, "PUT", &item, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Nome do tipo de evento é obrigatório");

    let (status, _) = send(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &item, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/tipos-eventos/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn member_role_association_flow() {
    let app = app();
    let member = create(&app, "/api/integrantes", member("123.456.789-00"), "integrante").await;
    let role = create(&app, "/api/funcoes", json!({"nome": "Violão"}), "funcao").await;
    let roles = format!("/api/integrantes/{member}/funcoes");
    let link = json!({"funcao_id": role});

    let (status, body) = send(&app, "POST", &roles, Some(link.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Função vinculada ao integrante com sucesso");

    let (status, _) = send(&app, "POST", &roles, Some(link)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &roles, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"id": role, "nome": "Violão"}]));

    let item = format!("{roles}/{role}");
    let (status, _) = send(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &item, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["codigo"], 404);
}

#[tokio::test]
async fn member_responses_never_carry_password() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/integrantes", Some(member("111"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["integrante"].get("senha").is_none());

    let (_, body) = send(&app, "GET", "/api/integrantes", None).await;
    for item in body.as_array().unwrap() {
        assert!(item.get("senha").is_none());
        assert!(item.get("senha_hash").is_none());
    }
}

#[tokio::test]
async fn member_phone_can_be_cleared() {
    let app = app();
    let mut body = member("123");
    body["telefone"] = json!("11 9999");
    let id = create(&app, "/api/integrantes", body, "integrante").await;
    let uri = format!("/api/integrantes/{id}");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"telefone": null}))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["integrante"]["telefone"].is_null());
    assert_eq!(body["integrante"]["nome"], "Ana");
}

#[tokio::test]
async fn member_cpf_formats_collide() {
    let app = app();
    create(&app, "/api/integrantes", member("123.456.789-00"), "integrante").await;

    let (status, body) = send(&app, "POST", "/api/integrantes", Some(member("12345678900"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["erro"], "CPF já cadastrado");
}

#[tokio::test]
async fn member_missing_fields_listed() {
    let app = app();
    let (status, body) = send(&app, "POST", "/api/integrantes", Some(json!({"nome": "Ana"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["erro"], "Campos obrigatórios ausentes");
    assert_eq!(body["detalhes"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_json_is_400_with_error_shape() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/artistas")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["codigo"], 400);
    assert!(body["erro"].is_string());
}

#[tokio::test]
async fn song_with_versions_and_blocked_artist_delete() {
    let app = app();
    let tone = create(&app, "/api/tonalidades", json!({"tom": "D"}), "tonalidade").await;
    let artist = create(&app, "/api/artistas", json!({"nome": "Fernandinho"}), "artista").await;
    let song = create(
        &app,
        "/api/musicas",
        json!({"nome": "Grandes Coisas", "tonalidade_id": tone}),
        "musica",
    )
    .await;

    let versions = format!("/api/musicas/{song}/versoes");
    let (status, body) = send(
        &app,
        "POST",
        &versions,
        Some(json!({"artista_id": artist, "bpm": 128, "link_versao": "https://youtu.be/x"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["versao"]["artista"]["nome"], "Fernandinho");
    assert_eq!(body["versao"]["bpm"], 128);

    let (status, _) = send(&app, "POST", &versions, Some(json!({"artista_id": artist}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "GET", &format!("/api/musicas/{song}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tonalidade"]["tom"], "D");
    assert_eq!(body["versoes"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/artistas/{artist}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["erro"], "Artista possui versões cadastradas");

    let (status, _) = send(&app, "DELETE", &format!("/api/musicas/{song}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/artistas/{artist}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn event_schedule_and_report() {
    let app = app();
    let song = create(&app, "/api/musicas", json!({"nome": "Aleluia"}), "musica").await;
    let member = create(&app, "/api/integrantes", member("42"), "integrante").await;
    let event = create(
        &app,
        "/api/eventos",
        json!({"data": "2020-01-05T19:00:00Z", "descricao": "Culto de domingo"}),
        "evento",
    )
    .await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/eventos/{event}/musicas"),
        Some(json!({"musica_id": song})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/eventos/{event}/integrantes"),
        Some(json!({"integrante_id": member})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, "GET", &format!("/api/eventos/{event}"), None).await;
    assert_eq!(body["musicas"][0]["nome"], "Aleluia");
    assert_eq!(body["integrantes"][0]["nome"], "Ana");

    let (status, body) = send(&app, "GET", "/api/relatorios/resumo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalMusicas"], 1);
    assert_eq!(body["totalEventos"], 1);
    assert_eq!(body["totalAssociacoes"], 1);
    assert_eq!(body["mediaMusicasPorEvento"], 1.0);
    assert_eq!(body["topMusicas"][0]["nome"], "Aleluia");
    assert_eq!(body["atividadeMensal"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn unknown_route_uses_error_shape() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/nada", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["codigo"], 404);
}

#[tokio::test]
async fn health_check() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
