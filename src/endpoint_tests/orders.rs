use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::{json, Value};

use super::helpers::{authorized, call, state_with, state_with_store};
use crate::domain::errors::StoreError;
use crate::domain::ports::{Document, StoredDocument};
use crate::errors::ErrorPolicy;
use crate::mocks::{identity_accepting_good_token, MockStore};
use crate::state::AppState;

fn document(value: Value) -> Document {
    value.as_object().cloned().expect("test documents are objects")
}

fn untouched_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_get().never();
    store.expect_set().never();
    store.expect_update().never();
    store.expect_delete().never();
    store.expect_list_all().never();
    store
}

fn order_request() -> Value {
    json!({
        "cliente": "João",
        "email": "joao@email.com",
        "itens": [
            { "quantidade": 2, "preco": 10.0 },
            { "quantidade": 1, "preco": 20.0 }
        ]
    })
}

// ── Preflight and authentication ─────────────────────────────────────────────

#[actix_web::test]
async fn preflight_needs_no_token_and_has_no_body() {
    for path in ["/pedidos", "/pedidos/123", "/pedidos/"] {
        let reply = call(
            state_with_store(untouched_store()),
            TestRequest::default().method(actix_web::http::Method::OPTIONS).uri(path),
        )
        .await;
        assert_eq!(reply.status, StatusCode::NO_CONTENT, "path {path}");
        assert!(reply.body.is_empty());
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
    }
}

#[actix_web::test]
async fn preflight_advertises_methods_per_resource() {
    let collection = call(
        state_with_store(untouched_store()),
        TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/pedidos"),
    )
    .await;
    assert_eq!(collection.header("access-control-allow-methods"), Some("GET, POST, OPTIONS"));
    assert_eq!(
        collection.header("access-control-allow-headers"),
        Some("Content-Type, Authorization")
    );

    let item = call(
        state_with_store(untouched_store()),
        TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/pedidos/123"),
    )
    .await;
    assert_eq!(
        item.header("access-control-allow-methods"),
        Some("GET, PUT, PATCH, DELETE, OPTIONS")
    );
}

#[actix_web::test]
async fn missing_token_is_rejected_before_the_store() {
    let requests = [
        TestRequest::get().uri("/pedidos"),
        TestRequest::post().uri("/pedidos").set_json(order_request()),
        TestRequest::get().uri("/pedidos/123"),
        TestRequest::put().uri("/pedidos/123").set_json(json!({ "status": "enviado" })),
        TestRequest::patch().uri("/pedidos/123").set_json(json!({ "status": "enviado" })),
        TestRequest::delete().uri("/pedidos/123"),
    ];
    for req in requests {
        let reply = call(state_with_store(untouched_store()), req).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply.error(), "missing or invalid authentication token");
        assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
    }
}

#[actix_web::test]
async fn non_bearer_header_counts_as_missing() {
    let reply = call(
        state_with_store(untouched_store()),
        TestRequest::get()
            .uri("/pedidos")
            .insert_header(("Authorization", "Basic Zm9vOmJhcg==")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "missing or invalid authentication token");
}

#[actix_web::test]
async fn rejected_token_is_401() {
    let reply = call(
        state_with_store(untouched_store()),
        TestRequest::get()
            .uri("/pedidos/123")
            .insert_header(("Authorization", "Bearer expired")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "invalid or expired token");
}

#[actix_web::test]
async fn unsupported_method_is_405_after_authentication() {
    for req in [
        TestRequest::put().uri("/pedidos"),
        TestRequest::delete().uri("/pedidos"),
        TestRequest::post().uri("/pedidos/123"),
    ] {
        let reply = call(state_with_store(untouched_store()), authorized(req)).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.error(), "method not allowed");
    }

    let anonymous = call(state_with_store(untouched_store()), TestRequest::put().uri("/pedidos")).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

// ── Create ───────────────────────────────────────────────────────────────────

#[actix_web::test]
async fn create_computes_total_and_stores_pending_order() {
    let mut store = MockStore::new();
    store
        .expect_set()
        .withf(|id, document| {
            document["id"] == id.to_string()
                && document["status"] == "PENDENTE"
                && document["total"] == 40.0
                && document["user_id"] == "user123"
                && document["cliente"] == "João"
                && document["itens"].as_array().map(Vec::len) == Some(2)
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::post().uri("/pedidos").set_json(order_request())),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["message"], "order created successfully");
    assert_eq!(body["status"], "PENDENTE");
    assert_eq!(body["total"], 40.0);
    assert!(!body["id"].as_str().unwrap_or_default().is_empty());
    assert!(body["data_criacao"].as_str().unwrap_or_default().ends_with('Z'));
}

#[actix_web::test]
async fn create_rejects_bad_submissions_without_storing() {
    let cases = [
        (json!({ "cliente": "João", "email": "joao@email.com" }), "missing required fields"),
        (
            json!({ "cliente": "João", "email": "joao@email.com", "itens": [{ "quantidade": 1 }] }),
            "invalid order item at index 0",
        ),
        (json!(["not", "an", "object"]), "invalid or missing JSON body"),
    ];
    for (body, expected) in cases {
        let reply = call(
            state_with_store(untouched_store()),
            authorized(TestRequest::post().uri("/pedidos").set_json(body)),
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.error().starts_with(expected), "got {:?}", reply.error());
    }
}

#[actix_web::test]
async fn create_with_unparseable_body_is_400() {
    let reply = call(
        state_with_store(untouched_store()),
        authorized(
            TestRequest::post()
                .uri("/pedidos")
                .insert_header(("Content-Type", "application/json"))
                .set_payload("{not json"),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "invalid or missing JSON body");
}

#[actix_web::test]
async fn store_failure_surfaces_as_500() {
    let mut store = MockStore::new();
    store
        .expect_set()
        .returning(|_, _| Err(StoreError::Backend("Erro inesperado".to_string())));

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::post().uri("/pedidos").set_json(order_request())),
    )
    .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "Erro inesperado");
    assert_eq!(reply.header("access-control-allow-origin"), Some("*"));
}

#[actix_web::test]
async fn store_failure_is_redacted_when_configured() {
    let mut store = MockStore::new();
    store
        .expect_list_all()
        .returning(|| Err(StoreError::Backend("connection refused on 10.0.0.7".to_string())));
    let state = AppState::new(
        std::sync::Arc::new(store),
        std::sync::Arc::new(identity_accepting_good_token()),
        ErrorPolicy {
            expose_internal_errors: false,
        },
    );

    let reply = call(state, authorized(TestRequest::get().uri("/pedidos"))).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "internal server error");
}

// ── Read ─────────────────────────────────────────────────────────────────────

#[actix_web::test]
async fn get_returns_document_with_id() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .withf(|id| id.to_string() == "123")
        .returning(|_| Ok(Some(document(json!({ "status": "PENDENTE", "total": 40.0, "extra": true })))));

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos/123"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({ "id": "123", "status": "PENDENTE", "total": 40.0, "extra": true })
    );
}

#[actix_web::test]
async fn get_unknown_order_is_404() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(None));

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos/999"))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "order not found");
}

#[actix_web::test]
async fn empty_id_segment_is_400() {
    let reply = call(
        state_with_store(untouched_store()),
        authorized(TestRequest::get().uri("/pedidos/")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "order id not provided correctly");
}

#[actix_web::test]
async fn list_empty_collection_is_empty_array() {
    let mut store = MockStore::new();
    store.expect_list_all().returning(|| Ok(Vec::new()));

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!([]));
}

#[actix_web::test]
async fn list_fills_in_missing_fields() {
    let mut store = MockStore::new();
    store.expect_list_all().returning(|| {
        Ok(vec![
            StoredDocument {
                id: "a".to_string(),
                data: document(json!({ "status": "enviado", "total": 12.5, "cliente": "Ana" })),
            },
            StoredDocument {
                id: "b".to_string(),
                data: Document::new(),
            },
        ])
    });

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body[0]["id"], "a");
    assert_eq!(body[0]["status"], "enviado");
    assert_eq!(body[0]["cliente"], "Ana");
    assert_eq!(body[0]["email"], "");
    assert_eq!(
        body[1],
        json!({
            "id": "b",
            "status": "DESCONHECIDO",
            "total": 0.0,
            "data_criacao": "",
            "cliente": "",
            "email": "",
            "itens": []
        })
    );
}

// ── Update and delete ────────────────────────────────────────────────────────

#[actix_web::test]
async fn update_status_of_existing_order() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .returning(|_| Ok(Some(document(json!({ "status": "PENDENTE" })))));
    store
        .expect_update()
        .withf(|id, fields| {
            id.to_string() == "123"
                && fields["status"] == "enviado"
                && fields.contains_key("ultima_atualizacao")
                && fields.len() == 2
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::put().uri("/pedidos/123").set_json(json!({ "status": "enviado" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({ "message": "order status updated successfully", "id": "123", "status": "enviado" })
    );
}

#[actix_web::test]
async fn patch_is_the_same_as_put() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(Some(Document::new())));
    store.expect_update().times(1).returning(|_, _| Ok(()));

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::patch().uri("/pedidos/123").set_json(json!({ "status": "entregue" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["status"], "entregue");
}

#[actix_web::test]
async fn update_of_unknown_order_is_404_and_writes_nothing() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(None));
    store.expect_update().never();

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::put().uri("/pedidos/999").set_json(json!({ "status": "enviado" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn update_without_status_is_400() {
    let reply = call(
        state_with_store(untouched_store()),
        authorized(TestRequest::put().uri("/pedidos/123").set_json(json!({ "estado": "enviado" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.error(), "no valid data sent");
}

#[actix_web::test]
async fn delete_existing_order() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(Some(Document::new())));
    store
        .expect_delete()
        .withf(|id| id.to_string() == "123")
        .times(1)
        .returning(|_| Ok(()));

    let reply = call(state_with_store(store), authorized(TestRequest::delete().uri("/pedidos/123"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({ "message": "order deleted successfully", "id": "123" })
    );
}

#[actix_web::test]
async fn delete_of_unknown_order_is_404() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(None));
    store.expect_delete().never();

    let reply = call(state_with_store(store), authorized(TestRequest::delete().uri("/pedidos/999"))).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.error(), "order not found");
}

#[actix_web::test]
async fn identity_is_not_consulted_for_preflight() {
    let mut identity = crate::mocks::MockIdentity::new();
    identity.expect_verify_token().never();

    let reply = call(
        state_with(untouched_store(), identity),
        TestRequest::default().method(actix_web::http::Method::OPTIONS).uri("/pedidos/123"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn create_with_overflowing_total_is_400_and_not_stored() {
    let body = json!({
        "cliente": "João",
        "email": "joao@email.com",
        "itens": [{ "quantidade": 1e200, "preco": 1e200 }]
    });
    let reply = call(
        state_with_store(untouched_store()),
        authorized(TestRequest::post().uri("/pedidos").set_json(body)),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        reply.error(),
        "invalid order item at index 0: quantity times price is out of range"
    );
}

#[actix_web::test]
async fn percent_encoded_id_is_decoded_before_lookup() {
    let mut store = MockStore::new();
    store
        .expect_get()
        .withf(|id| id.to_string() == "a b")
        .times(1)
        .returning(|_| Ok(Some(Document::new())));

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos/a%20b"))).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()["id"], "a b");
}

// ── Store failures ───────────────────────────────────────────────────────────

fn store_failing_on_get(message: &'static str) -> MockStore {
    let mut store = MockStore::new();
    store
        .expect_get()
        .returning(move |_| Err(StoreError::Backend(message.to_string())));
    store.expect_update().never();
    store.expect_delete().never();
    store
}

#[actix_web::test]
async fn lookup_failure_is_500_with_store_message() {
    let requests = [
        TestRequest::get().uri("/pedidos/123"),
        TestRequest::put().uri("/pedidos/123").set_json(json!({ "status": "enviado" })),
        TestRequest::delete().uri("/pedidos/123"),
    ];
    for req in requests {
        let reply = call(state_with_store(store_failing_on_get("Erro inesperado")), authorized(req)).await;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.error(), "Erro inesperado");
    }
}

#[actix_web::test]
async fn update_write_failure_is_500_with_store_message() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(Some(Document::new())));
    store
        .expect_update()
        .times(1)
        .returning(|_, _| Err(StoreError::Backend("write conflict".to_string())));

    let reply = call(
        state_with_store(store),
        authorized(TestRequest::patch().uri("/pedidos/123").set_json(json!({ "status": "enviado" }))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "write conflict");
}

#[actix_web::test]
async fn delete_failure_is_500_with_store_message() {
    let mut store = MockStore::new();
    store.expect_get().returning(|_| Ok(Some(Document::new())));
    store
        .expect_delete()
        .times(1)
        .returning(|_| Err(StoreError::Backend("disk full".to_string())));

    let reply = call(state_with_store(store), authorized(TestRequest::delete().uri("/pedidos/123"))).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "disk full");
}

#[actix_web::test]
async fn list_failure_is_500_with_store_message() {
    let mut store = MockStore::new();
    store
        .expect_list_all()
        .returning(|| Err(StoreError::Backend("Erro inesperado".to_string())));

    let reply = call(state_with_store(store), authorized(TestRequest::get().uri("/pedidos"))).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.error(), "Erro inesperado");
}
