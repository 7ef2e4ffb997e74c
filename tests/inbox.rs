mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use agentverse::domains::envelope::Envelope;
use agentverse::interfaces::handler::MessageHandler;
use agentverse::interfaces::identity::Identity;
use agentverse::services::inbox::{build_router, InboxState};

use common::{identity, FailingHandler, RecordingHandler};

fn router(address: &str, handler: Arc<dyn MessageHandler>) -> Router {
    build_router(InboxState {
        address: address.to_string(),
        handler,
    })
}

fn submit(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/submit")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn envelope_for(target: &str, payload: &str) -> Envelope {
    let alice = identity("alice");
    let mut env = Envelope::new(alice.address(), target, "model:note", None);
    env.encode_payload(payload);
    env.sign(&alice).unwrap();
    env
}

#[tokio::test]
async fn health_and_accepted_envelope() {
    let bob = identity("bob");
    let handler = Arc::new(RecordingHandler::default());
    let app = router(bob.address(), handler.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "ok"}));

    let env = envelope_for(bob.address(), r#"{"note":"hi"}"#);
    let response = app
        .clone()
        .oneshot(submit(env.to_json().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let messages = handler.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, identity("alice").address());
    assert_eq!(messages[0].payload, json!({"note": "hi"}));
}

#[tokio::test]
async fn tampered_and_unsigned_envelopes_are_unauthorized() {
    let bob = identity("bob");
    let handler = Arc::new(RecordingHandler::default());
    let app = router(bob.address(), handler.clone());

    let mut tampered = envelope_for(bob.address(), r#"{"amount":1}"#);
    tampered.encode_payload(r#"{"amount":1000}"#);
    let response = app
        .clone()
        .oneshot(submit(tampered.to_json().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("invalid signature"));

    let mut unsigned = envelope_for(bob.address(), "{}");
    unsigned.signature = None;
    let response = app
        .clone()
        .oneshot(submit(unsigned.to_json().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(handler.messages.lock().await.is_empty());
}

#[tokio::test]
async fn malformed_and_misaddressed_envelopes_are_bad_requests() {
    let bob = identity("bob");
    let handler = Arc::new(RecordingHandler::default());
    let app = router(bob.address(), handler.clone());

    let response = app
        .clone()
        .oneshot(submit("{\"version\":1}".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let carol = identity("carol");
    let misaddressed = envelope_for(carol.address(), "{}");
    let response = app
        .clone()
        .oneshot(submit(misaddressed.to_json().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut legacy_session: Value =
        serde_json::from_str(&envelope_for(bob.address(), "{}").to_json().unwrap()).unwrap();
    legacy_session["session"] = json!("00000000-0000-1000-8000-000000000000");
    let response = app
        .clone()
        .oneshot(submit(legacy_session.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let not_json_payload = envelope_for(bob.address(), "not json");
    let response = app
        .clone()
        .oneshot(submit(not_json_payload.to_json().unwrap()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(handler.messages.lock().await.is_empty());
}

#[tokio::test]
async fn handler_failures_are_server_errors() {
    let bob = identity("bob");
    let app = router(bob.address(), Arc::new(FailingHandler));
    let env = envelope_for(bob.address(), "{}");
    let response = app.oneshot(submit(env.to_json().unwrap())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("handler offline"));
}
