//! HTTP API Tests (hearth-gateway)
//!
//! Drives the axum router directly and checks the status mapping:
//! 200 success, 400 validation, 502 device error, 504 timeout.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use hearth_gateway::http::build_router;
use hearth_test_utils::{ack_payload, error_payload, wait_for_publishes, TestGateway};

const STATE_TOPIC: &str = "smarthome/livingroom/light/state";

fn action_request(room: &str, device: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/devices/{room}/{device}/action"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_action_success() {
    let gw = TestGateway::start(Duration::from_secs(2));
    let app = build_router(gw.commander.clone());

    // Play the device: acknowledge the command once it appears
    let transport = gw.transport.clone();
    tokio::spawn(async move {
        assert!(wait_for_publishes(&transport, 1).await);
        let (_, cmd) = transport.published_commands().pop().unwrap();
        transport
            .inject(STATE_TOPIC, ack_payload(cmd.correlation_id, "ON"))
            .await;
    });

    let response = app
        .oneshot(action_request("livingroom", "light", r#"{"action":"ON"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["confirmed_result"]["state"], "ON");
    assert!(body["confirmed_result"]["correlation_id"].is_string());
}

#[tokio::test]
async fn test_action_validation_is_bad_request() {
    let gw = TestGateway::start(Duration::from_secs(2));
    let app = build_router(gw.commander.clone());

    let response = app
        .oneshot(action_request("garage", "light", r#"{"action":"ON"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["detail"].as_str().unwrap().contains("unknown room"));
    assert_eq!(gw.transport.publish_count(), 0);
}

#[tokio::test]
async fn test_action_timeout_is_gateway_timeout() {
    let gw = TestGateway::start(Duration::from_millis(100));
    let app = build_router(gw.commander.clone());

    let response = app
        .oneshot(action_request("livingroom", "light", r#"{"action":"ON"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = body_json(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("did not respond in time"));
}

#[tokio::test]
async fn test_action_device_error_is_bad_gateway() {
    let gw = TestGateway::start(Duration::from_secs(2));
    let app = build_router(gw.commander.clone());

    let transport = gw.transport.clone();
    tokio::spawn(async move {
        assert!(wait_for_publishes(&transport, 1).await);
        let (_, cmd) = transport.published_commands().pop().unwrap();
        transport
            .inject(STATE_TOPIC, error_payload(cmd.correlation_id, "E1", "stuck"))
            .await;
    });

    let response = app
        .oneshot(action_request("livingroom", "light", r#"{"action":"ON"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let detail = body_json(response).await["detail"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(detail.contains("E1"));
    assert!(detail.contains("stuck"));
}

#[tokio::test]
async fn test_action_with_value() {
    let gw = TestGateway::start(Duration::from_secs(2));
    let app = build_router(gw.commander.clone());

    let transport = gw.transport.clone();
    tokio::spawn(async move {
        assert!(wait_for_publishes(&transport, 1).await);
        let (_, cmd) = transport.published_commands().pop().unwrap();
        assert_eq!(cmd.value, Some(75));
        transport
            .inject(
                "smarthome/bedroom/bedside_light/state",
                ack_payload(cmd.correlation_id, "ON"),
            )
            .await;
    });

    let response = app
        .oneshot(action_request(
            "bedroom",
            "bedside_light",
            r#"{"action":"SET_BRIGHTNESS","value":75}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_devices() {
    let gw = TestGateway::start(Duration::from_secs(2));
    let app = build_router(gw.commander.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/devices")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rooms"]["livingroom"]["light"]["type"], "switch");
    assert_eq!(body["rooms"]["kitchen"]["oven"]["valid_actions"][0], "START");
}

#[tokio::test]
async fn test_health() {
    let gw = TestGateway::start(Duration::from_secs(1));
    let app = build_router(gw.commander.clone());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
