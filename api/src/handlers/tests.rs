use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use clap::Parser;
use rcgen::{CertificateParams, KeyPair};
use serde_json::{Value, json};
use tower::ServiceExt;
use zaca_db::storage::memory::MemoryStorage;

use crate::{config::ZacaApiConfig, server};

fn router() -> Router {
    let config = ZacaApiConfig::try_parse_from(["zaca-api", "--store", "memory"]).unwrap();
    let (router, _) = server::make(config, Arc::new(MemoryStorage::new())).unwrap();
    router
}

fn test_pem() -> String {
    let key_pair = KeyPair::generate().unwrap();
    CertificateParams::new(vec!["svc.example.com".to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap()
        .pem()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn new_certificate(serial: &str, pem: &str) -> Value {
    json!({
        "serial_number": serial,
        "authority_key_identifier": "aki-1",
        "ca_label": "intermediate",
        "common_name": "svc",
        "status": "good",
        "not_before": "2023-01-01T00:00:00Z",
        "expiry": "2023-06-01T00:00:00Z",
        "issued_at": "2023-01-01T00:00:00Z",
        "pem": pem,
    })
}

#[tokio::test]
async fn test_health_check() {
    let router = router();
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_certificate_lifecycle() {
    let router = router();
    let pem = test_pem();

    let (status, body) = send(&router, "POST", "/api/v1/certificates", Some(new_certificate("ff", &pem))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["serial_number"], "255");
    assert_eq!(body["rows_affected"], 1);

    let (status, body) = send(&router, "GET", "/api/v1/certificates?role=INTERMEDIATE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["serial_number"], "255");
    assert_eq!(body["items"][0]["details"]["dns_names"][0], "svc.example.com");

    let (status, body) = send(&router, "GET", "/api/v1/certificates/ff/aki-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "good");

    let patch = json!({ "status": "revoked", "reason": 1, "revoked_at": "2023-02-01T00:00:00Z" });
    let (status, body) = send(&router, "PATCH", "/api/v1/certificates/255/aki-1", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "revoked");
    assert_eq!(body["record"]["common_name"], "svc");
    assert!(body["record"]["revoked_at"].is_string());

    let (status, body) = send(&router, "PATCH", "/api/v1/certificates/255/aki-1", Some(json!({ "revoked_at": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["status"], "revoked");
    assert!(body["record"]["revoked_at"].is_null());

    let (status, body) = send(&router, "DELETE", "/api/v1/certificates/255/aki-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows_affected"], 1);

    let (status, body) = send(&router, "DELETE", "/api/v1/certificates/255/aki-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");
}

#[tokio::test]
async fn test_invalid_list_arguments_are_bad_requests() {
    let router = router();

    for uri in [
        "/api/v1/certificates?page_size=0",
        "/api/v1/certificates?cert_sn=not-hex",
        "/api/v1/certificates?expiry_start_time=someday",
        "/api/v1/certificates?order=pem",
        "/api/v1/ocsp-responses?order=body%20desc",
    ] {
        let (status, body) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "InvalidArgument", "{uri}");
    }
}

#[tokio::test]
async fn test_rejected_update_is_server_error() {
    let router = router();
    let pem = test_pem();
    send(&router, "POST", "/api/v1/certificates", Some(new_certificate("10", &pem))).await;

    let patch = json!({ "not_before": "2024-01-01T00:00:00Z" });
    let (status, body) = send(&router, "PATCH", "/api/v1/certificates/10/aki-1", Some(patch)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UpdateFailed");

    let (_, body) = send(&router, "GET", "/api/v1/certificates/10/aki-1", None).await;
    assert_eq!(body["not_before"], "2023-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_ocsp_responses() {
    let router = router();

    for (serial, expiry) in [("1", "2024-01-01T00:00:00Z"), ("2", "2024-02-01T00:00:00Z")] {
        let body = json!({
            "serial_number": serial,
            "authority_key_identifier": "aki-1",
            "body": "MIIB",
            "expiry": expiry,
        });
        let (status, _) = send(&router, "POST", "/api/v1/ocsp-responses", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&router, "GET", "/api/v1/ocsp-responses?page=1&page_size=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["serial_number"], "2");

    let (status, body) = send(&router, "PATCH", "/api/v1/ocsp-responses/1/aki-1", Some(json!({ "body": "MIIC" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["body"], "MIIC");

    let (status, _) = send(&router, "GET", "/api/v1/ocsp-responses/3/aki-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mixed_case_label_matches_role_filter() {
    let router = router();
    let pem = test_pem();
    let mut body = new_certificate("20", &pem);
    body["ca_label"] = json!("Intermediate");

    let (status, created) = send(&router, "POST", "/api/v1/certificates", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["record"]["ca_label"], "intermediate");

    for role in ["Intermediate", "intermediate", "INTERMEDIATE"] {
        let (status, body) = send(&router, "GET", &format!("/api/v1/certificates?role={role}"), None).await;
        assert_eq!(status, StatusCode::OK, "{role}");
        assert_eq!(body["total"], 1, "{role}");
        assert_eq!(body["items"][0]["serial_number"], "20", "{role}");
    }

    let patch = json!({ "ca_label": "Root" });
    let (status, _) = send(&router, "PATCH", "/api/v1/certificates/20/aki-1", Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&router, "GET", "/api/v1/certificates?role=ROOT", None).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let router = router();
    let pem = test_pem();
    send(&router, "POST", "/api/v1/certificates", Some(new_certificate("30", &pem))).await;

    let uri = format!("/api/v1/certificates?page={}&page_size=1000", i64::MAX);
    let (status, body) = send(&router, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"], json!([]));
}
