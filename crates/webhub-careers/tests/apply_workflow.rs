use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use webhub_careers::config::{MailConfig, MailTransportConfig, Secret, SupabaseConfig};
use webhub_careers::workflows::careers::{
    application_router, CareerApplicationService, ErrorExposure, LettreMailer, SupabaseStore,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "careers-integration-boundary";

fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &str)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, file, value) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match file {
            Some((filename, content_type)) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/apply")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request builds")
}

fn application_request() -> Request<Body> {
    multipart_request(&[
        ("fullName", None, "Katherine Johnson"),
        ("email", None, "katherine@example.com"),
        ("phone", None, "+1 555 0142"),
        ("workMode", None, "Remote"),
        ("position", None, "Data Analyst"),
        ("cv", Some(("kj-resume.pdf", "application/pdf")), "%PDF-1.5 orbital"),
    ])
}

fn mailer(outbox: &Path) -> LettreMailer {
    LettreMailer::from_config(&MailConfig {
        transport: MailTransportConfig::File {
            outbox_dir: outbox.to_path_buf(),
        },
        from_address: "careers@webhub.com".to_string(),
        recipient: "hiring@webhub.com".to_string(),
    })
    .expect("mailer builds")
}

fn store(server: &MockServer) -> SupabaseStore {
    SupabaseStore::new(&SupabaseConfig {
        url: server.uri(),
        api_key: Secret::new("service-key"),
        table: "applications".to_string(),
    })
    .expect("store builds")
}

fn outbox_messages(outbox: &Path) -> Vec<String> {
    std::fs::read_dir(outbox)
        .expect("outbox readable")
        .filter_map(Result::ok)
        .map(|entry| std::fs::read_to_string(entry.path()).expect("message readable"))
        .collect()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}

#[tokio::test]
async fn application_is_mailed_and_recorded() {
    let outbox = tempfile::tempdir().expect("tempdir");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/applications"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let service = CareerApplicationService::new(
        Arc::new(mailer(outbox.path())),
        Arc::new(store(&server)),
    );
    let router = application_router(Arc::new(service), ErrorExposure::Redacted);

    let response = router
        .oneshot(application_request())
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["emailSent"], true);
    assert_eq!(payload["dataSaved"], true);

    let messages = outbox_messages(outbox.path());
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("New Job Application from Katherine Johnson - Data Analyst"));
    assert!(messages[0].contains("kj-resume.pdf"));

    let requests = server.received_requests().await.expect("recording enabled");
    let rows: Value = serde_json::from_slice(&requests[0].body).expect("row json");
    assert_eq!(rows[0]["name"], "Katherine Johnson");
    assert_eq!(rows[0]["mode_of_working"], "Remote");
    assert_eq!(rows[0]["cv_filename"], "kj-resume.pdf");
    assert_eq!(rows[0]["cover_letter_filename"], Value::Null);
    assert_eq!(rows[0]["position"], "Data Analyst");
}

#[tokio::test]
async fn store_outage_still_reports_success() {
    let outbox = tempfile::tempdir().expect("tempdir");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let service = CareerApplicationService::new(
        Arc::new(mailer(outbox.path())),
        Arc::new(store(&server)),
    );
    let router = application_router(Arc::new(service), ErrorExposure::Redacted);

    let response = router
        .oneshot(application_request())
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = json_body(response).await;
    assert_eq!(payload["emailSent"], true);
    assert_eq!(payload["dataSaved"], false);
    assert_eq!(outbox_messages(outbox.path()).len(), 1);
}
