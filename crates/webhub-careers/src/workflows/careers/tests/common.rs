use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;

use crate::workflows::careers::domain::{ApplicationForm, UploadedDocument};
use crate::workflows::careers::mailer::{ApplicationMailer, DeliveryReceipt, MailError};
use crate::workflows::careers::notification::ApplicationEmail;
use crate::workflows::careers::repository::{
    ApplicationRow, ApplicationStore, StoreError, StoreProbe,
};
use crate::workflows::careers::{application_router, CareerApplicationService, ErrorExposure};

pub(super) const PDF: &str = "application/pdf";
pub(super) const DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub(super) fn document(filename: &str, content_type: &str, bytes: &[u8]) -> UploadedDocument {
    UploadedDocument {
        filename: filename.to_string(),
        content_type: Some(content_type.to_string()),
        bytes: bytes.to_vec(),
    }
}

pub(super) fn cv() -> UploadedDocument {
    document("grace-hopper-cv.pdf", PDF, b"%PDF-1.7 compiler pioneer")
}

pub(super) fn cover_letter() -> UploadedDocument {
    document("cover-letter.docx", DOCX, b"PK\x03\x04 cover letter")
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        full_name: Some("Grace Hopper".to_string()),
        email: Some("grace@example.com".to_string()),
        phone: Some("+1 555 0100".to_string()),
        work_mode: Some("Hybrid".to_string()),
        message: Some("Happy to relocate.".to_string()),
        position: Some("Backend Engineer".to_string()),
        cv: Some(cv()),
        cover_letter: Some(cover_letter()),
    }
}

#[derive(Default)]
pub(super) struct MemoryMailer {
    sent: Mutex<Vec<ApplicationEmail>>,
}

impl MemoryMailer {
    pub(super) fn sent(&self) -> Vec<ApplicationEmail> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl ApplicationMailer for MemoryMailer {
    async fn dispatch(&self, email: &ApplicationEmail) -> Result<DeliveryReceipt, MailError> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(email.clone());
        Ok(DeliveryReceipt {
            recipient: "careers@webhub.com".to_string(),
            attachments: email.attachments.len(),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Mailer whose relay always refuses, optionally with an attachment-policy error.
pub(super) struct FailingMailer {
    pub(super) policy_violation: bool,
}

#[async_trait]
impl ApplicationMailer for FailingMailer {
    async fn dispatch(&self, email: &ApplicationEmail) -> Result<DeliveryReceipt, MailError> {
        if self.policy_violation {
            let attachment = &email.attachments[0];
            return Err(MailError::InvalidAttachment {
                filename: attachment.filename.clone(),
                content_type: attachment.content_type.clone(),
            });
        }
        Err(MailError::Transport(
            "send SMTP email: connection refused".to_string(),
        ))
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<Vec<ApplicationRow>>,
}

impl MemoryStore {
    pub(super) fn rows(&self) -> Vec<ApplicationRow> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn insert(&self, row: &ApplicationRow) -> Result<(), StoreError> {
        self.rows
            .lock()
            .expect("store mutex poisoned")
            .push(row.clone());
        Ok(())
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        Ok(StoreProbe {
            table: "applications".to_string(),
            row_count: Some(self.rows().len() as u64),
        })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

pub(super) struct UnavailableStore;

#[async_trait]
impl ApplicationStore for UnavailableStore {
    async fn insert(&self, _row: &ApplicationRow) -> Result<(), StoreError> {
        Err(StoreError::Transport("connection reset by peer".to_string()))
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        Err(StoreError::MissingTable("applications".to_string()))
    }

    fn backend(&self) -> &'static str {
        "unavailable"
    }
}

pub(super) fn build_service() -> (
    CareerApplicationService<MemoryMailer, MemoryStore>,
    Arc<MemoryMailer>,
    Arc<MemoryStore>,
) {
    let mailer = Arc::new(MemoryMailer::default());
    let store = Arc::new(MemoryStore::default());
    let service = CareerApplicationService::new(mailer.clone(), store.clone());
    (service, mailer, store)
}

pub(super) fn router_for<M, S>(service: CareerApplicationService<M, S>) -> axum::Router
where
    M: ApplicationMailer + 'static,
    S: ApplicationStore + 'static,
{
    application_router(Arc::new(service), ErrorExposure::Redacted)
}

const BOUNDARY: &str = "----webhub-careers-boundary";

/// Hand-assembled `multipart/form-data` body.
#[derive(Default)]
pub(super) struct MultipartBody {
    buffer: Vec<u8>,
}

impl MultipartBody {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn text(mut self, name: &str, value: &str) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub(super) fn file(
        mut self,
        name: &str,
        filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.buffer.extend_from_slice(bytes);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    pub(super) fn applicant_fields(self) -> Self {
        self.text("fullName", "Grace Hopper")
            .text("email", "grace@example.com")
            .text("phone", "+1 555 0100")
            .text("workMode", "Hybrid")
    }

    pub(super) fn into_request(mut self) -> Request<Body> {
        self.buffer
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post("/apply")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.buffer))
            .expect("request builds")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json")
}
