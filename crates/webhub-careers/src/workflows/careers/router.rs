use std::sync::Arc;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        DefaultBodyLimit, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, warn};

use super::domain::{ApplicationForm, DocumentSlot, UploadedDocument};
use super::mailer::ApplicationMailer;
use super::policy::{DocumentPolicy, IntakeViolation};
use super::repository::ApplicationStore;
use super::service::{ApplicationServiceError, CareerApplicationService, IntakeReceipt};
use crate::config::AppEnvironment;

pub const APPLICATION_ACCEPTED: &str = "Application submitted successfully!";
const DISPATCH_FAILED: &str = "Failed to process application";
const REDACTED_DETAILS: &str = "Internal server error";

/// Whether internal failure messages are echoed back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorExposure {
    Detailed,
    Redacted,
}

impl ErrorExposure {
    pub fn for_environment(environment: AppEnvironment) -> Self {
        if environment.exposes_error_details() {
            Self::Detailed
        } else {
            Self::Redacted
        }
    }

    fn details(self, err: &impl std::fmt::Display) -> String {
        match self {
            Self::Detailed => err.to_string(),
            Self::Redacted => REDACTED_DETAILS.to_string(),
        }
    }
}

/// `200` payload for `/apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAccepted {
    pub message: String,
    pub application_id: String,
    pub email_sent: bool,
    pub data_saved: bool,
}

impl From<&IntakeReceipt> for ApplicationAccepted {
    fn from(receipt: &IntakeReceipt) -> Self {
        Self {
            message: APPLICATION_ACCEPTED.to_string(),
            application_id: receipt.application_id.0.clone(),
            email_sent: true,
            data_saved: receipt.persistence.is_saved(),
        }
    }
}

/// `4xx`/`5xx` payload shared by the intake routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

struct IntakeState<M, S> {
    service: Arc<CareerApplicationService<M, S>>,
    exposure: ErrorExposure,
}

impl<M, S> Clone for IntakeState<M, S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            exposure: self.exposure,
        }
    }
}

/// Router builder exposing the careers intake and store diagnostic endpoints.
pub fn application_router<M, S>(
    service: Arc<CareerApplicationService<M, S>>,
    exposure: ErrorExposure,
) -> Router
where
    M: ApplicationMailer + 'static,
    S: ApplicationStore + 'static,
{
    let body_limit = service.policy().request_limit();
    Router::new()
        .route("/apply", post(apply_handler::<M, S>))
        .route("/test-supabase", get(store_probe_handler::<M, S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(IntakeState { service, exposure })
}

async fn apply_handler<M, S>(
    State(state): State<IntakeState<M, S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response
where
    M: ApplicationMailer + 'static,
    S: ApplicationStore + 'static,
{
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            return violation_response(IntakeViolation::MalformedPayload(rejection.body_text()))
        }
    };

    let form = match read_application_form(multipart, state.service.policy()).await {
        Ok(form) => form,
        Err(violation) => return violation_response(violation),
    };

    match state.service.submit(form).await {
        Ok(receipt) => (StatusCode::OK, Json(ApplicationAccepted::from(&receipt))).into_response(),
        Err(ApplicationServiceError::Intake(violation)) => violation_response(violation),
        Err(ApplicationServiceError::Mail(err)) if err.is_policy_violation() => error_response(
            StatusCode::BAD_REQUEST,
            ErrorBody {
                error: err.to_string(),
                details: None,
            },
        ),
        Err(ApplicationServiceError::Mail(err)) => {
            error!(error = %err, "error processing application");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: DISPATCH_FAILED.to_string(),
                    details: Some(state.exposure.details(&err)),
                },
            )
        }
    }
}

async fn store_probe_handler<M, S>(State(state): State<IntakeState<M, S>>) -> Response
where
    M: ApplicationMailer + 'static,
    S: ApplicationStore + 'static,
{
    match state.service.probe_store().await {
        Ok(probe) => {
            let payload = json!({
                "message": "Supabase connection successful",
                "table": probe.table,
                "count": probe.row_count,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody {
                error: "Supabase connection failed".to_string(),
                details: Some(err.to_string()),
            },
        ),
    }
}

/// Reads every part, enforcing type and size limits while files stream in.
async fn read_application_form(
    mut multipart: Multipart,
    policy: &DocumentPolicy,
) -> Result<ApplicationForm, IntakeViolation> {
    let mut form = ApplicationForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_violation)? {
        let name = field.name().unwrap_or_default().to_string();
        let Some(filename) = field.file_name().map(str::to_string) else {
            let value = field.text().await.map_err(multipart_violation)?;
            form.set_text(&name, value);
            continue;
        };

        // Untouched file inputs arrive as parts with an empty filename.
        if filename.is_empty() {
            continue;
        }

        let slot = DocumentSlot::from_field(&name)
            .ok_or_else(|| IntakeViolation::UnexpectedFile(name.clone()))?;
        if form.document(slot).is_some() {
            return Err(IntakeViolation::UnexpectedFile(name));
        }

        let content_type = field.content_type().map(str::to_string);
        policy.check_type(slot, content_type.as_deref())?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_violation)? {
            policy.check_size(slot, bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }

        form.attach(
            slot,
            UploadedDocument {
                filename,
                content_type,
                bytes,
            },
        );
    }

    Ok(form)
}

fn multipart_violation(err: MultipartError) -> IntakeViolation {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IntakeViolation::FileTooLarge { field: None }
    } else {
        IntakeViolation::MalformedPayload(err.body_text())
    }
}

fn violation_response(violation: IntakeViolation) -> Response {
    warn!(error = %violation, "rejecting application");
    error_response(
        StatusCode::BAD_REQUEST,
        ErrorBody {
            error: violation.to_string(),
            details: violation.details(),
        },
    )
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}
