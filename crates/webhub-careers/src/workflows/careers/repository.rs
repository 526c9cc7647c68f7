use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ApplicationSubmission;

/// Schema expected behind the store, printed by the `check-store` command.
pub const APPLICATIONS_TABLE_DDL: &str = "CREATE TABLE applications (
  id SERIAL PRIMARY KEY,
  name VARCHAR(255) NOT NULL,
  email VARCHAR(255) NOT NULL,
  phone VARCHAR(50) NOT NULL,
  mode_of_working VARCHAR(50) NOT NULL,
  message TEXT,
  cv_filename VARCHAR(255) NOT NULL,
  cover_letter_filename VARCHAR(255),
  position VARCHAR(255),
  created_at TIMESTAMP DEFAULT NOW()
);";

/// Row written to the hosted `applications` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub mode_of_working: String,
    pub message: Option<String>,
    pub cv_filename: String,
    pub cover_letter_filename: Option<String>,
    pub position: String,
    pub created_at: String,
}

impl ApplicationRow {
    pub fn from_submission(submission: &ApplicationSubmission, created_at: DateTime<Utc>) -> Self {
        Self {
            name: submission.full_name.clone(),
            email: submission.email.clone(),
            phone: submission.phone.clone(),
            mode_of_working: submission.work_mode.clone(),
            message: submission.message.clone(),
            cv_filename: submission.cv.filename.clone(),
            cover_letter_filename: submission
                .cover_letter
                .as_ref()
                .map(|document| document.filename.clone()),
            position: submission.position.label().to_string(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Result of the diagnostic connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreProbe {
    pub table: String,
    pub row_count: Option<u64>,
}

/// Persistence abstraction for submitted applications. Writes are best-effort.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, row: &ApplicationRow) -> Result<(), StoreError>;
    async fn probe(&self) -> Result<StoreProbe, StoreError>;

    /// Short label reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("application store is not configured")]
    Unconfigured,
    #[error("table '{0}' does not exist")]
    MissingTable(String),
    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("store unavailable: {0}")]
    Transport(String),
}

/// Stand-in used when no store credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

#[async_trait]
impl ApplicationStore for DisabledStore {
    async fn insert(&self, _row: &ApplicationRow) -> Result<(), StoreError> {
        Err(StoreError::Unconfigured)
    }

    async fn probe(&self) -> Result<StoreProbe, StoreError> {
        Err(StoreError::Unconfigured)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}
