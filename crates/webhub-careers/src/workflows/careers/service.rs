use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::domain::{ApplicationForm, ApplicationId};
use super::mailer::{ApplicationMailer, DeliveryReceipt, MailError};
use super::notification::ApplicationEmail;
use super::policy::{DocumentPolicy, IntakeViolation};
use super::repository::{ApplicationRow, ApplicationStore, StoreError, StoreProbe};

/// Outcome of the best-effort write that follows a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceOutcome {
    Saved,
    Failed { reason: String },
}

impl PersistenceOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceOutcome::Saved)
    }
}

/// Success-path result. Holding one means the careers inbox accepted the e-mail;
/// persistence is reported independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub application_id: ApplicationId,
    pub delivery: DeliveryReceipt,
    pub persistence: PersistenceOutcome,
}

/// Orders the intake steps: validation, dispatch, persistence, then id generation.
pub struct CareerApplicationService<M, S> {
    policy: DocumentPolicy,
    mailer: Arc<M>,
    store: Arc<S>,
}

impl<M, S> CareerApplicationService<M, S>
where
    M: ApplicationMailer + 'static,
    S: ApplicationStore + 'static,
{
    pub fn new(mailer: Arc<M>, store: Arc<S>) -> Self {
        Self::with_policy(DocumentPolicy::standard(), mailer, store)
    }

    pub fn with_policy(policy: DocumentPolicy, mailer: Arc<M>, store: Arc<S>) -> Self {
        Self {
            policy,
            mailer,
            store,
        }
    }

    pub fn policy(&self) -> &DocumentPolicy {
        &self.policy
    }

    pub fn mail_backend(&self) -> &'static str {
        self.mailer.backend()
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Validate, notify the careers inbox, then record the application.
    ///
    /// Dispatch failures abort before anything is written. Store failures are
    /// logged and reported through [`PersistenceOutcome::Failed`].
    pub async fn submit(
        &self,
        form: ApplicationForm,
    ) -> Result<IntakeReceipt, ApplicationServiceError> {
        let submission = self.policy.validate(form)?;
        info!(
            applicant = %submission.full_name,
            position = %submission.position,
            attachments = submission.documents().count(),
            "processing application"
        );

        let email = ApplicationEmail::compose(&submission);
        let delivery = match self.mailer.dispatch(&email).await {
            Ok(delivery) => delivery,
            Err(err) => {
                error!(error = %err, "application e-mail dispatch failed");
                return Err(err.into());
            }
        };
        info!(recipient = %delivery.recipient, "application e-mail sent");

        let row = ApplicationRow::from_submission(&submission, Utc::now());
        let persistence = match self.store.insert(&row).await {
            Ok(()) => {
                info!("application saved");
                PersistenceOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, "e-mail sent but application record was not saved");
                PersistenceOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        Ok(IntakeReceipt {
            application_id: ApplicationId::generate(),
            delivery,
            persistence,
        })
    }

    /// Connectivity check against the backing table.
    pub async fn probe_store(&self) -> Result<StoreProbe, StoreError> {
        self.store.probe().await
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Mail(#[from] MailError),
}
