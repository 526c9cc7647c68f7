//! Careers application intake.
//!
//! A submission flows through the [`policy::DocumentPolicy`] (required fields,
//! CV presence, upload type and size), is composed into a
//! [`notification::ApplicationEmail`] for the careers inbox, and is then
//! recorded through an [`repository::ApplicationStore`]. The e-mail is the
//! success criterion; the record is best-effort.

pub mod domain;
pub mod mailer;
pub mod notification;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;
pub mod supabase;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationForm, ApplicationId, ApplicationSubmission, DocumentSlot, Position,
    UploadedDocument, GENERAL_APPLICATION, TALENT_SUBMISSION,
};
pub use mailer::{ApplicationMailer, DeliveryReceipt, LettreMailer, MailError};
pub use notification::{ApplicationEmail, EmailAttachment};
pub use policy::{
    DocumentPolicy, IntakeViolation, ALLOWED_DOCUMENT_TYPES, MAX_DOCUMENT_BYTES,
};
pub use repository::{
    ApplicationRow, ApplicationStore, DisabledStore, StoreError, StoreProbe,
    APPLICATIONS_TABLE_DDL,
};
pub use router::{application_router, ApplicationAccepted, ErrorBody, ErrorExposure};
pub use service::{
    ApplicationServiceError, CareerApplicationService, IntakeReceipt, PersistenceOutcome,
};
pub use supabase::SupabaseStore;
