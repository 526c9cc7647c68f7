//! Careers application intake for the WebHub agency site.
//!
//! The crate owns configuration, telemetry and the careers workflow (form
//! validation, notification e-mail, record keeping). HTTP wiring beyond the
//! intake routes lives in the `webhub-careers-api` service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
