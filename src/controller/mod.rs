//! # Controller
//!
//! Glue used by the certificate, issuer and secret reconcilers on top of
//! [`ControllerState`](crate::state::ControllerState).
//!
//! - `renewal`: renewal window classification and overdue tracking
//! - `requests`: quota admission of certificate requests
//! - `revocation`: revoked marks and cleanup of deleted certificates
//! - `secrets`: secret content hashing and issuer fan-out on secret changes

pub mod renewal;
pub mod requests;
pub mod revocation;
pub mod secrets;

pub use renewal::{CertificateValidity, RenewalPolicy};
pub use requests::accept_certificate_request;
pub use revocation::{clear_revoked, forget_certificate, mark_revoked};
pub use secrets::{issuers_to_requeue, secret_changed_for_issuer, secret_hash};
