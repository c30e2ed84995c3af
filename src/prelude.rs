//! # Prelude
//!
//! Re-exports commonly used types for convenience.
//!
//! ```rust
//! use cert_management_controller::prelude::*;
//! ```

// State types - the core of the controller
pub use crate::state::{
    ControllerState, ObjectName, ObjectNameSet, QuotaDecision, StateSnapshot,
};

// Reconciler glue
pub use crate::controller::{
    accept_certificate_request, forget_certificate, issuers_to_requeue, mark_revoked,
    secret_hash, CertificateValidity, RenewalPolicy,
};

// Config types
pub use crate::config::{ControllerConfig, LogFormat};

// Common error types
pub use crate::error::{ConfigError, ControllerError};
