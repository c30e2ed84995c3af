//! Cert Management Controller Library
//!
//! In-memory state shared by the reconcilers of a certificate management
//! controller: which certificates belong to which issuer, which secrets
//! issuers authenticate with, per-issuer daily request quotas and the sets of
//! renewal overdue and revoked certificates. Around it sit configuration,
//! Prometheus metrics, an HTTP server for probes and diagnostics, and the
//! process runtime.
//!
//! ## Quick Start
//!
//! ```rust
//! use cert_management_controller::prelude::*;
//!
//! let state = ControllerState::new(10_000);
//! let issuer = ObjectName::new("default", "letsencrypt");
//! state.add_certificate_assoc(&issuer, &ObjectName::new("default", "web"));
//! assert_eq!(state.certificate_count_for_issuer(&issuer), 1);
//! ```

pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod observability;
pub mod prelude;
pub mod runtime;
pub mod server;
pub mod state;
