//! # Configuration
//!
//! Controller options read from the environment.

mod controller;
mod duration;

pub use controller::{ControllerConfig, LogFormat};
pub use duration::parse_kubernetes_duration;
