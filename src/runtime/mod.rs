//! # Runtime
//!
//! - `initialization`: startup and shutdown of the controller components
//! - `logging`: tracing subscriber setup

pub mod initialization;
pub mod logging;

pub use initialization::{initialize, start, Runtime};
pub use logging::init_tracing;
