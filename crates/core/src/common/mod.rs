//! Shared, cross-module primitives.
//!
//! This module performs:
//! 1. Definition of the default buffer-size constants used by [`crate::config`].
//! 2. Definition of the engine's error and result-code types.

pub mod constants;
pub mod error;

pub use constants::*;
pub use error::{EngineError, ResultCode, StepOutcome, StepResult};
