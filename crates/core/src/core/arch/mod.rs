//! Architectural state: register files and the condition-flag word.
//!
//! This module performs:
//! 1. The 32-bit flag word with named-bit accessors ([`flags`]).
//! 2. The 64-lane integer register file ([`gpr`]).
//! 3. The aliased float/double/vector register file ([`fpr`]).

pub mod flags;
pub mod fpr;
pub mod gpr;

pub use flags::{CompareTag, Flags};
pub use fpr::{FloatRegisterFile, Vector4f};
pub use gpr::IntegerRegisterFile;
