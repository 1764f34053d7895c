//! rulestore Core
//!
//! Types shared across rulestore components.
//!
//! This crate provides:
//! - Error types and result handling
//! - The policy model boundary adapters read from and load into
//! - The policy line loader (`ptype, f0, f1, ...`)

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{load_policy_line, Assertion, Model, POLICY_SECTIONS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::model::{load_policy_line, Assertion, Model};
}
