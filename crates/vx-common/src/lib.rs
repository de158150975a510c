//! Ventex common types, IDs, and errors.
//!
//! This crate provides foundational types shared across vx-* crates:
//! - Stay/subject/item identity newtypes
//! - Run identifiers for log and manifest correlation
//! - The unified error type with stable error codes
//! - Output schema versioning

pub mod error;
pub mod id;
pub mod schema;

pub use error::{Error, Result};
pub use id::{ItemId, RunId, StayId, SubjectId};
pub use schema::SCHEMA_VERSION;
