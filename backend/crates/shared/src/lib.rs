//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the `auth` and `artwork` crates:
//! - Unified error type and result alias ([`error::app_error::AppError`])
//! - Error classification mapped to HTTP status codes ([`error::kind::ErrorKind`])
//! - Typed identifiers stored as text UUIDs ([`id::Id`])
//!
//! Only things with the same meaning in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
