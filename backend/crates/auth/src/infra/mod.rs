//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod google;
pub mod memory;
pub mod postgres;

pub use google::GoogleIdentityVerifier;
pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
