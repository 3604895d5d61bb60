//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id)
//! - Bearer token extraction from `Authorization` headers
//! - Cryptographic utilities (SHA-1 request signing, Base64)

pub mod bearer;
pub mod crypto;
pub mod password;
