//! # Authentication Library
//!
//! Password hashing and JWT bearer-token issuance/verification.
//!
//! Both halves are deliberately storage-agnostic: the identity store hands
//! in plaintext and hashes, the web layer hands in tokens and secrets.

pub mod pwd;
pub mod token;

// Re-export commonly used types
pub use pwd::{hash_password, verify_password, MIN_PASSWORD_LEN};
pub use token::{decode_jwt, encode_jwt, Claims, TokenCodec};
