//! `khata-identity` — owner and customer records, credentials, one-time codes.
//!
//! Credential material is hashed at rest (argon2id with random salts); this
//! crate never stores or returns plaintext secrets. Authentication decisions
//! themselves live with the callers (`khata-api` services) — this crate only
//! exposes the verification primitives.

pub mod customer;
pub mod otp;
pub mod owner;
pub mod password;

pub use customer::{Customer, NewCustomer};
pub use otp::{otp_ttl, OtpCode, PendingOtp};
pub use owner::{NewOwner, Owner};
pub use password::{hash_password, verify_password};
