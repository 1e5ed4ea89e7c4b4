//! `khata-auth` — session principals and token plumbing.
//!
//! The ledger core never re-validates credentials; it trusts the
//! owner/customer identity carried in a verified session token. This crate
//! owns the claims model, the deterministic claims checks, and the HS256
//! signer the API layer uses to mint and verify bearer tokens.

pub mod claims;
pub mod token;

pub use claims::{validate_claims, Principal, SessionClaims, TokenValidationError};
pub use token::{Hs256SessionSigner, TokenError};
