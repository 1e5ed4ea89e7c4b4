//! `khata-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod code;
pub mod error;
pub mod id;

pub use code::{CustomerCode, ShopCode};
pub use error::{DomainError, DomainResult};
pub use id::{CustomerId, OwnerId};
