//! Configuration types
//!
//! Board-agnostic configuration structures. The host collaborator persists
//! them as postcard binary data (behind the `serde` feature); the core
//! treats them as read-only.

pub mod types;

pub use types::*;
