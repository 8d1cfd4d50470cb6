//! HTTP transport for the phonebook service.
//!
//! # Responsibility
//! - Expose contact CRUD over an axum router.
//! - Map storage records and repository errors onto the JSON wire surface.
//!
//! # Invariants
//! - This crate holds no domain logic; every operation goes through
//!   `phonebook_core`'s service/repository contracts.

pub mod error;
pub mod http;
pub mod state;
pub mod wire;

pub use http::build_router;
pub use state::AppState;
