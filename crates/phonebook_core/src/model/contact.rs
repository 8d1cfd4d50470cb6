//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical contact record and its pre-persistence draft.
//! - Validate presence of required fields before any write.
//!
//! # Invariants
//! - `id` is assigned by the store, is strictly increasing and never reused.
//! - `name` and `phone` are non-empty; `phone` is globally unique (the
//!   uniqueness itself is enforced by the storage layer).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a persisted contact.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ContactId = i64;

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Store-assigned identity. Immutable for the record lifetime.
    pub id: ContactId,
    pub name: String,
    pub phone: String,
}

/// Contact fields supplied by a caller before an identity exists.
///
/// Used for both create and full-replacement update, which share the same
/// validation contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub phone: String,
}

/// Validation failure for contact input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactValidationError {
    EmptyName,
    EmptyPhone,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "contact name must not be empty"),
            Self::EmptyPhone => write!(f, "contact phone must not be empty"),
        }
    }
}

impl Error for ContactValidationError {}

impl ContactDraft {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
        }
    }

    /// Checks that both required fields are present.
    ///
    /// # Contract
    /// - Every repository write path must call this before SQL mutations.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.is_empty() {
            return Err(ContactValidationError::EmptyName);
        }
        if self.phone.is_empty() {
            return Err(ContactValidationError::EmptyPhone);
        }
        Ok(())
    }
}
