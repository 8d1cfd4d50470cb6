//! Contact use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for transport-layer callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::contact::{Contact, ContactDraft, ContactId};
use crate::repo::contact_repo::{ContactListQuery, ContactPage, ContactRepository, RepoResult};

/// Use-case service wrapper for contact CRUD operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new contact and returns it with its assigned identity.
    ///
    /// Returns repository-level validation or duplicate-phone errors
    /// unchanged.
    pub fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact> {
        self.repo.create_contact(draft)
    }

    /// Gets one contact by stable id.
    pub fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.repo.get_contact(id)
    }

    /// Lists one page of contacts with pagination metadata.
    pub fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<ContactPage> {
        self.repo.list_contacts(query)
    }

    /// Replaces an existing contact's fields wholesale.
    pub fn update_contact(&self, id: ContactId, draft: &ContactDraft) -> RepoResult<()> {
        self.repo.update_contact(id, draft)
    }

    /// Permanently deletes a contact by id.
    pub fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        self.repo.delete_contact(id)
    }
}
