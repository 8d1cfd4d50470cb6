//! Shared server state and the per-request unit of work.
//!
//! # Invariants
//! - The connection mutex is never held across an await point.
//! - Every storage operation runs inside exactly one transaction.

use phonebook_core::{ContactService, RepoResult, SqliteContactRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, PoisonError};

/// Handler-visible application state.
///
/// The only cross-request resource is the storage connection; the service
/// itself stays stateless between requests.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps an already-migrated connection (see `phonebook_core::db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one contact operation as a transaction-scoped unit of work.
    ///
    /// Commits when `op` succeeds. On any error path the transaction is
    /// dropped and rolls back, so a failed request leaves no partial state.
    pub fn with_contacts<T, F>(&self, op: F) -> RepoResult<T>
    where
        F: FnOnce(&ContactService<SqliteContactRepository<'_>>) -> RepoResult<T>,
    {
        let mut conn = self.db.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn.transaction()?;
        let service = ContactService::new(SqliteContactRepository::try_new(&tx)?);
        let value = op(&service)?;
        tx.commit()?;
        Ok(value)
    }
}
