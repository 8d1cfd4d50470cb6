//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `contacts` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `ContactDraft::validate()` before SQL mutations.
//! - Phone uniqueness is enforced solely by the storage constraint; the
//!   repository only translates the constraint failure, it never
//!   pre-checks.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::{migrations, DbError};
use crate::model::contact::{Contact, ContactDraft, ContactId, ContactValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT id, name, phone FROM contacts";

/// Default page number when the caller supplies none.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the caller supplies none.
pub const DEFAULT_PER_PAGE: u32 = 5;

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    /// The given phone value is already owned by another contact.
    DuplicatePhone(String),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::DuplicatePhone(phone) => {
                write!(f, "phone number already exists: `{phone}`")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted contact data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactListQuery {
    /// 1-based page number.
    pub page: u32,
    /// Page size. Values below 1 normalize to [`DEFAULT_PER_PAGE`].
    pub per_page: u32,
}

impl Default for ContactListQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ContactListQuery {
    /// Replaces out-of-domain values (zero) with the documented defaults.
    pub fn normalized(self) -> Self {
        Self {
            page: if self.page >= 1 { self.page } else { DEFAULT_PAGE },
            per_page: if self.per_page >= 1 {
                self.per_page
            } else {
                DEFAULT_PER_PAGE
            },
        }
    }
}

/// One page of contacts plus the totals needed for pagination metadata.
///
/// Navigation values (`pages`, `has_prev`, ...) are derived here so every
/// caller reports the same arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPage {
    /// Records on this page, in insertion (`id`) order.
    pub contacts: Vec<Contact>,
    /// Total records in the store.
    pub total: u64,
    /// 1-based page number this page was fetched with.
    pub page: u32,
    /// Page size this page was fetched with. Always >= 1.
    pub per_page: u32,
}

impl ContactPage {
    /// Total page count: `ceil(total / per_page)`, 0 for an empty store.
    pub fn pages(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        u32::try_from(self.total.div_ceil(per_page)).unwrap_or(u32::MAX)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// Previous page number, absent on the first page.
    pub fn prev_num(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    /// Next page number, absent on (or past) the last page.
    pub fn next_num(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Persists a new contact and returns it with its assigned identity.
    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact>;
    /// Gets one contact by id.
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists one page of contacts in insertion order.
    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<ContactPage>;
    /// Replaces `name` and `phone` wholesale for an existing contact.
    fn update_contact(&self, id: ContactId, draft: &ContactDraft) -> RepoResult<()>;
    /// Permanently removes a contact.
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, draft: &ContactDraft) -> RepoResult<Contact> {
        draft.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO contacts (name, phone) VALUES (?1, ?2);",
            params![draft.name.as_str(), draft.phone.as_str()],
        );
        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(RepoError::DuplicatePhone(draft.phone.clone()));
            }
            return Err(err.into());
        }

        Ok(Contact {
            id: self.conn.last_insert_rowid(),
            name: draft.name.clone(),
            phone: draft.phone.clone(),
        })
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query(params![id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }

        Ok(None)
    }

    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<ContactPage> {
        let query = query.normalized();

        let total = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| {
                row.get::<_, u64>(0)
            })?;

        let offset = (i64::from(query.page) - 1) * i64::from(query.per_page);
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![i64::from(query.per_page), offset])?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }

        Ok(ContactPage {
            contacts,
            total,
            page: query.page,
            per_page: query.per_page,
        })
    }

    fn update_contact(&self, id: ContactId, draft: &ContactDraft) -> RepoResult<()> {
        draft.validate()?;

        let changed = self.conn.execute(
            "UPDATE contacts SET name = ?2, phone = ?3 WHERE id = ?1;",
            params![id, draft.name.as_str(), draft.phone.as_str()],
        );
        let changed = match changed {
            Ok(changed) => changed,
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicatePhone(draft.phone.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let contact = Contact {
        id: row.get("id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
    };

    if contact.name.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name in contacts row id={}",
            contact.id
        )));
    }
    if contact.phone.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty phone in contacts row id={}",
            contact.id
        )));
    }

    Ok(contact)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version =
        conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let expected_version = migrations::latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "contacts")? {
        return Err(RepoError::MissingRequiredTable("contacts"));
    }

    for column in ["id", "name", "phone"] {
        if !table_has_column(conn, "contacts", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "contacts",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        params![table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM pragma_table_info(?1)
            WHERE name = ?2
        );",
        params![table, column],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
