//! Wire-format types for the HTTP JSON surface.
//!
//! # Responsibility
//! - Define the explicit mapping from storage records to JSON responses.
//! - Parse client input leniently where the API contract demands defaults
//!   instead of errors.

use phonebook_core::{
    Contact, ContactDraft, ContactListQuery, ContactPage, DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// JSON-safe `{id, name, phone}` representation of one contact.
#[derive(Debug, Clone, Serialize)]
pub struct ContactView {
    pub id: i64,
    pub name: String,
    pub phone: String,
}

impl From<Contact> for ContactView {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            phone: contact.phone,
        }
    }
}

/// One listing page plus navigation metadata.
///
/// `prevNum`/`nextNum` are omitted entirely when there is no neighbouring
/// page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPageView {
    pub contacts: Vec<ContactView>,
    pub total: u64,
    pub pages: u32,
    pub page: u32,
    pub has_prev: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_num: Option<u32>,
}

impl From<ContactPage> for ContactPageView {
    fn from(page: ContactPage) -> Self {
        Self {
            total: page.total,
            pages: page.pages(),
            page: page.page,
            has_prev: page.has_prev(),
            has_next: page.has_next(),
            prev_num: page.prev_num(),
            next_num: page.next_num(),
            contacts: page.contacts.into_iter().map(ContactView::from).collect(),
        }
    }
}

/// Create/update request body. Both fields are required by validation, but
/// deserialization tolerates their absence so the API can answer with the
/// contract's invalid-input error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl ContactPayload {
    /// Missing fields become empty strings, which the draft validation
    /// reports as invalid input.
    pub fn into_draft(self) -> ContactDraft {
        ContactDraft::new(self.name.unwrap_or_default(), self.phone.unwrap_or_default())
    }
}

/// Builds a list query from raw `page`/`perPage` query parameters.
///
/// Missing, non-integer, and below-range values all fall back to the
/// defaults; this path never produces an error.
pub fn list_query_from_params(params: &HashMap<String, String>) -> ContactListQuery {
    ContactListQuery {
        page: lenient_param(params.get("page"), DEFAULT_PAGE),
        per_page: lenient_param(params.get("perPage"), DEFAULT_PER_PAGE),
    }
}

fn lenient_param(value: Option<&String>, fallback: u32) -> u32 {
    value
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|parsed| *parsed >= 1)
        .unwrap_or(fallback)
}
