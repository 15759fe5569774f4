//! Credential entries held inside an unlocked vault.
//!
//! Entries only exist as part of the decrypted payload; they are never
//! written to disk on their own.  Every string an entry owns is wiped
//! when the entry is dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::mem;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::errors::{PassVaultError, Result};

/// Stable identifier of an entry, independent of its (renamable) name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub(crate) fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// How a caller points at an entry: by exact name or by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKey<'a> {
    Name(&'a str),
    Id(EntryId),
}

impl<'a> From<&'a str> for EntryKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for EntryKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<EntryId> for EntryKey<'_> {
    fn from(id: EntryId) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for EntryKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A single credential: service name, optional username, secret fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,

    /// Service name (e.g. "Email").  Unique within a vault, case-sensitive.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Secret fields by name, e.g. `"password" -> "hunter2"`.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    pub(crate) fn new(
        name: &str,
        username: Option<&str>,
        fields: BTreeMap<String, String>,
    ) -> Result<Self> {
        validate_name(name)?;
        validate_fields(&fields)?;

        let now = Utc::now();
        Ok(Self {
            id: EntryId::random(),
            name: name.to_string(),
            username: username.map(str::to_string),
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    /// Convenience accessor for a single field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Does `key` designate this entry?
    pub(crate) fn matches(&self, key: &EntryKey<'_>) -> bool {
        match key {
            EntryKey::Name(name) => self.name == *name,
            EntryKey::Id(id) => self.id == *id,
        }
    }

    /// Metadata view without any secret field value.
    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            field_names: self.fields.keys().cloned().collect(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Field values are secrets: keep them out of debug output.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.username == other.username
            && self.fields == other.fields
            && self.created_at == other.created_at
            && self.updated_at == other.updated_at
    }
}

impl Eq for Entry {}

impl Zeroize for Entry {
    fn zeroize(&mut self) {
        self.name.zeroize();
        self.username.zeroize();
        // Map keys cannot be mutated in place; take the map apart.
        for (mut key, mut value) in mem::take(&mut self.fields) {
            key.zeroize();
            value.zeroize();
        }
    }
}

impl Drop for Entry {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Lightweight metadata about an entry (no secret values).
///
/// Returned by `VaultSession::list_entries` so front-ends can display
/// entries without touching any field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub id: EntryId,
    pub name: String,
    pub username: Option<String>,
    pub field_names: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A set of changes to apply to one entry.
///
/// Built with the chained setters; anything not set is left alone.
#[derive(Default, Clone)]
pub struct EntryUpdate {
    pub(crate) rename: Option<String>,
    pub(crate) username: Option<Option<String>>,
    pub(crate) set_fields: BTreeMap<String, String>,
    pub(crate) remove_fields: Vec<String>,
}

impl EntryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rename(mut self, name: impl Into<String>) -> Self {
        self.rename = Some(name.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(Some(username.into()));
        self
    }

    pub fn clear_username(mut self) -> Self {
        self.username = Some(None);
        self
    }

    pub fn set_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_fields.insert(name.into(), value.into());
        self
    }

    pub fn remove_field(mut self, name: impl Into<String>) -> Self {
        self.remove_fields.push(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rename.is_none()
            && self.username.is_none()
            && self.set_fields.is_empty()
            && self.remove_fields.is_empty()
    }

    /// Check everything that can be checked without the other entries.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(name) = &self.rename {
            validate_name(name)?;
        }
        validate_fields(&self.set_fields)
    }

    /// Apply to `entry`.  Call `validate` first.
    ///
    /// Every replaced or removed string is wiped before it is freed.
    pub(crate) fn apply_to(self, entry: &mut Entry) {
        for mut old in self.swap_into(entry) {
            old.zeroize();
        }
    }

    /// Apply the changes and hand back every string they displaced.
    fn swap_into(self, entry: &mut Entry) -> Vec<String> {
        let EntryUpdate {
            rename,
            username,
            set_fields,
            remove_fields,
        } = self;
        let mut displaced = Vec::new();

        if let Some(name) = rename {
            displaced.push(mem::replace(&mut entry.name, name));
        }
        if let Some(username) = username {
            displaced.extend(mem::replace(&mut entry.username, username));
        }
        for name in remove_fields {
            if let Some((key, value)) = entry.fields.remove_entry(&name) {
                displaced.push(key);
                displaced.push(value);
            }
            displaced.push(name);
        }
        for (name, value) in set_fields {
            displaced.extend(entry.fields.insert(name, value));
        }

        entry.updated_at = Utc::now();
        displaced
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PassVaultError::InvalidEntry(
            "entry name cannot be empty".into(),
        ));
    }
    Ok(())
}

fn validate_fields(fields: &BTreeMap<String, String>) -> Result<()> {
    if fields.keys().any(|k| k.trim().is_empty()) {
        return Err(PassVaultError::InvalidEntry(
            "field names cannot be empty".into(),
        ));
    }
    Ok(())
}
