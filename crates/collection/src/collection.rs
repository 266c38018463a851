use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{CollectionError, Result};
use crate::models::{fields, EnumKind, EnumTable, FieldValue, IssueRecord, UserRecord};
use crate::modules::ModuleGuesser;

const ISSUES_KEY: &str = "issues";
const USERS_KEY: &str = "users";

/// Everything known about the tracker for one run: issues by id, users by
/// id and the nine enumeration tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueCollection {
    pub issues: BTreeMap<i64, IssueRecord>,
    pub users: BTreeMap<String, UserRecord>,
    enums: BTreeMap<EnumKind, EnumTable>,
}

impl IssueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enum_table(&self, kind: EnumKind) -> Option<&EnumTable> {
        self.enums.get(&kind)
    }

    /// A kind counts as cached only when its table has at least one entry.
    pub fn has_enum(&self, kind: EnumKind) -> bool {
        self.enums.get(&kind).is_some_and(|table| !table.is_empty())
    }

    /// Installs the table for `kind`. An empty table clears the kind, so an
    /// empty listing is refetched on the next run.
    pub fn set_enum(&mut self, kind: EnumKind, table: EnumTable) {
        if table.is_empty() {
            self.enums.remove(&kind);
        } else {
            self.enums.insert(kind, table);
        }
    }

    /// Human label for `value` if the kind's table knows it.
    pub fn label(&self, kind: EnumKind, value: &FieldValue) -> Option<&str> {
        self.enums
            .get(&kind)
            .and_then(|table| table.get(&value.canonical()))
            .map(String::as_str)
    }

    /// Inserts or replaces the record for `id`, returning the previous one.
    pub fn insert_issue(&mut self, id: i64, record: IssueRecord) -> Option<IssueRecord> {
        self.issues.insert(id, record)
    }

    /// Adds an empty user record unless `id` is already known. Existing
    /// records are never overwritten.
    pub fn seed_user(&mut self, id: impl Into<String>) -> bool {
        let mut inserted = false;
        self.users.entry(id.into()).or_insert_with(|| {
            inserted = true;
            UserRecord::default()
        });
        inserted
    }

    /// Drops every issue with a message count of exactly zero. Returns how
    /// many were removed.
    pub fn discard_spam(&mut self) -> usize {
        let before = self.issues.len();
        self.issues.retain(|_, issue| issue.message_count() != Some(0.0));
        before - self.issues.len()
    }

    /// Stores the guesser's label as the `module` field of every issue; an
    /// issue without a guess gets an empty module.
    pub fn guess_modules(&mut self, guesser: &dyn ModuleGuesser) {
        for issue in self.issues.values_mut() {
            let module = guesser.guess(issue).unwrap_or_default();
            issue.insert(fields::MODULE, FieldValue::Text(module));
        }
    }

    pub fn as_json(&self) -> Result<Value> {
        let mut doc = Map::new();
        doc.insert(ISSUES_KEY.to_string(), serde_json::to_value(&self.issues)?);
        doc.insert(USERS_KEY.to_string(), serde_json::to_value(&self.users)?);
        for kind in EnumKind::ALL {
            let table = self.enums.get(&kind).cloned().unwrap_or_default();
            doc.insert(kind.as_str().to_string(), serde_json::to_value(table)?);
        }
        Ok(Value::Object(doc))
    }

    /// Rebuilds a collection from `as_json` output. Absent keys yield empty
    /// parts; a key holding the wrong shape is an error.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut doc) = value else {
            return Err(CollectionError::NotAnObject);
        };

        let issues = take(&mut doc, ISSUES_KEY)?;
        let users = take(&mut doc, USERS_KEY)?;
        let mut enums = BTreeMap::new();
        for kind in EnumKind::ALL {
            let table: EnumTable = take(&mut doc, kind.as_str())?;
            if !table.is_empty() {
                enums.insert(kind, table);
            }
        }
        for key in doc.keys() {
            debug!(key = %key, "ignoring unknown collection key");
        }

        Ok(Self {
            issues,
            users,
            enums,
        })
    }
}

fn take<T: DeserializeOwned + Default>(doc: &mut Map<String, Value>, key: &str) -> Result<T> {
    match doc.remove(key) {
        Some(value) => serde_json::from_value(value).map_err(|source| CollectionError::Shape {
            key: key.to_string(),
            source,
        }),
        None => Ok(T::default()),
    }
}
