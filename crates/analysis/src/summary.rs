use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime};
use collection::{EnumKind, FieldValue, IssueCollection, IssueRecord};
use serde::Serialize;

/// Number of most recently created unreviewed issues left out of
/// `oldest_unreviewed`.
pub const UNREVIEWED_TRIM: usize = 25;

const CREATION_FORMATS: &[&str] = &[
    "%Y-%m-%d.%H:%M:%S",
    "%Y-%m-%d.%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// The aggregates handed to the charting script. Field order is the
/// serialization order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub issues_by_status: BTreeMap<String, u64>,
    pub issues_by_type: BTreeMap<String, u64>,
    pub issues_by_module: BTreeMap<String, u64>,
    pub oldest_unreviewed: Vec<i64>,
}

pub fn summarize(collection: &IssueCollection) -> Summary {
    let mut summary = Summary::default();

    for issue in collection.issues.values() {
        let status = counter_key(collection, EnumKind::Status, issue.status());
        *summary.issues_by_status.entry(status).or_default() += 1;

        let issue_type = counter_key(collection, EnumKind::IssueType, issue.issue_type());
        *summary.issues_by_type.entry(issue_type).or_default() += 1;

        if let Some(module) = issue.module().filter(|m| !m.is_empty()) {
            *summary
                .issues_by_module
                .entry(module.to_string())
                .or_default() += 1;
        }
    }

    summary.oldest_unreviewed = oldest_unreviewed(collection);
    summary
}

fn counter_key(collection: &IssueCollection, kind: EnumKind, value: Option<&FieldValue>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    collection
        .label(kind, value)
        .map(str::to_string)
        .unwrap_or_else(|| value.canonical())
}

/// Ids of single-message issues, oldest first, minus the most recent
/// `UNREVIEWED_TRIM` of them. Ties on creation time fall back to the id.
fn oldest_unreviewed(collection: &IssueCollection) -> Vec<i64> {
    let mut unreviewed: Vec<(CreationKey, i64)> = collection
        .issues
        .iter()
        .filter(|(_, issue)| issue.message_count() == Some(1.0))
        .map(|(id, issue)| (CreationKey::of(issue), *id))
        .collect();
    unreviewed.sort();

    let keep = unreviewed.len().saturating_sub(UNREVIEWED_TRIM);
    unreviewed.truncate(keep);
    unreviewed.into_iter().map(|(_, id)| id).collect()
}

/// Sort key for issue creation. Parsed timestamps order chronologically and
/// come first, unparseable values follow in text order, missing ones last.
/// A numeric creation is read as Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum CreationKey {
    Parsed(NaiveDateTime),
    Raw(String),
    Missing,
}

impl CreationKey {
    fn of(issue: &IssueRecord) -> Self {
        match issue.creation() {
            Some(FieldValue::Number(secs)) => {
                match DateTime::from_timestamp(secs.floor() as i64, 0) {
                    Some(ts) => CreationKey::Parsed(ts.naive_utc()),
                    None => CreationKey::Raw(secs.to_string()),
                }
            }
            Some(value) => {
                let text = value.canonical();
                match parse_creation(&text) {
                    Some(ts) => CreationKey::Parsed(ts),
                    None => CreationKey::Raw(text),
                }
            }
            None => CreationKey::Missing,
        }
    }
}

fn parse_creation(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    CREATION_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|ts| ts.naive_utc())
        })
}
