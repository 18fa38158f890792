// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! Buckets activity entries by `(date, ticket)` in a single stable pass.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::feed::ActivityEntry;

/// Length of the `YYYY-MM-DD` prefix taken from an entry's `updated` stamp.
const DATE_PREFIX_LEN: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub date: String,
    pub ticket: String,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date, self.ticket)
    }
}

/// Derives the group key for one entry; fails if `updated` has no full date prefix.
pub fn group_key(entry: &ActivityEntry) -> Result<GroupKey> {
    let date = entry
        .updated
        .get(..DATE_PREFIX_LEN)
        .filter(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
        .ok_or_else(|| Error::Validation {
            entry_id: entry.id.clone(),
            reason: format!("updated timestamp {:?} has no YYYY-MM-DD prefix", entry.updated),
        })?;
    Ok(GroupKey {
        date: date.to_string(),
        ticket: entry.ticket().to_string(),
    })
}

/// Entries grouped by key. Iteration follows first occurrence of each key, and
/// entries inside a group keep feed order.
#[derive(Debug, Default)]
pub struct EntryGroups {
    groups: IndexMap<GroupKey, Vec<ActivityEntry>>,
    /// Entries that could not be keyed, with the reason.
    pub skipped: Vec<Error>,
}

impl EntryGroups {
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[ActivityEntry])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

pub fn group_entries(entries: &[ActivityEntry]) -> EntryGroups {
    let mut out = EntryGroups::default();
    for entry in entries {
        match group_key(entry) {
            Ok(key) => {
                tracing::trace!(
                    entry = %entry.id,
                    published = %entry.published,
                    object = %entry.object.id,
                    target = %entry.target.id,
                    group = %key,
                    "grouped"
                );
                out.groups.entry(key).or_default().push(entry.clone());
            }
            Err(e) => {
                tracing::warn!(entry = %entry.id, "skipping entry: {}", e);
                out.skipped.push(e);
            }
        }
    }
    out
}
