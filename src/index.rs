// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of PlexPdf.
//
// PlexPdf is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// PlexPdf is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PlexPdf. If not, see <https://www.gnu.org/licenses/>.

//! Ordering index: bidirectional mapping between file positions and names.
//!
//! ## Purpose
//! Every stored object carries its position in its physical name,
//! `{position}-{logical_name}`. This module owns that convention: parsing,
//! formatting, and the in-memory index derived from it. No other module
//! parses object names.
//!
//! ## Design
//! - `by_position`: position -> physical name (BTreeMap, so max lookups and
//!   ordered iteration are cheap)
//! - `by_name`: logical name -> position
//! - Invariant: the two maps are inverses over the indexed set; positions
//!   are unique. Positions need not be dense (delete leaves gaps).
//! - Built once at service startup from a full backend listing, repairing
//!   prefix-less and position-colliding names with physical renames. After
//!   that, mutations update it incrementally.

use crate::backend;
use crate::error::FileResult;
use object_store::ObjectStore;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Parse a physical object name into `(position, logical_name)`.
///
/// The position is the decimal integer before the first `-`; the remainder
/// is the logical name, which may itself contain `-`. Returns `None` for
/// names that do not follow the convention (no separator, non-numeric or
/// zero position, empty logical name).
pub(crate) fn parse_physical_name(name: &str) -> Option<(u64, &str)> {
    let (prefix, logical) = name.split_once('-')?;
    let position: u64 = prefix.parse().ok()?;
    if position == 0 || logical.is_empty() {
        return None;
    }
    Some((position, logical))
}

/// Physical object name for a logical name at a position
pub(crate) fn physical_name(position: u64, logical: &str) -> String {
    format!("{}-{}", position, logical)
}

/// In-memory bidirectional mapping between positions and stored names
#[derive(Debug, Clone, Default)]
pub struct OrderingIndex {
    by_position: BTreeMap<u64, String>,
    by_name: HashMap<String, u64>,
}

impl OrderingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from the current backend listing, renaming objects
    /// whose names lack a usable position prefix or collide on a position.
    ///
    /// Objects are processed in lexicographic listing order so repair
    /// assignment is deterministic. Any backend error during listing or
    /// rename propagates; the service treats that as fatal at startup.
    pub async fn build(store: &dyn ObjectStore, prefix: &str) -> FileResult<Self> {
        let metas = backend::list_objects(store, prefix).await?;
        let mut index = Self::new();

        for meta in &metas {
            let Some(name) = meta.location.filename() else {
                continue;
            };

            match parse_physical_name(name) {
                Some((position, logical)) if !index.occupied(position) => {
                    if index.position_of(logical).is_some() {
                        warn!(file = %logical, object = %name, "duplicate logical name in listing, keeping first");
                        continue;
                    }
                    index.record(logical, position, name.to_string());
                }
                Some((taken, logical)) => {
                    if index.position_of(logical).is_some() {
                        warn!(file = %logical, object = %name, "duplicate logical name in listing, keeping first");
                        continue;
                    }
                    let position = index.next_position();
                    let physical = physical_name(position, logical);
                    warn!(from = %name, to = %physical, taken, "position collision, reassigning");
                    backend::rename(
                        store,
                        &backend::object_path(prefix, name),
                        &backend::object_path(prefix, &physical),
                    )
                    .await?;
                    index.record(logical, position, physical);
                }
                None => {
                    if index.position_of(name).is_some() {
                        warn!(file = %name, "duplicate logical name in listing, keeping first");
                        continue;
                    }
                    let position = index.next_position();
                    let physical = physical_name(position, name);
                    warn!(from = %name, to = %physical, "object name without position prefix, renaming");
                    backend::rename(
                        store,
                        &backend::object_path(prefix, name),
                        &backend::object_path(prefix, &physical),
                    )
                    .await?;
                    index.record(name, position, physical);
                }
            }
        }

        Ok(index)
    }

    /// Rebuild from `(position, physical_name)` pairs already following the
    /// naming convention (e.g. a fresh listing after a reorder). Entries that
    /// do not parse are dropped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u64, String)>,
    {
        let mut index = Self::new();
        for (position, physical) in entries {
            let Some((_, logical)) = parse_physical_name(&physical) else {
                continue;
            };
            let logical = logical.to_string();
            index.record(&logical, position, physical);
        }
        index
    }

    /// Position of a logical name, if indexed
    pub fn position_of(&self, logical: &str) -> Option<u64> {
        self.by_name.get(logical).copied()
    }

    /// Physical name stored at a position, if occupied
    pub fn physical_at(&self, position: u64) -> Option<&str> {
        self.by_position.get(&position).map(|s| s.as_str())
    }

    /// Resolve a logical name to `(position, physical_name)`
    pub fn resolve(&self, logical: &str) -> Option<(u64, &str)> {
        let position = self.position_of(logical)?;
        let physical = self.by_position.get(&position)?;
        Some((position, physical.as_str()))
    }

    pub fn occupied(&self, position: u64) -> bool {
        self.by_position.contains_key(&position)
    }

    pub fn max_position(&self) -> Option<u64> {
        self.by_position.keys().next_back().copied()
    }

    /// Position assigned to the next upload: `max + 1`, or 1 when empty
    pub fn next_position(&self) -> u64 {
        self.max_position().map_or(1, |max| max + 1)
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    /// Record a stored object. Re-recording an existing logical name drops
    /// its previous position mapping, keeping the maps inverse of each other.
    pub fn record(&mut self, logical: &str, position: u64, physical: String) {
        if let Some(old) = self.by_name.insert(logical.to_string(), position) {
            self.by_position.remove(&old);
        }
        self.by_position.insert(position, physical);
    }

    /// Remove a logical name, returning its position. The position is left
    /// vacant; remaining files are not renumbered.
    pub fn remove(&mut self, logical: &str) -> Option<u64> {
        let position = self.by_name.remove(logical)?;
        self.by_position.remove(&position);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_physical_name() {
        assert_eq!(parse_physical_name("12-report.pdf"), Some((12, "report.pdf")));
        assert_eq!(
            parse_physical_name("1-my-file.pdf"),
            Some((1, "my-file.pdf"))
        );
        assert_eq!(parse_physical_name("report.pdf"), None);
        assert_eq!(parse_physical_name("0-report.pdf"), None);
        assert_eq!(parse_physical_name("x-report.pdf"), None);
        assert_eq!(parse_physical_name("3-"), None);
        assert_eq!(parse_physical_name("-report.pdf"), None);
    }

    #[test]
    fn test_physical_name_round_trip() {
        let physical = physical_name(7, "a-b.pdf");
        assert_eq!(physical, "7-a-b.pdf");
        assert_eq!(parse_physical_name(&physical), Some((7, "a-b.pdf")));
    }

    #[test]
    fn test_record_and_resolve() {
        let mut index = OrderingIndex::new();
        index.record("a.pdf", 1, "1-a.pdf".to_string());
        index.record("b.pdf", 2, "2-b.pdf".to_string());

        assert_eq!(index.resolve("a.pdf"), Some((1, "1-a.pdf")));
        assert_eq!(index.position_of("b.pdf"), Some(2));
        assert_eq!(index.physical_at(2), Some("2-b.pdf"));
        assert_eq!(index.resolve("missing.pdf"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_next_position() {
        let mut index = OrderingIndex::new();
        assert_eq!(index.next_position(), 1);

        index.record("a.pdf", 3, "3-a.pdf".to_string());
        index.record("b.pdf", 7, "7-b.pdf".to_string());
        assert_eq!(index.max_position(), Some(7));
        assert_eq!(index.next_position(), 8);
    }

    #[test]
    fn test_remove_leaves_gap() {
        let mut index = OrderingIndex::new();
        index.record("a.pdf", 1, "1-a.pdf".to_string());
        index.record("b.pdf", 2, "2-b.pdf".to_string());
        index.record("c.pdf", 3, "3-c.pdf".to_string());

        assert_eq!(index.remove("b.pdf"), Some(2));
        assert!(!index.occupied(2));
        assert_eq!(index.next_position(), 4);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_record_existing_name_replaces_position() {
        let mut index = OrderingIndex::new();
        index.record("a.pdf", 1, "1-a.pdf".to_string());
        index.record("a.pdf", 4, "4-a.pdf".to_string());

        assert_eq!(index.resolve("a.pdf"), Some((4, "4-a.pdf")));
        assert!(!index.occupied(1));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_from_entries_drops_malformed() {
        let index = OrderingIndex::from_entries(vec![
            (2, "2-b.pdf".to_string()),
            (1, "1-a.pdf".to_string()),
            (9, "unprefixed.pdf".to_string()),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.resolve("a.pdf"), Some((1, "1-a.pdf")));
        assert_eq!(index.resolve("b.pdf"), Some((2, "2-b.pdf")));
        assert_eq!(index.position_of("unprefixed.pdf"), None);
    }
}
