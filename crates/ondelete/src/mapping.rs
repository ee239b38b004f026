//! The collected mapping: referencing records bucketed by table and policy.
//!
//! Order is first-insertion order at both levels. Empty tables and empty
//! buckets are never stored, and nothing outside this crate can add to a
//! mapping once it has been built.

use ondelete_core::{PolicyTag, Row};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Records of one referencing table that share a policy tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyBucket {
    tag: PolicyTag,
    records: Vec<Row>,
}

impl PolicyBucket {
    /// What the deletion does to these records.
    pub fn tag(&self) -> PolicyTag {
        self.tag
    }

    /// The referencing records, in query order.
    pub fn records(&self) -> &[Row] {
        &self.records
    }

    /// Number of records in the bucket.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for buckets inside a mapping.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One top-level entry: a referencing table and its non-empty buckets.
///
/// This is the unit of pagination. Serializes as a single-key object
/// `{table: {tag: [rows]}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct AffectedTable {
    table: String,
    buckets: Vec<PolicyBucket>,
}

impl AffectedTable {
    /// Name of the referencing table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Buckets in first-insertion order.
    pub fn buckets(&self) -> &[PolicyBucket] {
        &self.buckets
    }

    /// Records under `tag`, if that bucket exists.
    pub fn bucket(&self, tag: PolicyTag) -> Option<&[Row]> {
        self.buckets
            .iter()
            .find(|b| b.tag == tag)
            .map(PolicyBucket::records)
    }

    /// Records across all buckets.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(PolicyBucket::len).sum()
    }

    fn push(&mut self, tag: PolicyTag, records: Vec<Row>) {
        match self.buckets.iter_mut().find(|b| b.tag == tag) {
            Some(bucket) => bucket.records.extend(records),
            None => self.buckets.push(PolicyBucket { tag, records }),
        }
    }
}

/// `{tag: [rows]}` for one table.
struct Buckets<'a>(&'a [PolicyBucket]);

impl Serialize for Buckets<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for bucket in self.0 {
            map.serialize_entry(bucket.tag.as_str(), &bucket.records)?;
        }
        map.end()
    }
}

impl Serialize for AffectedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.table, &Buckets(&self.buckets))?;
        map.end()
    }
}

/// Result of one inspection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedMapping {
    entries: Vec<AffectedTable>,
}

impl CollectedMapping {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append `records` to `table`'s `tag` bucket.
    ///
    /// An empty batch changes nothing, so no empty table or bucket is ever
    /// created.
    pub(crate) fn extend(&mut self, table: &str, tag: PolicyTag, records: Vec<Row>) {
        if records.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|e| e.table == table) {
            Some(entry) => entry.push(tag, records),
            None => self.entries.push(AffectedTable {
                table: table.to_string(),
                buckets: vec![PolicyBucket { tag, records }],
            }),
        }
    }

    /// Number of affected tables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing references the target.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order.
    pub fn entries(&self) -> &[AffectedTable] {
        &self.entries
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, AffectedTable> {
        self.entries.iter()
    }

    /// The entry for `table`, if any records were found there.
    pub fn get(&self, table: &str) -> Option<&AffectedTable> {
        self.entries.iter().find(|e| e.table == table)
    }

    /// Records under `table` / `tag`.
    pub fn records(&self, table: &str, tag: PolicyTag) -> Option<&[Row]> {
        self.get(table).and_then(|e| e.bucket(tag))
    }

    /// Total number of records across all tables and buckets.
    pub fn record_count(&self) -> usize {
        self.entries.iter().map(AffectedTable::record_count).sum()
    }

    /// Number of records carrying `tag`.
    pub fn count_tagged(&self, tag: PolicyTag) -> usize {
        self.entries
            .iter()
            .filter_map(|e| e.bucket(tag))
            .map(<[Row]>::len)
            .sum()
    }
}

impl<'a> IntoIterator for &'a CollectedMapping {
    type Item = &'a AffectedTable;
    type IntoIter = std::slice::Iter<'a, AffectedTable>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for CollectedMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.table, &Buckets(&entry.buckets))?;
        }
        map.end()
    }
}
