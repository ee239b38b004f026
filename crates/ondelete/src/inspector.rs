//! Reverse-reference collection for a record about to be deleted.
//!
//! `RelationInspector` asks a `RelationshipSource` which foreign keys point at
//! the target's table, keeps those whose ON DELETE action is cascade or
//! set-null, and runs one `ReferenceQuery` lookup per kept relationship. The
//! result is computed once, at construction, and never refreshed.

use crate::config::InspectorConfig;
use crate::mapping::CollectedMapping;
use crate::paginate::PagedResultView;
use crate::summary::ImpactSummary;
use ondelete_core::error::{SchemaError, SchemaErrorKind};
use ondelete_core::{
    Error, Model, PolicyTag, ReferenceQuery, RelationshipDescriptor, RelationshipSource, Result,
    UnpersistedRecordError, Value, classify,
};

/// One lookup to run: which relationship, which bucket, which value.
#[derive(Debug)]
struct Lookup {
    descriptor: RelationshipDescriptor,
    tag: PolicyTag,
    value: Value,
}

/// The records a deletion of one target would cascade to or nullify.
#[derive(Debug, Clone)]
pub struct RelationInspector {
    target_table: &'static str,
    identity: Vec<Value>,
    mapping: CollectedMapping,
    config: InspectorConfig,
}

impl RelationInspector {
    /// Inspect `target` using a store that supplies both capabilities.
    pub fn new<M, S>(target: &M, store: &S) -> Result<Self>
    where
        M: Model,
        S: RelationshipSource + ReferenceQuery + ?Sized,
    {
        Self::with_config(target, store, InspectorConfig::default())
    }

    /// Like `new`, with explicit configuration.
    pub fn with_config<M, S>(target: &M, store: &S, config: InspectorConfig) -> Result<Self>
    where
        M: Model,
        S: RelationshipSource + ReferenceQuery + ?Sized,
    {
        Self::collect(target, store, store, config)
    }

    /// Inspect `target` with schema metadata and lookups from separate sources.
    ///
    /// Fails with `Error::Unpersisted` before touching either source when the
    /// target has no identity.
    #[tracing::instrument(
        level = "debug",
        skip(target, schema, query),
        fields(table = M::TABLE_NAME)
    )]
    pub fn collect<M, R, Q>(
        target: &M,
        schema: &R,
        query: &Q,
        config: InspectorConfig,
    ) -> Result<Self>
    where
        M: Model,
        R: RelationshipSource + ?Sized,
        Q: ReferenceQuery + ?Sized,
    {
        let identity = target.identity().ok_or(UnpersistedRecordError {
            table: M::TABLE_NAME,
        })?;

        let mut lookups = Vec::new();
        for descriptor in schema.reverse_relationships(M::TABLE_NAME)? {
            let Some(tag) = classify(&descriptor) else {
                tracing::debug!(
                    referencing = %descriptor.referencing_table,
                    column = %descriptor.reference_column,
                    action = descriptor.on_delete.as_sql(),
                    "Skipping relationship without cascade or set-null"
                );
                continue;
            };
            let value = lookup_value(target, &identity, &descriptor)?;
            if value.is_null() {
                // `column = NULL` never matches
                tracing::debug!(
                    referencing = %descriptor.referencing_table,
                    "Referenced value is NULL, nothing can point at it"
                );
                continue;
            }
            tracing::debug!(
                referencing = %descriptor.referencing_table,
                column = %descriptor.reference_column,
                tag = %tag,
                "Classified relationship"
            );
            lookups.push(Lookup {
                descriptor,
                tag,
                value,
            });
        }

        let mapping = run_lookups(query, &lookups, config.consistent_read)?;

        tracing::debug!(
            tables = mapping.len(),
            records = mapping.record_count(),
            "Collected referencing records"
        );

        Ok(Self {
            target_table: M::TABLE_NAME,
            identity,
            mapping,
            config,
        })
    }

    /// The collected mapping. Same data on every call; never re-queries.
    pub fn collected_mapping(&self) -> &CollectedMapping {
        &self.mapping
    }

    /// Take the mapping out of the inspector.
    pub fn into_mapping(self) -> CollectedMapping {
        self.mapping
    }

    /// Table of the inspected record.
    pub fn target_table(&self) -> &'static str {
        self.target_table
    }

    /// Primary-key values of the inspected record.
    pub fn target_identity(&self) -> &[Value] {
        &self.identity
    }

    /// True when nothing references the target under a collected policy.
    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn summary(&self) -> ImpactSummary {
        ImpactSummary::from_mapping(&self.mapping)
    }

    /// Paginate the mapping with the configured page size.
    pub fn paginator(&self) -> Result<PagedResultView<'_>> {
        PagedResultView::new(&self.mapping, self.config.page_size)
    }
}

/// The target value a relationship's reference column is compared with.
fn lookup_value<M: Model>(
    target: &M,
    identity: &[Value],
    descriptor: &RelationshipDescriptor,
) -> Result<Value> {
    let single_key = match identity {
        [key] => Some(key),
        _ => None,
    };

    let Some(column) = descriptor.target_column.as_deref() else {
        return single_key.cloned().ok_or_else(|| {
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::Invalid,
                message: format!(
                    "{}.{} references the composite primary key of {} without naming a column",
                    descriptor.referencing_table, descriptor.reference_column, M::TABLE_NAME
                ),
            })
        });
    };

    if let (Some(key), [pk]) = (single_key, M::PRIMARY_KEY) {
        if pk.eq_ignore_ascii_case(column) {
            return Ok(key.clone());
        }
    }

    target
        .to_row()
        .into_iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(column))
        .map(|(_, value)| value)
        .ok_or_else(|| {
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::ColumnNotFound,
                message: format!(
                    "{} has no column '{}' referenced by {}.{}",
                    M::TABLE_NAME,
                    column,
                    descriptor.referencing_table,
                    descriptor.reference_column
                ),
            })
        })
}

fn run_lookups<Q: ReferenceQuery + ?Sized>(
    query: &Q,
    lookups: &[Lookup],
    consistent_read: bool,
) -> Result<CollectedMapping> {
    if lookups.is_empty() {
        return Ok(CollectedMapping::new());
    }

    let snapshot = consistent_read && query.begin_read_snapshot()?;
    let result = lookups
        .iter()
        .try_fold(CollectedMapping::new(), |mut mapping, lookup| {
            let d = &lookup.descriptor;
            let rows =
                query.query_by_reference(&d.referencing_table, &d.reference_column, &lookup.value)?;
            tracing::trace!(
                referencing = %d.referencing_table,
                rows = rows.len(),
                "Lookup complete"
            );
            mapping.extend(&d.referencing_table, lookup.tag, rows);
            Ok(mapping)
        });

    if !snapshot {
        return result;
    }
    match (result, query.end_read_snapshot()) {
        (Ok(mapping), Ok(())) => Ok(mapping),
        (Ok(_), Err(end_err)) => Err(end_err),
        (Err(err), end) => {
            if let Err(end_err) = end {
                tracing::debug!(error = %end_err, "Failed to close read snapshot after error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ondelete_core::error::{QueryError, QueryErrorKind};
    use ondelete_core::{FieldInfo, ReferentialAction, Row};
    use std::cell::{Cell, RefCell};

    #[derive(Debug)]
    struct Team {
        id: Option<i64>,
        code: Option<String>,
    }

    impl Model for Team {
        const TABLE_NAME: &'static str = "teams";
        const PRIMARY_KEY: &'static [&'static str] = &["id"];

        fn fields() -> &'static [FieldInfo] {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("id", "id").primary_key(true),
                FieldInfo::new("code", "code").nullable(true),
            ];
            FIELDS
        }

        fn to_row(&self) -> Vec<(&'static str, Value)> {
            vec![("id", self.id.into()), ("code", self.code.clone().into())]
        }

        fn primary_key_value(&self) -> Vec<Value> {
            vec![self.id.into()]
        }

        fn is_new(&self) -> bool {
            self.id.is_none()
        }
    }

    fn team(id: i64) -> Team {
        Team {
            id: Some(id),
            code: Some("AV".to_string()),
        }
    }

    /// In-memory store counting every call it receives.
    #[derive(Default)]
    struct FakeStore {
        relationships: Vec<RelationshipDescriptor>,
        rows: RefCell<Vec<(&'static str, Row)>>,
        schema_calls: Cell<usize>,
        queries: Cell<usize>,
        events: RefCell<Vec<&'static str>>,
        fail_table: Option<&'static str>,
    }

    impl FakeStore {
        fn relate(mut self, table: &str, column: &str, action: ReferentialAction) -> Self {
            self.relationships
                .push(RelationshipDescriptor::new(table, column, "teams", action));
            self
        }

        fn relate_to(
            mut self,
            table: &str,
            column: &str,
            target_column: &str,
            action: ReferentialAction,
        ) -> Self {
            self.relationships.push(
                RelationshipDescriptor::new(table, column, "teams", action)
                    .target_column(target_column),
            );
            self
        }

        fn row(self, table: &'static str, pairs: Vec<(&'static str, Value)>) -> Self {
            self.rows.borrow_mut().push((table, Row::from_pairs(pairs)));
            self
        }
    }

    impl RelationshipSource for FakeStore {
        fn reverse_relationships(&self, table: &str) -> Result<Vec<RelationshipDescriptor>> {
            self.schema_calls.set(self.schema_calls.get() + 1);
            Ok(self
                .relationships
                .iter()
                .filter(|d| d.target_table == table)
                .cloned()
                .collect())
        }
    }

    impl ReferenceQuery for FakeStore {
        fn query_by_reference(&self, table: &str, column: &str, value: &Value) -> Result<Vec<Row>> {
            self.queries.set(self.queries.get() + 1);
            self.events.borrow_mut().push("query");
            if self.fail_table == Some(table) {
                return Err(Error::Query(QueryError {
                    kind: QueryErrorKind::NotFound,
                    sql: None,
                    message: format!("no such table: {table}"),
                    source: None,
                }));
            }
            Ok(self
                .rows
                .borrow()
                .iter()
                .filter(|(t, row)| {
                    *t == table && row.get_by_name(column).is_some_and(|v| v.matches_key(value))
                })
                .map(|(_, row)| row.clone())
                .collect())
        }

        fn begin_read_snapshot(&self) -> Result<bool> {
            self.events.borrow_mut().push("begin");
            Ok(true)
        }

        fn end_read_snapshot(&self) -> Result<()> {
            self.events.borrow_mut().push("end");
            Ok(())
        }
    }

    fn hero(id: i64, team_id: i64) -> Vec<(&'static str, Value)> {
        vec![("id", Value::BigInt(id)), ("team_id", Value::Int(team_id as i32))]
    }

    #[test]
    fn test_unpersisted_target_issues_no_calls() {
        let store = FakeStore::default()
            .relate("heroes", "team_id", ReferentialAction::Cascade)
            .row("heroes", hero(1, 1));
        let unsaved = Team { id: None, code: None };

        let err = RelationInspector::new(&unsaved, &store).unwrap_err();
        assert!(err.is_unpersisted());
        assert!(matches!(
            err,
            Error::Unpersisted(UnpersistedRecordError { table: "teams" })
        ));
        assert_eq!(store.schema_calls.get(), 0);
        assert_eq!(store.queries.get(), 0);
        assert!(store.events.borrow().is_empty());
    }

    #[test]
    fn test_cascade_and_set_null_across_tables() {
        let store = FakeStore::default()
            .relate("heroes", "team_id", ReferentialAction::Cascade)
            .relate("sponsors", "team_id", ReferentialAction::SetNull)
            .row("heroes", hero(1, 7))
            .row("heroes", hero(2, 8))
            .row("sponsors", vec![("id", Value::BigInt(5)), ("team_id", Value::BigInt(7))]);

        let inspector = RelationInspector::new(&team(7), &store).unwrap();
        let mapping = inspector.collected_mapping();

        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.records("heroes", PolicyTag::Delete).unwrap(),
            &[Row::from_pairs(hero(1, 7))]
        );
        assert_eq!(mapping.get("heroes").unwrap().buckets().len(), 1);
        let sponsors = mapping.records("sponsors", PolicyTag::SetNull).unwrap();
        assert_eq!(sponsors.len(), 1);
        assert_eq!(sponsors[0].get_named::<i64>("id").unwrap(), 5);
        assert_eq!(mapping.records("sponsors", PolicyTag::Delete), None);

        assert_eq!(inspector.target_table(), "teams");
        assert_eq!(inspector.target_identity(), &[Value::BigInt(7)]);
        assert!(!inspector.is_empty());
    }

    #[test]
    fn test_both_policies_on_one_table() {
        let store = FakeStore::default()
            .relate("matches", "home_id", ReferentialAction::Cascade)
            .relate("matches", "mvp_team_id", ReferentialAction::SetNull)
            .row(
                "matches",
                vec![
                    ("id", Value::Int(1)),
                    ("home_id", Value::Int(3)),
                    ("mvp_team_id", Value::Int(9)),
                ],
            )
            .row(
                "matches",
                vec![
                    ("id", Value::Int(2)),
                    ("home_id", Value::Int(9)),
                    ("mvp_team_id", Value::Int(3)),
                ],
            );

        let inspector = RelationInspector::new(&team(3), &store).unwrap();
        let entry = inspector.collected_mapping().get("matches").unwrap();
        let tags: Vec<PolicyTag> = entry.buckets().iter().map(|b| b.tag()).collect();
        assert_eq!(tags, vec![PolicyTag::Delete, PolicyTag::SetNull]);

        let deleted = entry.bucket(PolicyTag::Delete).unwrap();
        assert_eq!(deleted.len(), 1);
        assert_eq!(deleted[0].get_named::<i32>("id").unwrap(), 1);

        let nulled = entry.bucket(PolicyTag::SetNull).unwrap();
        assert_eq!(nulled.len(), 1);
        assert_eq!(nulled[0].get_named::<i32>("id").unwrap(), 2);
    }

    #[test]
    fn test_other_policies_contribute_nothing() {
        let store = FakeStore::default()
            .relate("heroes", "team_id", ReferentialAction::NoAction)
            .relate("heroes", "team_id", ReferentialAction::Restrict)
            .relate("heroes", "team_id", ReferentialAction::SetDefault)
            .row("heroes", hero(1, 7));

        let inspector = RelationInspector::new(&team(7), &store).unwrap();
        assert!(inspector.is_empty());
        assert_eq!(store.queries.get(), 0);
        // No eligible lookups, so no snapshot either
        assert!(store.events.borrow().is_empty());
    }

    #[test]
    fn test_duplicates_listed_once_per_descriptor() {
        let store = FakeStore::default()
            .relate("rivalries", "left_id", ReferentialAction::Cascade)
            .relate("rivalries", "right_id", ReferentialAction::Cascade)
            .row(
                "rivalries",
                vec![("left_id", Value::Int(4)), ("right_id", Value::Int(4))],
            );

        let inspector = RelationInspector::new(&team(4), &store).unwrap();
        let deleted = inspector
            .collected_mapping()
            .records("rivalries", PolicyTag::Delete)
            .unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(deleted[0], deleted[1]);
        assert_eq!(inspector.summary().deleted, 2);
    }

    #[test]
    fn test_mapping_is_stable_after_store_changes() {
        let store = FakeStore::default()
            .relate("heroes", "team_id", ReferentialAction::Cascade)
            .row("heroes", hero(1, 7));

        let inspector = RelationInspector::new(&team(7), &store).unwrap();
        let first = inspector.collected_mapping().clone();
        assert_eq!(store.queries.get(), 1);

        store
            .rows
            .borrow_mut()
            .push(("heroes", Row::from_pairs(hero(2, 7))));

        assert_eq!(inspector.collected_mapping(), &first);
        assert_eq!(inspector.collected_mapping().record_count(), 1);
        assert_eq!(store.queries.get(), 1);
    }

    #[test]
    fn test_target_column_other_than_primary_key() {
        let store = FakeStore::default()
            .relate_to("fans", "team_code", "code", ReferentialAction::SetNull)
            .row(
                "fans",
                vec![("id", Value::Int(1)), ("team_code", Value::from("AV"))],
            )
            .row(
                "fans",
                vec![("id", Value::Int(2)), ("team_code", Value::from("XM"))],
            );

        let inspector = RelationInspector::new(&team(1), &store).unwrap();
        let nulled = inspector
            .collected_mapping()
            .records("fans", PolicyTag::SetNull)
            .unwrap();
        assert_eq!(nulled.len(), 1);
        assert_eq!(nulled[0].get_named::<i32>("id").unwrap(), 1);
    }

    #[test]
    fn test_null_referenced_value_skips_lookup() {
        let store = FakeStore::default()
            .relate_to("fans", "team_code", "code", ReferentialAction::Cascade);
        let target = Team {
            id: Some(1),
            code: None,
        };

        let inspector = RelationInspector::new(&target, &store).unwrap();
        assert!(inspector.is_empty());
        assert_eq!(store.queries.get(), 0);
    }

    #[test]
    fn test_unknown_target_column_is_schema_error() {
        let store = FakeStore::default()
            .relate_to("fans", "team_slug", "slug", ReferentialAction::Cascade);

        let err = RelationInspector::new(&team(1), &store).unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError {
                kind: SchemaErrorKind::ColumnNotFound,
                ..
            })
        ));
        assert_eq!(store.queries.get(), 0);
    }

    #[test]
    fn test_snapshot_wraps_lookups() {
        let store = FakeStore::default()
            .relate("heroes", "team_id", ReferentialAction::Cascade)
            .relate("sponsors", "team_id", ReferentialAction::SetNull);

        RelationInspector::new(&team(1), &store).unwrap();
        assert_eq!(*store.events.borrow(), vec!["begin", "query", "query", "end"]);
    }

    #[test]
    fn test_snapshot_closed_on_error_and_error_kept() {
        let store = FakeStore {
            fail_table: Some("sponsors"),
            ..FakeStore::default()
        }
        .relate("sponsors", "team_id", ReferentialAction::SetNull)
        .relate("heroes", "team_id", ReferentialAction::Cascade);

        let err = RelationInspector::new(&team(1), &store).unwrap_err();
        assert!(matches!(
            err,
            Error::Query(QueryError {
                kind: QueryErrorKind::NotFound,
                ..
            })
        ));
        assert_eq!(*store.events.borrow(), vec!["begin", "query", "end"]);
    }

    #[test]
    fn test_consistent_read_disabled() {
        let store = FakeStore::default().relate("heroes", "team_id", ReferentialAction::Cascade);
        let config = InspectorConfig::new().consistent_read(false);

        RelationInspector::with_config(&team(1), &store, config).unwrap();
        assert_eq!(*store.events.borrow(), vec!["query"]);
    }

    #[test]
    fn test_separate_schema_and_query_sources() {
        let schema = FakeStore::default().relate("heroes", "team_id", ReferentialAction::Cascade);
        let data = FakeStore::default().row("heroes", hero(1, 2));

        let inspector =
            RelationInspector::collect(&team(2), &schema, &data, InspectorConfig::default())
                .unwrap();
        assert_eq!(schema.queries.get(), 0);
        assert_eq!(data.schema_calls.get(), 0);
        assert_eq!(inspector.summary().deleted, 1);
    }

    #[test]
    fn test_paginator_uses_configured_page_size() {
        let store = FakeStore::default()
            .relate("a", "team_id", ReferentialAction::Cascade)
            .relate("b", "team_id", ReferentialAction::Cascade)
            .relate("c", "team_id", ReferentialAction::SetNull)
            .row("a", hero(1, 1))
            .row("b", hero(2, 1))
            .row("c", hero(3, 1));

        let config = InspectorConfig::new().page_size(2);
        let inspector = RelationInspector::with_config(&team(1), &store, config).unwrap();
        let view = inspector.paginator().unwrap();
        assert_eq!(view.page_size(), 2);
        assert_eq!(view.num_pages(), 2);
        assert_eq!(view.get_page(2).unwrap().entries()[0].table(), "c");

        let summary = inspector.summary();
        assert_eq!((summary.deleted, summary.modified, summary.tables), (2, 1, 3));
    }
}
