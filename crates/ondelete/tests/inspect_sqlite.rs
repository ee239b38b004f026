use ondelete::prelude::*;
use ondelete::{InvalidPageKind, UnpersistedRecordError};
use ondelete_sqlite::SqliteConnection;

#[derive(Debug, Clone)]
struct Team {
    id: Option<i64>,
    name: String,
}

impl Model for Team {
    const TABLE_NAME: &'static str = "teams";
    const PRIMARY_KEY: &'static [&'static str] = &["id"];

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("id", "id").primary_key(true),
            FieldInfo::new("name", "name"),
        ];
        FIELDS
    }

    fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![("id", self.id.into()), ("name", self.name.as_str().into())]
    }

    fn primary_key_value(&self) -> Vec<Value> {
        vec![self.id.into()]
    }

    fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

const SCHEMA: &str = "
    CREATE TABLE teams (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
    CREATE TABLE heroes (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        team_id INTEGER REFERENCES teams(id) ON DELETE CASCADE
    );
    CREATE TABLE sponsors (
        id INTEGER PRIMARY KEY,
        brand TEXT NOT NULL,
        team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL
    );
    CREATE TABLE fans (
        id INTEGER PRIMARY KEY,
        team_id INTEGER REFERENCES teams(id)
    );
    CREATE TABLE matches (
        id INTEGER PRIMARY KEY,
        home_id INTEGER REFERENCES teams(id) ON DELETE CASCADE,
        mvp_team_id INTEGER REFERENCES teams(id) ON DELETE SET NULL
    );
";

fn setup() -> SqliteConnection {
    let conn = SqliteConnection::open_memory().expect("open sqlite memory db");
    conn.execute_raw(SCHEMA).expect("create schema");
    conn.execute_raw(
        "INSERT INTO teams (id, name) VALUES (1, 'Avengers'), (2, 'X-Men'), (3, 'Loners');
         INSERT INTO heroes (id, name, team_id) VALUES
             (1, 'Thor', 1), (2, 'Hulk', 1), (3, 'Storm', 2);
         INSERT INTO sponsors (id, brand, team_id) VALUES (1, 'Stark', 1), (2, 'Oscorp', 2);
         INSERT INTO fans (id, team_id) VALUES (1, 1), (2, 1);
         INSERT INTO matches (id, home_id, mvp_team_id) VALUES (1, 1, 2), (2, 2, 1);",
    )
    .expect("seed data");
    conn
}

fn team(id: i64) -> Team {
    Team {
        id: Some(id),
        name: String::new(),
    }
}

fn names(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|r| r.get_named::<String>(column).expect("text column"))
        .collect()
}

#[test]
fn sqlite_collects_cascade_and_set_null_records() {
    let conn = setup();
    let inspector = RelationInspector::new(&team(1), &conn).expect("inspect team 1");
    let mapping = inspector.collected_mapping();

    // Tables arrive in the order the store lists them (sorted by name)
    let tables: Vec<&str> = mapping.iter().map(AffectedTable::table).collect();
    assert_eq!(tables, vec!["heroes", "matches", "sponsors"]);

    assert_eq!(
        names(mapping.records("heroes", PolicyTag::Delete).unwrap(), "name"),
        vec!["Thor", "Hulk"]
    );
    assert_eq!(
        names(mapping.records("sponsors", PolicyTag::SetNull).unwrap(), "brand"),
        vec!["Stark"]
    );

    let matches = mapping.get("matches").unwrap();
    let deleted = matches.bucket(PolicyTag::Delete).unwrap();
    let nulled = matches.bucket(PolicyTag::SetNull).unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].get_named::<i64>("id").unwrap(), 1);
    assert_eq!(nulled.len(), 1);
    assert_eq!(nulled[0].get_named::<i64>("id").unwrap(), 2);

    // fans reference teams with NO ACTION
    assert!(mapping.get("fans").is_none());

    let summary = inspector.summary();
    assert_eq!(summary.deleted, 3);
    assert_eq!(summary.modified, 2);
    assert_eq!(summary.tables, 3);
    assert_eq!(
        summary.to_string(),
        "3 objects will be deleted, 2 objects will be modified"
    );

    // The read snapshot is closed again
    assert!(!conn.in_transaction().unwrap());
}

#[test]
fn sqlite_unreferenced_record_has_empty_mapping_and_no_pages() {
    let conn = setup();
    let inspector = RelationInspector::new(&team(3), &conn).expect("inspect team 3");
    assert!(inspector.is_empty());
    assert!(inspector.summary().is_empty());

    let view = inspector.paginator().unwrap();
    assert_eq!(view.num_pages(), 0);
    for n in [1, 2, 10] {
        match view.get_page(n) {
            Err(Error::InvalidPage(e)) => assert_eq!(e.kind, InvalidPageKind::NoResults),
            other => panic!("expected InvalidPage for page {n}, got {other:?}"),
        }
    }
}

#[test]
fn sqlite_unsaved_record_is_rejected() {
    let conn = setup();
    let unsaved = Team {
        id: None,
        name: "New".to_string(),
    };
    let err = RelationInspector::new(&unsaved, &conn).unwrap_err();
    assert!(matches!(
        err,
        Error::Unpersisted(UnpersistedRecordError { table: "teams" })
    ));
}

#[test]
fn sqlite_mapping_does_not_drift_after_store_changes() {
    let conn = setup();
    let inspector = RelationInspector::new(&team(1), &conn).expect("inspect team 1");
    let before = serde_json::to_string(inspector.collected_mapping()).unwrap();

    conn.execute("DELETE FROM heroes WHERE team_id = ?1", &[Value::BigInt(1)])
        .unwrap();
    conn.execute(
        "INSERT INTO sponsors (brand, team_id) VALUES (?1, ?2)",
        &[Value::from("Pym"), Value::BigInt(1)],
    )
    .unwrap();

    let after = serde_json::to_string(inspector.collected_mapping()).unwrap();
    assert_eq!(before, after);

    // A fresh inspection sees the new state
    let fresh = RelationInspector::new(&team(1), &conn).unwrap();
    assert!(fresh.collected_mapping().get("heroes").is_none());
    assert_eq!(
        fresh
            .collected_mapping()
            .records("sponsors", PolicyTag::SetNull)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn sqlite_pages_hold_whole_entries() {
    let conn = setup();
    let config = InspectorConfig::new().page_size(2);
    let inspector = RelationInspector::with_config(&team(1), &conn, config).unwrap();
    let view = inspector.paginator().unwrap();

    assert_eq!(view.count(), 3);
    assert_eq!(view.num_pages(), 2);
    assert!(matches!(view.get_page(0), Err(Error::InvalidPage(_))));
    assert!(matches!(view.get_page(3), Err(Error::InvalidPage(_))));

    let first = view.get_page(1).unwrap();
    assert_eq!(first.len(), 2);
    // matches keeps both of its buckets on the same page
    assert_eq!(first.entries()[1].table(), "matches");
    assert_eq!(first.entries()[1].buckets().len(), 2);

    let json = serde_json::to_value(view.get_page(2).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "number": 2,
            "num_pages": 2,
            "has_next": false,
            "has_previous": true,
            "entries": [
                {"sponsors": {"set_null": [{"id": 1, "brand": "Stark", "team_id": 1}]}}
            ]
        })
    );
}

#[test]
fn sqlite_inside_caller_transaction_leaves_it_open() {
    let conn = setup();
    conn.begin().unwrap();
    conn.execute(
        "INSERT INTO heroes (name, team_id) VALUES (?1, ?2)",
        &[Value::from("Vision"), Value::BigInt(1)],
    )
    .unwrap();

    let inspector = RelationInspector::new(&team(1), &conn).unwrap();
    assert_eq!(
        inspector
            .collected_mapping()
            .records("heroes", PolicyTag::Delete)
            .unwrap()
            .len(),
        3
    );
    assert!(conn.in_transaction().unwrap());
    conn.rollback().unwrap();
}

#[test]
fn sqlite_raw_begin_transaction_is_reused() {
    let conn = setup();
    conn.execute_raw("BEGIN").unwrap();

    let inspector = RelationInspector::new(&team(1), &conn).expect("inspect inside raw BEGIN");
    assert_eq!(
        names(
            inspector
                .collected_mapping()
                .records("heroes", PolicyTag::Delete)
                .unwrap(),
            "name"
        ),
        vec!["Thor", "Hulk"]
    );
    assert!(conn.in_transaction().unwrap());
    conn.execute_raw("ROLLBACK").unwrap();
    assert!(!conn.in_transaction().unwrap());
}
