use keeplist_core::db::open_db;
use keeplist_core::db::open_db_in_memory;
use keeplist_core::{
    FixedClock, KeyValueStore, MemoryKvStore, Note, NoteBook, OrderedCollection,
    SequenceIdGenerator, SqliteKvStore, StorageKey, StoreError, TaskBoard, TaskFilter,
};

#[test]
fn sqlite_store_roundtrips_and_replaces_values() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKvStore::try_new(&conn).unwrap();
    let key = StorageKey::new("scratch").unwrap();

    assert!(kv.get(&key).unwrap().is_none());
    kv.set(&key, b"first").unwrap();
    kv.set(&key, b"second").unwrap();
    assert_eq!(kv.get(&key).unwrap().as_deref(), Some(&b"second"[..]));

    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);

    kv.remove(&key).unwrap();
    assert!(kv.get(&key).unwrap().is_none());
}

#[test]
fn sqlite_store_requires_migrated_connection() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteKvStore::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        StoreError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn text_values_in_sqlite_are_read_as_payload_bytes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('vibrantTodoTasks', 'not json');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('notes', ?1);",
        [r#"[{"id":"n1","title":"kept","timestamp":5}]"#],
    )
    .unwrap();
    let kv = SqliteKvStore::try_new(&conn).unwrap();

    let tasks = TaskBoard::open(&kv, SequenceIdGenerator::new("t")).unwrap();
    assert!(tasks.tasks().is_empty());
    assert!(tasks.collection().recovered_error().is_some());

    let notes = NoteBook::open(&kv, SequenceIdGenerator::new("n"), FixedClock::new(0)).unwrap();
    assert_eq!(notes.selected().unwrap().title, "kept");
}

#[test]
fn task_board_survives_reopen_of_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("keeplist.sqlite3");

    {
        let conn = open_db(&path).unwrap();
        let kv = SqliteKvStore::try_new(&conn).unwrap();
        let mut board = TaskBoard::open(&kv, SequenceIdGenerator::new("t")).unwrap();
        board.add_task("A").unwrap();
        board.add_task("B").unwrap();
        board.add_task("C").unwrap();
        board.toggle_complete("t-2").unwrap();
        board.reorder("t-3", "t-1").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let kv = SqliteKvStore::try_new(&conn).unwrap();
    let mut board = TaskBoard::open(&kv, SequenceIdGenerator::new("u")).unwrap();
    let order: Vec<_> = board.tasks().iter().map(|task| task.id.as_str()).collect();
    assert_eq!(order, ["t-3", "t-1", "t-2"]);

    board.set_filter(TaskFilter::Active);
    let active: Vec<_> = board.visible().into_iter().map(|task| task.id).collect();
    assert_eq!(active, ["t-3", "t-1"]);
}

#[test]
fn legacy_task_payload_is_sorted_by_stored_order() {
    let kv = MemoryKvStore::new();
    let payload = br#"[
        {"id":"b","text":"second","completed":true,"order":1700000000500},
        {"id":"a","text":"first","completed":false,"order":1700000000100}
    ]"#;
    kv.set(&StorageKey::tasks(), payload).unwrap();

    let mut board = TaskBoard::open(&kv, SequenceIdGenerator::new("t")).unwrap();
    let order: Vec<_> = board.tasks().iter().map(|task| task.id.as_str()).collect();
    assert_eq!(order, ["a", "b"]);

    let added = board.add_task("third").unwrap().unwrap();
    assert_eq!(added.order_key, 1700000000501);
}

#[test]
fn legacy_note_payload_opens_with_newest_selected() {
    let kv = MemoryKvStore::new();
    let payload = br#"[
        {"id":"1-a","title":"Old","content":"x","timestamp":100},
        {"id":"2-b","title":"","content":"untitled body","timestamp":300},
        {"id":"3-c","title":"Mid","content":"","timestamp":200}
    ]"#;
    kv.set(&StorageKey::notes(), payload).unwrap();

    let clock = FixedClock::new(1_000);
    let book = NoteBook::open(&kv, SequenceIdGenerator::new("n"), &clock).unwrap();
    let titles: Vec<_> = book
        .notes()
        .iter()
        .map(|note| note.display_title().to_string())
        .collect();
    assert_eq!(titles, ["(Untitled)", "Mid", "Old"]);
    assert_eq!(book.selected_id(), Some("2-b"));
}

#[test]
fn note_collection_roundtrips_through_store() {
    let kv = MemoryKvStore::new();
    let clock = FixedClock::new(10);
    let written: Vec<Note> = {
        let mut book = NoteBook::open(&kv, SequenceIdGenerator::new("n"), &clock).unwrap();
        book.save("one", "body").unwrap();
        book.new_note();
        clock.advance(5);
        book.save("two", "").unwrap();
        book.collection().list().to_vec()
    };

    let reloaded = OrderedCollection::<Note, _, _>::load(
        &kv,
        StorageKey::notes(),
        SequenceIdGenerator::new("z"),
    )
    .unwrap();
    assert_eq!(reloaded.list(), written.as_slice());
}
