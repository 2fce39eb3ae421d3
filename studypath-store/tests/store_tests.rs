use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use studypath_store::{Collection, Store, StoreError};
use studypath_types::{
    Exam, ScheduleItem, ScheduleItemKind, SubjectId, SubjectProfile,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn item(subject: &str, day: u32) -> ScheduleItem {
    ScheduleItem::new(
        SubjectId::from(subject),
        ScheduleItemKind::Revision,
        format!("{subject} revision"),
        date(day),
    )
}

// ── Round-trip and upsert ───────────────────────────────────────

#[test]
fn put_then_get_returns_equal_record() {
    let store = Store::open_in_memory().unwrap();
    let original = item("maths", 10);

    store.put(Collection::ScheduleItems, &original).unwrap();
    let loaded: ScheduleItem = store
        .get(Collection::ScheduleItems, &original.id.to_string())
        .unwrap()
        .unwrap();

    assert_eq!(loaded, original);
}

#[test]
fn get_missing_key_returns_none() {
    let store = Store::open_in_memory().unwrap();
    let loaded: Option<ScheduleItem> = store
        .get(Collection::ScheduleItems, "no-such-key")
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn put_is_an_upsert() {
    let store = Store::open_in_memory().unwrap();
    let mut record = item("maths", 10);
    store.put(Collection::ScheduleItems, &record).unwrap();

    record.completed = true;
    record.title = "updated".to_string();
    store.put(Collection::ScheduleItems, &record).unwrap();

    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 1);
    let loaded: ScheduleItem = store
        .get(Collection::ScheduleItems, &record.id.to_string())
        .unwrap()
        .unwrap();
    assert!(loaded.completed);
    assert_eq!(loaded.title, "updated");
}

#[test]
fn profile_is_keyed_by_subject() {
    let store = Store::open_in_memory().unwrap();
    let profile = SubjectProfile::new(SubjectId::from("chemistry"), "Chemistry");
    store.put(Collection::Profiles, &profile).unwrap();

    let loaded: SubjectProfile = store
        .get(Collection::Profiles, "chemistry")
        .unwrap()
        .unwrap();
    assert_eq!(loaded, profile);
}

#[test]
fn record_without_key_is_rejected() {
    let store = Store::open_in_memory().unwrap();
    let err = store
        .put(Collection::Exams, &serde_json::json!({ "title": "no id" }))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

// ── getAll / delete / clear ─────────────────────────────────────

#[test]
fn get_all_returns_every_record() {
    let store = Store::open_in_memory().unwrap();
    for day in 1..=4 {
        store
            .put(Collection::ScheduleItems, &item("physics", day))
            .unwrap();
    }
    let all: Vec<ScheduleItem> = store.get_all(Collection::ScheduleItems).unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn delete_removes_record_and_is_noop_when_absent() {
    let store = Store::open_in_memory().unwrap();
    let record = item("maths", 10);
    store.put(Collection::ScheduleItems, &record).unwrap();

    store
        .delete(Collection::ScheduleItems, &record.id.to_string())
        .unwrap();
    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 0);

    // Deleting again is not an error.
    store
        .delete(Collection::ScheduleItems, &record.id.to_string())
        .unwrap();
}

#[test]
fn clear_empties_only_that_collection() {
    let store = Store::open_in_memory().unwrap();
    store.put(Collection::ScheduleItems, &item("maths", 1)).unwrap();
    store
        .put(
            Collection::Exams,
            &Exam::new(SubjectId::from("maths"), "Paper 1", date(20)),
        )
        .unwrap();

    store.clear(Collection::ScheduleItems).unwrap();

    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 0);
    assert_eq!(store.count(Collection::Exams).unwrap(), 1);
}

// ── Batch writes ────────────────────────────────────────────────

#[test]
fn put_batch_persists_all_records() {
    let store = Store::open_in_memory().unwrap();
    let items: Vec<ScheduleItem> = (1..=5).map(|day| item("biology", day)).collect();
    store.put_batch(Collection::ScheduleItems, &items).unwrap();
    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 5);
}

#[test]
fn put_batch_is_atomic_within_a_collection() {
    let store = Store::open_in_memory().unwrap();
    let batch = vec![
        serde_json::json!({ "id": "ok-1", "title": "fine" }),
        serde_json::json!({ "title": "missing id" }),
    ];

    let err = store.put_batch(Collection::Exams, &batch).unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
    // The valid first record must have been rolled back with the rest.
    assert_eq!(store.count(Collection::Exams).unwrap(), 0);
}

// ── Index queries ───────────────────────────────────────────────

#[test]
fn get_by_index_filters_by_subject() {
    let store = Store::open_in_memory().unwrap();
    store.put(Collection::ScheduleItems, &item("maths", 1)).unwrap();
    store.put(Collection::ScheduleItems, &item("maths", 2)).unwrap();
    store.put(Collection::ScheduleItems, &item("french", 3)).unwrap();

    let maths: Vec<ScheduleItem> = store
        .get_by_index(Collection::ScheduleItems, "subject", "maths")
        .unwrap();
    assert_eq!(maths.len(), 2);
    assert!(maths.iter().all(|i| i.subject.as_str() == "maths"));
}

#[test]
fn get_by_index_range_returns_dates_in_order() {
    let store = Store::open_in_memory().unwrap();
    for day in [5, 25, 12, 1, 18] {
        store
            .put(Collection::ScheduleItems, &item("maths", day))
            .unwrap();
    }

    let window: Vec<ScheduleItem> = store
        .get_by_index_range(Collection::ScheduleItems, "date", "2026-03-05", "2026-03-18")
        .unwrap();
    let days: Vec<u32> = window
        .iter()
        .map(|i| i.date.format("%d").to_string().parse().unwrap())
        .collect();
    assert_eq!(days, vec![5, 12, 18]);
}

#[test]
fn unknown_index_is_a_typed_error() {
    let store = Store::open_in_memory().unwrap();
    let err = store
        .get_by_index::<ScheduleItem>(Collection::ScheduleItems, "owner", "x")
        .unwrap_err();
    assert!(matches!(err, StoreError::UnknownIndex { .. }));
}

// ── Transactions across collections ─────────────────────────────

#[test]
fn with_transaction_commits_across_collections() {
    let store = Store::open_in_memory().unwrap();
    let items: Vec<ScheduleItem> = (1..=3).map(|day| item("maths", day)).collect();
    let exam = Exam::new(SubjectId::from("maths"), "Paper 1", date(20));

    store
        .with_transaction(|tx| {
            tx.put_batch(Collection::ScheduleItems, &items)?;
            tx.put(Collection::Exams, &exam)?;
            Ok(())
        })
        .unwrap();

    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 3);
    assert_eq!(store.count(Collection::Exams).unwrap(), 1);
}

#[test]
fn with_transaction_rolls_back_every_collection_on_error() {
    let store = Store::open_in_memory().unwrap();
    let exam = Exam::new(SubjectId::from("maths"), "Paper 1", date(20));

    let result: Result<(), _> = store.with_transaction(|tx| {
        tx.put(Collection::Exams, &exam)?;
        tx.put(
            Collection::ScheduleItems,
            &serde_json::json!({ "title": "missing id" }),
        )?;
        Ok(())
    });

    assert!(result.is_err());
    assert_eq!(store.count(Collection::Exams).unwrap(), 0);
    assert_eq!(store.count(Collection::ScheduleItems).unwrap(), 0);
}

// ── Durability ──────────────────────────────────────────────────

#[test]
fn reopening_the_store_preserves_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("studypath.db");
    let record = item("maths", 10);

    {
        let store = Store::open(&path).unwrap();
        store.put(Collection::ScheduleItems, &record).unwrap();
    }

    let store = Store::open(&path).unwrap();
    let loaded: ScheduleItem = store
        .get(Collection::ScheduleItems, &record.id.to_string())
        .unwrap()
        .unwrap();
    assert_eq!(loaded, record);
}
