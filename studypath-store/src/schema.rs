//! Collection schema: tables, primary keys, and secondary indexes.
//!
//! Each domain collection stores records as JSON text plus a handful of
//! extracted columns declared here. The extracted columns exist solely to
//! back SQL indexes for the filter/range queries the application needs
//! (by subject, date, kind).

/// A secondary index on a collection: a column populated from the record's
/// JSON at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    /// Column (and index) name.
    pub name: &'static str,
    /// JSON pointer into the serialized record (e.g. "/subject").
    pub pointer: &'static str,
}

/// The named keyed collections of the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Subject profiles, keyed by subject id.
    Profiles,
    /// Schedule items, keyed by item id.
    ScheduleItems,
    /// Exams, keyed by exam id.
    Exams,
    /// Exam results, keyed by result id.
    Results,
    /// Flashcard decks, keyed by deck id.
    FlashcardDecks,
}

impl Collection {
    /// All domain collections, in schema order.
    pub const ALL: [Collection; 5] = [
        Collection::Profiles,
        Collection::ScheduleItems,
        Collection::Exams,
        Collection::Results,
        Collection::FlashcardDecks,
    ];

    /// The backing table name.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::ScheduleItems => "schedule_items",
            Self::Exams => "exams",
            Self::Results => "results",
            Self::FlashcardDecks => "flashcard_decks",
        }
    }

    /// JSON pointer to the record's primary key.
    #[must_use]
    pub const fn key_pointer(&self) -> &'static str {
        match self {
            Self::Profiles => "/subject",
            _ => "/id",
        }
    }

    /// Secondary indexes declared for this collection.
    #[must_use]
    pub const fn indexes(&self) -> &'static [IndexSpec] {
        match self {
            Self::Profiles => &[],
            Self::ScheduleItems => &[
                IndexSpec {
                    name: "kind",
                    pointer: "/kind",
                },
                IndexSpec {
                    name: "date",
                    pointer: "/date",
                },
                IndexSpec {
                    name: "subject",
                    pointer: "/subject",
                },
            ],
            Self::Exams => &[
                IndexSpec {
                    name: "date",
                    pointer: "/date",
                },
                IndexSpec {
                    name: "subject",
                    pointer: "/subject",
                },
            ],
            Self::Results => &[IndexSpec {
                name: "date",
                pointer: "/date",
            }],
            Self::FlashcardDecks => &[IndexSpec {
                name: "subject",
                pointer: "/subject",
            }],
        }
    }

    /// Looks up an index by name.
    pub(crate) fn index(&self, name: &str) -> Option<&'static IndexSpec> {
        self.indexes().iter().find(|spec| spec.name == name)
    }
}

/// Builds the idempotent migration script for the whole database: one
/// table per domain collection plus the sync-queue log and response cache.
pub(crate) fn migration_sql() -> String {
    let mut sql = String::new();

    for collection in Collection::ALL {
        let table = collection.table();
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    key TEXT PRIMARY KEY,\n    data TEXT NOT NULL"
        ));
        for spec in collection.indexes() {
            sql.push_str(&format!(",\n    {} TEXT", spec.name));
        }
        sql.push_str("\n);\n");
        for spec in collection.indexes() {
            sql.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{name} ON {table}({name});\n",
                name = spec.name
            ));
        }
    }

    sql.push_str(
        "
        CREATE TABLE IF NOT EXISTS sync_queue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            entity TEXT NOT NULL,
            op TEXT NOT NULL,
            payload TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL,
            status TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_sync_queue_timestamp ON sync_queue(timestamp_ms);
        CREATE INDEX IF NOT EXISTS idx_sync_queue_status ON sync_queue(status);

        CREATE TABLE IF NOT EXISTS response_cache (
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            timestamp_ms INTEGER NOT NULL,
            ttl_ms INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_response_cache_timestamp ON response_cache(timestamp_ms);

        -- An entry still marked syncing was caught mid-replay by a crash;
        -- the remote never confirmed it, so it goes back to pending.
        UPDATE sync_queue SET status = 'pending' WHERE status = 'syncing';
        ",
    );

    sql
}
