//! The persistent keyed-collection store.
//!
//! Records are serialized to JSON and upserted by the primary key the
//! collection schema points at. Index columns are extracted from the same
//! JSON at write time, so reads can filter without deserializing every row.

use crate::error::{StoreError, StoreResult};
use crate::schema::{self, Collection};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// The shared persistent store. Cheap to clone via `Arc`; all access is
/// serialized through one connection, which is what gives multi-collection
/// transactions their isolation.
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Opens (or creates) the store at the given path and runs the
    /// idempotent schema migration, which also requeues any sync-queue
    /// entry a crash left mid-replay. Repeated opens are safe.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(&schema::migration_sql())?;
        debug!(path = %path.as_ref().display(), "opened store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(&schema::migration_sql())?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Returns the record stored under `key`, or `None` if absent.
    pub fn get<T: DeserializeOwned>(
        &self,
        collection: Collection,
        key: &str,
    ) -> StoreResult<Option<T>> {
        get_row(&self.lock(), collection, key)
    }

    /// Returns all records in a collection. Order is not guaranteed.
    pub fn get_all<T: DeserializeOwned>(&self, collection: Collection) -> StoreResult<Vec<T>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT data FROM {}", collection.table()))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        decode_rows(rows)
    }

    /// Upserts a record by the primary key its collection schema declares.
    pub fn put<T: Serialize>(&self, collection: Collection, record: &T) -> StoreResult<()> {
        put_row(&self.lock(), collection, record)
    }

    /// Upserts a batch of records inside one transaction: all persist or
    /// none do. Atomic within this collection only.
    pub fn put_batch<T: Serialize>(&self, collection: Collection, records: &[T]) -> StoreResult<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for record in records {
            put_row(&tx, collection, record)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Removes a record if present; no-op otherwise.
    pub fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        self.lock().execute(
            &format!("DELETE FROM {} WHERE key = ?1", collection.table()),
            params![key],
        )?;
        Ok(())
    }

    /// Empties a collection.
    pub fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.lock()
            .execute(&format!("DELETE FROM {}", collection.table()), [])?;
        Ok(())
    }

    /// Number of records in a collection.
    pub fn count(&self, collection: Collection) -> StoreResult<usize> {
        let count: i64 = self.lock().query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Returns the records whose indexed column equals `value`.
    pub fn get_by_index<T: DeserializeOwned>(
        &self,
        collection: Collection,
        index: &str,
        value: &str,
    ) -> StoreResult<Vec<T>> {
        let spec = collection.index(index).ok_or_else(|| StoreError::UnknownIndex {
            collection: collection.table(),
            index: index.to_string(),
        })?;
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT data FROM {} WHERE {} = ?1",
            collection.table(),
            spec.name
        ))?;
        let rows = stmt.query_map(params![value], |row| row.get::<_, String>(0))?;
        decode_rows(rows)
    }

    /// Returns the records whose indexed column lies in `[lo, hi]`,
    /// ordered by that column. Dates are stored ISO-formatted so
    /// lexicographic order is chronological order.
    pub fn get_by_index_range<T: DeserializeOwned>(
        &self,
        collection: Collection,
        index: &str,
        lo: &str,
        hi: &str,
    ) -> StoreResult<Vec<T>> {
        let spec = collection.index(index).ok_or_else(|| StoreError::UnknownIndex {
            collection: collection.table(),
            index: index.to_string(),
        })?;
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT data FROM {table} WHERE {col} >= ?1 AND {col} <= ?2 ORDER BY {col}",
            table = collection.table(),
            col = spec.name
        ))?;
        let rows = stmt.query_map(params![lo, hi], |row| row.get::<_, String>(0))?;
        decode_rows(rows)
    }

    /// Runs `f` inside one transaction spanning any number of collections.
    /// The transaction commits only if `f` returns `Ok`; any error rolls
    /// everything back. This is what makes composite document saves atomic.
    pub fn with_transaction<T>(
        &self,
        f: impl FnOnce(&StoreTx<'_>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let out = f(&StoreTx { tx: &tx })?;
        tx.commit()?;
        Ok(out)
    }
}

impl Clone for Store {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Write handle passed to [`Store::with_transaction`] closures.
pub struct StoreTx<'a> {
    tx: &'a rusqlite::Transaction<'a>,
}

impl StoreTx<'_> {
    /// Upserts a record within the transaction.
    pub fn put<T: Serialize>(&self, collection: Collection, record: &T) -> StoreResult<()> {
        put_row(self.tx, collection, record)
    }

    /// Upserts a batch of records within the transaction.
    pub fn put_batch<T: Serialize>(&self, collection: Collection, records: &[T]) -> StoreResult<()> {
        for record in records {
            put_row(self.tx, collection, record)?;
        }
        Ok(())
    }

    /// Removes a record within the transaction; no-op if absent.
    pub fn delete(&self, collection: Collection, key: &str) -> StoreResult<()> {
        self.tx.execute(
            &format!("DELETE FROM {} WHERE key = ?1", collection.table()),
            params![key],
        )?;
        Ok(())
    }

    /// Empties a collection within the transaction.
    pub fn clear(&self, collection: Collection) -> StoreResult<()> {
        self.tx
            .execute(&format!("DELETE FROM {}", collection.table()), [])?;
        Ok(())
    }
}

// ── Row encoding helpers ─────────────────────────────────────────

fn get_row<T: DeserializeOwned>(
    conn: &Connection,
    collection: Collection,
    key: &str,
) -> StoreResult<Option<T>> {
    let data: Option<String> = conn
        .query_row(
            &format!("SELECT data FROM {} WHERE key = ?1", collection.table()),
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    match data {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

fn put_row<T: Serialize>(conn: &Connection, collection: Collection, record: &T) -> StoreResult<()> {
    let value = serde_json::to_value(record)?;
    let key = value
        .pointer(collection.key_pointer())
        .and_then(Value::as_str)
        .ok_or_else(|| {
            StoreError::InvalidData(format!(
                "record for '{}' has no string key at {}",
                collection.table(),
                collection.key_pointer()
            ))
        })?
        .to_string();
    let json = serde_json::to_string(&value)?;

    let mut columns: Vec<&str> = vec!["key", "data"];
    let mut values: Vec<rusqlite::types::Value> = vec![key.into(), json.into()];
    for spec in collection.indexes() {
        columns.push(spec.name);
        values.push(index_value(&value, spec.pointer));
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = columns[1..]
        .iter()
        .map(|c| format!("{c} = excluded.{c}"))
        .collect();
    let sql = format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) \
         ON CONFLICT(key) DO UPDATE SET {updates}",
        table = collection.table(),
        columns = columns.join(", "),
        placeholders = placeholders.join(", "),
        updates = updates.join(", "),
    );
    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

/// Extracts an index column value from the serialized record. Scalars are
/// stored as text (ISO dates sort correctly that way); anything missing or
/// non-scalar indexes as NULL.
fn index_value(record: &Value, pointer: &str) -> rusqlite::types::Value {
    match record.pointer(pointer) {
        Some(Value::String(s)) => s.clone().into(),
        Some(Value::Number(n)) => n.to_string().into(),
        Some(Value::Bool(b)) => b.to_string().into(),
        _ => rusqlite::types::Value::Null,
    }
}

fn decode_rows<T: DeserializeOwned>(
    rows: impl Iterator<Item = rusqlite::Result<String>>,
) -> StoreResult<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(serde_json::from_str(&row?)?);
    }
    Ok(out)
}
