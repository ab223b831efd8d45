//! # Fixture Store
//!
//! The canonical in-memory tables every query operates over.
//!
//! ## Invariants
//! - Rows leave the store only as clones; originals are never aliased out
//! - Reads never mutate
//! - Every mutation runs to completion under a single write-lock acquisition

mod seed;

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde_json::{Map, Value};
use thiserror::Error;

/// One record: an ordered column-to-value mapping
pub type Row = Map<String, Value>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Fixture store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A previous holder of the lock panicked
    #[error("Storage error: {0}")]
    LockPoisoned(&'static str),
}

/// The tables known to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableName {
    Posts,
    Comments,
    Profiles,
    /// Auth-only; not reachable through the table interface
    Users,
}

impl TableName {
    /// Every table, in a stable order
    pub const ALL: [TableName; 4] = [
        TableName::Posts,
        TableName::Comments,
        TableName::Profiles,
        TableName::Users,
    ];

    /// Parse a table name as callers spell it
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "posts" => Some(TableName::Posts),
            "comments" => Some(TableName::Comments),
            "profiles" => Some(TableName::Profiles),
            "users" => Some(TableName::Users),
            _ => None,
        }
    }

    /// Resolve a name through the public table interface.
    ///
    /// `users` holds credentials and is treated as unknown here.
    pub fn queryable(name: &str) -> Option<Self> {
        Self::parse(name).filter(|t| t.is_queryable())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Posts => "posts",
            TableName::Comments => "comments",
            TableName::Profiles => "profiles",
            TableName::Users => "users",
        }
    }

    pub fn is_queryable(&self) -> bool {
        !matches!(self, TableName::Users)
    }

    /// Foreign-key column on `self` that references `target.id`, if any
    pub fn foreign_key_to(&self, target: TableName) -> Option<&'static str> {
        match (self, target) {
            (TableName::Posts, TableName::Profiles) => Some("author_id"),
            (TableName::Comments, TableName::Profiles) => Some("user_id"),
            (TableName::Comments, TableName::Posts) => Some("post_id"),
            _ => None,
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All tables, as seen from inside a lock
#[derive(Debug, Default, Clone)]
pub struct Tables {
    tables: HashMap<TableName, Vec<Row>>,
}

impl Tables {
    /// Rows of a table in insertion order
    pub fn rows(&self, table: TableName) -> &[Row] {
        self.tables.get(&table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable rows of a table
    pub fn rows_mut(&mut self, table: TableName) -> &mut Vec<Row> {
        self.tables.entry(table).or_default()
    }

    /// Find a row whose `id` column equals `id`
    pub fn find_by_id(&self, table: TableName, id: &Value) -> Option<&Row> {
        self.rows(table).iter().find(|row| row.get("id") == Some(id))
    }
}

/// In-memory backing store shared by the query builder and auth emulator
#[derive(Debug, Default)]
pub struct FixtureStore {
    tables: RwLock<Tables>,
}

impl FixtureStore {
    /// A store with all four tables empty
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store seeded with the blog demo data
    pub fn seeded() -> Self {
        let mut tables = Tables::default();
        *tables.rows_mut(TableName::Posts) = seed::posts();
        *tables.rows_mut(TableName::Comments) = seed::comments();
        *tables.rows_mut(TableName::Profiles) = seed::profiles();
        *tables.rows_mut(TableName::Users) = seed::users();
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Replace a table's rows wholesale
    pub fn seed_table(&self, table: TableName, rows: Vec<Row>) -> StoreResult<()> {
        self.with_tables_mut(|tables| {
            *tables.rows_mut(table) = rows;
        })
    }

    /// Copy of a table's rows
    pub fn snapshot(&self, table: TableName) -> StoreResult<Vec<Row>> {
        self.with_tables(|tables| tables.rows(table).to_vec())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: TableName) -> StoreResult<usize> {
        self.with_tables(|tables| tables.rows(table).len())
    }

    /// Run `f` under the read lock
    pub fn with_tables<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Tables) -> T,
    {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("fixture tables"))?;
        Ok(f(&tables))
    }

    /// Run `f` under the write lock; the mutation completes before any
    /// other reader or writer observes the tables
    pub fn with_tables_mut<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Tables) -> T,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("fixture tables"))?;
        Ok(f(&mut tables))
    }

    /// Look up a credential row by exact email
    pub fn find_user_by_email(&self, email: &str) -> StoreResult<Option<Row>> {
        self.with_tables(|tables| {
            tables
                .rows(TableName::Users)
                .iter()
                .find(|row| row.get("email").and_then(Value::as_str) == Some(email))
                .cloned()
        })
    }

    /// Append a credential row
    pub fn insert_user(&self, row: Row) -> StoreResult<()> {
        self.with_tables_mut(|tables| tables.rows_mut(TableName::Users).push(row))
    }
}

/// Whether `email` belongs to one of the seeded demo accounts
pub fn is_seeded_email(email: &str) -> bool {
    seed::users()
        .iter()
        .any(|row| row.get("email").and_then(Value::as_str) == Some(email))
}

/// Convert a JSON object into a row; anything else yields `None`
pub fn into_row(value: Value) -> Option<Row> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_name_parse() {
        assert_eq!(TableName::parse("posts"), Some(TableName::Posts));
        assert_eq!(TableName::parse("users"), Some(TableName::Users));
        assert_eq!(TableName::parse("Posts"), None);
        assert_eq!(TableName::parse("tags"), None);
    }

    #[test]
    fn test_users_not_queryable() {
        assert_eq!(TableName::queryable("users"), None);
        assert_eq!(TableName::queryable("comments"), Some(TableName::Comments));
    }

    #[test]
    fn test_foreign_keys() {
        assert_eq!(TableName::Posts.foreign_key_to(TableName::Profiles), Some("author_id"));
        assert_eq!(TableName::Comments.foreign_key_to(TableName::Profiles), Some("user_id"));
        assert_eq!(TableName::Comments.foreign_key_to(TableName::Posts), Some("post_id"));
        assert_eq!(TableName::Profiles.foreign_key_to(TableName::Posts), None);
    }

    #[test]
    fn test_seeded_store_has_demo_data() {
        let store = FixtureStore::seeded();
        assert_eq!(store.row_count(TableName::Posts).unwrap(), 4);
        assert_eq!(store.row_count(TableName::Comments).unwrap(), 4);
        assert_eq!(store.row_count(TableName::Users).unwrap(), 4);
        assert!(store.row_count(TableName::Profiles).unwrap() >= 4);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let store = FixtureStore::seeded();
        let mut rows = store.snapshot(TableName::Posts).unwrap();
        rows[0].insert("title".to_string(), json!("changed"));
        rows.clear();

        let fresh = store.snapshot(TableName::Posts).unwrap();
        assert_eq!(fresh.len(), 4);
        assert_ne!(fresh[0]["title"], json!("changed"));
    }

    #[test]
    fn test_seed_table_replaces_rows() {
        let store = FixtureStore::empty();
        let row = into_row(json!({"id": "p1", "title": "Hello"})).unwrap();
        store.seed_table(TableName::Posts, vec![row]).unwrap();

        assert_eq!(store.row_count(TableName::Posts).unwrap(), 1);
        assert_eq!(store.row_count(TableName::Comments).unwrap(), 0);
    }

    #[test]
    fn test_find_user_by_email() {
        let store = FixtureStore::seeded();
        let user = store.find_user_by_email("zhangsan@example.com").unwrap();
        assert_eq!(user.unwrap()["id"], json!("1"));
        assert!(store.find_user_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn test_find_by_id() {
        let store = FixtureStore::seeded();
        let found = store
            .with_tables(|t| t.find_by_id(TableName::Profiles, &json!("2")).cloned())
            .unwrap();
        assert_eq!(found.unwrap()["username"], json!("Li Si"));
    }

    #[test]
    fn test_is_seeded_email() {
        assert!(is_seeded_email("lisi@example.com"));
        assert!(!is_seeded_email("LISI@example.com"));
    }

    #[test]
    fn test_into_row_rejects_non_objects() {
        assert!(into_row(json!([1, 2])).is_none());
        assert!(into_row(json!("x")).is_none());
        assert!(into_row(json!({})).is_some());
    }
}
