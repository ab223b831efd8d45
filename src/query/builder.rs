//! # Query Builder
//!
//! A per-request state accumulator. Chain calls only record intent; nothing
//! touches the fixture store until the builder is resolved with
//! [`QueryBuilder::execute`] or by awaiting it directly.
//!
//! Resolution order:
//! 1. artificial latency
//! 2. snapshot the table rows
//! 3. filters (AND)
//! 4. writes: apply insert/update/delete, keep the affected rows
//! 5. reads: final order clause, count, page window
//! 6. projection, then `single()` collapsing
//!
//! Misuse never panics: the first contract violation is remembered and
//! surfaced as an `InvalidQueryState` error in the envelope.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::{QueryError, QueryResult};
use super::filter::{Filter, FilterSet};
use super::order::{apply_orders, OrderSpec};
use super::response::ResultEnvelope;
use super::select::Projection;
use crate::fixtures::{into_row, FixtureStore, Row, TableName, Tables};
use crate::observability::{log_event_with_fields, Event};

/// Offset/limit derived from an inclusive `[from, to]` range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    /// `limit = to - from + 1`, never negative
    pub fn from_range(from: usize, to: usize) -> Self {
        Self {
            offset: from,
            limit: if to < from {
                0
            } else {
                (to - from).saturating_add(1)
            },
        }
    }

    pub fn slice(&self, rows: Vec<Row>) -> Vec<Row> {
        rows.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// Pending mutation recorded by a write modifier
#[derive(Debug, Clone, PartialEq)]
enum WriteOp {
    Insert(Vec<Row>),
    Update(Row),
    Delete,
}

impl WriteOp {
    fn name(&self) -> &'static str {
        match self {
            WriteOp::Insert(_) => "insert()",
            WriteOp::Update(_) => "update()",
            WriteOp::Delete => "delete()",
        }
    }
}

/// Chainable, lazily-executing request against one table
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    store: Arc<FixtureStore>,
    table_name: String,
    table: Option<TableName>,
    latency: Duration,
    projection: Projection,
    filters: FilterSet,
    orders: Vec<OrderSpec>,
    window: Option<PageWindow>,
    single: bool,
    count_requested: bool,
    /// Set by order/range/limit/count, which only make sense for reads
    read_shaped: Option<&'static str>,
    write: Option<WriteOp>,
    violation: Option<String>,
}

impl QueryBuilder {
    /// Start a request against `table`. Unknown names (and `users`) resolve
    /// to empty results.
    pub fn new(store: Arc<FixtureStore>, table: &str, latency: Duration) -> Self {
        Self {
            store,
            table_name: table.to_string(),
            table: TableName::queryable(table),
            latency,
            projection: Projection::all(),
            filters: FilterSet::new(),
            orders: Vec::new(),
            window: None,
            single: false,
            count_requested: false,
            read_shaped: None,
            write: None,
            violation: None,
        }
    }

    /// Table name as requested
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn is_write(&self) -> bool {
        self.write.is_some()
    }

    /// Whether `count()` was called; the count is computed regardless
    pub fn count_requested(&self) -> bool {
        self.count_requested
    }

    /// Record a projection such as `*, profiles(username)`
    pub fn select(mut self, fields: &str) -> Self {
        match Projection::parse(fields) {
            Ok(projection) => self.projection = projection,
            Err(QueryError::InvalidQueryState(msg)) => self.reject(msg),
            Err(e) => self.reject(e.to_string()),
        }
        self
    }

    /// Keep rows whose `column` equals `value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        if self.check_column("eq()", &column) {
            self.filters.push(Filter::equals(column, value));
        }
        self
    }

    /// Keep rows whose `column` is one of `values`
    pub fn in_<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let column = column.into();
        if self.check_column("in()", &column) {
            self.filters.push(Filter::member_of(column, values));
        }
        self
    }

    /// Declare an ordering; only the last declared one takes effect
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        let column = column.into();
        if self.check_column("order()", &column) && self.mark_read("order()") {
            self.orders.push(OrderSpec { column, ascending });
        }
        self
    }

    /// Inclusive row range; the last call wins
    pub fn range(mut self, from: usize, to: usize) -> Self {
        if self.mark_read("range()") {
            self.window = Some(PageWindow::from_range(from, to));
        }
        self
    }

    /// First `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        if self.mark_read("limit()") {
            self.window = Some(PageWindow { offset: 0, limit: n });
        }
        self
    }

    /// Collapse the result to its first row, or `None`
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    /// Request the pre-pagination match count
    pub fn count(mut self) -> Self {
        if self.mark_read("count()") {
            self.count_requested = true;
        }
        self
    }

    /// Insert one object or an array of objects
    pub fn insert(mut self, rows: impl Into<Value>) -> Self {
        let rows = match rows.into() {
            Value::Object(row) => Some(vec![row]),
            Value::Array(items) => items.into_iter().map(into_row).collect(),
            _ => None,
        };
        match rows {
            Some(rows) => self.set_write(WriteOp::Insert(rows)),
            None => self.reject("insert() expects an object or an array of objects"),
        }
        self
    }

    /// Merge `patch` into every matched row
    pub fn update(mut self, patch: impl Into<Value>) -> Self {
        match into_row(patch.into()) {
            Some(patch) => self.set_write(WriteOp::Update(patch)),
            None => self.reject("update() expects an object"),
        }
        self
    }

    /// Remove every matched row
    pub fn delete(mut self) -> Self {
        self.set_write(WriteOp::Delete);
        self
    }

    /// Resolve the request
    pub async fn execute(self) -> ResultEnvelope {
        if self.latency.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(self.latency).await;
        }

        match self.resolve() {
            Ok(envelope) => envelope,
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::QueryRejected,
                    &[("table", self.table_name.as_str()), ("reason", reason.as_str())],
                );
                ResultEnvelope::failure(e)
            }
        }
    }

    fn resolve(&self) -> QueryResult<ResultEnvelope> {
        if let Some(violation) = &self.violation {
            return Err(QueryError::invalid(violation.clone()));
        }

        let Some(table) = self.table else {
            log_event_with_fields(Event::UnknownTable, &[("table", self.table_name.as_str())]);
            return Ok(self.finish(Vec::new(), 0));
        };

        let envelope = match &self.write {
            None => self.store.with_tables(|t| self.resolve_read(table, t))?,
            Some(op) => {
                let envelope = self
                    .store
                    .with_tables_mut(|t| self.resolve_write(table, op, t))?;
                let affected = envelope.count.to_string();
                log_event_with_fields(
                    Event::WriteApplied,
                    &[
                        ("table", table.as_str()),
                        ("op", op.name()),
                        ("affected", affected.as_str()),
                    ],
                );
                envelope
            }
        };

        let count = envelope.count.to_string();
        log_event_with_fields(
            Event::QueryResolved,
            &[("table", table.as_str()), ("count", count.as_str())],
        );
        Ok(envelope)
    }

    fn resolve_read(&self, table: TableName, tables: &Tables) -> ResultEnvelope {
        let mut rows = self.filters.apply(tables.rows(table).to_vec());
        apply_orders(&mut rows, &self.orders);

        let count = rows.len();
        if let Some(window) = self.window {
            rows = window.slice(rows);
        }

        let rows = self.project(table, rows, tables);
        self.finish(rows, count)
    }

    fn resolve_write(&self, table: TableName, op: &WriteOp, tables: &mut Tables) -> ResultEnvelope {
        let affected = match op {
            WriteOp::Insert(rows) => {
                let stamped: Vec<Row> = rows.iter().cloned().map(with_defaults).collect();
                tables.rows_mut(table).extend(stamped.iter().cloned());
                stamped
            }
            WriteOp::Update(patch) => {
                let mut updated = Vec::new();
                for row in tables.rows_mut(table).iter_mut() {
                    if self.filters.matches(row) {
                        for (key, value) in patch {
                            row.insert(key.clone(), value.clone());
                        }
                        updated.push(row.clone());
                    }
                }
                updated
            }
            WriteOp::Delete => {
                let rows = tables.rows_mut(table);
                let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(rows)
                    .into_iter()
                    .partition(|row| self.filters.matches(row));
                *rows = kept;
                removed
            }
        };

        let count = affected.len();
        let rows = self.project(table, affected, tables);
        self.finish(rows, count)
    }

    fn project(&self, table: TableName, rows: Vec<Row>, tables: &Tables) -> Vec<Row> {
        if self.projection.is_identity() {
            return rows;
        }
        rows.iter()
            .map(|row| self.projection.apply(table, row, tables))
            .collect()
    }

    fn finish(&self, rows: Vec<Row>, count: usize) -> ResultEnvelope {
        if self.single {
            ResultEnvelope::single(rows.into_iter().next(), count)
        } else {
            ResultEnvelope::rows(rows, count)
        }
    }

    fn reject(&mut self, message: impl Into<String>) {
        if self.violation.is_none() {
            self.violation = Some(message.into());
        }
    }

    fn check_column(&mut self, call: &str, column: &str) -> bool {
        if column.trim().is_empty() {
            self.reject(format!("{} requires a column name", call));
            return false;
        }
        true
    }

    fn mark_read(&mut self, call: &'static str) -> bool {
        if let Some(op) = &self.write {
            let message = format!("{} after {}", call, op.name());
            self.reject(message);
            return false;
        }
        self.read_shaped.get_or_insert(call);
        true
    }

    fn set_write(&mut self, op: WriteOp) {
        if let Some(existing) = &self.write {
            let message = format!("{} after {}", op.name(), existing.name());
            self.reject(message);
            return;
        }
        if let Some(call) = self.read_shaped {
            let message = format!("{} after {}", op.name(), call);
            self.reject(message);
            return;
        }
        self.write = Some(op);
    }
}

/// Fill the columns a database default would: `id`, `created_at`,
/// `updated_at`
fn with_defaults(mut row: Row) -> Row {
    if !row.contains_key("id") {
        row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    if !row.contains_key("created_at") {
        row.insert("created_at".to_string(), Value::String(now.clone()));
    }
    if !row.contains_key("updated_at") {
        row.insert("updated_at".to_string(), Value::String(now));
    }
    row
}

impl IntoFuture for QueryBuilder {
    type Output = ResultEnvelope;
    type IntoFuture = Pin<Box<dyn Future<Output = ResultEnvelope> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}
