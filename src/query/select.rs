//! # Projection
//!
//! Parses select strings such as `*, profiles(username)` and shapes rows
//! accordingly. Embedded relations are resolved by following a foreign key
//! on the row to the related table's `id`.

use serde_json::Value;

use super::errors::{QueryError, QueryResult};
use crate::fixtures::{Row, TableName, Tables};

/// Which plain columns a projection keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    /// `*`: every column
    All,
    /// Enumerated columns, in the order requested
    Only(Vec<String>),
}

/// A related table pulled into each row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Relation name as written; also the output key
    pub table: String,
    pub projection: Projection,
}

/// Parsed select string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub columns: Columns,
    pub embeds: Vec<Embed>,
}

impl Default for Projection {
    fn default() -> Self {
        Self::all()
    }
}

impl Projection {
    /// `*`
    pub fn all() -> Self {
        Self {
            columns: Columns::All,
            embeds: Vec::new(),
        }
    }

    /// Parse a select string
    pub fn parse(select: &str) -> QueryResult<Self> {
        let entries = split_top_level(select)?;
        if entries.is_empty() {
            return Err(QueryError::invalid("select cannot be empty"));
        }

        let mut wildcard = false;
        let mut columns = Vec::new();
        let mut embeds = Vec::new();

        for entry in entries {
            if entry == "*" {
                wildcard = true;
            } else if let Some(open) = entry.find('(') {
                if !entry.ends_with(')') {
                    return Err(QueryError::invalid(format!(
                        "malformed embedded select: {}",
                        entry
                    )));
                }
                let table = entry[..open].trim();
                if table.is_empty() {
                    return Err(QueryError::invalid(format!(
                        "embedded select missing relation name: {}",
                        entry
                    )));
                }
                let inner = &entry[open + 1..entry.len() - 1];
                embeds.push(Embed {
                    table: table.to_string(),
                    projection: Projection::parse(inner)?,
                });
            } else {
                columns.push(entry.to_string());
            }
        }

        let columns = if wildcard || (columns.is_empty() && embeds.is_empty()) {
            Columns::All
        } else {
            Columns::Only(columns)
        };

        Ok(Self { columns, embeds })
    }

    /// True when rows come back unchanged
    pub fn is_identity(&self) -> bool {
        self.columns == Columns::All && self.embeds.is_empty()
    }

    /// Shape one row of `table`.
    ///
    /// Enumerated columns absent from the row are omitted. An embed whose
    /// relation is unknown or whose foreign key finds no row becomes `null`.
    pub fn apply(&self, table: TableName, row: &Row, tables: &Tables) -> Row {
        let mut shaped = match &self.columns {
            Columns::All => row.clone(),
            Columns::Only(fields) => fields
                .iter()
                .filter_map(|f| row.get(f).map(|v| (f.clone(), v.clone())))
                .collect(),
        };

        for embed in &self.embeds {
            let related = TableName::parse(&embed.table).and_then(|target| {
                let fk = table.foreign_key_to(target)?;
                let key = row.get(fk)?;
                let found = tables.find_by_id(target, key)?;
                Some(Value::Object(embed.projection.apply(target, found, tables)))
            });
            shaped.insert(embed.table.clone(), related.unwrap_or(Value::Null));
        }

        shaped
    }
}

/// Split on commas that are not inside parentheses, trimming each entry.
/// A blank string yields no entries; a blank entry next to others is an error.
fn split_top_level(select: &str) -> QueryResult<Vec<String>> {
    if select.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in select.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| QueryError::invalid(format!("unbalanced ')' in select: {}", select)))?;
                current.push(c);
            }
            ',' if depth == 0 => {
                push_entry(&mut entries, &current, select)?;
                current.clear();
            }
            c if c.is_whitespace() => {}
            c => current.push(c),
        }
    }

    if depth != 0 {
        return Err(QueryError::invalid(format!(
            "unbalanced '(' in select: {}",
            select
        )));
    }
    push_entry(&mut entries, &current, select)?;

    Ok(entries)
}

fn push_entry(entries: &mut Vec<String>, entry: &str, select: &str) -> QueryResult<()> {
    if entry.is_empty() {
        return Err(QueryError::invalid(format!("empty entry in select: {}", select)));
    }
    entries.push(entry.to_string());
    Ok(())
}
