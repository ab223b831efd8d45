//! # Result Envelope
//!
//! `{data, error, count}` returned by every table operation.

use serde::Serialize;

use crate::errors::ErrorDescriptor;
use crate::fixtures::Row;

/// Payload of a successful resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    /// Produced by `single()`
    Row(Row),
    Rows(Vec<Row>),
}

/// Envelope returned by query resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope {
    pub data: Option<Data>,
    pub error: Option<ErrorDescriptor>,
    /// Matches before pagination for reads; affected rows for writes
    pub count: usize,
}

impl ResultEnvelope {
    /// A row-sequence result
    pub fn rows(rows: Vec<Row>, count: usize) -> Self {
        Self {
            data: Some(Data::Rows(rows)),
            error: None,
            count,
        }
    }

    /// A `single()` result; absence is not an error
    pub fn single(row: Option<Row>, count: usize) -> Self {
        Self {
            data: row.map(Data::Row),
            error: None,
            count,
        }
    }

    /// A failed resolution
    pub fn failure(error: impl Into<ErrorDescriptor>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
            count: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Rows carried by the envelope; a single row is a one-element slice
    pub fn rows_slice(&self) -> &[Row] {
        match &self.data {
            Some(Data::Rows(rows)) => rows,
            Some(Data::Row(row)) => std::slice::from_ref(row),
            None => &[],
        }
    }

    /// The row of a `single()` result
    pub fn row(&self) -> Option<&Row> {
        match &self.data {
            Some(Data::Row(row)) => Some(row),
            _ => None,
        }
    }

    /// Convert into a `Result` for callers that prefer `?`
    pub fn into_result(self) -> Result<Option<Data>, ErrorDescriptor> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }
}
