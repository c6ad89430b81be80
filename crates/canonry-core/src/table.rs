//! Minimal named-column tabular input.
//!
//! The I/O layer (CSV reader, caller code) hands data over as a [`Table`];
//! conversion into typed records happens exactly once, with schema
//! validation at that boundary. Pipeline code never does runtime column
//! lookups after that point.

use crate::error::{Error, Result};

/// A set of named columns with string cells, as loaded from a delimited
/// text source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have one cell per header.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(Error::Schema(format!(
                "row {} has {} cells, expected {}",
                self.rows.len() + 1,
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column headers, in input order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, in input order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name, if present.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of a required column; missing columns are a schema error.
    ///
    /// `context` names the table in the error message ("reference", "raw").
    pub fn require_column(&self, name: &str, context: &str) -> Result<usize> {
        self.column(name).ok_or_else(|| {
            Error::Schema(format!(
                "{} table missing required column '{}'",
                context, name
            ))
        })
    }
}
