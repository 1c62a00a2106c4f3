//! Column-typed input tables
//!
//! A [`Table`] is the transport-neutral shape the engine ingests: a list of
//! column names and rows of JSON scalars. Tables are built either from an
//! array of records (`[{"member_id": "M1", ...}]`) or from a columnar object
//! (`{"columns": [...], "rows": [[...]]}`).

use octofhir_measure_diagnostics::{MQ0001, MQ0002, MQ0003, MQ0004, MeasureError, Result, TableKind};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A column-typed input table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub kind: TableKind,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new(kind: TableKind, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create an empty table of unknown schema
    pub fn empty(kind: TableKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a row, checking its width
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(MeasureError::schema_in(
                MQ0003,
                self.kind.name(),
                format!(
                    "row {} has {} cells, expected {}",
                    self.rows.len(),
                    row.len(),
                    self.columns.len()
                ),
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Build a table from an array of JSON objects
    ///
    /// Columns are the union of keys in first-seen order; keys missing from
    /// a record become nulls.
    pub fn from_records(kind: TableKind, records: &[Value]) -> Result<Self> {
        let mut columns: IndexSet<String> = IndexSet::new();
        for (index, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                MeasureError::schema_in(
                    MQ0004,
                    kind.name(),
                    format!("record {} is not an object", index),
                )
            })?;
            columns.extend(object.keys().cloned());
        }

        let rows = records
            .iter()
            .filter_map(Value::as_object)
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self {
            kind,
            columns: columns.into_iter().collect(),
            rows,
        })
    }

    /// Build a table from either a record array or a columnar object
    pub fn from_json_value(kind: TableKind, value: &Value) -> Result<Self> {
        match value {
            Value::Array(records) => Self::from_records(kind, records),
            Value::Object(object) => {
                let columns = object
                    .get("columns")
                    .and_then(Value::as_array)
                    .ok_or_else(|| malformed(kind, "columnar table needs a 'columns' array"))?;
                let columns = columns
                    .iter()
                    .map(|c| {
                        c.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| malformed(kind, "column names must be strings"))
                    })
                    .collect::<Result<Vec<_>>>()?;

                let mut table = Self::new(kind, columns);
                if let Some(rows) = object.get("rows") {
                    let rows = rows
                        .as_array()
                        .ok_or_else(|| malformed(kind, "'rows' must be an array"))?;
                    for row in rows {
                        let cells = row
                            .as_array()
                            .ok_or_else(|| malformed(kind, "each row must be an array"))?;
                        table.push_row(cells.clone())?;
                    }
                }
                Ok(table)
            }
            Value::Null => Ok(Self::empty(kind)),
            _ => Err(malformed(kind, "expected an array of records or a columnar object")),
        }
    }

    /// Fail fast when any required column is absent
    pub fn require(&self, required: &[&str]) -> Result<()> {
        // An empty record array carries no schema
        if self.columns.is_empty() && self.rows.is_empty() {
            return Ok(());
        }

        let mut errors: Vec<MeasureError> = required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| {
                MeasureError::schema_in(
                    MQ0001,
                    self.kind.name(),
                    format!("missing required column '{}' in {} table", name, self.kind),
                )
            })
            .collect();

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(MeasureError::Multiple(errors)),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows with column lookup by name
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }
}

fn malformed(kind: TableKind, message: &str) -> MeasureError {
    MeasureError::schema_in(MQ0002, kind.name(), format!("{} table: {}", kind, message))
}

/// A borrowed table row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Zero-based row index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw cell value, `None` when the column is absent
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        let col = self.table.column_index(column)?;
        self.table.rows[self.index].get(col)
    }

    /// Cell rendered as trimmed text; nulls and blanks are `None`
    pub fn text(&self, column: &str) -> Option<String> {
        match self.value(column)? {
            Value::Null => None,
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() { None } else { Some(s.to_string()) }
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }
}
