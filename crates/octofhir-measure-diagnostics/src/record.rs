//! Input record references for data-quality reporting

use serde::{Deserialize, Serialize};
use std::fmt;

/// The input table a record was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Members,
    Claims,
    Pharmacy,
    Labs,
}

impl TableKind {
    /// Table name as used in snapshots and messages
    pub const fn name(&self) -> &'static str {
        match self {
            TableKind::Members => "members",
            TableKind::Claims => "claims",
            TableKind::Pharmacy => "pharmacy",
            TableKind::Labs => "labs",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a single input record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    /// Source table
    pub table: TableKind,
    /// Zero-based row index within the table
    pub row: usize,
    /// Owning member, when known
    pub member_id: Option<String>,
    /// Offending column, when the issue is field-specific
    pub column: Option<String>,
}

impl RecordRef {
    /// Create a reference to a table row
    pub const fn new(table: TableKind, row: usize) -> Self {
        Self {
            table,
            row,
            member_id: None,
            column: None,
        }
    }

    /// Attach the owning member id
    pub fn member(mut self, member_id: impl Into<String>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    /// Attach the offending column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.row)?;
        if let Some(column) = &self.column {
            write!(f, ".{}", column)?;
        }
        if let Some(member_id) = &self.member_id {
            write!(f, " (member {})", member_id)?;
        }
        Ok(())
    }
}
