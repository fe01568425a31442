//! Database type definitions
//!
//! Rows hold the string form of each cell, as rendered by the connector:
//! the validator only ever compares string representations.

/// A single row of query results
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    /// Cell values in column order
    pub values: Vec<CellValue>,
}

/// A cell value (single column value in a row)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// NULL value
    Null,

    /// String form of any non-NULL value
    Text(String),
}

impl Row {
    /// Build a row from text cells, `None` meaning NULL
    pub fn from_text<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            values: cells
                .into_iter()
                .map(|c| c.map_or(CellValue::Null, |s| CellValue::Text(s.into())))
                .collect(),
        }
    }

    /// First column of the row, if the row has any columns
    pub fn first(&self) -> Option<&CellValue> {
        self.values.first()
    }
}

impl CellValue {
    /// String form used when comparing against a check value
    pub fn as_text(&self) -> &str {
        match self {
            CellValue::Null => "None",
            CellValue::Text(s) => s,
        }
    }

    /// Check if this is a NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<Option<&str>> for CellValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(CellValue::Null, |s| CellValue::Text(s.to_string()))
    }
}
