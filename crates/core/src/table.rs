//! Normalized tables and the row filtering applied before display.

use serde::{Deserialize, Deserializer, Serialize};

/// Rendered in place of a null or NaN cell.
pub const INVALID_CELL_PLACEHOLDER: &str = "N/A";

/// Status shown when no table data is available at all.
pub const NO_DATA_MESSAGE: &str = "Error: No data received for table.";

/// Status shown when every row of the table contained an invalid cell.
pub const NO_VALID_ROWS_MESSAGE: &str = "Table exists but contains no valid rows.";

/// Title used when the backend returned a table without a name.
pub const UNTITLED_TABLE: &str = "Untitled Table";

/// A single cell value as sent by the backend.
///
/// Arrays and objects are kept as their JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Null, undefined and NaN cells are invalid.
    pub fn is_invalid(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            Self::Bool(_) | Self::Text(_) => false,
        }
    }

    /// Text shown for this cell in the table viewer.
    pub fn display(&self) -> String {
        match self {
            _ if self.is_invalid() => INVALID_CELL_PLACEHOLDER.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Null => INVALID_CELL_PLACEHOLDER.to_string(),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            other => Self::Text(other.to_string()),
        }
    }
}

impl From<CellValue> for serde_json::Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(b),
            CellValue::Number(n) => serde_json::Number::from_f64(n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            CellValue::Text(s) => serde_json::Value::String(s),
        }
    }
}

/// One normalized relation with its data.
///
/// Older backend builds used `header` and `rank` for the header and row
/// keys; both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedTable {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "header")]
    pub headers: Vec<String>,
    #[serde(default, alias = "rank", deserialize_with = "deserialize_rows")]
    pub rows: Vec<Vec<CellValue>>,
}

impl NormalizedTable {
    /// Fill in the requested name when the backend omitted it.
    pub fn with_default_name(mut self, requested: &str) -> Self {
        if self.name.is_empty() {
            self.name = requested.to_string();
        }
        self
    }

    /// Empty table carrying only a name, used after a failed fetch.
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

// Rows that are not arrays cannot be laid out under the headers.
fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<Vec<CellValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|row| match row {
            serde_json::Value::Array(cells) => {
                Some(cells.into_iter().map(CellValue::from).collect())
            }
            _ => None,
        })
        .collect())
}

/// Display-ready view of a table: only rows without invalid cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// Build the view, or the status message to show instead.
    pub fn new(table: Option<&NormalizedTable>) -> Result<Self, &'static str> {
        let table = table.ok_or(NO_DATA_MESSAGE)?;
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .filter(|row| !row.iter().any(CellValue::is_invalid))
            .map(|row| row.iter().map(CellValue::display).collect())
            .collect();

        if rows.is_empty() {
            return Err(NO_VALID_ROWS_MESSAGE);
        }

        let title = if table.name.is_empty() {
            UNTITLED_TABLE.to_string()
        } else {
            table.name.clone()
        };

        Ok(Self {
            title,
            headers: table.headers.clone(),
            rows,
        })
    }

    /// Display width of each column: the widest header or cell.
    pub fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|i| {
                let header = self.headers.get(i).map_or(0, |h| h.chars().count());
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .fold(header, usize::max)
            })
            .collect()
    }
}
