use chrono::NaiveDate;
use serde::Serialize;

/// A single cell of the transaction table.
///
/// Cells arrive from the Sheets API as strings; the processor coerces them
/// into `Number`/`Date` where the column calls for it. `Empty` only exists
/// between fetch and zero-fill.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

/// Rectangular transaction table: one header per column, one row per
/// transaction. Rows always have exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, padding ragged rows with `Empty` and truncating rows
    /// longer than the header count.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<Value>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, Value::Empty);
        }
        Self { headers, rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Append a derived column. `values` must have one entry per row.
    pub fn push_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.headers.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Unique text values of a column in first-appearance order.
    pub fn unique_text(&self, name: &str) -> Vec<String> {
        let Some(idx) = self.column_index(name) else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        for row in &self.rows {
            if let Some(text) = row[idx].as_str() {
                if !seen.iter().any(|s| s == text) {
                    seen.push(text.to_string());
                }
            }
        }
        seen
    }
}

/// Total spend per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Total spend per subcategory within one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryTotal {
    pub subcategory: String,
    pub total: f64,
}

/// Total spend per derived month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    pub month: String,
    pub total: f64,
}

/// Mean and median spend per category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: String,
    pub mean_expense: f64,
    pub median_expense: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_new_pads_ragged_rows() {
        let table = Table::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![text("1")],
                vec![text("1"), text("2"), text("3"), text("4")],
            ],
        );
        assert_eq!(table.rows[0].len(), 3);
        assert_eq!(table.rows[0][1], Value::Empty);
        assert_eq!(table.rows[0][2], Value::Empty);
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn test_unique_text_keeps_first_appearance_order() {
        let table = Table::new(
            vec!["category".into()],
            vec![
                vec![text("food")],
                vec![text("rent")],
                vec![text("food")],
                vec![text("travel")],
            ],
        );
        assert_eq!(table.unique_text("category"), vec!["food", "rent", "travel"]);
        assert!(table.unique_text("missing").is_empty());
    }

    #[test]
    fn test_push_column_extends_every_row() {
        let mut table = Table::new(vec!["a".into()], vec![vec![text("x")], vec![text("y")]]);
        table.push_column("month", vec![text("2024-01"), text("2024-02")]);
        assert_eq!(table.headers, vec!["a", "month"]);
        assert_eq!(table.rows[1][1], text("2024-02"));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Text("x".into()).as_f64(), None);
        assert_eq!(text("x").as_str(), Some("x"));
        assert!(Value::Empty.is_empty());
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::Date(d).as_date(), Some(d));
    }
}
