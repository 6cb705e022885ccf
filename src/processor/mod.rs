//! Transaction data processing
//!
//! Normalizes the raw sheet table and serves the aggregation queries behind
//! the dashboard:
//!
//! - type coercion: `date` to dates, the sum columns to numbers
//! - zero-fill: every remaining empty cell becomes `0`, including cells in
//!   non-numeric columns
//! - queries: filter by category/period, totals by category, subcategory
//!   and month, mean/median by category
//!
//! All queries are read-only except [`Processor::monthly_summary`], which
//! writes the derived `month` column back into the table.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{CategoryStats, CategoryTotal, MonthlyTotal, SubcategoryTotal, Table, Value};

pub const COL_DATE: &str = "date";
pub const COL_CATEGORY: &str = "category";
pub const COL_SUBCATEGORY: &str = "subcategory";
pub const COL_PERIOD: &str = "period";
pub const COL_SUM_LOCAL: &str = "sum rub";
pub const COL_SUM_ORIGINAL: &str = "sum currency";
pub const COL_MONTH: &str = "month";

/// Month label for rows whose date was null-coerced to zero.
const EPOCH_MONTH: &str = "1970-01";

#[derive(Debug, Error, PartialEq)]
pub enum ProcessorError {
    #[error("column '{0}' not found")]
    ColumnNotFound(&'static str),
}

type Result<T> = std::result::Result<T, ProcessorError>;

/// Holds the normalized transaction table and answers aggregation queries.
#[derive(Debug, Clone)]
pub struct Processor {
    table: Table,
}

impl Processor {
    /// Normalize a freshly fetched table: coerce types, then zero-fill.
    pub fn new(mut table: Table) -> Self {
        coerce_types(&mut table);
        fill_empty_with_zero(&mut table);
        log::info!("Data types checked and converted where necessary.");
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Rows whose `category` cell equals the needle.
    pub fn filter_by_category(&self, category: &str) -> Result<Table> {
        self.filter_by_text(COL_CATEGORY, category)
    }

    /// Rows whose `period` cell equals the needle.
    pub fn filter_by_period(&self, period: &str) -> Result<Table> {
        self.filter_by_text(COL_PERIOD, period)
    }

    /// Total local-currency spend per category, keys sorted ascending.
    pub fn category_summary(&self) -> Result<Vec<CategoryTotal>> {
        let totals = self.sum_by(COL_CATEGORY, &self.table)?;
        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }

    /// Total spend per subcategory within one category.
    pub fn subcategory_summary(&self, category: &str) -> Result<Vec<SubcategoryTotal>> {
        let filtered = self.filter_by_category(category)?;
        let totals = self.sum_by(COL_SUBCATEGORY, &filtered)?;
        Ok(totals
            .into_iter()
            .map(|(subcategory, total)| SubcategoryTotal { subcategory, total })
            .collect())
    }

    /// Per-category totals within one period; feeds the bar chart when a
    /// period is selected.
    pub fn period_category_summary(&self, period: &str) -> Result<Vec<CategoryTotal>> {
        let filtered = self.filter_by_period(period)?;
        let totals = self.sum_by(COL_CATEGORY, &filtered)?;
        Ok(totals
            .into_iter()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect())
    }

    /// Total spend per derived month.
    ///
    /// Writes the `month` column back into the table: dates format as
    /// `YYYY-MM`, zero-coerced dates land in the epoch month.
    pub fn monthly_summary(&mut self) -> Result<Vec<MonthlyTotal>> {
        let date_idx = self
            .table
            .column_index(COL_DATE)
            .ok_or(ProcessorError::ColumnNotFound(COL_DATE))?;
        let sum_idx = self
            .table
            .column_index(COL_SUM_LOCAL)
            .ok_or(ProcessorError::ColumnNotFound(COL_SUM_LOCAL))?;

        let months: Vec<Value> = self
            .table
            .rows
            .iter()
            .map(|row| Value::Text(month_label(&row[date_idx])))
            .collect();

        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for (row, month) in self.table.rows.iter().zip(&months) {
            let label = month.as_str().unwrap_or(EPOCH_MONTH);
            *totals.entry(label.to_string()).or_insert(0.0) +=
                row[sum_idx].as_f64().unwrap_or(0.0);
        }

        // Overwrite on repeat calls instead of stacking duplicate columns.
        if let Some(month_idx) = self.table.column_index(COL_MONTH) {
            for (row, month) in self.table.rows.iter_mut().zip(months) {
                row[month_idx] = month;
            }
        } else {
            self.table.push_column(COL_MONTH, months);
        }

        Ok(totals
            .into_iter()
            .map(|(month, total)| MonthlyTotal { month, total })
            .collect())
    }

    /// Mean and median spend per category, keys sorted ascending.
    pub fn category_mean_median(&self) -> Result<Vec<CategoryStats>> {
        let groups = self.group_values(COL_CATEGORY, &self.table)?;
        Ok(groups
            .into_iter()
            .map(|(category, mut values)| {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                values.sort_by(|a, b| a.total_cmp(b));
                CategoryStats {
                    category,
                    mean_expense: mean,
                    median_expense: median_of_sorted(&values),
                }
            })
            .collect())
    }

    fn filter_by_text(&self, column: &'static str, needle: &str) -> Result<Table> {
        let idx = self
            .table
            .column_index(column)
            .ok_or(ProcessorError::ColumnNotFound(column))?;

        let rows = self
            .table
            .rows
            .iter()
            .filter(|row| row[idx].as_str() == Some(needle))
            .cloned()
            .collect();

        Ok(Table::new(self.table.headers.clone(), rows))
    }

    fn sum_by(&self, key_column: &'static str, table: &Table) -> Result<BTreeMap<String, f64>> {
        let groups = self.group_values(key_column, table)?;
        Ok(groups
            .into_iter()
            .map(|(key, values)| (key, values.iter().sum()))
            .collect())
    }

    /// Local-currency amounts grouped by the text value of `key_column`.
    fn group_values(
        &self,
        key_column: &'static str,
        table: &Table,
    ) -> Result<BTreeMap<String, Vec<f64>>> {
        let key_idx = table
            .column_index(key_column)
            .ok_or(ProcessorError::ColumnNotFound(key_column))?;
        let sum_idx = table
            .column_index(COL_SUM_LOCAL)
            .ok_or(ProcessorError::ColumnNotFound(COL_SUM_LOCAL))?;

        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in &table.rows {
            // Zero-filled key cells group under the "0" label.
            groups
                .entry(key_label(&row[key_idx]))
                .or_default()
                .push(row[sum_idx].as_f64().unwrap_or(0.0));
        }
        Ok(groups)
    }
}

/// Coerce the `date` column to dates and the sum columns to numbers.
/// Values that fail to parse become `Empty` for the zero-fill pass.
fn coerce_types(table: &mut Table) {
    if let Some(idx) = table.column_index(COL_DATE) {
        for row in &mut table.rows {
            row[idx] = match row[idx].as_str().and_then(parse_date_flexible) {
                Some(date) => Value::Date(date),
                None => Value::Empty,
            };
        }
    }

    for column in [COL_SUM_LOCAL, COL_SUM_ORIGINAL] {
        if let Some(idx) = table.column_index(column) {
            for row in &mut table.rows {
                row[idx] = match row[idx].as_str().and_then(|s| s.trim().parse::<f64>().ok()) {
                    Some(n) => Value::Number(n),
                    None => Value::Empty,
                };
            }
        }
    }
}

/// Replace every empty cell with zero, whatever the column.
fn fill_empty_with_zero(table: &mut Table) {
    let mut filled = 0usize;
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            if cell.is_empty() {
                *cell = Value::Number(0.0);
                filled += 1;
            }
        }
    }
    if filled > 0 {
        log::info!("Replaced {} missing values with zeros.", filled);
    }
}

/// Parse date strings flexibly: plain dates, datetimes, and the dotted
/// day-first format spreadsheets commonly export.
fn parse_date_flexible(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(date_str, "%d.%m.%Y").ok())
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Group key for a cell: text as-is, anything else via its display form.
fn key_label(cell: &Value) -> String {
    match cell {
        Value::Text(s) => s.clone(),
        Value::Number(n) => format!("{}", n),
        Value::Date(d) => d.to_string(),
        Value::Empty => String::new(),
    }
}

fn month_label(cell: &Value) -> String {
    match cell.as_date() {
        Some(date) => date.format("%Y-%m").to_string(),
        None => EPOCH_MONTH.to_string(),
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}
