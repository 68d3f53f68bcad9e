//! Display formatting for a seller's rows.

use crate::dataset::SellerRows;
use crate::error::{DashboardError, Result};
use crate::record::{TABLE_COLUMNS, Value};
use serde::Serialize;

/// Shown instead of a number when a cell cannot be coerced.
pub const PLACEHOLDER: &str = "n/a";

/// One formatted table line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub ctg: String,
    pub sale: String,
    pub tgt: String,
    pub achievement: String,
    pub commission: String,
}

impl TableRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            self.ctg.as_str(),
            self.sale.as_str(),
            self.tgt.as_str(),
            self.achievement.as_str(),
            self.commission.as_str(),
        ]
    }
}

/// One bar of the achievement chart. Categories whose achievement is not
/// numeric produce no point.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub percent: f64,
}

/// The formatted rows of one seller, ready to be displayed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SellerTable {
    pub seller: String,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    pub chart: Vec<ChartPoint>,
}

/// Formats a seller's rows.
///
/// Fails with `EmptySeller` when there are no rows and with `MissingColumns`
/// when the sheet lacks any of the table columns. Nothing partial is returned.
pub fn format_seller(rows: &SellerRows<'_>) -> Result<SellerTable> {
    if rows.rows.is_empty() {
        return Err(DashboardError::EmptySeller(rows.seller.to_string()));
    }

    let missing: Vec<String> = TABLE_COLUMNS
        .iter()
        .filter(|c| !rows.columns.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DashboardError::MissingColumns(missing));
    }

    let mut table_rows = Vec::with_capacity(rows.rows.len());
    let mut chart = Vec::new();
    for record in &rows.rows {
        let category = record.ctg.to_string();
        if let Some(percent) = achievement_percent(&record.achievement) {
            chart.push(ChartPoint {
                category: category.clone(),
                percent,
            });
        }
        table_rows.push(TableRow {
            ctg: category,
            sale: format_amount(&record.sale),
            tgt: format_amount(&record.tgt),
            achievement: format_achievement(&record.achievement),
            commission: format_amount(&record.commission),
        });
    }

    Ok(SellerTable {
        seller: rows.seller.to_string(),
        columns: TABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: table_rows,
        chart,
    })
}

/// Achievement fraction as a percentage rounded to 2 decimals. Fractions too
/// large to scale stay `None`.
pub fn achievement_percent(value: &Value) -> Option<f64> {
    value
        .as_number()
        .map(|fraction| (fraction * 100.0 * 100.0).round() / 100.0)
        .filter(|percent| percent.is_finite())
}

/// `0.4567` -> `"45.67 %"`; non-numeric input yields the placeholder.
pub fn format_achievement(value: &Value) -> String {
    match achievement_percent(value) {
        Some(percent) => format!("{:.2} %", percent),
        None => PLACEHOLDER.to_string(),
    }
}

/// Thousands-grouped integer, or the placeholder for non-numeric input.
pub fn format_amount(value: &Value) -> String {
    match value.as_number() {
        Some(n) => format_thousands(n),
        None => PLACEHOLDER.to_string(),
    }
}

/// Rounds to an integer and inserts `,` every three digits.
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}
