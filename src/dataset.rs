use crate::error::{DashboardError, Result};
use crate::record::{KEY_COLUMNS, SalesRecord, TABLE_COLUMNS};
use chrono::{DateTime, Local};
use std::collections::HashSet;

/// The loaded sales sheet.
///
/// Immutable once built; the cache hands it out behind an `Arc` so every
/// render pass reads the same rows.
#[derive(Clone, Debug)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<SalesRecord>,
    loaded_at: DateTime<Local>,
}

/// Rows of one seller inside one branch, together with the sheet header.
#[derive(Clone, Debug)]
pub struct SellerRows<'a> {
    pub seller: &'a str,
    pub columns: &'a [String],
    pub rows: Vec<&'a SalesRecord>,
}

impl Dataset {
    /// Builds a dataset, rejecting sheets without the key columns.
    pub fn new(columns: Vec<String>, records: Vec<SalesRecord>) -> Result<Self> {
        let missing: Vec<String> = KEY_COLUMNS
            .iter()
            .filter(|key| !columns.iter().any(|c| c == *key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashboardError::MissingColumns(missing));
        }

        Ok(Dataset {
            columns,
            records,
            loaded_at: Local::now(),
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }

    /// Table columns absent from the sheet header, in display order.
    pub fn missing_table_columns(&self) -> Vec<String> {
        TABLE_COLUMNS
            .iter()
            .filter(|c| !self.columns.iter().any(|h| h == *c))
            .map(|c| c.to_string())
            .collect()
    }

    /// Distinct branches in first-appearance order. Blank branch cells are skipped.
    pub fn branches(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.branch.as_str()))
    }

    pub fn has_branch(&self, branch: &str) -> bool {
        self.records.iter().any(|r| r.branch == branch)
    }

    pub fn rows_for_branch<'a>(&'a self, branch: &'a str) -> impl Iterator<Item = &'a SalesRecord> {
        self.records.iter().filter(move |r| r.branch == branch)
    }

    /// Distinct non-empty seller names of a branch, first-appearance order.
    pub fn sellers_in(&self, branch: &str) -> Vec<String> {
        distinct(self.rows_for_branch(branch).map(|r| r.name.as_str()))
    }

    /// All rows of `seller` within `branch`.
    pub fn seller_rows<'a>(&'a self, branch: &'a str, seller: &'a str) -> SellerRows<'a> {
        SellerRows {
            seller,
            columns: &self.columns,
            rows: self
                .rows_for_branch(branch)
                .filter(|r| r.name == seller)
                .collect(),
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if !value.is_empty() && seen.insert(value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::{
        COL_ACHIEVEMENT, COL_BRANCH, COL_COMMISSION, COL_CTG, COL_NAME, COL_SALE, COL_TGT, Value,
    };

    pub(crate) fn full_header() -> Vec<String> {
        [
            COL_BRANCH,
            COL_NAME,
            COL_CTG,
            COL_SALE,
            COL_TGT,
            COL_ACHIEVEMENT,
            COL_COMMISSION,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    pub(crate) fn row(branch: &str, name: &str, ctg: &str, sale: f64, tgt: f64) -> SalesRecord {
        let mut r = SalesRecord::new(branch, name);
        r.ctg = Value::Text(ctg.to_string());
        r.sale = Value::Number(sale);
        r.tgt = Value::Number(tgt);
        r.achievement = Value::Number(sale / tgt);
        r.commission = Value::Number(sale * 0.05);
        r
    }

    pub(crate) fn sample() -> Dataset {
        Dataset::new(
            full_header(),
            vec![
                row("North", "Ali", "Phones", 1200.0, 1000.0),
                row("North", "Sara", "Phones", 800.0, 1000.0),
                row("South", "Reza", "Laptops", 5000.0, 4000.0),
                row("North", "Ali", "Tablets", 300.0, 600.0),
                row("East", "", "Phones", 10.0, 100.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn branches_keep_first_appearance_order() {
        assert_eq!(sample().branches(), vec!["North", "South", "East"]);
    }

    #[test]
    fn sellers_are_distinct_and_ordered() {
        let data = sample();
        assert_eq!(data.sellers_in("North"), vec!["Ali", "Sara"]);
        assert_eq!(data.sellers_in("South"), vec!["Reza"]);
    }

    #[test]
    fn branch_with_blank_names_has_no_sellers() {
        let data = sample();
        assert!(data.has_branch("East"));
        assert!(data.sellers_in("East").is_empty());
    }

    #[test]
    fn seller_rows_stay_inside_branch() {
        let data = sample();
        let rows = data.seller_rows("North", "Ali");
        assert_eq!(rows.rows.len(), 2);
        assert!(rows.rows.iter().all(|r| r.branch == "North" && r.name == "Ali"));
    }

    #[test]
    fn missing_key_column_is_rejected() {
        let header = vec![COL_BRANCH.to_string(), COL_CTG.to_string()];
        match Dataset::new(header, vec![]) {
            Err(DashboardError::MissingColumns(cols)) => assert_eq!(cols, vec!["Name"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_table_columns_are_reported() {
        let mut header = full_header();
        header.retain(|c| c != COL_COMMISSION);
        let data = Dataset::new(header, vec![]).unwrap();
        assert_eq!(data.missing_table_columns(), vec!["commesion"]);
    }
}
