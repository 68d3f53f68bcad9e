use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    // Plain or thousands-grouped numeric text, e.g. "0.45", "-1,234,567.8"
    static ref NUMERIC_TEXT: Regex =
        Regex::new(r"^[+-]?(\d{1,3}(,\d{3})+|\d+)(\.\d+)?$|^[+-]?\.\d+$").unwrap();
}

pub const COL_BRANCH: &str = "Branch";
pub const COL_NAME: &str = "Name";
pub const COL_CTG: &str = "Ctg";
pub const COL_SALE: &str = "Sale";
pub const COL_TGT: &str = "Tgt";
pub const COL_ACHIEVEMENT: &str = "%Achivement";
pub const COL_COMMISSION: &str = "commesion";

/// Columns the loader cannot work without.
pub const KEY_COLUMNS: [&str; 2] = [COL_BRANCH, COL_NAME];

/// Columns every seller table is built from, in display order.
pub const TABLE_COLUMNS: [&str; 5] = [COL_CTG, COL_SALE, COL_TGT, COL_ACHIEVEMENT, COL_COMMISSION];

/// A single spreadsheet cell after loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Value {
    /// Builds a value from raw text, keeping blanks as `Empty`.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Value::Empty
        } else {
            Value::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Numeric coercion: numbers pass through, numeric text is parsed,
    /// everything else (blank, words, NaN) is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) => None,
            Value::Text(s) => {
                let s = s.trim();
                if !NUMERIC_TEXT.is_match(s) {
                    return None;
                }
                s.replace(',', "").parse::<f64>().ok()
            }
            Value::Empty => None,
        }
    }

    /// Text used when the value acts as a grouping key (branch, seller).
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Empty => Ok(()),
        }
    }
}

/// One row of the sales sheet.
///
/// `branch` and `name` are stored as keys (an empty seller name is kept as an
/// empty string so the row still belongs to its branch). The measure columns
/// keep their raw cell value; formatting happens later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub branch: String,
    pub name: String,
    pub ctg: Value,
    pub sale: Value,
    pub tgt: Value,
    pub achievement: Value,
    pub commission: Value,
}

impl SalesRecord {
    pub fn new(branch: impl Into<String>, name: impl Into<String>) -> Self {
        SalesRecord {
            branch: branch.into(),
            name: name.into(),
            ctg: Value::Empty,
            sale: Value::Empty,
            tgt: Value::Empty,
            achievement: Value::Empty,
            commission: Value::Empty,
        }
    }

    /// Sets a measure column by its sheet header. Unknown headers are ignored.
    pub fn set(&mut self, column: &str, value: Value) {
        match column {
            COL_BRANCH => self.branch = value.as_key(),
            COL_NAME => self.name = value.as_key(),
            COL_CTG => self.ctg = value,
            COL_SALE => self.sale = value,
            COL_TGT => self.tgt = value,
            COL_ACHIEVEMENT => self.achievement = value,
            COL_COMMISSION => self.commission = value,
            _ => {}
        }
    }

    pub fn has_seller(&self) -> bool {
        !self.name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_is_coerced() {
        assert_eq!(Value::Text("0.45".into()).as_number(), Some(0.45));
        assert_eq!(Value::Text("1,234,567".into()).as_number(), Some(1234567.0));
        assert_eq!(Value::Text("-12.5".into()).as_number(), Some(-12.5));
        assert_eq!(Value::Text(".5".into()).as_number(), Some(0.5));
    }

    #[test]
    fn non_numeric_values_coerce_to_none() {
        assert_eq!(Value::Text("n/a".into()).as_number(), None);
        assert_eq!(Value::Text("12,34".into()).as_number(), None);
        assert_eq!(Value::Empty.as_number(), None);
        assert_eq!(Value::Number(f64::NAN).as_number(), None);
    }

    #[test]
    fn integral_numbers_render_as_clean_keys() {
        assert_eq!(Value::Number(101.0).as_key(), "101");
        assert_eq!(Value::Number(1.5).as_key(), "1.5");
        assert_eq!(Value::Empty.as_key(), "");
    }

    #[test]
    fn set_routes_columns_by_header() {
        let mut record = SalesRecord::new("", "");
        record.set(COL_BRANCH, Value::Number(7.0));
        record.set(COL_NAME, Value::Text("Sara".into()));
        record.set(COL_COMMISSION, Value::Number(120.0));
        record.set("Unrelated", Value::Number(1.0));

        assert_eq!(record.branch, "7");
        assert_eq!(record.name, "Sara");
        assert_eq!(record.commission, Value::Number(120.0));
        assert!(record.has_seller());
    }
}
