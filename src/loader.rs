use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::record::{SalesRecord, Value};
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, info};
use std::path::Path;

/// Load the sales sheet from a file
///
/// Spreadsheet formats (`xlsx`, `xlsm`, `xls`, `ods`) are read through
/// calamine, `csv` through the csv reader. The first row is the header.
///
/// # Arguments
/// * `path` - File to read
/// * `sheet` - Worksheet name; `None` picks the first sheet
///
/// # Returns
/// * `Result<Dataset>` - The loaded dataset or a load error
///
/// # Examples
/// ```no_run
/// use sales_dashboard::loader::load;
///
/// match load("test.xlsx", None) {
///     Ok(data) => println!("Loaded {} sales rows", data.len()),
///     Err(e) => eprintln!("Error loading sales data: {}", e),
/// }
/// ```
pub fn load(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Dataset> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => from_workbook(path, sheet)?,
        "csv" => from_csv(path)?,
        other => {
            return Err(DashboardError::UnsupportedFormat(if other.is_empty() {
                path.display().to_string()
            } else {
                format!(".{other}")
            }));
        }
    };

    info!(
        "Loaded {} sales rows ({} branches) from {}",
        dataset.len(),
        dataset.branches().len(),
        path.display()
    );
    Ok(dataset)
}

/// Read one worksheet of a spreadsheet file.
pub fn from_workbook(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    if !path.exists() {
        return Err(DashboardError::load(path, "file not found"));
    }
    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::load(path, e))?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|n| n == name) {
                return Err(DashboardError::SheetNotFound(name.to_string()));
            }
            workbook
                .worksheet_range(name)
                .map_err(|e| DashboardError::load(path, e))?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or(DashboardError::EmptySheet)?
            .map_err(|e| DashboardError::load(path, e))?,
    };

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| c.to_string().trim().to_string()).collect(),
        None => return Err(DashboardError::EmptySheet),
    };
    debug!("Worksheet header: {:?}", header);

    from_rows(header, rows.map(|cells| cells.iter().map(cell_value).collect()))
}

/// Read a comma separated file with a header line.
pub fn from_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DashboardError::load(path, e))?;

    let header: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::load(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::EmptySheet);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DashboardError::load(path, e))?;
        rows.push(record.iter().map(Value::from_text).collect::<Vec<_>>());
    }

    from_rows(header, rows.into_iter())
}

/// Build a dataset from a header and raw rows. Fully blank rows are skipped.
pub fn from_rows(header: Vec<String>, rows: impl Iterator<Item = Vec<Value>>) -> Result<Dataset> {
    if header.iter().all(|h| h.is_empty()) {
        return Err(DashboardError::EmptySheet);
    }

    let records = rows
        .filter(|row| row.iter().any(|v| !v.is_empty()))
        .map(|row| {
            let mut record = SalesRecord::new("", "");
            for (column, value) in header.iter().zip(row) {
                record.set(column, value);
            }
            record
        })
        .collect();

    Dataset::new(header, records)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(v) => Value::Number(*v as f64),
        Data::Float(v) => Value::Number(*v),
        Data::String(v) => Value::from_text(v),
        Data::Empty | Data::Error(_) => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}
