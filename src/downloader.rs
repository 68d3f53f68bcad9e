use crate::error::{DashboardError, Result};
use crate::format::SellerTable;

/// Convert a seller table to CSV format
///
/// Writes the header row followed by one line per category, using the
/// already formatted display strings. Quoting of commas (thousands
/// separators) is handled by the csv writer.
///
/// # Arguments
/// * `table` - Formatted table of one seller
///
/// # Returns
/// * `Result<String>` - CSV content or an export error
pub fn to_csv(table: &SellerTable) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&table.columns).map_err(export_error)?;
    for row in &table.rows {
        writer.write_record(row.cells()).map_err(export_error)?;
    }

    let bytes = writer.into_inner().map_err(export_error)?;
    String::from_utf8(bytes).map_err(export_error)
}

/// Convert a seller table to XLSX format
///
/// Produces a single-sheet workbook with a bold header row, the same
/// content as the on-screen table.
///
/// # Arguments
/// * `table` - Formatted table of one seller
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an export error
#[cfg(feature = "web")]
pub fn to_xlsx(table: &SellerTable) -> Result<Vec<u8>> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();

    for (c, column) in table.columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, c as u16, column.as_str(), &bold)
            .map_err(export_error)?;
    }
    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.cells().iter().enumerate() {
            worksheet
                .write_string((r + 1) as u32, c as u16, *cell)
                .map_err(export_error)?;
        }
    }

    workbook.save_to_buffer().map_err(export_error)
}

/// File name offered for a download, e.g. `sales-Ali_Rezaei.csv`.
pub fn export_file_name(seller: &str, extension: &str) -> String {
    let stem: String = seller
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("sales-{}.{}", stem, extension)
}

fn export_error<E: std::fmt::Display>(e: E) -> DashboardError {
    DashboardError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::sample;
    use crate::format::format_seller;

    fn ali() -> SellerTable {
        let data = sample();
        format_seller(&data.seller_rows("North", "Ali")).unwrap()
    }

    #[test]
    fn csv_has_header_and_quoted_numbers() {
        let csv = to_csv(&ali()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Ctg,Sale,Tgt,%Achivement,commesion"));
        assert_eq!(lines.next(), Some("Phones,\"1,200\",\"1,000\",120.00 %,60"));
        assert_eq!(lines.count(), 1);
    }

    #[cfg(feature = "web")]
    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = to_xlsx(&ali()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(export_file_name("Ali Rezaei", "csv"), "sales-Ali_Rezaei.csv");
        assert_eq!(export_file_name("a/b", "xlsx"), "sales-a_b.xlsx");
    }
}
