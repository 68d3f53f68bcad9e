use rust_xlsxwriter::Workbook;
use sales_dashboard::format::format_seller;
use sales_dashboard::{DashboardError, Value, loader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: [&str; 7] = ["Branch", "Name", "Ctg", "Sale", "Tgt", "%Achivement", "commesion"];

fn write_workbook(dir: &Path, sheet: &str) -> PathBuf {
    let path = dir.join("sales.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).unwrap();

    for (c, name) in HEADER.iter().enumerate() {
        worksheet.write_string(0, c as u16, *name).unwrap();
    }

    let rows: [(&str, &str, &str, f64, f64); 4] = [
        ("Tehran", "Ali", "Phones", 1_234_567.0, 1_000_000.0),
        ("Tehran", "Sara", "Phones", 450.0, 1000.0),
        ("Shiraz", "Reza", "Laptops", 90.0, 100.0),
        ("Tehran", "Ali", "Tablets", 300.0, 600.0),
    ];
    for (i, (branch, name, ctg, sale, tgt)) in rows.iter().enumerate() {
        let r = (i + 2) as u32; // leave row 1 blank
        worksheet.write_string(r, 0, *branch).unwrap();
        worksheet.write_string(r, 1, *name).unwrap();
        worksheet.write_string(r, 2, *ctg).unwrap();
        worksheet.write_number(r, 3, *sale).unwrap();
        worksheet.write_number(r, 4, *tgt).unwrap();
        worksheet.write_number(r, 5, sale / tgt).unwrap();
        worksheet.write_number(r, 6, sale * 0.02).unwrap();
    }

    workbook.save(&path).unwrap();
    path
}

#[test]
fn workbook_loads_first_sheet_and_skips_blank_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "Sales");

    let data = loader::load(&path, None).unwrap();
    assert_eq!(data.len(), 4);
    assert_eq!(data.branches(), vec!["Tehran", "Shiraz"]);
    assert_eq!(data.sellers_in("Tehran"), vec!["Ali", "Sara"]);
    assert!(data.missing_table_columns().is_empty());
}

#[test]
fn workbook_rows_format_for_display() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "Sales");
    let data = loader::load(&path, Some("Sales")).unwrap();

    let table = format_seller(&data.seller_rows("Tehran", "Ali")).unwrap();
    assert_eq!(table.rows[0].sale, "1,234,567");
    assert_eq!(table.rows[0].tgt, "1,000,000");
    assert_eq!(table.rows[0].achievement, "123.46 %");
    assert_eq!(table.rows[1].achievement, "50.00 %");
    assert_eq!(table.chart.len(), 2);
}

#[test]
fn unknown_worksheet_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(dir.path(), "Sales");

    let err = loader::load(&path, Some("Q2")).unwrap_err();
    assert!(matches!(err, DashboardError::SheetNotFound(ref s) if s == "Q2"));
}

#[test]
fn csv_with_grouped_numbers_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.csv");
    std::fs::write(
        &path,
        "Branch,Name,Ctg,Sale,Tgt,%Achivement,commesion\n\
         Tehran,Ali,Phones,\"1,200\",\"1,000\",1.2,24\n\
         ,,,,,,\n\
         Tehran,Sara,Phones,800,1000,pending,16\n",
    )
    .unwrap();

    let data = loader::load(&path, None).unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.records()[0].sale.as_number(), Some(1200.0));
    assert_eq!(data.records()[1].achievement, Value::Text("pending".into()));

    let table = format_seller(&data.seller_rows("Tehran", "Sara")).unwrap();
    assert_eq!(table.rows[0].achievement, "n/a");
    assert!(table.chart.is_empty());
}

#[test]
fn csv_without_name_column_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sales.csv");
    std::fs::write(&path, "Branch,Ctg,Sale\nTehran,Phones,10\n").unwrap();

    match loader::load(&path, None) {
        Err(DashboardError::MissingColumns(cols)) => assert_eq!(cols, vec!["Name"]),
        other => panic!("unexpected: {other:?}"),
    }
}
