// src/export.rs
//! Spreadsheet export of the summary report: one workbook, exactly three
//! sheets - full inventory, per-material summary, low stock.

use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};

use crate::error::ApiResult;
use crate::models::{Container, MaterialSummary, SummaryReport};

/// The three logical tables of an exported report, grouped before any
/// writing happens.
#[derive(Debug, Clone)]
pub struct ReportSheets {
    pub full_inventory: Vec<Container>,
    pub materials_summary: Vec<MaterialSummary>,
    pub low_stock: Vec<Container>,
}

pub fn group_report(report: &SummaryReport) -> ReportSheets {
    ReportSheets {
        full_inventory: report.full_inventory.clone(),
        materials_summary: report.materials_summary.clone(),
        low_stock: report.low_stock_items.clone(),
    }
}

/// Replace path-unsafe characters so a cabinet name is usable in a file
/// name: whitespace and separators become underscores.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// `Report_<cabinet>.xlsx`, or `Report_all_cabinets.xlsx` for the unscoped
/// report.
pub fn export_file_name(cabinet_name: Option<&str>) -> String {
    let scope = cabinet_name.map(sanitize_name).unwrap_or_else(|| "all_cabinets".to_string());
    format!("Report_{}.xlsx", scope)
}

pub fn write_workbook(sheets: &ReportSheets, path: &Path) -> ApiResult<()> {
    let mut workbook = build_workbook(sheets)?;
    workbook.save(path)?;
    Ok(())
}

pub fn workbook_bytes(sheets: &ReportSheets) -> ApiResult<Vec<u8>> {
    let mut workbook = build_workbook(sheets)?;
    Ok(workbook.save_to_buffer()?)
}

fn build_workbook(sheets: &ReportSheets) -> ApiResult<Workbook> {
    let mut workbook = Workbook::new();

    let full = workbook.add_worksheet();
    full.set_name("Full inventory")?;
    write_container_sheet(full, &sheets.full_inventory)?;

    let summary = workbook.add_worksheet();
    summary.set_name("Materials summary")?;
    summary.write_string(0, 0, "Material")?;
    summary.write_string(0, 1, "Total quantity")?;
    summary.write_string(0, 2, "Unit")?;
    for (i, row) in sheets.materials_summary.iter().enumerate() {
        let r = (i + 1) as u32;
        summary.write_string(r, 0, &row.name)?;
        summary.write_number(r, 1, row.total_quantity)?;
        summary.write_string(r, 2, &row.unit)?;
    }

    let low = workbook.add_worksheet();
    low.set_name("Low stock")?;
    write_container_sheet(low, &sheets.low_stock)?;

    Ok(workbook)
}

fn write_container_sheet(worksheet: &mut Worksheet, rows: &[Container]) -> ApiResult<()> {
    worksheet.write_string(0, 0, "Cabinet")?;
    worksheet.write_string(0, 1, "Material")?;
    worksheet.write_string(0, 2, "Current quantity")?;
    worksheet.write_string(0, 3, "Unit")?;
    worksheet.write_string(0, 4, "Threshold")?;
    for (i, container) in rows.iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &container.cabinet_name)?;
        worksheet.write_string(r, 1, &container.name)?;
        worksheet.write_number(r, 2, container.current_quantity)?;
        worksheet.write_string(r, 3, &container.unit)?;
        worksheet.write_number(r, 4, container.low_stock_threshold)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn container(name: &str, cabinet: &str, current: f64) -> Container {
        Container {
            id: Uuid::new_v4(),
            name: name.to_string(),
            unit: "ml".to_string(),
            low_stock_threshold: 10.0,
            initial_quantity: 100.0,
            current_quantity: current,
            cabinet: 1,
            cabinet_name: cabinet.to_string(),
            created_at: None,
        }
    }

    fn sample_report() -> SummaryReport {
        SummaryReport {
            total_cabinets: Some(1),
            total_containers: 2,
            materials_summary: vec![MaterialSummary {
                name: "Acetone".to_string(),
                unit: "ml".to_string(),
                total_quantity: 85.0,
            }],
            low_stock_items: vec![container("Acetone", "Lab A", 5.0)],
            full_inventory: vec![
                container("Acetone", "Lab A", 5.0),
                container("Ethanol", "Lab A", 80.0),
            ],
        }
    }

    #[test]
    fn test_group_report_keeps_three_tables() {
        let sheets = group_report(&sample_report());
        assert_eq!(sheets.full_inventory.len(), 2);
        assert_eq!(sheets.materials_summary.len(), 1);
        assert_eq!(sheets.low_stock.len(), 1);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Lab A"), "Lab_A");
        assert_eq!(sanitize_name("acids/bases"), "acids_bases");
        assert_eq!(sanitize_name("shelf:2*?"), "shelf_2__");
        assert_eq!(sanitize_name("plain"), "plain");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name(Some("Lab A")), "Report_Lab_A.xlsx");
        assert_eq!(export_file_name(None), "Report_all_cabinets.xlsx");
    }

    #[test]
    fn test_workbook_has_three_sheets_and_bytes() {
        let sheets = group_report(&sample_report());
        let bytes = workbook_bytes(&sheets).unwrap();
        // An xlsx file is a zip archive
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_workbook_writes_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name(Some("Lab A")));
        let sheets = group_report(&sample_report());
        write_workbook(&sheets, &path).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
