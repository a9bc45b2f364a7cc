// src/controllers/reports.rs
use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::export;
use crate::models::{Cabinet, SummaryReport};

/// Reports page: the aggregate summary, optionally scoped to one cabinet,
/// plus the spreadsheet export. The cabinet list for the scope picker is
/// fetched lazily, once.
pub struct ReportsController {
    api: ApiClient,
    report: Option<SummaryReport>,
    cabinets: Vec<Cabinet>,
    selected_cabinet: Option<i64>,
}

impl ReportsController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            report: None,
            cabinets: Vec::new(),
            selected_cabinet: None,
        }
    }

    /// Fetch the report for the given scope. The cabinet list rides along
    /// on the first load only.
    pub async fn load(&mut self, cabinet_id: Option<i64>) -> ApiResult<()> {
        self.selected_cabinet = cabinet_id;
        self.report = Some(self.api.get_summary_report(cabinet_id).await?);
        if self.cabinets.is_empty() {
            self.cabinets = self.api.get_cabinets().await?;
        }
        Ok(())
    }

    pub async fn select_cabinet(&mut self, cabinet_id: Option<i64>) -> ApiResult<()> {
        self.load(cabinet_id).await
    }

    pub fn report(&self) -> Option<&SummaryReport> {
        self.report.as_ref()
    }

    pub fn cabinets(&self) -> &[Cabinet] {
        &self.cabinets
    }

    pub fn selected_cabinet_name(&self) -> Option<&str> {
        let id = self.selected_cabinet?;
        self.cabinets.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    /// Group the loaded report into its three tables and write the workbook
    /// into `dir`, named after the selected cabinet (or the whole stock).
    pub fn export(&self, dir: &Path) -> ApiResult<PathBuf> {
        let report = self
            .report
            .as_ref()
            .ok_or_else(|| ApiError::BadRequest("No report loaded".to_string()))?;
        let sheets = export::group_report(report);
        let path = dir.join(export::export_file_name(self.selected_cabinet_name()));
        export::write_workbook(&sheets, &path)?;
        log::info!("Report exported to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenStore;

    fn controller() -> ReportsController {
        let api = ApiClient::new("http://127.0.0.1:1", TokenStore::in_memory());
        ReportsController::new(api)
    }

    fn report() -> SummaryReport {
        SummaryReport {
            total_cabinets: None,
            total_containers: 0,
            materials_summary: vec![],
            low_stock_items: vec![],
            full_inventory: vec![],
        }
    }

    #[test]
    fn test_export_without_report_is_rejected() {
        let controller = controller();
        let dir = tempfile::tempdir().unwrap();
        let err = controller.export(dir.path()).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_export_names_file_after_selected_cabinet() {
        let mut controller = controller();
        controller.report = Some(report());
        controller.cabinets = vec![Cabinet {
            id: 4,
            name: "Lab A".to_string(),
            description: None,
            containers: vec![],
        }];
        controller.selected_cabinet = Some(4);

        let dir = tempfile::tempdir().unwrap();
        let path = controller.export(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Report_Lab_A.xlsx");

        // Unscoped export falls back to the whole-stock name
        controller.selected_cabinet = None;
        let path = controller.export(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Report_all_cabinets.xlsx");
    }
}
