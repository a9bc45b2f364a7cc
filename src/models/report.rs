// src/models/report.rs
use serde::{Deserialize, Serialize};

use super::container::Container;

/// Aggregate inventory snapshot computed server-side per request. Held only
/// for the current view, never cached.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SummaryReport {
    /// Absent when the report is scoped to a single cabinet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cabinets: Option<i64>,
    pub total_containers: i64,
    pub materials_summary: Vec<MaterialSummary>,
    pub low_stock_items: Vec<Container>,
    pub full_inventory: Vec<Container>,
}

/// One row of the per-material aggregation (summed across containers that
/// share a material name).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MaterialSummary {
    pub name: String,
    pub unit: String,
    pub total_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_report_has_no_cabinet_total() {
        let json = serde_json::json!({
            "total_containers": 3,
            "materials_summary": [
                { "name": "Acetone", "unit": "ml", "total_quantity": 750.0 }
            ],
            "low_stock_items": [],
            "full_inventory": []
        });
        let report: SummaryReport = serde_json::from_value(json).unwrap();
        assert_eq!(report.total_cabinets, None);
        assert_eq!(report.total_containers, 3);
        assert_eq!(report.materials_summary[0].total_quantity, 750.0);
    }
}
