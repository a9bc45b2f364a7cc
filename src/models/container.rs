// src/models/container.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A trackable stock unit living inside a cabinet. Quantities are owned by
/// the backend; the client only ever holds a re-fetchable snapshot.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Container {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub low_stock_threshold: f64,
    #[serde(default)]
    pub initial_quantity: f64,
    #[serde(default)]
    pub current_quantity: f64,
    /// Owning cabinet id.
    pub cabinet: i64,
    #[serde(default)]
    pub cabinet_name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateContainerRequest {
    pub cabinet: i64,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Unit is required"))]
    pub unit: String,
    #[validate(range(min = 0.0, message = "Initial quantity must be non-negative"))]
    pub initial_quantity: f64,
    #[validate(range(min = 0.0, message = "Current quantity must be non-negative"))]
    pub current_quantity: f64,
    #[validate(range(min = 0.0, message = "Threshold must be non-negative"))]
    pub low_stock_threshold: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, Default)]
pub struct UpdateContainerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Unit must not be empty"))]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Initial quantity must be non-negative"))]
    pub initial_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Current quantity must be non-negative"))]
    pub current_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "Threshold must be non-negative"))]
    pub low_stock_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cabinet: Option<i64>,
}

/// Body of the replenish and write-off operations.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct QuantityRequest {
    pub quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_request_validation() {
        let req = CreateContainerRequest {
            cabinet: 1,
            name: "Acetone".to_string(),
            unit: "ml".to_string(),
            initial_quantity: 500.0,
            current_quantity: 500.0,
            low_stock_threshold: 50.0,
        };
        assert!(req.validate().is_ok());

        let bad = CreateContainerRequest {
            name: "".to_string(),
            initial_quantity: -1.0,
            ..req
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_request_omits_unset_fields() {
        let req = UpdateContainerRequest {
            current_quantity: Some(12.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "current_quantity": 12.5 }));
    }

    #[test]
    fn test_container_missing_numerics_default_to_zero() {
        let json = serde_json::json!({
            "id": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "name": "Ethanol",
            "unit": "ml",
            "cabinet": 2,
            "created_at": null
        });
        let c: Container = serde_json::from_value(json).unwrap();
        assert_eq!(c.current_quantity, 0.0);
        assert_eq!(c.initial_quantity, 0.0);
        assert_eq!(c.low_stock_threshold, 0.0);
        assert_eq!(c.cabinet_name, "");
    }
}
