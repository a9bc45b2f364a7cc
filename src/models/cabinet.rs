// src/models/cabinet.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::container::Container;

/// A named grouping of containers. The backend nests the owned containers
/// into every cabinet it returns.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cabinet {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreateCabinetRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct UpdateCabinetRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cabinet_without_containers_field() {
        let json = serde_json::json!({
            "id": 7,
            "name": "Lab A",
            "description": null
        });
        let cabinet: Cabinet = serde_json::from_value(json).unwrap();
        assert!(cabinet.containers.is_empty());
    }
}
