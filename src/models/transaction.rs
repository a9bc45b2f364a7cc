// src/models/transaction.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable, append-only log entry of a quantity-changing event.
/// Container name and username come denormalized from the backend; the user
/// is null when the account was deleted after the fact.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transaction {
    pub id: i64,
    pub container: Uuid,
    #[serde(default)]
    pub container_name: String,
    pub user: Option<String>,
    pub transaction_type: TransactionType,
    pub quantity_change: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Logged when a container is first created with its starting quantity.
    #[serde(rename = "INITIAL", alias = "CREATE")]
    Initial,
    #[serde(rename = "REPLENISH")]
    Replenish,
    #[serde(rename = "WRITE_OFF")]
    WriteOff,
}

impl TransactionType {
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Initial => "Created",
            TransactionType::Replenish => "Replenished",
            TransactionType::WriteOff => "Written off",
        }
    }
}
