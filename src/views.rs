// src/views.rs
//! Pure derivations shared by the pages: fill level, low-stock detection,
//! transaction sort/filter and cabinet search. Everything here is a
//! deterministic function of its inputs.

use std::cmp::Ordering;

use crate::models::{Cabinet, Container, Transaction, User};

// ==================== FILL LEVEL ====================

/// Current quantity as a percentage of the initial (capacity) quantity.
/// A container with no recorded capacity reads as 0, never as an error.
/// The value is not clamped; only the display band treats it as [0, 100].
pub fn fill_percentage(current: f64, initial: f64) -> f64 {
    if initial > 0.0 {
        current / initial * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillLevel {
    Critical,
    Warning,
    Normal,
}

impl FillLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 20.0 {
            FillLevel::Critical
        } else if percentage <= 50.0 {
            FillLevel::Warning
        } else {
            FillLevel::Normal
        }
    }
}

impl Container {
    pub fn fill_percentage(&self) -> f64 {
        fill_percentage(self.current_quantity, self.initial_quantity)
    }

    pub fn fill_level(&self) -> FillLevel {
        FillLevel::from_percentage(self.fill_percentage())
    }

    /// Low stock means at or below the configured threshold.
    pub fn is_low_stock(&self) -> bool {
        is_low_stock(self.current_quantity, self.low_stock_threshold)
    }
}

// ==================== LOW STOCK ====================

pub fn is_low_stock(current: f64, threshold: f64) -> bool {
    current <= threshold
}

/// Containers at or below their threshold. The length of this list is the
/// notification badge number; the reports page renders the same rows.
pub fn low_stock_list(containers: &[Container]) -> Vec<&Container> {
    containers.iter().filter(|c| c.is_low_stock()).collect()
}

// ==================== TRANSACTION SORT ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Timestamp,
    QuantityChange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Column-header sort state: clicking the active column flips the direction,
/// clicking another column resets it to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Timestamp,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn request(&mut self, key: SortKey) {
        self.direction = if self.key == key && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.key = key;
    }
}

/// Stable sort: rows comparing equal keep their relative input order.
pub fn sort_transactions(
    list: &[Transaction],
    key: SortKey,
    direction: SortDirection,
) -> Vec<Transaction> {
    let mut sorted = list.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortKey::QuantityChange => a
                .quantity_change
                .partial_cmp(&b.quantity_change)
                .unwrap_or(Ordering::Equal),
        };
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    sorted
}

// ==================== TRANSACTION FILTER ====================

/// Case-insensitive substring match on the material name, ANDed with an
/// optional user filter. Transactions carry only the denormalized username,
/// so the user filter resolves it to an id through the users list; entries
/// whose user is gone (or unresolvable) never match a set filter.
pub fn filter_transactions(
    list: &[Transaction],
    material: &str,
    user_id: Option<i64>,
    users: &[User],
) -> Vec<Transaction> {
    let needle = material.to_lowercase();
    list.iter()
        .filter(|t| {
            let material_match = t.container_name.to_lowercase().contains(&needle);
            let user_match = match user_id {
                None => true,
                Some(id) => t
                    .user
                    .as_deref()
                    .and_then(|name| users.iter().find(|u| u.username == name))
                    .map(|u| u.id == id)
                    .unwrap_or(false),
            };
            material_match && user_match
        })
        .cloned()
        .collect()
}

// ==================== CABINET SEARCH ====================

pub fn search_cabinets<'a>(cabinets: &'a [Cabinet], term: &str) -> Vec<&'a Cabinet> {
    let needle = term.to_lowercase();
    cabinets
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect()
}

// ==================== TESTS ====================
