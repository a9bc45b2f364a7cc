// src/controllers/mod.rs
//! One controller per page. Each orchestrates fetch -> derive -> render data
//! and issues mutations through the API client, followed by a full re-fetch.
//! Overlapping in-flight requests are neither de-duplicated nor cancelled.

pub mod dashboard;
pub mod history;
pub mod print;
pub mod reports;
pub mod scanner;
pub mod users;

pub use dashboard::DashboardController;
pub use history::HistoryController;
pub use print::PrintController;
pub use reports::ReportsController;
pub use scanner::{ScanDevice, ScanState, ScannerController};
pub use users::{UserForm, UsersController};
