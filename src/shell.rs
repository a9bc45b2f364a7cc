// src/shell.rs
//! The layout around the pages: role-gated navigation, logout, and the
//! low-stock notification badge fed by a repeating poll of the summary
//! report. The poll is bound to the shell's lifetime and is torn down
//! deterministically - an orphaned timer must never outlive its owner.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::ApiClient;
use crate::error::{validate_quantity, ApiResult};
use crate::models::{Container, Role};
use crate::session::Page;
use uuid::Uuid;

pub struct Shell {
    api: ApiClient,
    role: Role,
    low_stock: Arc<Mutex<Vec<Container>>>,
    poll: Option<JoinHandle<()>>,
}

impl Shell {
    pub fn new(api: ApiClient, role: Role) -> Self {
        Self {
            api,
            role,
            low_stock: Arc::new(Mutex::new(Vec::new())),
            poll: None,
        }
    }

    /// Pages reachable from the navigation bar for this role.
    pub fn pages(&self) -> Vec<Page> {
        match self.role {
            Role::Administrator => vec![
                Page::Dashboard,
                Page::History,
                Page::Users,
                Page::Reports,
                Page::Print,
            ],
            Role::Operator => vec![Page::Scanner],
        }
    }

    /// Start the repeating low-stock poll. Only administrators see the
    /// badge, so operators get no task at all. The first fetch fires
    /// immediately, then once per interval. Poll errors only log; the badge
    /// keeps its last value.
    pub fn start_notifications(&mut self, interval: Duration) {
        self.stop_notifications();
        if !self.role.is_administrator() {
            return;
        }

        let api = self.api.clone();
        let low_stock = Arc::clone(&self.low_stock);
        self.poll = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match api.get_summary_report(None).await {
                    Ok(report) => {
                        log::debug!("Low-stock poll: {} item(s)", report.low_stock_items.len());
                        *low_stock.lock().unwrap() = report.low_stock_items;
                    }
                    Err(err) => log::warn!("Low-stock poll failed: {}", err),
                }
            }
        }));
    }

    pub fn stop_notifications(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    pub fn polling(&self) -> bool {
        self.poll.is_some()
    }

    /// One out-of-cycle poll, used right after a mutation.
    pub async fn refresh_now(&self) -> ApiResult<()> {
        let report = self.api.get_summary_report(None).await?;
        *self.low_stock.lock().unwrap() = report.low_stock_items;
        Ok(())
    }

    pub fn notifications(&self) -> Vec<Container> {
        self.low_stock.lock().unwrap().clone()
    }

    /// The badge number is the length of the low-stock list, nothing else.
    pub fn badge_count(&self) -> usize {
        self.low_stock.lock().unwrap().len()
    }

    /// Notification click-through: replenish the container and re-fetch so
    /// both the badge and the stock levels reflect the backend's state.
    pub async fn replenish_from_notification(
        &self,
        container_id: Uuid,
        quantity: f64,
    ) -> ApiResult<()> {
        validate_quantity(quantity)?;
        self.api.replenish(container_id, quantity).await?;
        self.refresh_now().await
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.stop_notifications();
    }
}
