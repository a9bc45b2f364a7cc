// src/controllers/history.rs
use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::models::{Transaction, User};
use crate::views::{self, SortKey, SortState};

/// Transaction log page. Data is loaded once; the visible rows are
/// re-derived from the stored state on every read, so each filter or sort
/// change is reflected immediately.
pub struct HistoryController {
    api: ApiClient,
    transactions: Vec<Transaction>,
    users: Vec<User>,
    sort: SortState,
    filter_material: String,
    filter_user: Option<i64>,
}

impl HistoryController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            transactions: Vec::new(),
            users: Vec::new(),
            sort: SortState::default(),
            filter_material: String::new(),
            filter_user: None,
        }
    }

    /// Fetch transactions and the users lookup. Overlapping calls are not
    /// de-duplicated; the last one to complete wins.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.transactions = self.api.get_transactions().await?;
        self.users = self.api.get_users().await?;
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn set_material_filter(&mut self, term: &str) {
        self.filter_material = term.to_string();
    }

    pub fn set_user_filter(&mut self, user_id: Option<i64>) {
        self.filter_user = user_id;
    }

    /// Column-header click: the active column flips direction, a new column
    /// starts ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        self.sort.request(key);
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    /// Filter, then stable-sort. Initial order is timestamp descending.
    pub fn rows(&self) -> Vec<Transaction> {
        let filtered = views::filter_transactions(
            &self.transactions,
            &self.filter_material,
            self.filter_user,
            &self.users,
        );
        views::sort_transactions(&filtered, self.sort.key, self.sort.direction)
    }
}
