// src/controllers/dashboard.rs
use uuid::Uuid;
use validator::Validate;

use crate::api::ApiClient;
use crate::error::{validate_quantity, validate_required, ApiResult};
use crate::models::{
    Cabinet, CreateCabinetRequest, CreateContainerRequest, UpdateContainerRequest,
};
use crate::views;

/// Warehouse overview: the cabinet list with one selected cabinet whose
/// containers are managed inline. Every mutation is followed by a full
/// re-fetch; reads always resolve against the latest fetched list.
pub struct DashboardController {
    api: ApiClient,
    cabinets: Vec<Cabinet>,
    selected: Option<i64>,
    search_term: String,
    pending_highlight: Option<i64>,
}

impl DashboardController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cabinets: Vec::new(),
            selected: None,
            search_term: String::new(),
            pending_highlight: None,
        }
    }

    /// Initial load: fetch everything and select the first cabinet when
    /// nothing is selected yet.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.fetch().await?;
        if self.selected.is_none() {
            self.selected = self.cabinets.first().map(|c| c.id);
        }
        self.apply_highlight();
        Ok(())
    }

    /// Re-fetch after a mutation. Keeps the current selection; a selection
    /// pointing at a deleted cabinet simply resolves to nothing.
    pub async fn refresh(&mut self) -> ApiResult<()> {
        self.fetch().await?;
        self.apply_highlight();
        Ok(())
    }

    async fn fetch(&mut self) -> ApiResult<()> {
        self.cabinets = self.api.get_cabinets().await?;
        Ok(())
    }

    /// Deep-link from a notification: select this cabinet on the next load.
    pub fn set_highlight(&mut self, cabinet_id: i64) {
        self.pending_highlight = Some(cabinet_id);
    }

    // The highlight is consumed the first time a non-empty cabinet list is
    // available, whether or not it still matches one; it must never
    // re-trigger on later refreshes.
    fn apply_highlight(&mut self) {
        if self.cabinets.is_empty() {
            return;
        }
        if let Some(id) = self.pending_highlight.take() {
            if self.cabinets.iter().any(|c| c.id == id) {
                self.selected = Some(id);
            }
        }
    }

    // ==================== SELECTION & SEARCH ====================

    pub fn select_cabinet(&mut self, cabinet_id: i64) {
        if self.cabinets.iter().any(|c| c.id == cabinet_id) {
            self.selected = Some(cabinet_id);
        }
    }

    pub fn selected_cabinet(&self) -> Option<&Cabinet> {
        let id = self.selected?;
        self.cabinets.iter().find(|c| c.id == id)
    }

    /// Rows of the selected cabinet that sit at or below their threshold
    /// (the highlighted ones).
    pub fn low_stock_in_selected(&self) -> Vec<&crate::models::Container> {
        self.selected_cabinet()
            .map(|cabinet| views::low_stock_list(&cabinet.containers))
            .unwrap_or_default()
    }

    pub fn cabinets(&self) -> &[Cabinet] {
        &self.cabinets
    }

    pub fn set_search_term(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    pub fn visible_cabinets(&self) -> Vec<&Cabinet> {
        views::search_cabinets(&self.cabinets, &self.search_term)
    }

    // ==================== CABINET MUTATIONS ====================

    pub async fn create_cabinet(&mut self, name: &str) -> ApiResult<()> {
        validate_required("Cabinet name", name)?;
        let request = CreateCabinetRequest {
            name: name.to_string(),
            description: String::new(),
        };
        request.validate()?;
        let created = self.api.create_cabinet(&request).await?;
        self.refresh().await?;
        self.selected = Some(created.id);
        Ok(())
    }

    pub async fn delete_cabinet(&mut self, cabinet_id: i64) -> ApiResult<()> {
        self.api.delete_cabinet(cabinet_id).await?;
        if self.selected == Some(cabinet_id) {
            self.selected = None;
        }
        self.refresh().await
    }

    // ==================== CONTAINER MUTATIONS ====================

    pub async fn create_container(&mut self, request: CreateContainerRequest) -> ApiResult<()> {
        request.validate()?;
        self.api.create_container(&request).await?;
        self.refresh().await
    }

    pub async fn update_container(
        &mut self,
        container_id: Uuid,
        request: UpdateContainerRequest,
    ) -> ApiResult<()> {
        request.validate()?;
        self.api.update_container(container_id, &request).await?;
        self.refresh().await
    }

    pub async fn delete_container(&mut self, container_id: Uuid) -> ApiResult<()> {
        self.api.delete_container(container_id).await?;
        self.refresh().await
    }

    /// The backend owns the arithmetic; the refreshed list is what renders.
    pub async fn replenish_container(&mut self, container_id: Uuid, quantity: f64) -> ApiResult<()> {
        validate_quantity(quantity)?;
        self.api.replenish(container_id, quantity).await?;
        self.refresh().await
    }

    pub async fn qr_image(&self, container_id: Uuid) -> ApiResult<Vec<u8>> {
        self.api.get_qr_image(container_id).await
    }
}
