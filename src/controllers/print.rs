// src/controllers/print.rs
use crate::api::ApiClient;
use crate::error::ApiResult;
use crate::models::Cabinet;
use crate::qr::{self, QrSize};

/// One printable code card: the payload the scanner will read back, the
/// material name as caption, and the rendered size.
#[derive(Debug, Clone, PartialEq)]
pub struct QrCard {
    pub payload: String,
    pub name: String,
    pub size_px: u32,
}

/// Print page: pick a cabinet and a size tier, get one card per container.
pub struct PrintController {
    api: ApiClient,
    cabinets: Vec<Cabinet>,
    selected: Option<i64>,
    size: QrSize,
}

impl PrintController {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cabinets: Vec::new(),
            selected: None,
            size: QrSize::default(),
        }
    }

    /// Fetch cabinets and select the first one.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.cabinets = self.api.get_cabinets().await?;
        self.selected = self.cabinets.first().map(|c| c.id);
        Ok(())
    }

    pub fn cabinets(&self) -> &[Cabinet] {
        &self.cabinets
    }

    pub fn select_cabinet(&mut self, cabinet_id: i64) {
        if self.cabinets.iter().any(|c| c.id == cabinet_id) {
            self.selected = Some(cabinet_id);
        }
    }

    pub fn set_size(&mut self, size: QrSize) {
        self.size = size;
    }

    pub fn size(&self) -> QrSize {
        self.size
    }

    pub fn cards(&self) -> Vec<QrCard> {
        let Some(id) = self.selected else {
            return Vec::new();
        };
        let Some(cabinet) = self.cabinets.iter().find(|c| c.id == id) else {
            return Vec::new();
        };
        cabinet
            .containers
            .iter()
            .map(|container| QrCard {
                payload: qr::payload_for(container.id),
                name: container.name.clone(),
                size_px: self.size.pixels(),
            })
            .collect()
    }
}
