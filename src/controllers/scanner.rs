// src/controllers/scanner.rs
use crate::api::ApiClient;
use crate::error::{validate_quantity, ApiError, ApiResult};
use crate::models::Container;
use crate::qr;

/// Camera collaborator. The real device feeds decoded payload strings into
/// `handle_decode`; the controller only drives capture on and off.
pub trait ScanDevice {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Scan session phases: capturing, showing a looked-up container, or idle
/// after a failed lookup, awaiting a new scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanState {
    Scanning,
    LookedUp(Container),
    Idle,
}

pub struct ScannerController<D: ScanDevice> {
    api: ApiClient,
    device: D,
    device_active: bool,
    state: ScanState,
    message: Option<String>,
}

impl<D: ScanDevice> ScannerController<D> {
    /// Capture starts immediately; the page opens in scanning mode.
    pub fn new(api: ApiClient, mut device: D) -> Self {
        device.start();
        Self {
            api,
            device,
            device_active: true,
            state: ScanState::Scanning,
            message: None,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn container(&self) -> Option<&Container> {
        match &self.state {
            ScanState::LookedUp(container) => Some(container),
            _ => None,
        }
    }

    /// A successful decode stops capture, takes the id after the final `/`
    /// of the payload and looks the container up. Decodes arriving outside
    /// the scanning phase are leftover noise and are dropped.
    pub async fn handle_decode(&mut self, payload: &str) {
        if self.state != ScanState::Scanning {
            return;
        }
        self.stop_device();
        self.message = None;

        let container_id = match qr::container_id_from_payload(payload) {
            Ok(id) => id,
            Err(_) => {
                self.state = ScanState::Idle;
                self.message = Some("Container not found or no access".to_string());
                return;
            }
        };

        match self.api.get_container(container_id).await {
            Ok(container) => {
                log::debug!("Scanned container '{}' ({})", container.name, container.id);
                self.state = ScanState::LookedUp(container);
            }
            Err(err) => {
                log::warn!("Container lookup failed: {}", err);
                self.state = ScanState::Idle;
                self.message = Some(match err {
                    ApiError::NotFound(_) => "Container not found or no access".to_string(),
                    other => other.to_string(),
                });
            }
        }
    }

    /// Write off the given amount from the shown container. The amount is
    /// validated client-side before any network call; on success the shown
    /// snapshot is replaced with the backend's post-write-off container,
    /// never with a locally computed value.
    pub async fn write_off(&mut self, amount: f64) -> ApiResult<()> {
        let container_id = match &self.state {
            ScanState::LookedUp(container) => container.id,
            _ => return Err(ApiError::BadRequest("No container scanned".to_string())),
        };

        if let Err(err) = validate_quantity(amount) {
            self.message = Some("Enter a valid amount to write off".to_string());
            return Err(err);
        }

        match self.api.write_off(container_id, amount).await {
            Ok(updated) => {
                self.message = Some(format!("Wrote off {}", amount));
                self.state = ScanState::LookedUp(updated);
                Ok(())
            }
            Err(err) => {
                self.message = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Re-arm the device for another scan, dropping the previous result.
    pub fn rescan(&mut self) {
        self.message = None;
        self.state = ScanState::Scanning;
        if !self.device_active {
            self.device.start();
            self.device_active = true;
        }
    }

    /// Deterministic teardown: capture must not outlive the page.
    pub fn teardown(&mut self) {
        self.stop_device();
    }

    fn stop_device(&mut self) {
        if self.device_active {
            self.device.stop();
            self.device_active = false;
        }
    }
}

impl<D: ScanDevice> Drop for ScannerController<D> {
    fn drop(&mut self) {
        self.stop_device();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingDevice {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl ScanDevice for CountingDevice {
        fn start(&mut self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller() -> (ScannerController<CountingDevice>, CountingDevice) {
        let device = CountingDevice::default();
        let api = ApiClient::new("http://127.0.0.1:1", TokenStore::in_memory());
        (ScannerController::new(api, device.clone()), device)
    }

    #[test]
    fn test_capture_starts_with_the_page() {
        let (controller, device) = controller();
        assert_eq!(*controller.state(), ScanState::Scanning);
        assert_eq!(device.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bad_payload_stops_device_and_reports_not_found() {
        let (mut controller, device) = controller();
        controller.handle_decode("scan/not-a-real-id").await;
        assert_eq!(*controller.state(), ScanState::Idle);
        assert_eq!(device.stops.load(Ordering::SeqCst), 1);
        assert_eq!(
            controller.message(),
            Some("Container not found or no access")
        );
    }

    #[tokio::test]
    async fn test_decode_noise_outside_scanning_is_ignored() {
        let (mut controller, device) = controller();
        controller.handle_decode("scan/garbage").await;
        let stops = device.stops.load(Ordering::SeqCst);
        // Further decodes while idle change nothing
        controller.handle_decode("scan/garbage").await;
        assert_eq!(device.stops.load(Ordering::SeqCst), stops);
        assert_eq!(*controller.state(), ScanState::Idle);
    }

    #[tokio::test]
    async fn test_write_off_requires_scanned_container() {
        let (mut controller, _) = controller();
        let err = controller.write_off(5.0).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_write_off_rejects_non_positive_amount_before_any_call() {
        let (mut controller, _) = controller();
        controller.state = ScanState::LookedUp(Container {
            id: uuid::Uuid::new_v4(),
            name: "Acetone".to_string(),
            unit: "ml".to_string(),
            low_stock_threshold: 1.0,
            initial_quantity: 10.0,
            current_quantity: 5.0,
            cabinet: 1,
            cabinet_name: "Lab A".to_string(),
            created_at: None,
        });
        let err = controller.write_off(-2.0).await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        assert_eq!(controller.message(), Some("Enter a valid amount to write off"));
    }

    #[tokio::test]
    async fn test_rescan_rearms_the_device() {
        let (mut controller, device) = controller();
        controller.handle_decode("scan/bad").await;
        controller.rescan();
        assert_eq!(*controller.state(), ScanState::Scanning);
        assert_eq!(device.starts.load(Ordering::SeqCst), 2);
        assert_eq!(controller.message(), None);
    }

    #[test]
    fn test_teardown_stops_capture_exactly_once() {
        let (mut controller, device) = controller();
        controller.teardown();
        assert_eq!(device.stops.load(Ordering::SeqCst), 1);
        drop(controller);
        // Drop after an explicit teardown must not stop twice
        assert_eq!(device.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_tears_down_active_capture() {
        let (controller, device) = controller();
        drop(controller);
        assert_eq!(device.stops.load(Ordering::SeqCst), 1);
    }
}
