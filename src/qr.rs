// src/qr.rs
//! Scan payload codec. Printed codes carry a fixed path-prefixed container
//! id; the scanner only cares about the segment after the final slash.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub const SCAN_PATH_PREFIX: &str = "scan/";

/// Payload baked into a printed code: `scan/{containerId}`.
pub fn payload_for(container_id: Uuid) -> String {
    format!("{}{}", SCAN_PATH_PREFIX, container_id)
}

/// The identifier is whatever follows the last `/` of the scanned text.
pub fn id_segment(payload: &str) -> &str {
    payload.rsplit('/').next().unwrap_or(payload)
}

pub fn container_id_from_payload(payload: &str) -> ApiResult<Uuid> {
    let segment = id_segment(payload);
    Uuid::parse_str(segment).map_err(|_| ApiError::invalid_scan_payload(payload))
}

/// Print size tiers for the QR cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QrSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl QrSize {
    pub fn pixels(&self) -> u32 {
        match self {
            QrSize::Small => 64,
            QrSize::Medium => 100,
            QrSize::Large => 150,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(QrSize::Small),
            "medium" => Some(QrSize::Medium),
            "large" => Some(QrSize::Large),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let id = Uuid::new_v4();
        let payload = payload_for(id);
        assert!(payload.starts_with("scan/"));
        assert_eq!(container_id_from_payload(&payload).unwrap(), id);
    }

    #[test]
    fn test_id_is_last_path_segment() {
        assert_eq!(id_segment("scan/42"), "42");
        assert_eq!(id_segment("https://host/app/scan/42"), "42");
        assert_eq!(id_segment("42"), "42");
    }

    #[test]
    fn test_non_uuid_segment_is_rejected() {
        assert!(container_id_from_payload("scan/42").is_err());
        assert!(container_id_from_payload("").is_err());
    }

    #[test]
    fn test_size_tiers() {
        assert_eq!(QrSize::Small.pixels(), 64);
        assert_eq!(QrSize::Medium.pixels(), 100);
        assert_eq!(QrSize::Large.pixels(), 150);
        assert_eq!(QrSize::from_str("LARGE"), Some(QrSize::Large));
        assert_eq!(QrSize::from_str("tiny"), None);
    }
}
