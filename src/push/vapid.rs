//! VAPID application server key.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::VapidKeyEnvelope;

/// Length of an uncompressed P-256 point.
pub const VAPID_KEY_LEN: usize = 65;

/// Decoded server key, fixed for the lifetime of one subscription attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct VapidKey([u8; VAPID_KEY_LEN]);

impl VapidKey {
    /// Decodes a base64url key. Trailing padding is tolerated.
    pub fn from_base64url(encoded: &str) -> Result<Self> {
        let trimmed = encoded.trim().trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|e| AppError::MalformedResponse(format!("VAPID key is not base64url: {}", e)))?;

        let raw: [u8; VAPID_KEY_LEN] = bytes.as_slice().try_into().map_err(|_| {
            AppError::MalformedResponse(format!(
                "VAPID key must be {} bytes, got {}",
                VAPID_KEY_LEN,
                bytes.len()
            ))
        })?;
        if raw[0] != 0x04 {
            return Err(AppError::MalformedResponse(
                "VAPID key is not an uncompressed P-256 point".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    /// Validates the `{success, publicKey}` envelope and decodes the key.
    pub fn from_envelope(body: Value) -> Result<Self> {
        let envelope: VapidKeyEnvelope = serde_json::from_value(body)
            .map_err(|e| AppError::MalformedResponse(format!("VAPID envelope: {}", e)))?;
        if !envelope.success {
            return Err(AppError::MalformedResponse("VAPID endpoint reported failure".to_string()));
        }
        match envelope.public_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Self::from_base64url(key),
            _ => Err(AppError::MalformedResponse("VAPID envelope has no publicKey".to_string())),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }
}

impl std::fmt::Debug for VapidKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VapidKey({})", self.to_base64url())
    }
}
