//! Ed25519 verification of signed Discord interaction requests.

use badgebridge_core::{AppError, AppResult};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};

/// Verifies `X-Signature-Ed25519` over `X-Signature-Timestamp || body`.
#[derive(Debug, Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl InteractionVerifier {
    /// Parses the application's hex-encoded public key.
    pub fn from_hex(public_key: &str) -> AppResult<Self> {
        let bytes = hex::decode(public_key.trim()).map_err(|error| {
            AppError::Validation(format!("DISCORD_PUBLIC_KEY is not valid hex: {error}"))
        })?;
        let bytes: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            AppError::Validation(format!(
                "DISCORD_PUBLIC_KEY must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|error| {
            AppError::Validation(format!("DISCORD_PUBLIC_KEY is not a valid key: {error}"))
        })?;

        Ok(Self { key })
    }

    /// Returns `Unauthorized` unless the signature matches.
    pub fn verify(&self, signature_hex: &str, timestamp: &str, body: &[u8]) -> AppResult<()> {
        let signature = hex::decode(signature_hex.trim())
            .ok()
            .and_then(|bytes| <[u8; 64]>::try_from(bytes.as_slice()).ok())
            .map(|bytes| Signature::from_bytes(&bytes))
            .ok_or_else(|| AppError::Unauthorized("malformed request signature".to_owned()))?;

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| AppError::Unauthorized("invalid request signature".to_owned()))
    }
}
