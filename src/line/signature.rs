//! X-Line-Signature verification
//!
//! The header carries base64(HMAC-SHA256(channel secret, raw request body)).

use crate::error::BotError;
use crate::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Clone)]
pub struct SignatureVerifier {
    channel_secret: String,
}

impl SignatureVerifier {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    fn mac(&self, body: &[u8]) -> Result<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(self.channel_secret.as_bytes())
            .map_err(|e| BotError::Configuration(format!("Invalid channel secret: {}", e)))?;
        mac.update(body);
        Ok(mac)
    }

    /// Signature header value for `body`
    pub fn sign(&self, body: &[u8]) -> Result<String> {
        Ok(BASE64.encode(self.mac(body)?.finalize().into_bytes()))
    }

    /// Constant-time check of `signature` against `body`
    pub fn verify(&self, body: &[u8], signature: Option<&str>) -> Result<()> {
        let signature = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BotError::InvalidSignature("missing signature header".to_string()))?;

        let decoded = BASE64
            .decode(signature)
            .map_err(|_| BotError::InvalidSignature("signature is not base64".to_string()))?;

        self.mac(body)?
            .verify_slice(&decoded)
            .map_err(|_| BotError::InvalidSignature("signature mismatch".to_string()))
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("channel_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"destination":"U0","events":[]}"#;

    #[test]
    fn test_sign_then_verify() {
        let verifier = SignatureVerifier::new("channel_secret");
        let signature = verifier.sign(BODY).unwrap();

        tokio_test::assert_ok!(verifier.verify(BODY, Some(&signature)));
    }

    #[test]
    fn test_rejects_tampered_body() {
        let verifier = SignatureVerifier::new("channel_secret");
        let signature = verifier.sign(BODY).unwrap();

        let err = verifier
            .verify(br#"{"destination":"U1","events":[]}"#, Some(&signature))
            .unwrap_err();
        assert!(matches!(err, BotError::InvalidSignature(_)));
    }

    #[test]
    fn test_rejects_other_secret() {
        let signature = SignatureVerifier::new("secret_a").sign(BODY).unwrap();
        let verifier = SignatureVerifier::new("secret_b");

        assert!(verifier.verify(BODY, Some(&signature)).is_err());
    }

    #[test]
    fn test_rejects_missing_or_malformed() {
        let verifier = SignatureVerifier::new("channel_secret");

        assert!(verifier.verify(BODY, None).is_err());
        assert!(verifier.verify(BODY, Some("")).is_err());
        assert!(verifier.verify(BODY, Some("not base64!!")).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let verifier = SignatureVerifier::new("super-secret");
        assert!(!format!("{:?}", verifier).contains("super-secret"));
    }
}
