//! Payment webhook signature verification.
//!
//! Implements secure verification of PayOS webhook signatures using
//! HMAC-SHA256 computed over the raw request body.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;
use super::webhook_event::PaymentWebhookEvent;

/// Verifier for PayOS webhook signatures.
#[derive(Clone)]
pub struct PayosWebhookVerifier {
    /// The checksum key shared with the payment provider.
    secret: String,
}

impl PayosWebhookVerifier {
    /// Creates a new verifier with the given checksum key.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies the webhook signature against the raw request body.
    ///
    /// The provider sends the signature as lowercase hex in the
    /// `x-payos-signature` header. Verification must run over the body
    /// bytes exactly as received, never over a re-serialized copy.
    ///
    /// # Errors
    ///
    /// - `ParseError` - Signature header is not valid hex
    /// - `InvalidSignature` - Signature does not match the body
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        let provided = hex::decode(signature_header.trim())
            .map_err(|_| WebhookError::ParseError("invalid signature hex".to_string()))?;

        let expected = self.compute_signature(payload);

        if !constant_time_compare(&expected, &provided) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Verifies the webhook signature and parses the payment event.
    ///
    /// # Verification Steps
    ///
    /// 1. Decode the hex signature header
    /// 2. Compute the expected HMAC-SHA256 over the raw body
    /// 3. Compare signatures using constant-time comparison
    /// 4. Parse the JSON payload into a PaymentWebhookEvent
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - Signature verification failed
    /// - `ParseError` - Failed to parse header hex or JSON payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<PaymentWebhookEvent, WebhookError> {
        self.verify(payload, signature_header)?;

        let event: PaymentWebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(event)
    }

    /// Computes the HMAC-SHA256 signature over the raw payload.
    fn compute_signature(&self, payload: &[u8]) -> Vec<u8> {
        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(payload);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex HMAC-SHA256 signature for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "payos_checksum_test_12345";

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let signature = compute_test_signature(TEST_SECRET, payload);

        let result = verifier.verify(payload, &signature);

        assert!(result.is_ok());
    }

    #[test]
    fn verify_trims_surrounding_whitespace() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let signature = format!(" {}\n", compute_test_signature(TEST_SECRET, payload));

        let result = verifier.verify(payload, &signature);

        assert!(result.is_ok());
    }

    #[test]
    fn verify_invalid_signature_fails() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let signature = "a".repeat(64);

        let result = verifier.verify(payload, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = PayosWebhookVerifier::new("wrong_secret");
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let signature = compute_test_signature(TEST_SECRET, payload);

        let result = verifier.verify(payload, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let original = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let tampered = br#"{"data":{"orderCode":"SUB_x_6_0","amount":299000}}"#;
        let signature = compute_test_signature(TEST_SECRET, original);

        let result = verifier.verify(tampered, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_non_hex_header_fails_as_parse_error() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;

        let result = verifier.verify(payload, "not_valid_hex!");

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn verify_truncated_signature_fails() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = br#"{"data":{"orderCode":"SUB_x_1_0","amount":299000}}"#;
        let full = compute_test_signature(TEST_SECRET, payload);

        let result = verifier.verify(payload, &full[..32]);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    // ══════════════════════════════════════════════════════════════
    // JSON Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_and_parse_invalid_json_fails() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = b"not valid json";
        let signature = compute_test_signature(TEST_SECRET, payload);

        let result = verifier.verify_and_parse(payload, &signature);

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn verify_and_parse_checks_signature_before_parsing() {
        let verifier = PayosWebhookVerifier::new(TEST_SECRET);
        let payload = b"not valid json";
        let signature = "b".repeat(64);

        let result = verifier.verify_and_parse(payload, &signature);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 5];
        assert!(constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_values() {
        let a = vec![1, 2, 3, 4, 5];
        let b = vec![1, 2, 3, 4, 6];
        assert!(!constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        let a = vec![1, 2, 3];
        let b = vec![1, 2, 3, 4];
        assert!(!constant_time_compare(&a, &b));
    }

    #[test]
    fn constant_time_compare_empty_slices() {
        let a: Vec<u8> = vec![];
        let b: Vec<u8> = vec![];
        assert!(constant_time_compare(&a, &b));
    }

    // ══════════════════════════════════════════════════════════════
    // Integration Test
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn full_verification_flow() {
        let secret = "payos_full_test_secret";
        let verifier = PayosWebhookVerifier::new(secret);

        let payload = serde_json::json!({
            "code": "00",
            "desc": "success",
            "success": true,
            "data": {
                "orderCode": "SUB_6a1f0bcd-3e52-47a9-9c3b-2f8d11d2a001_3_1704067200000",
                "amount": 799000,
                "reference": "FT24001234"
            }
        });
        let payload_bytes = serde_json::to_vec(&payload).unwrap();

        let signature = compute_test_signature(secret, &payload_bytes);

        let result = verifier.verify_and_parse(&payload_bytes, &signature);

        assert!(result.is_ok());
        let event = result.unwrap();
        assert_eq!(
            event.order_code(),
            "SUB_6a1f0bcd-3e52-47a9-9c3b-2f8d11d2a001_3_1704067200000"
        );
        assert_eq!(event.amount(), 799_000);
        assert_eq!(event.success, Some(true));
    }
}
