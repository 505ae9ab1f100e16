//! Webhook signature verification.
//!
//! Implements Stripe's signing scheme: the `stripe-signature` header carries
//! a unix timestamp (`t=`) and one or more HMAC-SHA256 signatures (`v1=`)
//! over `"{t}.{raw body}"`. Verification is a hard boundary - an event that
//! fails here is never parsed, regardless of its claimed content.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::types::Event;

type HmacSha256 = Hmac<Sha256>;

/// Signature verification failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Header did not contain both a `t=` and a `v1=` element.
    #[error("malformed signature header")]
    Malformed,

    /// Timestamp outside the tolerance window (replay protection).
    #[error("signature timestamp outside tolerance window")]
    Expired,

    /// No candidate signature matched the expected HMAC.
    #[error("signature mismatch")]
    Mismatch,
}

/// Failure constructing a verified event.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("invalid event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Verify a raw payload against its signature header.
///
/// `now` is the current unix timestamp, passed in so tests can pin it.
///
/// # Errors
///
/// Returns [`SignatureError`] describing which check failed.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<(), SignatureError> {
    let (timestamp, candidates) = parse_header(header)?;

    let ts: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
    if now.abs_diff(ts) > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    if candidates
        .iter()
        .any(|candidate| constant_time_eq(&expected, candidate))
    {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Verify the signature and parse the payload into an [`Event`].
///
/// # Errors
///
/// Returns [`WebhookError`] if verification or JSON parsing fails.
pub fn construct_event(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: u64,
    now: i64,
) -> Result<Event, WebhookError> {
    verify_signature(payload, header, secret, tolerance_secs, now)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Parse `t=<ts>,v1=<sig>[,v1=<sig>...]` into its parts.
///
/// Stripe may include multiple `v1` entries during signing-secret rotation;
/// any one matching is sufficient.
fn parse_header(header: &str) -> Result<(&str, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for element in header.split(',') {
        match element.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    match (timestamp, candidates.is_empty()) {
        (Some(ts), false) => Ok((ts, candidates)),
        _ => Err(SignatureError::Malformed),
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_aB3xY9mK2nL5pQ7rT0uW4zC6dF8g";

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn header_for(payload: &[u8], secret: &str, timestamp: i64) -> String {
        format!("t={timestamp},v1={}", sign(payload, secret, timestamp))
    }

    #[test]
    fn test_valid_signature_accepted() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let now = 1_750_000_000;
        let header = header_for(payload, SECRET, now);

        assert_eq!(verify_signature(payload, &header, SECRET, 300, now), Ok(()));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let payload = b"{}";
        let now = 1_750_000_000;
        let header = header_for(payload, "whsec_someOtherKey123456789abcdef", now);

        assert_eq!(
            verify_signature(payload, &header, SECRET, 300, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let now = 1_750_000_000;
        let header = header_for(b"{\"amount\":100}", SECRET, now);

        assert_eq!(
            verify_signature(b"{\"amount\":999}", &header, SECRET, 300, now),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let payload = b"{}";
        let now = 1_750_000_000;
        let header = header_for(payload, SECRET, now - 600);

        assert_eq!(
            verify_signature(payload, &header, SECRET, 300, now),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_malformed_header_rejected() {
        for header in ["", "v1=abc", "t=123", "garbage", "t=abc,v1=def"] {
            let result = verify_signature(b"{}", header, SECRET, 300, 1_750_000_000);
            assert!(
                matches!(
                    result,
                    Err(SignatureError::Malformed) | Err(SignatureError::Mismatch)
                ),
                "header {header:?} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_any_of_multiple_v1_candidates_matches() {
        // Secret rotation: header carries signatures from old and new secret.
        let payload = b"{}";
        let now = 1_750_000_000;
        let stale = sign(payload, "whsec_retiredKey987654321zyxwvut", now);
        let fresh = sign(payload, SECRET, now);
        let header = format!("t={now},v1={stale},v1={fresh}");

        assert_eq!(verify_signature(payload, &header, SECRET, 300, now), Ok(()));
    }

    #[test]
    fn test_construct_event_parses_after_verification() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
        let now = 1_750_000_000;
        let header = header_for(payload, SECRET, now);

        let event = construct_event(payload, &header, SECRET, 300, now).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.id, "evt_1");
    }

    #[test]
    fn test_construct_event_rejects_unparseable_verified_body() {
        let payload = b"not json";
        let now = 1_750_000_000;
        let header = header_for(payload, SECRET, now);

        assert!(matches!(
            construct_event(payload, &header, SECRET, 300, now),
            Err(WebhookError::Parse(_))
        ));
    }
}
