//! Webhook signature checks.
//!
//! CloudConvert signs every callback with HMAC-SHA256 over the raw request
//! body and sends the result as `CloudConvert-Signature: t=<unix>,v1=<hex>`.

use crate::common::error::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "CloudConvert-Signature";

/// Parsed `t=...,v1=...` header.
#[derive(Debug, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: Option<String>,
    pub v1: String,
}

impl SignatureHeader {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut parts = HashMap::new();
        for pair in raw.split(',') {
            let (key, value) = pair
                .split_once('=')
                .ok_or(AppError::InvalidSignature("malformed signature header"))?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.contains('=') {
                return Err(AppError::InvalidSignature("malformed signature header"));
            }
            parts.insert(key, value);
        }

        let v1 = parts
            .get("v1")
            .filter(|v| !v.is_empty())
            .ok_or(AppError::InvalidSignature("missing v1 signature"))?;

        Ok(Self {
            timestamp: parts.get("t").map(|t| t.to_string()),
            v1: v1.to_string(),
        })
    }
}

/// Hex HMAC-SHA256 of `payload` under `secret`.
pub fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = mac_for(secret);
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `header` against the raw body. The digest comparison runs in
/// constant time (`Mac::verify_slice`).
pub fn verify_signature(
    payload: &[u8],
    header: Option<&str>,
    secret: &str,
) -> Result<SignatureHeader, AppError> {
    let raw = header.ok_or(AppError::InvalidSignature("no signature header"))?;
    let parsed = SignatureHeader::parse(raw)?;

    let provided = hex::decode(&parsed.v1)
        .map_err(|_| AppError::InvalidSignature("invalid signature"))?;

    let mut mac = mac_for(secret);
    mac.update(payload);
    mac.verify_slice(&provided)
        .map_err(|_| AppError::InvalidSignature("invalid signature"))?;

    Ok(parsed)
}

fn mac_for(secret: &str) -> HmacSha256 {
    // HMAC accepts keys of any length, so this constructor cannot fail.
    match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC can take key of any size"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &[u8] = br#"{"event":"job.finished","job":{"id":"abc"}}"#;

    fn header_for(body: &[u8], secret: &str) -> String {
        format!("t=1700000000,v1={}", sign(body, secret))
    }

    #[test]
    fn accepts_matching_signature() {
        let header = header_for(BODY, "secret");
        let parsed = verify_signature(BODY, Some(&header), "secret").unwrap();
        assert_eq!(parsed.timestamp.as_deref(), Some("1700000000"));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            sign(b"what do ya want for nothing?", "Jefe"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn any_single_bit_flip_in_body_is_rejected() {
        let header = header_for(BODY, "secret");
        for byte in 0..BODY.len() {
            for bit in 0..8 {
                let mut mutated = BODY.to_vec();
                mutated[byte] ^= 1 << bit;
                assert!(
                    verify_signature(&mutated, Some(&header), "secret").is_err(),
                    "flip at byte {byte} bit {bit} was accepted"
                );
            }
        }
    }

    #[test]
    fn any_single_bit_flip_in_secret_is_rejected() {
        let secret = "whsec_123";
        let header = header_for(BODY, secret);
        let bytes = secret.as_bytes();
        for byte in 0..bytes.len() {
            for bit in 0..7 {
                let mut mutated = bytes.to_vec();
                mutated[byte] ^= 1 << bit;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(verify_signature(BODY, Some(&header), &mutated).is_err());
            }
        }
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = verify_signature(BODY, None, "secret").unwrap_err();
        assert!(matches!(err, AppError::InvalidSignature("no signature header")));
    }

    #[test]
    fn missing_v1_is_rejected() {
        let err = verify_signature(BODY, Some("t=1700000000"), "secret").unwrap_err();
        assert!(matches!(err, AppError::InvalidSignature("missing v1 signature")));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for raw in ["", "garbage", "t=1,v1", "t=1,=abc", "v1=a=b", "t=1,,v1=00"] {
            assert!(
                verify_signature(BODY, Some(raw), "secret").is_err(),
                "{raw:?} was accepted"
            );
        }
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let err = verify_signature(BODY, Some("t=1,v1=zz"), "secret").unwrap_err();
        assert!(matches!(err, AppError::InvalidSignature("invalid signature")));
    }

    #[test]
    fn tolerates_whitespace_between_pairs() {
        let header = format!("t=1, v1={}", sign(BODY, "secret"));
        assert!(verify_signature(BODY, Some(&header), "secret").is_ok());
    }
}
