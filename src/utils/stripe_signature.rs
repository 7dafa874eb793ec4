//! Verification of the `Stripe-Signature` webhook header.
//!
//! Header format: `t=<unix>,v1=<hex>[,v1=<hex>...]`. The signed payload is
//! `"{t}.{raw body}"` under HMAC-SHA256 with the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,
    #[error("no matching v1 signature")]
    Mismatch,
    #[error("signature timestamp outside tolerance")]
    Stale,
}

struct ParsedHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<ParsedHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part.trim().split_once('=').ok_or(SignatureError::Malformed)?;
        match key {
            "t" => timestamp = Some(value.parse::<i64>().map_err(|_| SignatureError::Malformed)?),
            "v1" => {
                if let Ok(bytes) = hex::decode(value) {
                    signatures.push(bytes);
                }
            }
            _ => {}
        }
    }

    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(ParsedHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::Malformed),
    }
}

#[cfg(test)]
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    let matched = parsed.signatures.iter().any(|signature| {
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return false;
        };
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        mac.verify_slice(signature).is_ok()
    });

    if !matched {
        return Err(SignatureError::Mismatch);
    }
    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Stale);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"ping"}"#;

    #[test]
    fn accepts_valid_signature_among_several() {
        let now = 1_700_000_000;
        let header = format!("t={},v1=deadbeef,v1={}", now, sign(BODY, now, SECRET));
        assert_eq!(verify_signature(BODY, &header, SECRET, now + 10, 300), Ok(()));
    }

    #[test]
    fn rejects_tampered_body() {
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(BODY, now, SECRET));
        assert_eq!(
            verify_signature(b"{}", &header, SECRET, now, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_replayed_events() {
        let then = 1_700_000_000;
        let header = format!("t={},v1={}", then, sign(BODY, then, SECRET));
        assert_eq!(
            verify_signature(BODY, &header, SECRET, then + 301, 300),
            Err(SignatureError::Stale)
        );
    }

    #[test]
    fn rejects_malformed_headers() {
        for header in ["", "t=abc,v1=00", "v1=00", "t=1"] {
            assert_eq!(
                verify_signature(BODY, header, SECRET, 1, 300),
                Err(SignatureError::Malformed),
                "{header}"
            );
        }
    }
}
