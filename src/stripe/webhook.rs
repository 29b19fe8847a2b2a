use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed payload before it is rejected as a replay.
const TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    MalformedHeader,

    #[error("no v1 signatures present")]
    NoSignatures,

    #[error("timestamp outside of tolerance")]
    TimestampOutOfTolerance,

    #[error("no signature matches the payload")]
    NoMatch,
}

/// Verify a `Stripe-Signature` header against the raw request body.
///
/// The signed payload is `"{timestamp}.{body}"`, authenticated with
/// HMAC-SHA256 under the endpoint's signing secret. Any one matching `v1`
/// signature is sufficient (the header carries several during secret rolls).
pub fn verify(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    let (timestamp, signatures) = parse_header(header)?;

    if signatures.is_empty() {
        return Err(SignatureError::NoSignatures);
    }
    if (now.timestamp() - timestamp).abs() > TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::MalformedHeader)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    for signature in &signatures {
        if let Ok(bytes) = hex::decode(signature) {
            // verify_slice is constant-time
            if mac.clone().verify_slice(&bytes).is_ok() {
                return Ok(());
            }
        }
    }

    Err(SignatureError::NoMatch)
}

/// Parse `t=<unix>,v1=<hex>[,v1=<hex>...]`, ignoring unknown schemes.
fn parse_header(header: &str) -> Result<(i64, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::MalformedHeader)?;
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    Ok((
        timestamp.ok_or(SignatureError::MalformedHeader)?,
        signatures,
    ))
}
