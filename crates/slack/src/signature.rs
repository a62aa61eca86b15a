//! Request authentication for inbound slash commands.
//!
//! Slack signs every request with the app's signing secret:
//! `v0=hex(HMAC-SHA256(secret, "v0:<timestamp>:<raw body>"))`. The legacy
//! verification token is still accepted when no signing secret is configured.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older or newer than this are treated as replays.
pub const MAX_CLOCK_SKEW_SECS: u64 = 300;

const SIGNATURE_VERSION: &str = "v0";
const TOKEN_DIGEST_KEY: &[u8] = b"urbano-verification-token";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing `{0}` header")]
    MissingHeader(&'static str),
    #[error("request timestamp `{0}` is not a unix timestamp")]
    MalformedTimestamp(String),
    #[error("request timestamp {issued_at} is outside the allowed window (now {now})")]
    StaleTimestamp { issued_at: u64, now: u64 },
    #[error("signature is not a `v0=<hex>` digest")]
    MalformedSignature,
    #[error("signing secret cannot key the hmac")]
    InvalidKey,
    #[error("signature does not match request body")]
    Mismatch,
}

impl SignatureError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingHeader(_) => "missing_header",
            Self::MalformedTimestamp(_) => "malformed_timestamp",
            Self::StaleTimestamp { .. } => "stale_timestamp",
            Self::MalformedSignature => "malformed_signature",
            Self::InvalidKey => "invalid_key",
            Self::Mismatch => "mismatch",
        }
    }
}

/// Checks the `X-Slack-Signature` header against the raw request body.
pub fn verify_request(
    secret: &SecretString,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now_secs: u64,
) -> Result<(), SignatureError> {
    let timestamp = timestamp.ok_or(SignatureError::MissingHeader(TIMESTAMP_HEADER))?.trim();
    let signature = signature.ok_or(SignatureError::MissingHeader(SIGNATURE_HEADER))?.trim();

    let issued_at = timestamp
        .parse::<u64>()
        .map_err(|_| SignatureError::MalformedTimestamp(timestamp.to_owned()))?;
    if now_secs.abs_diff(issued_at) > MAX_CLOCK_SKEW_SECS {
        return Err(SignatureError::StaleTimestamp { issued_at, now: now_secs });
    }

    let digest = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|rest| rest.strip_prefix('='))
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or(SignatureError::MalformedSignature)?;

    signing_mac(secret, timestamp, body)?
        .verify_slice(&digest)
        .map_err(|_| SignatureError::Mismatch)
}

/// `v0=<hex>` signature for `body`, as Slack would send it.
pub fn sign_request(
    secret: &SecretString,
    timestamp: &str,
    body: &[u8],
) -> Result<String, SignatureError> {
    let digest = signing_mac(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("{SIGNATURE_VERSION}={}", hex::encode(digest)))
}

/// Compares a legacy verification token without leaking timing.
pub fn token_matches(expected: &SecretString, supplied: &str) -> bool {
    let Ok(reference) = HmacSha256::new_from_slice(TOKEN_DIGEST_KEY) else {
        return false;
    };
    let reference = reference.chain_update(expected.expose_secret()).finalize().into_bytes();

    match HmacSha256::new_from_slice(TOKEN_DIGEST_KEY) {
        Ok(candidate) => candidate.chain_update(supplied).verify_slice(&reference).is_ok(),
        Err(_) => false,
    }
}

fn signing_mac(
    secret: &SecretString,
    timestamp: &str,
    body: &[u8],
) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|_| SignatureError::InvalidKey)?;
    mac.update(SIGNATURE_VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}
