//! Request signing for the ad-keyword API.
//!
//! Every call carries an `X-Signature` header: the base64-encoded
//! HMAC-SHA256 of `"{timestamp}.{method}.{path}"`, keyed with the account's
//! secret key. The timestamp is milliseconds since the Unix epoch and must be
//! the same value sent in `X-Timestamp`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use sha2::Sha256;

use crate::Error;

type HmacSha256 = Hmac<Sha256>;

pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const CUSTOMER_HEADER: &str = "x-customer";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Computes the signature for a single request.
pub fn sign(timestamp: &str, method: &str, path: &str, secret: &str) -> Result<String, Error> {
    let message = format!("{}.{}.{}", timestamp, method, path);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Signature(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Builds the authenticated header set, stamping the current wall-clock time.
pub fn build_headers(
    method: &str,
    path: &str,
    api_key: &str,
    secret: &str,
    customer_id: &str,
) -> Result<HeaderMap, Error> {
    let timestamp = chrono::Utc::now().timestamp_millis().to_string();
    build_headers_at(&timestamp, method, path, api_key, secret, customer_id)
}

/// Same as [`build_headers`] with an explicit timestamp.
pub fn build_headers_at(
    timestamp: &str,
    method: &str,
    path: &str,
    api_key: &str,
    secret: &str,
    customer_id: &str,
) -> Result<HeaderMap, Error> {
    let signature = sign(timestamp, method, path, secret)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=UTF-8"),
    );
    insert(&mut headers, TIMESTAMP_HEADER, timestamp)?;
    insert(&mut headers, API_KEY_HEADER, api_key)?;
    insert(&mut headers, CUSTOMER_HEADER, customer_id)?;
    insert(&mut headers, SIGNATURE_HEADER, &signature)?;
    Ok(headers)
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), Error> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| Error::Signature(format!("invalid value for header {}", name)))?;
    headers.insert(HeaderName::from_static(name), value);
    Ok(())
}
