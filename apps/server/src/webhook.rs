//! Shopify webhook signature verification.
//!
//! Shopify signs the raw request body with the app's webhook secret and
//! sends the base64 HMAC-SHA256 digest in `X-Shopify-Hmac-Sha256`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

type HmacSha256 = Hmac<Sha256>;

/// Base64 HMAC-SHA256 of `body` under `secret`.
pub fn sign(secret: &str, body: &[u8]) -> Option<String> {
    mac(secret, body).map(|mac| BASE64.encode(mac.finalize().into_bytes()))
}

/// Check a received signature against the raw body, in constant time.
///
/// A missing or undecodable signature never verifies.
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let Some(signature) = signature else {
        return false;
    };
    let Ok(expected) = BASE64.decode(signature.trim()) else {
        return false;
    };
    mac(secret, body).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

fn mac(secret: &str, body: &[u8]) -> Option<HmacSha256> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(mac)
}
