//! Payment callback signatures.
//!
//! When a customer completes a payment, the gateway hands the browser three values: its order handle, its payment
//! handle and a signature. The signature is the hex-encoded HMAC-SHA256 of `"{order_handle}|{payment_handle}"`, keyed
//! with the merchant's key secret. Only someone holding the secret can produce it, so a matching signature proves that
//! the gateway vouched for this order/payment pair.
//!
//! The same primitive, applied to the raw request body with the webhook secret, authenticates webhook deliveries.
use hmac::{digest::InvalidLength, Hmac, Mac};
use log::*;
use rpg_common::Secret;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn keyed_mac(key: &[u8], data: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac)
}

/// Hex-encoded HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256_hex(key: &str, data: &[u8]) -> Result<String, InvalidLength> {
    let mac = keyed_mac(key.as_bytes(), data)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks a hex-encoded HMAC-SHA256 signature in constant time.
///
/// Signatures that are not valid hex are rejected without computing anything.
pub fn verify_hmac_sha256_hex(key: &str, data: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    match keyed_mac(key.as_bytes(), data) {
        Ok(mac) => mac.verify_slice(&expected).is_ok(),
        Err(e) => {
            error!("🔐️ Could not key the HMAC for signature verification. {e}");
            false
        },
    }
}

fn signed_payload(order_handle: &str, payment_handle: &str) -> String {
    format!("{order_handle}|{payment_handle}")
}

/// Computes the signature the gateway attaches to a completed payment.
pub fn sign_payment(
    order_handle: &str,
    payment_handle: &str,
    secret: &Secret<String>,
) -> Result<String, InvalidLength> {
    hmac_sha256_hex(secret.reveal(), signed_payload(order_handle, payment_handle).as_bytes())
}

/// Returns true if `signature` is the gateway signature for the given order and payment handles.
pub fn verify_payment_signature(
    order_handle: &str,
    payment_handle: &str,
    signature: &str,
    secret: &Secret<String>,
) -> bool {
    verify_hmac_sha256_hex(secret.reveal(), signed_payload(order_handle, payment_handle).as_bytes(), signature)
}
