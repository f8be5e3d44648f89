//! Callback token.
//!
//! The merchant response URL handed to the bank embeds a keyed token
//! binding that URL to one order. The token is independent of the bank's
//! own signature; its sole purpose is to stop unauthenticated invocation
//! of the callback endpoint for arbitrary orders. Any mismatch is a hard
//! rejection with no detail disclosed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::signature::constant_time_eq;
use super::GATEWAY_ID;

type HmacSha256 = Hmac<Sha256>;

/// Derive the callback token for an order
pub fn generate_token(order_id: u64, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(format!("{}-{}", GATEWAY_ID, order_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a caller-supplied token against an order id
pub fn verify_token(candidate: &str, order_id: u64, secret: &str) -> bool {
    let expected = generate_token(order_id, secret);
    constant_time_eq(&expected, candidate)
}
