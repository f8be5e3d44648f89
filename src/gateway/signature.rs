//! Bank transaction signature.
//!
//! The IPG signs transactions with a base64-encoded SHA-1 digest over the
//! delimiter-free concatenation of the shared password, merchant identity,
//! order id, an amount component and the numeric currency code. The same
//! construction covers both phases of the exchange: the outbound request
//! signs the zero-padded purchase amount, the inbound response is signed
//! over the bank's response code instead.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha1::{Digest, Sha1};

/// Which transaction field takes the amount slot in the signing string
#[derive(Debug, Clone, Copy)]
pub enum SignaturePhase<'a> {
    /// Outbound request: the 12-character zero-padded minor-unit amount
    Purchase { purchase_amount: &'a str },
    /// Inbound callback: the bank's response code
    Response { response_code: &'a str },
}

impl<'a> SignaturePhase<'a> {
    fn component(&self) -> &'a str {
        match self {
            SignaturePhase::Purchase { purchase_amount } => purchase_amount,
            SignaturePhase::Response { response_code } => response_code,
        }
    }
}

/// Compute the gateway signature for one phase of the exchange.
///
/// The concatenation order and the absence of delimiters must match the
/// bank bit-for-bit or the transaction is rejected.
pub fn compute_signature(
    password: &str,
    merchant_id: &str,
    acquirer_id: &str,
    order_id: u64,
    phase: SignaturePhase<'_>,
    currency_code: u16,
) -> String {
    let input = format!(
        "{}{}{}{}{}{}",
        password,
        merchant_id,
        acquirer_id,
        order_id,
        phase.component(),
        currency_code
    );
    let digest = Sha1::digest(input.as_bytes());
    BASE64.encode(digest)
}

/// Recompute and compare a candidate signature in constant time
#[allow(clippy::too_many_arguments)]
pub fn verify_signature(
    candidate: &str,
    password: &str,
    merchant_id: &str,
    acquirer_id: &str,
    order_id: u64,
    phase: SignaturePhase<'_>,
    currency_code: u16,
) -> bool {
    let expected = compute_signature(
        password,
        merchant_id,
        acquirer_id,
        order_id,
        phase,
        currency_code,
    );
    constant_time_eq(&expected, candidate.trim())
}

// Byte-wise comparison that does not short-circuit on the first
// mismatch; signature checks must not leak where they diverge.
pub(crate) fn constant_time_eq(expected: &str, candidate: &str) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }

    expected
        .as_bytes()
        .iter()
        .zip(candidate.as_bytes().iter())
        .fold(0, |acc, (a, b)| acc | (a ^ b))
        == 0
}
