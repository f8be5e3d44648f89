//! HNB Internet Payment Gateway integration.
//!
//! Redirect-based protocol: the checkout flow posts a signed field set
//! to the bank's hosted payment page, and the bank reports the outcome
//! asynchronously to a tokenized merchant response URL. This module
//! owns the whole exchange: request signing, callback authentication
//! and the order state machine.

pub mod adapter;
pub mod callback;
pub mod currency;
pub mod form;
pub mod orders;
pub mod request;
pub mod signature;
pub mod token;
pub mod traits;

pub use adapter::IpgGateway;
pub use callback::{CallbackOutcome, RawCallback};
pub use orders::{Order, OrderStatus, OrderStore};
pub use request::PaymentRequest;
pub use traits::PaymentGateway;

use std::fmt;

/// Identifier bound into callback tokens and callback URLs
pub const GATEWAY_ID: &str = "hnb_ipg";

/// Bank's hosted payment page; the redirect form posts here
pub const IPG_URL: &str =
    "https://www.hnbpg.hnb.lk/SENTRY/PaymentGateway/Application/ReDirectLink.aspx";

/// Protocol version reported in the outbound request
pub const VERSION: &str = "1.0.0";

/// Signing scheme the bank expects; a mismatch means this integration
/// is not compatible with the merchant account
pub const SIGNATURE_METHOD: &str = "SHA1";

/// "A": authorize and capture in one step
pub const CAPTURE_FLAG: char = 'A';

/// Merchant identity issued by the bank. Supplied once at configuration
/// time; the password never leaves this process.
#[derive(Clone)]
pub struct MerchantCredentials {
    pub merchant_id: String,
    pub acquirer_id: String,
    pub password: String,
}

// The password must not leak through debug logging.
impl fmt::Debug for MerchantCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerchantCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("acquirer_id", &self.acquirer_id)
            .field("password", &"<redacted>")
            .finish()
    }
}
