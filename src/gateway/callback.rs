//! Inbound callback processing.
//!
//! The bank calls the merchant response URL after the customer completes
//! (or abandons) the hosted payment page. The payload is adversarial
//! until the callback token and the response-phase signature both
//! verify. Token and shape failures are rejected with no detail and no
//! order access; everything else drives one terminal transition of the
//! order and appends a permanent audit note.

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{GatewayError, GatewayErrorKind, GatewayResult};

use super::currency;
use super::orders::{Order, OrderStatus, OrderStore};
use super::signature::{verify_signature, SignaturePhase};
use super::token::verify_token;
use super::MerchantCredentials;

/// Untrusted callback fields as they arrive on the wire. Everything is
/// optional here; the strict parse happens in `CallbackIdentity::parse`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCallback {
    pub order_id: Option<String>,
    pub token: Option<String>,
    #[serde(rename = "ResponseCode")]
    pub response_code: Option<String>,
    #[serde(rename = "ReasonCode")]
    pub reason_code: Option<String>,
    #[serde(rename = "ReasonCodeDesc")]
    pub reason_code_desc: Option<String>,
    #[serde(rename = "Signature")]
    pub signature: Option<String>,
}

impl RawCallback {
    /// The bank posts the response fields to a merchant response URL
    /// that already carries `order_id` and `token` as query
    /// parameters; both sources must be read, body taking precedence.
    pub fn merged_with(self, fallback: RawCallback) -> RawCallback {
        RawCallback {
            order_id: self.order_id.or(fallback.order_id),
            token: self.token.or(fallback.token),
            response_code: self.response_code.or(fallback.response_code),
            reason_code: self.reason_code.or(fallback.reason_code),
            reason_code_desc: self.reason_code_desc.or(fallback.reason_code_desc),
            signature: self.signature.or(fallback.signature),
        }
    }
}

/// The fields a callback must carry before the order is even looked up
struct CallbackIdentity {
    order_id: u64,
    token: String,
}

impl CallbackIdentity {
    fn parse(raw: &RawCallback) -> GatewayResult<Self> {
        let order_id = raw
            .order_id
            .as_deref()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| GatewayError::validation("order_id missing or not a positive integer"))?;

        let token = raw
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::validation("token missing"))?
            .to_string();

        Ok(Self { order_id, token })
    }
}

/// Bank response outcome, parsed once so dispatch cannot fall through
/// on raw numeric literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    Approved,
    Declined,
    Other(String),
}

impl ResponseCode {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "1" => ResponseCode::Approved,
            "2" => ResponseCode::Declined,
            other => ResponseCode::Other(other.to_string()),
        }
    }
}

/// What the HTTP layer should do once processing terminates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Generic failure response; no detail, no order was touched
    Rejected,
    /// Callback could not be attributed to a live order; send the
    /// customer to the shop's default landing page
    SafeLanding,
    /// Payment completed; send the customer to the order's return URL
    Completed { redirect_url: String },
    /// Declined or errored; show the notice and send the customer back
    /// to the payment page
    Failed {
        notice: String,
        redirect_url: String,
    },
}

pub struct CallbackProcessor<'a> {
    credentials: &'a MerchantCredentials,
    callback_secret: &'a str,
    store: &'a dyn OrderStore,
}

impl<'a> CallbackProcessor<'a> {
    pub fn new(
        credentials: &'a MerchantCredentials,
        callback_secret: &'a str,
        store: &'a dyn OrderStore,
    ) -> Self {
        Self {
            credentials,
            callback_secret,
            store,
        }
    }

    /// Run one callback to termination. Token and shape failures come
    /// back as `Rejected` without an order lookup; store failures are
    /// the only hard errors.
    pub async fn process(&self, raw: &RawCallback) -> GatewayResult<CallbackOutcome> {
        let identity = match CallbackIdentity::parse(raw) {
            Ok(identity) => identity,
            Err(_) => {
                warn!("Rejected callback with malformed payload");
                return Ok(CallbackOutcome::Rejected);
            }
        };

        if !verify_token(&identity.token, identity.order_id, self.callback_secret) {
            warn!(
                order_id = identity.order_id,
                "Rejected callback with invalid token"
            );
            return Ok(CallbackOutcome::Rejected);
        }

        let order = match self.store.find_order(identity.order_id).await? {
            Some(order) => order,
            None => {
                warn!(
                    order_id = identity.order_id,
                    "Callback for unknown order, sending safe landing"
                );
                return Ok(CallbackOutcome::SafeLanding);
            }
        };

        // Paid is terminal. Banks redeliver callbacks, and a replayed
        // decline carries only the URL token; it must never demote an
        // order that has already been credited.
        if order.status == OrderStatus::Paid {
            info!(
                order_id = order.id,
                "Callback for an already-paid order, no transition"
            );
            return Ok(CallbackOutcome::Completed {
                redirect_url: order.return_url.clone(),
            });
        }

        let code = match raw.response_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => ResponseCode::parse(code),
            None => {
                warn!(
                    order_id = order.id,
                    "Callback without a response code, sending safe landing"
                );
                return Ok(CallbackOutcome::SafeLanding);
            }
        };

        match code {
            ResponseCode::Approved => self.handle_approved(&order, raw).await,
            ResponseCode::Declined => self.handle_declined(&order, raw).await,
            ResponseCode::Other(code) => self.handle_errored(&order, &code).await,
        }
    }

    async fn handle_approved(
        &self,
        order: &Order,
        raw: &RawCallback,
    ) -> GatewayResult<CallbackOutcome> {
        let currency_code = currency::numeric_code(&order.currency).ok_or_else(|| {
            GatewayError::new(GatewayErrorKind::UnsupportedCurrency {
                currency: order.currency.clone(),
            })
        })?;

        let signature_valid = raw
            .signature
            .as_deref()
            .map(|candidate| {
                verify_signature(
                    candidate,
                    &self.credentials.password,
                    &self.credentials.merchant_id,
                    &self.credentials.acquirer_id,
                    order.id,
                    SignaturePhase::Response { response_code: "1" },
                    currency_code,
                )
            })
            .unwrap_or(false);

        if !signature_valid {
            warn!(
                order_id = order.id,
                "Approved response failed signature verification"
            );
            self.store
                .add_note(
                    order.id,
                    "HNB IPG reported an approved payment but the response signature \
                     failed verification; treating the callback as forged.",
                )
                .await?;
            self.store
                .set_status_unless_paid(order.id, OrderStatus::Errored)
                .await?;
            return Ok(CallbackOutcome::Failed {
                notice: "We could not validate the payment response. No charge was \
                         recorded; please try again or contact us."
                    .to_string(),
                redirect_url: order.retry_url.clone(),
            });
        }

        let transitioned = self.store.mark_paid_if_pending(order.id).await?;
        if transitioned {
            self.store
                .add_note(order.id, "HNB IPG payment approved (response code 1).")
                .await?;
            info!(order_id = order.id, "Order marked paid");
        } else {
            // Banks retry callbacks; a repeat delivery for a paid order
            // must not double-credit.
            info!(
                order_id = order.id,
                "Duplicate approval callback for non-pending order, no transition"
            );
        }

        Ok(CallbackOutcome::Completed {
            redirect_url: order.return_url.clone(),
        })
    }

    async fn handle_declined(
        &self,
        order: &Order,
        raw: &RawCallback,
    ) -> GatewayResult<CallbackOutcome> {
        // The decline path carries no usable signature; reason fields
        // are stored for the merchant but stay untrusted.
        let reason_code = escape_html(raw.reason_code.as_deref().unwrap_or("unknown"));
        let reason_desc = escape_html(raw.reason_code_desc.as_deref().unwrap_or("no description"));

        self.store
            .add_note(
                order.id,
                &format!(
                    "Payment declined by HNB IPG. Reason {}: {}",
                    reason_code, reason_desc
                ),
            )
            .await?;
        self.store
            .set_status_unless_paid(order.id, OrderStatus::Declined)
            .await?;
        info!(order_id = order.id, "Order declined by gateway");

        Ok(CallbackOutcome::Failed {
            notice: "Your payment was declined by the bank. Please try again or use \
                     a different card."
                .to_string(),
            redirect_url: order.retry_url.clone(),
        })
    }

    async fn handle_errored(&self, order: &Order, code: &str) -> GatewayResult<CallbackOutcome> {
        self.store
            .add_note(
                order.id,
                &format!("Unexpected HNB IPG response code {}.", escape_html(code)),
            )
            .await?;
        self.store
            .set_status_unless_paid(order.id, OrderStatus::Errored)
            .await?;
        warn!(order_id = order.id, "Unexpected gateway response code");

        Ok(CallbackOutcome::Failed {
            notice: "The payment could not be processed. Please try again.".to_string(),
            redirect_url: order.retry_url.clone(),
        })
    }
}

/// Escape bank-supplied text before it is stored or displayed
fn escape_html(value: &str) -> String {
    maud::html! { (value) }.into_string()
}
