//! Capability surface the host checkout flow consumes.

use async_trait::async_trait;

use crate::error::GatewayResult;

use super::callback::{CallbackOutcome, RawCallback};
use super::request::PaymentRequest;

/// A redirect-based payment gateway.
///
/// The protocol core itself has no dependency on this trait; it exists
/// so the checkout flow can hold any gateway behind one interface.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Build the signed outbound field set for an order's checkout attempt
    async fn build_request(&self, order_id: u64) -> GatewayResult<PaymentRequest>;

    /// Run one inbound bank callback to termination
    async fn handle_callback(&self, payload: &RawCallback) -> GatewayResult<CallbackOutcome>;

    /// Whether the gateway can currently take payments (enabled,
    /// credentialed, supported currency)
    fn is_available(&self) -> bool;
}
