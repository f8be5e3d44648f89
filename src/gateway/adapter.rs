//! HNB IPG gateway adapter.
//!
//! Wires the configured merchant identity, the callback secret and the
//! host order store into the `PaymentGateway` capability surface.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{GatewayConfig, ShopConfig};
use crate::error::{GatewayError, GatewayErrorKind, GatewayResult};

use super::callback::{CallbackOutcome, CallbackProcessor, RawCallback};
use super::currency;
use super::orders::OrderStore;
use super::request::{build_payment_request, PaymentRequest};
use super::traits::PaymentGateway;
use super::MerchantCredentials;

pub struct IpgGateway {
    enabled: bool,
    credentials: Option<MerchantCredentials>,
    callback_secret: String,
    public_base_url: String,
    shop_currency: String,
    store: Arc<dyn OrderStore>,
}

impl IpgGateway {
    pub fn new(gateway: &GatewayConfig, shop: &ShopConfig, store: Arc<dyn OrderStore>) -> Self {
        let credentials = match (&gateway.merchant_id, &gateway.acquirer_id, &gateway.password) {
            (Some(merchant_id), Some(acquirer_id), Some(password)) => Some(MerchantCredentials {
                merchant_id: merchant_id.clone(),
                acquirer_id: acquirer_id.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        if credentials.is_none() {
            warn!("HNB IPG credentials incomplete, gateway will report unavailable");
        }

        Self {
            enabled: gateway.enabled,
            credentials,
            callback_secret: gateway.callback_secret.clone(),
            public_base_url: shop.public_base_url.clone(),
            shop_currency: shop.currency.clone(),
            store,
        }
    }

    fn availability(&self) -> Result<&MerchantCredentials, GatewayError> {
        if !self.enabled {
            return Err(GatewayError::unavailable("gateway is disabled"));
        }
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| GatewayError::unavailable("merchant credentials not configured"))?;
        if !currency::is_supported(&self.shop_currency) {
            return Err(GatewayError::unavailable(format!(
                "shop currency '{}' is not supported",
                self.shop_currency
            )));
        }
        Ok(credentials)
    }
}

#[async_trait]
impl PaymentGateway for IpgGateway {
    async fn build_request(&self, order_id: u64) -> GatewayResult<PaymentRequest> {
        let credentials = self.availability()?;

        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or_else(|| GatewayError::new(GatewayErrorKind::OrderNotFound { order_id }))?;

        let request = build_payment_request(
            &order,
            credentials,
            &self.public_base_url,
            &self.callback_secret,
        )?;
        info!(order_id, "Built IPG payment request");
        Ok(request)
    }

    async fn handle_callback(&self, payload: &RawCallback) -> GatewayResult<CallbackOutcome> {
        let credentials = match self.credentials.as_ref() {
            Some(credentials) => credentials,
            None => {
                // Without credentials no outbound request was ever
                // signed; nothing legitimate can arrive here.
                warn!("Callback received while gateway has no credentials");
                return Ok(CallbackOutcome::Rejected);
            }
        };

        CallbackProcessor::new(credentials, &self.callback_secret, self.store.as_ref())
            .process(payload)
            .await
    }

    fn is_available(&self) -> bool {
        self.availability().is_ok()
    }
}
