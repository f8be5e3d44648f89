//! End-to-end exercise of the redirect protocol: build the outbound
//! request for an order, then play the bank's part and deliver the
//! approval callback against the same gateway instance.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

use hnb_ipg::config::{GatewayConfig, ShopConfig};
use hnb_ipg::error::GatewayResult;
use hnb_ipg::gateway::signature::{compute_signature, SignaturePhase};
use hnb_ipg::gateway::{
    CallbackOutcome, IpgGateway, Order, OrderStatus, OrderStore, PaymentGateway, RawCallback,
};

const SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Shop-side order store standing in for the host platform
struct MemoryShop {
    orders: Mutex<Vec<Order>>,
    notes: Mutex<Vec<(u64, String)>>,
}

impl MemoryShop {
    fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders),
            notes: Mutex::new(Vec::new()),
        }
    }

    fn status_of(&self, order_id: u64) -> Option<OrderStatus> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status)
    }

    fn notes_for(&self, order_id: u64) -> Vec<String> {
        self.notes
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, note)| note.clone())
            .collect()
    }
}

#[async_trait]
impl OrderStore for MemoryShop {
    async fn find_order(&self, order_id: u64) -> GatewayResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    async fn mark_paid_if_pending(&self, order_id: u64) -> GatewayResult<bool> {
        let mut orders = self.orders.lock().unwrap();
        match orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status == OrderStatus::Pending)
        {
            Some(order) => {
                order.status = OrderStatus::Paid;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_status_unless_paid(&self, order_id: u64, status: OrderStatus) -> GatewayResult<()> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(order) = orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status != OrderStatus::Paid)
        {
            order.status = status;
        }
        Ok(())
    }

    async fn add_note(&self, order_id: u64, note: &str) -> GatewayResult<()> {
        self.notes.lock().unwrap().push((order_id, note.to_string()));
        Ok(())
    }
}

fn pending_order(id: u64) -> Order {
    Order {
        id,
        total: Decimal::from_str("1500.00").unwrap(),
        currency: "LKR".to_string(),
        status: OrderStatus::Pending,
        return_url: format!("https://shop.example.com/thank-you/{id}"),
        retry_url: format!("https://shop.example.com/pay/{id}"),
        cancel_url: format!("https://shop.example.com/cart/{id}"),
    }
}

fn build_gateway(shop: Arc<MemoryShop>) -> IpgGateway {
    let gateway_config = GatewayConfig {
        enabled: true,
        merchant_id: Some("MER001".to_string()),
        acquirer_id: Some("ACQ001".to_string()),
        password: Some("gateway-password".to_string()),
        callback_secret: SECRET.to_string(),
    };
    let shop_config = ShopConfig {
        currency: "LKR".to_string(),
        public_base_url: "https://shop.example.com".to_string(),
        base_url: "https://shop.example.com/".to_string(),
    };
    IpgGateway::new(&gateway_config, &shop_config, shop)
}

/// Pull the token query parameter back out of the merchant response URL
fn token_from(merchant_response_url: &str) -> String {
    merchant_response_url
        .rsplit("token=")
        .next()
        .expect("callback URL carries a token")
        .to_string()
}

#[tokio::test]
async fn approved_callback_pays_the_order_exactly_once() {
    let shop = Arc::new(MemoryShop::new(vec![pending_order(42)]));
    let gateway = build_gateway(shop.clone());

    let request = gateway.build_request(42).await.unwrap();
    assert_eq!(request.purchase_amount, "000000150000");
    assert_eq!(request.purchase_currency, 144);

    // The bank signs its response over the response code instead of
    // the purchase amount.
    let response_signature = compute_signature(
        "gateway-password",
        "MER001",
        "ACQ001",
        42,
        SignaturePhase::Response { response_code: "1" },
        144,
    );

    let callback = RawCallback {
        order_id: Some("42".to_string()),
        token: Some(token_from(&request.merchant_response_url)),
        response_code: Some("1".to_string()),
        reason_code: None,
        reason_code_desc: None,
        signature: Some(response_signature),
    };

    let first = gateway.handle_callback(&callback).await.unwrap();
    assert_eq!(
        first,
        CallbackOutcome::Completed {
            redirect_url: "https://shop.example.com/thank-you/42".to_string()
        }
    );
    assert_eq!(shop.status_of(42), Some(OrderStatus::Paid));
    assert_eq!(shop.notes_for(42).len(), 1);

    // Redelivery of the identical callback must not double-credit.
    let second = gateway.handle_callback(&callback).await.unwrap();
    assert_eq!(
        second,
        CallbackOutcome::Completed {
            redirect_url: "https://shop.example.com/thank-you/42".to_string()
        }
    );
    assert_eq!(shop.status_of(42), Some(OrderStatus::Paid));
    assert_eq!(shop.notes_for(42).len(), 1);
}

#[tokio::test]
async fn declined_replay_after_approval_leaves_the_order_paid() {
    let shop = Arc::new(MemoryShop::new(vec![pending_order(42)]));
    let gateway = build_gateway(shop.clone());

    let request = gateway.build_request(42).await.unwrap();
    let token = token_from(&request.merchant_response_url);
    let response_signature = compute_signature(
        "gateway-password",
        "MER001",
        "ACQ001",
        42,
        SignaturePhase::Response { response_code: "1" },
        144,
    );

    let approved = RawCallback {
        order_id: Some("42".to_string()),
        token: Some(token.clone()),
        response_code: Some("1".to_string()),
        reason_code: None,
        reason_code_desc: None,
        signature: Some(response_signature),
    };
    gateway.handle_callback(&approved).await.unwrap();
    assert_eq!(shop.status_of(42), Some(OrderStatus::Paid));

    // A later decline for the same order carries the same URL token
    // and no signature; it must not demote the paid order.
    let declined = RawCallback {
        order_id: Some("42".to_string()),
        token: Some(token),
        response_code: Some("2".to_string()),
        reason_code: Some("05".to_string()),
        reason_code_desc: Some("Do not honor".to_string()),
        signature: None,
    };
    let outcome = gateway.handle_callback(&declined).await.unwrap();

    assert_eq!(
        outcome,
        CallbackOutcome::Completed {
            redirect_url: "https://shop.example.com/thank-you/42".to_string()
        }
    );
    assert_eq!(shop.status_of(42), Some(OrderStatus::Paid));
    assert_eq!(shop.notes_for(42).len(), 1);
}

#[tokio::test]
async fn declined_callback_records_reason_and_declines() {
    let shop = Arc::new(MemoryShop::new(vec![pending_order(7)]));
    let gateway = build_gateway(shop.clone());

    let request = gateway.build_request(7).await.unwrap();
    let callback = RawCallback {
        order_id: Some("7".to_string()),
        token: Some(token_from(&request.merchant_response_url)),
        response_code: Some("2".to_string()),
        reason_code: Some("05".to_string()),
        reason_code_desc: Some("Do not honor".to_string()),
        signature: None,
    };

    let outcome = gateway.handle_callback(&callback).await.unwrap();
    assert!(matches!(outcome, CallbackOutcome::Failed { .. }));
    assert_eq!(shop.status_of(7), Some(OrderStatus::Declined));

    let notes = shop.notes_for(7);
    assert_eq!(notes.len(), 1);
    assert!(notes[0].contains("05"));
    assert!(notes[0].contains("Do not honor"));
}

#[tokio::test]
async fn token_for_another_order_never_reaches_the_shop() {
    let shop = Arc::new(MemoryShop::new(vec![pending_order(42), pending_order(43)]));
    let gateway = build_gateway(shop.clone());

    // Token minted for order 43, replayed against order 42.
    let request = gateway.build_request(43).await.unwrap();
    let callback = RawCallback {
        order_id: Some("42".to_string()),
        token: Some(token_from(&request.merchant_response_url)),
        response_code: Some("1".to_string()),
        reason_code: None,
        reason_code_desc: None,
        signature: None,
    };

    let outcome = gateway.handle_callback(&callback).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Rejected);
    assert_eq!(shop.status_of(42), Some(OrderStatus::Pending));
    assert!(shop.notes_for(42).is_empty());
}

#[tokio::test]
async fn forged_approval_signature_errors_the_order() {
    let shop = Arc::new(MemoryShop::new(vec![pending_order(42)]));
    let gateway = build_gateway(shop.clone());

    let request = gateway.build_request(42).await.unwrap();
    let callback = RawCallback {
        order_id: Some("42".to_string()),
        token: Some(token_from(&request.merchant_response_url)),
        response_code: Some("1".to_string()),
        reason_code: None,
        reason_code_desc: None,
        // Reusing the purchase-phase signature is the obvious forgery.
        signature: Some(request.signature.clone()),
    };

    let outcome = gateway.handle_callback(&callback).await.unwrap();
    assert!(matches!(outcome, CallbackOutcome::Failed { .. }));
    assert_eq!(shop.status_of(42), Some(OrderStatus::Errored));
}
