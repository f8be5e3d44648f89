//! Outbound payment request assembly.
//!
//! Builds the full field set the redirect form posts to the IPG:
//! merchant identity, the purchase amount as a fixed-width minor-unit
//! string, the signed merchant response URL and the purchase-phase
//! signature. Built fresh per checkout attempt and never persisted.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{GatewayError, GatewayErrorKind, GatewayResult};

use super::currency;
use super::orders::Order;
use super::signature::{compute_signature, SignaturePhase};
use super::token::generate_token;
use super::{MerchantCredentials, CAPTURE_FLAG, SIGNATURE_METHOD, VERSION};

/// Width of the PurchaseAmt wire field
const AMOUNT_FIELD_WIDTH: usize = 12;

/// The complete outbound field set for one checkout attempt
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub version: &'static str,
    pub merchant_id: String,
    pub acquirer_id: String,
    pub merchant_response_url: String,
    pub purchase_currency: u16,
    pub purchase_currency_exponent: u8,
    pub order_id: u64,
    pub signature_method: &'static str,
    pub signature: String,
    pub capture_flag: char,
    pub purchase_amount: String,
    /// Not part of the wire field set; the redirect page's cancel link
    /// sends the customer back here
    pub cancel_url: String,
}

impl PaymentRequest {
    /// Wire fields in the order the IPG documents them. The redirect
    /// form must emit exactly these pairs.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Version", self.version.to_string()),
            ("MerID", self.merchant_id.clone()),
            ("AcqID", self.acquirer_id.clone()),
            ("MerRespURL", self.merchant_response_url.clone()),
            ("PurchaseCurrency", self.purchase_currency.to_string()),
            (
                "PurchaseCurrencyExponent",
                self.purchase_currency_exponent.to_string(),
            ),
            ("OrderID", self.order_id.to_string()),
            ("SignatureMethod", self.signature_method.to_string()),
            ("Signature", self.signature.clone()),
            ("CaptureFlag", self.capture_flag.to_string()),
            ("PurchaseAmt", self.purchase_amount.clone()),
        ]
    }
}

/// Convert an order total to the fixed-width minor-unit amount string.
///
/// The wire field is 12 characters; amounts that round to more digits
/// are rejected rather than truncated.
pub fn format_minor_units(total: Decimal, exponent: u8) -> GatewayResult<String> {
    let factor = Decimal::from(10u64.pow(u32::from(exponent)));
    let scaled = total.checked_mul(factor).ok_or_else(|| {
        GatewayError::new(GatewayErrorKind::AmountTooLarge {
            amount: total.to_string(),
        })
    })?;
    // Half-up rounding; Decimal::round defaults to banker's rounding
    // which would turn 1000.5 minor units into 1000.
    let minor = scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    if minor.is_sign_negative() {
        return Err(GatewayError::validation(format!(
            "order total must not be negative, got {}",
            total
        )));
    }

    let minor = minor.to_u64().ok_or_else(|| {
        GatewayError::new(GatewayErrorKind::AmountTooLarge {
            amount: total.to_string(),
        })
    })?;

    let formatted = minor.to_string();
    if formatted.len() > AMOUNT_FIELD_WIDTH {
        return Err(GatewayError::new(GatewayErrorKind::AmountTooLarge {
            amount: total.to_string(),
        }));
    }

    Ok(format!("{:0>width$}", formatted, width = AMOUNT_FIELD_WIDTH))
}

/// Merchant response URL with the order id and a fresh callback token
pub fn build_callback_url(public_base_url: &str, order_id: u64, callback_secret: &str) -> String {
    let token = generate_token(order_id, callback_secret);
    format!(
        "{}/gateway/callback?order_id={}&token={}",
        public_base_url.trim_end_matches('/'),
        order_id,
        token
    )
}

/// Assemble the signed outbound request for an order.
///
/// Pure apart from deterministic hashing; performs no I/O.
pub fn build_payment_request(
    order: &Order,
    credentials: &MerchantCredentials,
    public_base_url: &str,
    callback_secret: &str,
) -> GatewayResult<PaymentRequest> {
    let currency = currency::lookup(&order.currency).ok_or_else(|| {
        GatewayError::new(GatewayErrorKind::UnsupportedCurrency {
            currency: order.currency.clone(),
        })
    })?;

    let purchase_amount = format_minor_units(order.total, currency.exponent)?;
    let merchant_response_url = build_callback_url(public_base_url, order.id, callback_secret);

    let signature = compute_signature(
        &credentials.password,
        &credentials.merchant_id,
        &credentials.acquirer_id,
        order.id,
        SignaturePhase::Purchase {
            purchase_amount: &purchase_amount,
        },
        currency.numeric_code,
    );

    Ok(PaymentRequest {
        version: VERSION,
        merchant_id: credentials.merchant_id.clone(),
        acquirer_id: credentials.acquirer_id.clone(),
        merchant_response_url,
        purchase_currency: currency.numeric_code,
        purchase_currency_exponent: currency.exponent,
        order_id: order.id,
        signature_method: SIGNATURE_METHOD,
        signature,
        capture_flag: CAPTURE_FLAG,
        purchase_amount,
        cancel_url: order.cancel_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::orders::OrderStatus;
    use crate::gateway::token::verify_token;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn credentials() -> MerchantCredentials {
        MerchantCredentials {
            merchant_id: "MER001".to_string(),
            acquirer_id: "ACQ001".to_string(),
            password: "gateway-password".to_string(),
        }
    }

    fn order(total: &str, currency: &str) -> Order {
        Order {
            id: 42,
            total: Decimal::from_str(total).unwrap(),
            currency: currency.to_string(),
            status: OrderStatus::Pending,
            return_url: "https://shop.example.com/thank-you".to_string(),
            retry_url: "https://shop.example.com/pay/42".to_string(),
            cancel_url: "https://shop.example.com/cart".to_string(),
        }
    }

    #[test]
    fn test_lkr_purchase_amount_scenario() {
        // 1500.00 LKR, exponent 2: 150000 minor units, padded to 12.
        let request = build_payment_request(
            &order("1500.00", "LKR"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap();

        assert_eq!(request.purchase_amount, "000000150000");
        assert_eq!(request.purchase_currency, 144);
        assert_eq!(request.purchase_currency_exponent, 2);
    }

    #[test]
    fn test_fixed_protocol_attributes() {
        let request = build_payment_request(
            &order("10.00", "USD"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap();

        assert_eq!(request.version, "1.0.0");
        assert_eq!(request.signature_method, "SHA1");
        assert_eq!(request.capture_flag, 'A');
    }

    #[test]
    fn test_field_order_matches_wire_contract() {
        let request = build_payment_request(
            &order("1500.00", "LKR"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap();

        let names: Vec<&str> = request.fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "Version",
                "MerID",
                "AcqID",
                "MerRespURL",
                "PurchaseCurrency",
                "PurchaseCurrencyExponent",
                "OrderID",
                "SignatureMethod",
                "Signature",
                "CaptureFlag",
                "PurchaseAmt",
            ]
        );
    }

    #[test]
    fn test_cancel_url_carried_but_not_posted() {
        let request = build_payment_request(
            &order("1500.00", "LKR"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap();

        assert_eq!(request.cancel_url, "https://shop.example.com/cart");
        assert!(request
            .fields()
            .iter()
            .all(|(_, value)| value != "https://shop.example.com/cart"));
    }

    #[test]
    fn test_unsupported_currency_rejected() {
        let err = build_payment_request(
            &order("10.00", "XYZ"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap_err();
        assert!(matches!(
            err.kind,
            GatewayErrorKind::UnsupportedCurrency { .. }
        ));
    }

    #[test]
    fn test_amount_overflowing_field_rejected() {
        // 13 minor-unit digits; must be rejected, not truncated.
        let err = format_minor_units(Decimal::from_str("10000000000.00").unwrap(), 2).unwrap_err();
        assert!(matches!(err.kind, GatewayErrorKind::AmountTooLarge { .. }));
    }

    #[test]
    fn test_amount_at_field_boundary_accepted() {
        let amount = format_minor_units(Decimal::from_str("9999999999.99").unwrap(), 2).unwrap();
        assert_eq!(amount, "999999999999");
    }

    #[test]
    fn test_rounding_to_minor_units() {
        assert_eq!(
            format_minor_units(Decimal::from_str("10.005").unwrap(), 2).unwrap(),
            "000000001001"
        );
        assert_eq!(
            format_minor_units(Decimal::from_str("0.01").unwrap(), 2).unwrap(),
            "000000000001"
        );
    }

    #[test]
    fn test_negative_total_rejected() {
        let err = format_minor_units(Decimal::from_str("-5.00").unwrap(), 2).unwrap_err();
        assert!(matches!(err.kind, GatewayErrorKind::Validation { .. }));
    }

    #[test]
    fn test_callback_url_embeds_valid_token() {
        let url = build_callback_url("https://shop.example.com/", 42, SECRET);
        assert!(url.starts_with("https://shop.example.com/gateway/callback?order_id=42&token="));

        let token = url.rsplit("token=").next().unwrap();
        assert!(verify_token(token, 42, SECRET));
        assert!(!verify_token(token, 7, SECRET));
    }

    #[test]
    fn test_signature_matches_engine_output() {
        let request = build_payment_request(
            &order("1500.00", "LKR"),
            &credentials(),
            "https://shop.example.com",
            SECRET,
        )
        .unwrap();

        let expected = compute_signature(
            "gateway-password",
            "MER001",
            "ACQ001",
            42,
            SignaturePhase::Purchase {
                purchase_amount: "000000150000",
            },
            144,
        );
        assert_eq!(request.signature, expected);
    }
}
