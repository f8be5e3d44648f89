use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::error::GatewayErrorKind;
use crate::gateway::form::render_redirect_form;
use crate::gateway::PaymentGateway;

use super::AppState;

/// Receipt page: builds the signed outbound request for the order and
/// serves the auto-submitting form that carries it to the bank.
pub async fn receipt_page(
    State(state): State<AppState>,
    Path(order_id): Path<u64>,
) -> Response {
    match state.gateway.build_request(order_id).await {
        Ok(request) => render_redirect_form(&request).into_response(),
        Err(err) => match err.kind {
            GatewayErrorKind::OrderNotFound { .. } => {
                (StatusCode::NOT_FOUND, "Order not found").into_response()
            }
            GatewayErrorKind::Unavailable { .. }
            | GatewayErrorKind::UnsupportedCurrency { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This payment method is currently unavailable",
            )
                .into_response(),
            _ => {
                error!(order_id, error = %err, "Failed to build payment request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to start the payment",
                )
                    .into_response()
            }
        },
    }
}
