use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tracing::error;

use crate::gateway::form::render_notice_page;
use crate::gateway::{CallbackOutcome, PaymentGateway, RawCallback};

use super::AppState;

/// Bank callback arriving as a form POST. The response URL the bank
/// posts to already carries order_id and token on the query string.
pub async fn handle_post(
    State(state): State<AppState>,
    Query(query): Query<RawCallback>,
    Form(body): Form<RawCallback>,
) -> Response {
    process(state, body.merged_with(query)).await
}

/// Bank callback arriving on the query string
pub async fn handle_get(
    State(state): State<AppState>,
    Query(payload): Query<RawCallback>,
) -> Response {
    process(state, payload).await
}

async fn process(state: AppState, payload: RawCallback) -> Response {
    match state.gateway.handle_callback(&payload).await {
        Ok(CallbackOutcome::Completed { redirect_url }) => {
            Redirect::to(&redirect_url).into_response()
        }
        Ok(CallbackOutcome::Failed {
            notice,
            redirect_url,
        }) => render_notice_page(&notice, &redirect_url).into_response(),
        Ok(CallbackOutcome::SafeLanding) => {
            Redirect::to(&state.config.shop.base_url).into_response()
        }
        // Generic refusal; token/shape failures get no detail.
        Ok(CallbackOutcome::Rejected) => {
            (StatusCode::BAD_REQUEST, "Invalid request").into_response()
        }
        Err(err) => {
            if err.is_silent() {
                (StatusCode::BAD_REQUEST, "Invalid request").into_response()
            } else {
                error!(error = %err, "Callback processing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to process the payment response",
                )
                    .into_response()
            }
        }
    }
}
