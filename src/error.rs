use std::fmt;

use crate::database::error::DatabaseError;

/// Gateway error classification
#[derive(Debug, Clone)]
pub enum GatewayErrorKind {
    /// Malformed inbound payload (missing or wrong-typed fields)
    Validation {
        message: String,
    },
    /// Callback token or bank signature mismatch
    Authentication {
        message: String,
    },
    /// Shop currency is not in the IPG currency table
    UnsupportedCurrency {
        currency: String,
    },
    /// Minor-unit amount does not fit the 12-digit wire field
    AmountTooLarge {
        amount: String,
    },
    /// Order lookup came back empty
    OrderNotFound {
        order_id: u64,
    },
    /// Gateway is disabled or misconfigured (missing credentials,
    /// unsupported shop currency)
    Unavailable {
        reason: String,
    },
    /// Order store failure
    Storage {
        message: String,
    },
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone)]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub context: Option<String>,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::new(GatewayErrorKind::Validation {
            message: message.into(),
        })
    }

    pub fn authentication<S: Into<String>>(message: S) -> Self {
        Self::new(GatewayErrorKind::Authentication {
            message: message.into(),
        })
    }

    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self::new(GatewayErrorKind::Unavailable {
            reason: reason.into(),
        })
    }

    /// Errors that must never be detailed to the caller. The inbound
    /// handler answers these with a bare generic failure.
    pub fn is_silent(&self) -> bool {
        matches!(
            self.kind,
            GatewayErrorKind::Validation { .. } | GatewayErrorKind::Authentication { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, GatewayErrorKind::OrderNotFound { .. })
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match &self.kind {
            GatewayErrorKind::Validation { message } => {
                format!("Invalid payload: {}", message)
            }
            GatewayErrorKind::Authentication { message } => {
                format!("Authentication failed: {}", message)
            }
            GatewayErrorKind::UnsupportedCurrency { currency } => {
                format!("Currency '{}' is not supported by the IPG", currency)
            }
            GatewayErrorKind::AmountTooLarge { amount } => {
                format!(
                    "Amount '{}' exceeds the 12-digit purchase amount field",
                    amount
                )
            }
            GatewayErrorKind::OrderNotFound { order_id } => {
                format!("Order {} not found", order_id)
            }
            GatewayErrorKind::Unavailable { reason } => {
                format!("Payment gateway unavailable: {}", reason)
            }
            GatewayErrorKind::Storage { message } => {
                format!("Order store failure: {}", message)
            }
        };

        if let Some(context) = &self.context {
            write!(f, "{} ({})", message, context)
        } else {
            write!(f, "{}", message)
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<DatabaseError> for GatewayError {
    fn from(error: DatabaseError) -> Self {
        Self::new(GatewayErrorKind::Storage {
            message: error.to_string(),
        })
    }
}
