//! HTTP surface: health, checkout receipt page and the bank callback
//! endpoint.

pub mod callback;
pub mod checkout;
pub mod health;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::gateway::IpgGateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: Arc<IpgGateway>,
    pub pool: PgPool,
}
