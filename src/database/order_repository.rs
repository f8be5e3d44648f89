use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::error::{DatabaseError, DatabaseErrorKind};
use crate::error::GatewayResult;
use crate::gateway::orders::{Order, OrderStatus, OrderStore};

/// Order row as stored by the shop
#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub total: Decimal,
    pub currency: String,
    pub status: String,
    pub return_url: String,
    pub retry_url: String,
    pub cancel_url: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, DatabaseError> {
        let status = OrderStatus::from_str(&self.status).ok_or_else(|| {
            DatabaseError::new(DatabaseErrorKind::Unknown {
                message: format!("Order {} has unknown status '{}'", self.id, self.status),
            })
        })?;

        Ok(Order {
            id: self.id as u64,
            total: self.total,
            currency: self.currency,
            status,
            return_url: self.return_url,
            retry_url: self.retry_url,
            cancel_url: self.cancel_url,
        })
    }
}

/// Repository backing the gateway's order boundary
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_order(&self, order_id: u64) -> Result<Option<OrderRow>, DatabaseError> {
        sqlx::query_as::<_, OrderRow>(
            "SELECT id, total, currency, status, return_url, retry_url, cancel_url, \
             created_at, updated_at \
             FROM orders WHERE id = $1",
        )
        .bind(order_id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn find_order(&self, order_id: u64) -> GatewayResult<Option<Order>> {
        let row = self.fetch_order(order_id).await?;
        row.map(OrderRow::into_order)
            .transpose()
            .map_err(Into::into)
    }

    /// Compare-and-set paid transition. The WHERE clause is the
    /// idempotency guarantee under duplicate callback delivery.
    async fn mark_paid_if_pending(&self, order_id: u64) -> GatewayResult<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = 'paid', updated_at = NOW() \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(order_id as i64)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    /// The WHERE clause keeps Paid terminal even when a decline or
    /// error callback races a successful approval.
    async fn set_status_unless_paid(
        &self,
        order_id: u64,
        status: OrderStatus,
    ) -> GatewayResult<()> {
        sqlx::query(
            "UPDATE orders SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> 'paid'",
        )
        .bind(order_id as i64)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }

    async fn add_note(&self, order_id: u64, note: &str) -> GatewayResult<()> {
        let note_id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO order_notes (id, order_id, note, created_at) \
             VALUES ($1, $2, $3, NOW())",
        )
        .bind(note_id)
        .bind(order_id as i64)
        .bind(note)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }
}
