use async_trait::async_trait;
use common::{OrderId, UserId, VendorId, Version};
use domain::{NewOrder, Order, PickupToken};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    ListOptions, Result, SortBy, StoreError,
    repository::OrderRepository,
};

/// PostgreSQL-backed order repository.
///
/// Orders are stored as a JSONB body plus scalar columns for filtering
/// and sorting; the version column backs the optimistic update check.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let body: serde_json::Value = row.try_get("body")?;
        Ok(serde_json::from_value(body)?)
    }

    fn order_clause(sort_by: SortBy) -> &'static str {
        match sort_by {
            SortBy::Newest => "ORDER BY order_number DESC",
            SortBy::Oldest => "ORDER BY order_number ASC",
            SortBy::PriceHigh => "ORDER BY total_cents DESC, order_number DESC",
            SortBy::PriceLow => "ORDER BY total_cents ASC, order_number ASC",
        }
    }

    async fn list_for_owner(
        &self,
        owner_column: &str,
        owner: Uuid,
        options: ListOptions,
    ) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT body FROM orders WHERE {owner_column} = $1");
        if options.state.is_some() {
            sql.push_str(" AND state = $2");
        }
        sql.push(' ');
        sql.push_str(Self::order_clause(options.sort_by));

        let mut query = sqlx::query(&sql).bind(owner);
        if let Some(state) = options.state {
            query = query.bind(state.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, new: NewOrder) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let order_number: i64 = sqlx::query_scalar("SELECT nextval('order_numbers')")
            .fetch_one(&mut *tx)
            .await?;

        let order = Order::create(OrderId::new(), order_number, new);
        let body = serde_json::to_value(&order)?;

        sqlx::query(
            r#"
            INSERT INTO orders
                (id, order_number, user_id, vendor_id, state, qr_token,
                 total_cents, version, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id().as_uuid())
        .bind(order.order_number())
        .bind(order.user_id().as_uuid())
        .bind(order.vendor_id().as_uuid())
        .bind(order.state().as_str())
        .bind(order.qr_token().map(|t| t.as_str().to_string()))
        .bind(order.total().cents())
        .bind(order.version().as_i64())
        .bind(&body)
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn find(&self, id: OrderId) -> Result<Order> {
        let row = sqlx::query("SELECT body FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn find_by_token(&self, token: &PickupToken) -> Result<Order> {
        let row = sqlx::query("SELECT body FROM orders WHERE qr_token = $1")
            .bind(token.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(StoreError::TokenNotFound),
        }
    }

    async fn list_for_user(&self, user_id: UserId, options: ListOptions) -> Result<Vec<Order>> {
        self.list_for_owner("user_id", user_id.as_uuid(), options)
            .await
    }

    async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
        options: ListOptions,
    ) -> Result<Vec<Order>> {
        self.list_for_owner("vendor_id", vendor_id.as_uuid(), options)
            .await
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        let expected = order.version();
        order.set_version(expected.next());
        let body = serde_json::to_value(&order)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET state = $1, qr_token = $2, version = $3, body = $4, updated_at = $5
            WHERE id = $6 AND version = $7
            "#,
        )
        .bind(order.state().as_str())
        .bind(order.qr_token().map(|t| t.as_str().to_string()))
        .bind(order.version().as_i64())
        .bind(&body)
        .bind(order.updated_at())
        .bind(order.id().as_uuid())
        .bind(expected.as_i64())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM orders WHERE id = $1")
                    .bind(order.id().as_uuid())
                    .fetch_optional(&self.pool)
                    .await?;

            return match actual {
                Some(actual) => {
                    tracing::debug!(
                        order_id = %order.id(),
                        expected = %expected,
                        actual,
                        "optimistic update lost the version check"
                    );
                    Err(StoreError::ConcurrentModification {
                        order_id: order.id(),
                        expected,
                        actual: Version::new(actual),
                    })
                }
                None => Err(StoreError::NotFound(order.id())),
            };
        }

        Ok(order)
    }
}
