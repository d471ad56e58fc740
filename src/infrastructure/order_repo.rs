use chrono::{DateTime, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{FulfillmentStatus, NewOrder, Order, PaymentStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{parse_column, NewOrderRow, OrderRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        log::error!("database error: {e}");
        DomainError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        log::error!("connection pool error: {e}");
        DomainError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Persistence(format!("line item encoding: {e}"))
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn into_orders(rows: Vec<OrderRow>) -> Result<Vec<Order>, DomainError> {
    rows.into_iter().map(Order::try_from).collect()
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;
        let row = NewOrderRow::from_domain(order)?;

        let inserted = diesel::insert_into(orders::table)
            .values(&row)
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)?;
        Order::try_from(inserted)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn list_by_user(&self, user_id: i32) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::user_id.eq(user_id))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        into_orders(rows)
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        into_orders(rows)
    }

    fn list_by_fulfillment_status(
        &self,
        status: FulfillmentStatus,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::order_status.eq(status.as_str()))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        into_orders(rows)
    }

    fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = orders::table
            .filter(orders::created_at.ge(from))
            .filter(orders::created_at.lt(until))
            .select(OrderRow::as_select())
            .order(orders::created_at.desc())
            .load(&mut conn)?;
        into_orders(rows)
    }

    fn count_by_fulfillment_status(&self) -> Result<Vec<(FulfillmentStatus, i64)>, DomainError> {
        let mut conn = self.pool.get()?;

        let counts: Vec<(String, i64)> = orders::table
            .group_by(orders::order_status)
            .select((orders::order_status, count_star()))
            .load(&mut conn)?;
        counts
            .into_iter()
            .map(|(status, count)| Ok((parse_column(&status)?, count)))
            .collect()
    }

    fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(orders::table.find(id))
            .set((
                orders::payment_status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn update_fulfillment_status(
        &self,
        id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(orders::table.find(id))
            .set((
                orders::order_status.eq(status.as_str()),
                orders::updated_at.eq(Utc::now()),
            ))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }
}
