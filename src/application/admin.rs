use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::catalog::{
    MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain, Station, Train,
};
use crate::domain::context::RequestContext;
use crate::domain::errors::DomainError;
use crate::domain::order::{validate_amount, FulfillmentStatus, Order, PaymentStatus};
use crate::domain::ports::{CatalogRepository, OrderRepository};

const POPULAR_ITEMS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_orders: i64,
    pub by_status: Vec<(FulfillmentStatus, i64)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopularItem {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total_orders: usize,
    pub revenue: BigDecimal,
    pub trains_used: usize,
    pub stations_covered: usize,
    pub popular_items: Vec<PopularItem>,
}

/// Staff operations over orders and reference data. Every call requires an
/// admin context.
pub struct AdminConsole {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl AdminConsole {
    pub fn new(orders: Arc<dyn OrderRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self { orders, catalog }
    }

    /// Every order, or only those in `status`, newest first.
    pub fn list_orders(
        &self,
        ctx: &RequestContext,
        status: Option<FulfillmentStatus>,
    ) -> Result<Vec<Order>, DomainError> {
        ctx.require_admin()?;
        match status {
            Some(status) => self.orders.list_by_fulfillment_status(status),
            None => self.orders.list_all(),
        }
    }

    /// Fulfillment has no enforced ordering; any status may be set.
    pub fn set_fulfillment_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<Order, DomainError> {
        ctx.require_admin()?;
        let order = self
            .orders
            .update_fulfillment_status(id, status)?
            .ok_or(DomainError::NotFound("Order"))?;
        log::info!("admin {} set order {} status to {}", ctx.user_id, id, status);
        Ok(order)
    }

    /// Manual override of the payment status, e.g. cash collected on delivery.
    /// Bypasses the forward-only rule of the checkout workflow.
    pub fn set_payment_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Order, DomainError> {
        ctx.require_admin()?;
        let order = self
            .orders
            .update_payment_status(id, status)?
            .ok_or(DomainError::NotFound("Order"))?;
        log::info!("admin {} set order {} payment to {}", ctx.user_id, id, status);
        Ok(order)
    }

    pub fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardStats, DomainError> {
        ctx.require_admin()?;
        let counts = self.orders.count_by_fulfillment_status()?;
        let by_status: Vec<(FulfillmentStatus, i64)> = FulfillmentStatus::ALL
            .iter()
            .map(|s| {
                let count = counts
                    .iter()
                    .find(|(status, _)| status == s)
                    .map_or(0, |(_, n)| *n);
                (*s, count)
            })
            .collect();
        Ok(DashboardStats {
            total_orders: by_status.iter().map(|(_, n)| n).sum(),
            by_status,
        })
    }

    /// Orders created between `from` and `to`, both days inclusive (UTC).
    pub fn sales_report(
        &self,
        ctx: &RequestContext,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<SalesReport, DomainError> {
        ctx.require_admin()?;
        if from > to {
            return Err(DomainError::invalid("report start is after its end"));
        }
        let day_after = to
            .succ_opt()
            .ok_or_else(|| DomainError::invalid("report end is out of range"))?;
        let orders = self
            .orders
            .list_created_between(start_of(from), start_of(day_after))?;
        Ok(summarize(from, to, &orders))
    }

    /// Every train, including those not currently running.
    pub fn list_trains(&self, ctx: &RequestContext) -> Result<Vec<Train>, DomainError> {
        ctx.require_admin()?;
        self.catalog.list_all_trains()
    }

    /// Every menu item, including unavailable ones.
    pub fn list_menu_items(&self, ctx: &RequestContext) -> Result<Vec<MenuItem>, DomainError> {
        ctx.require_admin()?;
        self.catalog.list_all_menu_items()
    }

    pub fn create_train(&self, ctx: &RequestContext, train: NewTrain) -> Result<Train, DomainError> {
        ctx.require_admin()?;
        require_text("train name", &train.name)?;
        self.catalog.create_train(train)
    }

    pub fn create_station(
        &self,
        ctx: &RequestContext,
        station: NewStation,
    ) -> Result<Station, DomainError> {
        ctx.require_admin()?;
        require_text("station name", &station.name)?;
        if station.distance_from_colombo < 0 {
            return Err(DomainError::invalid("distance cannot be negative"));
        }
        self.catalog.create_station(station)
    }

    pub fn create_menu_item(
        &self,
        ctx: &RequestContext,
        item: NewMenuItem,
    ) -> Result<MenuItem, DomainError> {
        ctx.require_admin()?;
        require_text("item name", &item.name)?;
        require_text("category", &item.category)?;
        require_price(&item.price)?;
        self.catalog.create_menu_item(item)
    }

    /// Edits a menu item. Orders already placed keep their price snapshot.
    pub fn update_menu_item(
        &self,
        ctx: &RequestContext,
        id: i32,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, DomainError> {
        ctx.require_admin()?;
        if update.is_empty() {
            return Err(DomainError::invalid("nothing to update"));
        }
        if let Some(name) = &update.name {
            require_text("item name", name)?;
        }
        if let Some(price) = &update.price {
            require_price(price)?;
        }
        self.catalog
            .update_menu_item(id, update)?
            .ok_or(DomainError::NotFound("Menu item"))
    }
}

fn start_of(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::invalid(format!("{field} is required")));
    }
    Ok(())
}

fn require_price(price: &BigDecimal) -> Result<(), DomainError> {
    validate_amount("price", price)
}

fn summarize(from: NaiveDate, to: NaiveDate, orders: &[Order]) -> SalesReport {
    let revenue = orders
        .iter()
        .fold(BigDecimal::from(0), |acc, o| acc + &o.total_amount);
    let trains: HashSet<i32> = orders.iter().map(|o| o.train_id).collect();
    let stations: HashSet<i32> = orders.iter().map(|o| o.station_id).collect();

    let mut quantities: BTreeMap<i32, PopularItem> = BTreeMap::new();
    for item in orders.iter().flat_map(|o| &o.items) {
        quantities
            .entry(item.menu_item_id)
            .or_insert_with(|| PopularItem {
                menu_item_id: item.menu_item_id,
                name: item.name.clone(),
                quantity: 0,
            })
            .quantity += i64::from(item.quantity);
    }
    let mut popular_items: Vec<PopularItem> = quantities.into_values().collect();
    popular_items.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    popular_items.truncate(POPULAR_ITEMS_LIMIT);

    SalesReport {
        from,
        to,
        total_orders: orders.len(),
        revenue,
        trains_used: trains.len(),
        stations_covered: stations.len(),
        popular_items,
    }
}
