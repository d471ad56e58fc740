use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use uuid::Uuid;

use super::catalog::{MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain, Station, Train};
use super::errors::DomainError;
use super::order::{FulfillmentStatus, NewOrder, Order, PaymentStatus};

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists a new order as `placed` / `pending`.
    fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Orders of one user, newest first.
    fn list_by_user(&self, user_id: i32) -> Result<Vec<Order>, DomainError>;
    /// Every order, newest first.
    fn list_all(&self) -> Result<Vec<Order>, DomainError>;
    /// Orders in one fulfillment status, newest first.
    fn list_by_fulfillment_status(
        &self,
        status: FulfillmentStatus,
    ) -> Result<Vec<Order>, DomainError>;
    /// Orders created in `[from, until)`, newest first.
    fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError>;
    /// Number of orders per fulfillment status. Statuses without orders may be
    /// absent.
    fn count_by_fulfillment_status(&self) -> Result<Vec<(FulfillmentStatus, i64)>, DomainError>;
    fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, DomainError>;
    fn update_fulfillment_status(
        &self,
        id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn list_active_trains(&self) -> Result<Vec<Train>, DomainError>;
    /// Every train, running or not.
    fn list_all_trains(&self) -> Result<Vec<Train>, DomainError>;
    fn find_train(&self, id: i32) -> Result<Option<Train>, DomainError>;
    fn create_train(&self, train: NewTrain) -> Result<Train, DomainError>;

    /// Stations in route order.
    fn list_stations(&self) -> Result<Vec<Station>, DomainError>;
    fn find_station(&self, id: i32) -> Result<Option<Station>, DomainError>;
    fn create_station(&self, station: NewStation) -> Result<Station, DomainError>;

    /// Available menu items, optionally restricted to one category.
    fn list_menu_items(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError>;
    /// Every menu item including unavailable ones.
    fn list_all_menu_items(&self) -> Result<Vec<MenuItem>, DomainError>;
    fn find_menu_item(&self, id: i32) -> Result<Option<MenuItem>, DomainError>;
    fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, DomainError>;
    fn update_menu_item(
        &self,
        id: i32,
        update: MenuItemUpdate,
    ) -> Result<Option<MenuItem>, DomainError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub order_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntent {
    pub client_secret: String,
}

/// External card processor. Every call may fail; confirmation itself happens
/// on the client with the processor's own library.
pub trait PaymentGateway: Send + Sync + 'static {
    fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> BoxFuture<'_, Result<PaymentIntent, DomainError>>;
}
