//! In-process adapters for the domain ports. Used by the test suites and for
//! running the HTTP surface without a database or a card processor.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::domain::catalog::{
    MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain, Station, Train,
};
use crate::domain::errors::DomainError;
use crate::domain::order::{FulfillmentStatus, NewOrder, Order, PaymentStatus};
use crate::domain::ports::{
    CatalogRepository, OrderRepository, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, DomainError> {
    mutex
        .lock()
        .map_err(|_| DomainError::Persistence("in-memory store poisoned".to_string()))
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: Uuid, apply: F) -> Result<Option<Order>, DomainError>
    where
        F: FnOnce(&mut Order),
    {
        let mut orders = lock(&self.orders)?;
        Ok(orders.iter_mut().find(|o| o.id == id).map(|order| {
            apply(order);
            order.updated_at = Utc::now();
            order.clone()
        }))
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            train_id: order.train_id,
            station_id: order.station_id,
            items: order.items,
            total_amount: order.total_amount,
            delivery_fee: order.delivery_fee,
            payment_method: order.payment_method,
            payment_status: PaymentStatus::Pending,
            fulfillment_status: FulfillmentStatus::Placed,
            customer_phone: order.customer_phone,
            seat_info: order.seat_info,
            created_at: now,
            updated_at: now,
        };
        lock(&self.orders)?.push(order.clone());
        Ok(order)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(lock(&self.orders)?.iter().find(|o| o.id == id).cloned())
    }

    fn list_by_user(&self, user_id: i32) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)?
            .iter()
            .rev()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn list_all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)?.iter().rev().cloned().collect())
    }

    fn list_by_fulfillment_status(
        &self,
        status: FulfillmentStatus,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)?
            .iter()
            .rev()
            .filter(|o| o.fulfillment_status == status)
            .cloned()
            .collect())
    }

    fn list_created_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Order>, DomainError> {
        Ok(lock(&self.orders)?
            .iter()
            .rev()
            .filter(|o| o.created_at >= from && o.created_at < until)
            .cloned()
            .collect())
    }

    fn count_by_fulfillment_status(&self) -> Result<Vec<(FulfillmentStatus, i64)>, DomainError> {
        let orders = lock(&self.orders)?;
        Ok(FulfillmentStatus::ALL
            .iter()
            .map(|s| {
                let count = orders.iter().filter(|o| o.fulfillment_status == *s).count();
                (*s, count as i64)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }

    fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> Result<Option<Order>, DomainError> {
        self.update(id, |o| o.payment_status = status)
    }

    fn update_fulfillment_status(
        &self,
        id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<Option<Order>, DomainError> {
        self.update(id, |o| o.fulfillment_status = status)
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct CatalogState {
    trains: Vec<Train>,
    stations: Vec<Station>,
    menu_items: Vec<MenuItem>,
    last_id: i32,
}

impl CatalogState {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogRepository for InMemoryCatalogRepository {
    fn list_active_trains(&self) -> Result<Vec<Train>, DomainError> {
        Ok(lock(&self.state)?
            .trains
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    fn list_all_trains(&self) -> Result<Vec<Train>, DomainError> {
        Ok(lock(&self.state)?.trains.clone())
    }

    fn find_train(&self, id: i32) -> Result<Option<Train>, DomainError> {
        Ok(lock(&self.state)?.trains.iter().find(|t| t.id == id).cloned())
    }

    fn create_train(&self, train: NewTrain) -> Result<Train, DomainError> {
        let mut state = lock(&self.state)?;
        let train = Train {
            id: state.next_id(),
            name: train.name,
            train_type: train.train_type,
            departure_time: train.departure_time,
            arrival_time: train.arrival_time,
            frequency: train.frequency,
            is_active: train.is_active,
        };
        state.trains.push(train.clone());
        Ok(train)
    }

    fn list_stations(&self) -> Result<Vec<Station>, DomainError> {
        let mut stations = lock(&self.state)?.stations.clone();
        stations.sort_by_key(|s| s.sort_order);
        Ok(stations)
    }

    fn find_station(&self, id: i32) -> Result<Option<Station>, DomainError> {
        Ok(lock(&self.state)?
            .stations
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    fn create_station(&self, station: NewStation) -> Result<Station, DomainError> {
        let mut state = lock(&self.state)?;
        let station = Station {
            id: state.next_id(),
            name: station.name,
            sinhala_name: station.sinhala_name,
            distance_from_colombo: station.distance_from_colombo,
            sort_order: station.sort_order,
        };
        state.stations.push(station.clone());
        Ok(station)
    }

    fn list_menu_items(&self, category: Option<&str>) -> Result<Vec<MenuItem>, DomainError> {
        Ok(lock(&self.state)?
            .menu_items
            .iter()
            .filter(|m| m.is_available)
            .filter(|m| category.map_or(true, |c| m.category == c))
            .cloned()
            .collect())
    }

    fn list_all_menu_items(&self) -> Result<Vec<MenuItem>, DomainError> {
        Ok(lock(&self.state)?.menu_items.clone())
    }

    fn find_menu_item(&self, id: i32) -> Result<Option<MenuItem>, DomainError> {
        Ok(lock(&self.state)?
            .menu_items
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, DomainError> {
        let mut state = lock(&self.state)?;
        let item = MenuItem {
            id: state.next_id(),
            name: item.name,
            description: item.description,
            price: item.price,
            category: item.category,
            image_url: item.image_url,
            is_available: item.is_available,
            created_at: Utc::now(),
        };
        state.menu_items.push(item.clone());
        Ok(item)
    }

    fn update_menu_item(
        &self,
        id: i32,
        update: MenuItemUpdate,
    ) -> Result<Option<MenuItem>, DomainError> {
        let mut state = lock(&self.state)?;
        Ok(state.menu_items.iter_mut().find(|m| m.id == id).map(|item| {
            update.apply_to(item);
            item.clone()
        }))
    }
}

// ── Payments ─────────────────────────────────────────────────────────────────

/// Gateway double that records every intent request and either answers with a
/// deterministic client secret or fails with a fixed message.
#[derive(Default)]
pub struct RecordingGateway {
    requests: Mutex<Vec<PaymentIntentRequest>>,
    failure: Option<String>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            requests: Mutex::default(),
            failure: Some(message.into()),
        }
    }

    pub fn requests(&self) -> Vec<PaymentIntentRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl PaymentGateway for RecordingGateway {
    fn create_intent(
        &self,
        request: PaymentIntentRequest,
    ) -> BoxFuture<'_, Result<PaymentIntent, DomainError>> {
        Box::pin(async move {
            let order_id = request.order_id;
            lock(&self.requests)?.push(request);
            match &self.failure {
                Some(message) => Err(DomainError::PaymentGateway(message.clone())),
                None => Ok(PaymentIntent {
                    client_secret: format!("pi_{}_secret_test", order_id.simple()),
                }),
            }
        })
    }
}
