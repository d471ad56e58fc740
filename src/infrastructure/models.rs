use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::catalog::{
    MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain, Station, Train,
};
use crate::domain::errors::DomainError;
use crate::domain::order::{FulfillmentStatus, LineItem, NewOrder, Order, PaymentStatus};
use crate::schema::{menu_items, orders, stations, trains};

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: i32,
    pub train_id: i32,
    pub station_id: i32,
    pub total_amount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub items: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: i32,
    pub train_id: i32,
    pub station_id: i32,
    pub total_amount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub items: Value,
}

/// Shape of one element of the `orders.items` JSONB column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLineItem {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl From<&LineItem> for StoredLineItem {
    fn from(item: &LineItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.unit_price.clone(),
        }
    }
}

impl From<StoredLineItem> for LineItem {
    fn from(item: StoredLineItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id,
            name: item.name,
            quantity: item.quantity,
            unit_price: item.price,
        }
    }
}

impl NewOrderRow {
    pub fn from_domain(order: NewOrder) -> Result<Self, DomainError> {
        let stored: Vec<StoredLineItem> = order.items.iter().map(StoredLineItem::from).collect();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            train_id: order.train_id,
            station_id: order.station_id,
            total_amount: order.total_amount,
            delivery_fee: order.delivery_fee,
            payment_method: order.payment_method.as_str().to_string(),
            payment_status: PaymentStatus::Pending.as_str().to_string(),
            order_status: FulfillmentStatus::Placed.as_str().to_string(),
            customer_phone: order.customer_phone,
            seat_info: order.seat_info,
            items: serde_json::to_value(stored)?,
        })
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let stored: Vec<StoredLineItem> = serde_json::from_value(row.items)?;
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            train_id: row.train_id,
            station_id: row.station_id,
            items: stored.into_iter().map(LineItem::from).collect(),
            total_amount: row.total_amount,
            delivery_fee: row.delivery_fee,
            payment_method: parse_column(&row.payment_method)?,
            payment_status: parse_column(&row.payment_status)?,
            fulfillment_status: parse_column(&row.order_status)?,
            customer_phone: row.customer_phone,
            seat_info: row.seat_info,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn parse_column<T: FromStr<Err = DomainError>>(value: &str) -> Result<T, DomainError> {
    value
        .parse()
        .map_err(|e: DomainError| DomainError::Persistence(format!("corrupt order row: {e}")))
}

// ── Reference data ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = trains)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrainRow {
    pub id: i32,
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = trains)]
pub struct NewTrainRow {
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    pub is_active: bool,
}

impl From<TrainRow> for Train {
    fn from(row: TrainRow) -> Self {
        Train {
            id: row.id,
            name: row.name,
            train_type: row.train_type,
            departure_time: row.departure_time,
            arrival_time: row.arrival_time,
            frequency: row.frequency,
            is_active: row.is_active,
        }
    }
}

impl From<NewTrain> for NewTrainRow {
    fn from(t: NewTrain) -> Self {
        NewTrainRow {
            name: t.name,
            train_type: t.train_type,
            departure_time: t.departure_time,
            arrival_time: t.arrival_time,
            frequency: t.frequency,
            is_active: t.is_active,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StationRow {
    pub id: i32,
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stations)]
pub struct NewStationRow {
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

impl From<StationRow> for Station {
    fn from(row: StationRow) -> Self {
        Station {
            id: row.id,
            name: row.name,
            sinhala_name: row.sinhala_name,
            distance_from_colombo: row.distance_from_colombo,
            sort_order: row.sort_order,
        }
    }
}

impl From<NewStation> for NewStationRow {
    fn from(s: NewStation) -> Self {
        NewStationRow {
            name: s.name,
            sinhala_name: s.sinhala_name,
            distance_from_colombo: s.distance_from_colombo,
            sort_order: s.sort_order,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = menu_items)]
pub struct NewMenuItemRow {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// `None` fields are left out of the UPDATE.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = menu_items)]
pub struct MenuItemChangeset {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            category: row.category,
            image_url: row.image_url,
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

impl From<NewMenuItem> for NewMenuItemRow {
    fn from(m: NewMenuItem) -> Self {
        NewMenuItemRow {
            name: m.name,
            description: m.description,
            price: m.price,
            category: m.category,
            image_url: m.image_url,
            is_available: m.is_available,
        }
    }
}

impl From<MenuItemUpdate> for MenuItemChangeset {
    fn from(u: MenuItemUpdate) -> Self {
        MenuItemChangeset {
            name: u.name,
            description: u.description,
            price: u.price,
            category: u.category,
            image_url: u.image_url,
            is_available: u.is_available,
        }
    }
}
