use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Train {
    pub id: i32,
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewTrain {
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    pub is_active: bool,
}

/// A pickup stop along the line; `sort_order` is its position on the route.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone)]
pub struct NewStation {
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// Partial edit of a menu item; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

impl MenuItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image_url.is_none()
            && self.is_available.is_none()
    }

    pub fn apply_to(self, item: &mut MenuItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(image_url) = self.image_url {
            item.image_url = Some(image_url);
        }
        if let Some(is_available) = self.is_available {
            item.is_available = is_available;
        }
    }
}
