use std::collections::BTreeMap;

use bigdecimal::BigDecimal;

use super::catalog::MenuItem;
use super::order::{delivery_fee, OrderLineRequest, MAX_LINE_QUANTITY};

/// Per-line cap, in the cart's unsigned representation.
const MAX_ENTRY_QUANTITY: u32 = MAX_LINE_QUANTITY as u32;

#[derive(Debug, Clone)]
pub struct CartEntry {
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartEntry {
    pub fn subtotal(&self) -> BigDecimal {
        &self.item.price * BigDecimal::from(self.quantity)
    }
}

/// Client-held basket keyed by menu item id. Never persisted server side;
/// checkout turns it into order line requests.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: BTreeMap<i32, CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `item`, merging with an existing entry. A line never
    /// exceeds the per-line maximum.
    pub fn add_item(&mut self, item: &MenuItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let quantity = quantity.min(MAX_ENTRY_QUANTITY);
        self.entries
            .entry(item.id)
            .and_modify(|e| {
                e.quantity = e.quantity.saturating_add(quantity).min(MAX_ENTRY_QUANTITY)
            })
            .or_insert_with(|| CartEntry {
                item: item.clone(),
                quantity,
            });
    }

    /// Sets the quantity of an existing entry. Zero removes it.
    pub fn update_quantity(&mut self, menu_item_id: i32, quantity: u32) {
        if quantity == 0 {
            self.entries.remove(&menu_item_id);
        } else if let Some(entry) = self.entries.get_mut(&menu_item_id) {
            entry.quantity = quantity.min(MAX_ENTRY_QUANTITY);
        }
    }

    pub fn remove_item(&mut self, menu_item_id: i32) -> Option<CartEntry> {
        self.entries.remove(&menu_item_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CartEntry> {
        self.entries.values()
    }

    pub fn item_count(&self) -> u32 {
        self.entries.values().map(|e| e.quantity).sum()
    }

    pub fn subtotal(&self) -> BigDecimal {
        self.entries
            .values()
            .fold(BigDecimal::from(0), |acc, e| acc + e.subtotal())
    }

    pub fn total(&self) -> BigDecimal {
        self.subtotal() + delivery_fee()
    }

    /// Line requests carrying the prices the shopper saw.
    pub fn to_order_lines(&self) -> Vec<OrderLineRequest> {
        self.entries
            .values()
            .map(|e| OrderLineRequest {
                menu_item_id: e.item.id,
                quantity: i32::try_from(e.quantity).unwrap_or(MAX_LINE_QUANTITY),
                unit_price: Some(e.item.price.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn menu_item(id: i32, price: i64) -> MenuItem {
        MenuItem {
            id,
            name: format!("dish-{id}"),
            description: String::new(),
            price: BigDecimal::from(price),
            category: "rice".into(),
            image_url: None,
            is_available: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adding_same_item_merges_quantities() {
        let mut cart = Cart::new();
        let kottu = menu_item(1, 500);
        cart.add_item(&kottu, 1);
        cart.add_item(&kottu, 1);
        cart.add_item(&menu_item(2, 200), 1);

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), BigDecimal::from(1200));
        assert_eq!(cart.total(), BigDecimal::from(1300));
    }

    #[test]
    fn zero_quantity_removes_entry() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item(1, 500), 2);
        cart.update_quantity(1, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_ignores_unknown_items() {
        let mut cart = Cart::new();
        cart.update_quantity(9, 4);
        assert!(cart.is_empty());
    }

    #[test]
    fn order_lines_carry_seen_prices() {
        let mut cart = Cart::new();
        cart.add_item(&menu_item(2, 200), 1);
        cart.add_item(&menu_item(1, 500), 2);

        let lines = cart.to_order_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].menu_item_id, 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].unit_price, Some(BigDecimal::from(500)));

        cart.clear();
        assert_eq!(cart.subtotal(), BigDecimal::from(0));
    }

    #[test]
    fn huge_quantities_are_capped_per_line() {
        let mut cart = Cart::new();
        let tea = menu_item(1, 200);
        cart.add_item(&tea, u32::MAX);
        cart.add_item(&tea, u32::MAX);
        cart.update_quantity(1, u32::MAX);

        let lines = cart.to_order_lines();
        assert_eq!(lines[0].quantity, MAX_LINE_QUANTITY);
        assert_eq!(cart.item_count(), MAX_ENTRY_QUANTITY);
    }
}
