use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;

/// Flat delivery charge added to every order, in whole currency units.
pub const DELIVERY_FEE_UNITS: i64 = 100;

/// Gateway amounts are expressed in hundredths of the currency unit.
pub const MINOR_UNITS_PER_UNIT: i64 = 100;

/// Upper bound on the quantity of a single order line.
pub const MAX_LINE_QUANTITY: i32 = 99;

/// Largest amount a `NUMERIC(10,2)` money column holds.
pub const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

pub fn delivery_fee() -> BigDecimal {
    BigDecimal::from(DELIVERY_FEE_UNITS)
}

pub fn max_amount() -> BigDecimal {
    BigDecimal::new(MAX_AMOUNT_MINOR.into(), 2)
}

/// Declares a status-like enum stored and transported as a lowercase string.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(DomainError::invalid(format!(
                        "unknown {} '{}'",
                        $label, other
                    ))),
                }
            }
        }
    };
}

string_enum!(PaymentMethod, "payment method" {
    Card => "card",
    Cash => "cash",
});

string_enum!(
    /// Monetary state of an order. Only moves forward through the workflow:
    /// `pending` to `paid` or `failed`. Admins may still force any value.
    PaymentStatus, "payment status" {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
    }
);

string_enum!(
    /// Kitchen/delivery progress, settable in any order by the admin console.
    FulfillmentStatus, "order status" {
        Placed => "placed",
        Preparing => "preparing",
        Ready => "ready",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
);

impl PaymentStatus {
    /// Whether the checkout workflow may move from `self` to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

/// A priced snapshot of one menu item, frozen at order time.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl LineItem {
    pub fn subtotal(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// One requested cart line. `unit_price` is what the client believes the item
/// costs; when present it must agree with the menu.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLineRequest {
    pub menu_item_id: i32,
    pub quantity: i32,
    pub unit_price: Option<BigDecimal>,
}

/// Checkout submission, before any reference has been resolved.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub train_id: i32,
    pub station_id: i32,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub payment_method: PaymentMethod,
    pub items: Vec<OrderLineRequest>,
    pub expected_total: Option<BigDecimal>,
    pub expected_delivery_fee: Option<BigDecimal>,
}

/// A fully validated order ready to be persisted. The repository assigns the
/// id, the initial statuses and the timestamps.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i32,
    pub train_id: i32,
    pub station_id: i32,
    pub items: Vec<LineItem>,
    pub total_amount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub payment_method: PaymentMethod,
    pub customer_phone: String,
    pub seat_info: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: i32,
    pub train_id: i32,
    pub station_id: i32,
    pub items: Vec<LineItem>,
    pub total_amount: BigDecimal,
    pub delivery_fee: BigDecimal,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sum of every line subtotal plus the delivery fee.
pub fn order_total(items: &[LineItem], delivery_fee: &BigDecimal) -> BigDecimal {
    items
        .iter()
        .fold(delivery_fee.clone(), |acc, item| acc + item.subtotal())
}

/// Money is non-negative, has at most two decimal places and fits the
/// storage column.
pub fn validate_amount(field: &str, amount: &BigDecimal) -> Result<(), DomainError> {
    if *amount < BigDecimal::from(0) {
        return Err(DomainError::invalid(format!("{field} cannot be negative")));
    }
    if amount.with_scale(2) != *amount {
        return Err(DomainError::invalid(format!(
            "{field} has more than two decimal places"
        )));
    }
    if *amount > max_amount() {
        return Err(DomainError::invalid(format!(
            "{field} exceeds {}",
            max_amount()
        )));
    }
    Ok(())
}

/// Convert a currency amount to the gateway's integer minor units.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    (amount * BigDecimal::from(MINOR_UNITS_PER_UNIT))
        .round(0)
        .to_i64()
        .ok_or_else(|| DomainError::invalid(format!("amount {amount} is out of range")))
}

/// Accepts an optional leading `+` followed by 10 to 15 digits, which may be
/// grouped with spaces or dashes. Returns the trimmed input.
pub fn validate_phone(phone: &str) -> Result<String, DomainError> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let mut digits = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            ' ' | '-' => {}
            _ => return Err(DomainError::invalid(format!("invalid phone number '{trimmed}'"))),
        }
    }

    if !(10..=15).contains(&digits) || body.starts_with([' ', '-']) {
        return Err(DomainError::invalid(format!("invalid phone number '{trimmed}'")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn line(id: i32, price: &str, quantity: i32) -> LineItem {
        LineItem {
            menu_item_id: id,
            name: format!("item-{id}"),
            quantity,
            unit_price: BigDecimal::from_str(price).expect("valid decimal"),
        }
    }

    #[test]
    fn total_includes_every_line_and_delivery_fee() {
        let items = vec![line(1, "500.00", 2), line(2, "200.00", 1)];
        assert_eq!(order_total(&items, &delivery_fee()), BigDecimal::from(1300));
    }

    #[test]
    fn total_keeps_cents_exact() {
        let items = vec![line(1, "0.10", 3), line(2, "19.99", 7)];
        let expected = BigDecimal::from_str("240.23").unwrap();
        assert_eq!(order_total(&items, &delivery_fee()), expected);
    }

    #[test]
    fn minor_units_scale_by_hundred() {
        assert_eq!(to_minor_units(&BigDecimal::from(1300)).unwrap(), 130_000);
        let cents = BigDecimal::from_str("12.346").unwrap();
        assert_eq!(to_minor_units(&cents).unwrap(), 1235);
    }

    #[test]
    fn amounts_are_limited_to_cents_and_column_range() {
        let ok = |raw: &str| validate_amount("price", &BigDecimal::from_str(raw).unwrap());
        assert!(ok("0").is_ok());
        assert!(ok("450.5").is_ok());
        assert!(ok("450.500").is_ok());
        assert!(ok("99999999.99").is_ok());
        assert!(ok("0.005").is_err());
        assert!(ok("-1").is_err());
        assert!(ok("100000000").is_err());
    }

    #[test]
    fn phone_accepts_international_format() {
        assert_eq!(validate_phone(" +94771234567 ").unwrap(), "+94771234567");
        assert!(validate_phone("077-123 4567").is_ok());
    }

    #[test]
    fn phone_rejects_short_or_garbage() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("+94abc1234567").is_err());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("+-9477123456").is_err());
    }

    #[test]
    fn payment_status_only_moves_forward() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Paid.can_transition_to(Pending));
        assert!(!Failed.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Failed));
    }

    #[test]
    fn statuses_parse_their_wire_names() {
        for status in FulfillmentStatus::ALL {
            assert_eq!(FulfillmentStatus::from_str(status.as_str()).unwrap(), *status);
        }
        assert_eq!(PaymentMethod::from_str("card").unwrap(), PaymentMethod::Card);
        assert!(matches!(
            PaymentStatus::from_str("refunded"),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
