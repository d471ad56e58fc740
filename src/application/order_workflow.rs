use std::collections::BTreeMap;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::context::RequestContext;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    delivery_fee, max_amount, order_total, to_minor_units, validate_phone, LineItem, NewOrder,
    Order, PaymentMethod, PaymentStatus, PlaceOrder, MAX_LINE_QUANTITY,
};
use crate::domain::ports::{
    CatalogRepository, OrderRepository, PaymentGateway, PaymentIntent, PaymentIntentRequest,
};

pub const DEFAULT_CURRENCY: &str = "lkr";

/// Checkout orchestration: cart to persisted order, and for card orders the
/// payment sequencing that ends with the order marked paid.
pub struct OrderWorkflow {
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    currency: String,
}

impl OrderWorkflow {
    pub fn new(orders: Arc<dyn OrderRepository>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self {
            orders,
            catalog,
            gateway: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Validates the submission, snapshots menu prices and persists the order
    /// as `placed` / `pending`. Nothing is written unless every check passes.
    pub fn place_order(&self, ctx: &RequestContext, req: PlaceOrder) -> Result<Order, DomainError> {
        if req.items.is_empty() {
            return Err(DomainError::invalid("order must contain at least one item"));
        }
        let customer_phone = validate_phone(&req.customer_phone)?;

        match self.catalog.find_train(req.train_id)? {
            Some(train) if train.is_active => {}
            Some(_) => return Err(DomainError::invalid(format!("train {} is not running", req.train_id))),
            None => return Err(DomainError::invalid(format!("unknown train {}", req.train_id))),
        }
        if self.catalog.find_station(req.station_id)?.is_none() {
            return Err(DomainError::invalid(format!("unknown station {}", req.station_id)));
        }

        let items = self.snapshot_lines(&req)?;
        let fee = delivery_fee();
        if let Some(claimed) = &req.expected_delivery_fee {
            if *claimed != fee {
                return Err(DomainError::invalid(format!("delivery fee must be {fee}")));
            }
        }
        let total_amount = order_total(&items, &fee);
        if total_amount > max_amount() {
            return Err(DomainError::invalid(format!(
                "order total {total_amount} exceeds the maximum of {}",
                max_amount()
            )));
        }
        if let Some(claimed) = &req.expected_total {
            if *claimed != total_amount {
                return Err(DomainError::invalid(format!(
                    "total {claimed} does not match computed total {total_amount}"
                )));
            }
        }

        let seat_info = req
            .seat_info
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let order = self.orders.create(NewOrder {
            user_id: ctx.user_id,
            train_id: req.train_id,
            station_id: req.station_id,
            items,
            total_amount,
            delivery_fee: fee,
            payment_method: req.payment_method,
            customer_phone,
            seat_info,
        })?;

        log::info!(
            "order {} placed by user {} ({}, total {})",
            order.id,
            order.user_id,
            order.payment_method,
            order.total_amount
        );
        Ok(order)
    }

    /// Cash on delivery: payment stays `pending` until an admin records it.
    pub fn place_cash_order(
        &self,
        ctx: &RequestContext,
        mut req: PlaceOrder,
    ) -> Result<Order, DomainError> {
        req.payment_method = PaymentMethod::Cash;
        self.place_order(ctx, req)
    }

    fn snapshot_lines(&self, req: &PlaceOrder) -> Result<Vec<LineItem>, DomainError> {
        req.items
            .iter()
            .map(|line| {
                if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
                    return Err(DomainError::invalid(format!(
                        "quantity for item {} must be between 1 and {MAX_LINE_QUANTITY}",
                        line.menu_item_id
                    )));
                }
                let item = self
                    .catalog
                    .find_menu_item(line.menu_item_id)?
                    .filter(|m| m.is_available)
                    .ok_or_else(|| {
                        DomainError::invalid(format!(
                            "menu item {} is not available",
                            line.menu_item_id
                        ))
                    })?;
                if let Some(seen) = &line.unit_price {
                    if *seen != item.price {
                        return Err(DomainError::invalid(format!(
                            "price of '{}' changed to {}",
                            item.name, item.price
                        )));
                    }
                }
                Ok(LineItem {
                    menu_item_id: item.id,
                    name: item.name,
                    quantity: line.quantity,
                    unit_price: item.price,
                })
            })
            .collect()
    }

    /// Owner-only lookup.
    pub fn get_order(&self, ctx: &RequestContext, id: Uuid) -> Result<Order, DomainError> {
        let order = self
            .orders
            .find_by_id(id)?
            .ok_or(DomainError::NotFound("Order"))?;
        if order.user_id != ctx.user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(order)
    }

    pub fn list_orders(&self, ctx: &RequestContext) -> Result<Vec<Order>, DomainError> {
        self.orders.list_by_user(ctx.user_id)
    }

    /// First half of card payment initiation: checks the order can be paid by
    /// card and builds the gateway request. Touches only the repository.
    pub fn prepare_card_payment(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
        amount: Option<BigDecimal>,
    ) -> Result<PaymentIntentRequest, DomainError> {
        if self.gateway.is_none() {
            return Err(DomainError::PaymentNotConfigured);
        }
        let order = self.get_order(ctx, order_id)?;
        if order.payment_method != PaymentMethod::Card {
            return Err(DomainError::invalid("order is not a card payment"));
        }
        if order.payment_status != PaymentStatus::Pending {
            return Err(DomainError::invalid(format!(
                "order payment is already {}",
                order.payment_status
            )));
        }
        if let Some(amount) = amount {
            if amount != order.total_amount {
                return Err(DomainError::invalid(format!(
                    "amount {amount} does not match order total {}",
                    order.total_amount
                )));
            }
        }

        let mut metadata = BTreeMap::new();
        metadata.insert("orderId".to_string(), order.id.to_string());
        metadata.insert("userId".to_string(), ctx.user_id.to_string());

        Ok(PaymentIntentRequest {
            order_id: order.id,
            amount_minor: to_minor_units(&order.total_amount)?,
            currency: self.currency.clone(),
            metadata,
        })
    }

    /// Second half: asks the gateway for an intent. Failures surface as-is;
    /// there is no retry.
    pub async fn initiate_card_payment(
        &self,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent, DomainError> {
        let gateway = self.gateway.as_ref().ok_or(DomainError::PaymentNotConfigured)?;
        let order_id = request.order_id;
        let amount = request.amount_minor;
        match gateway.create_intent(request).await {
            Ok(intent) => {
                log::info!("payment intent created for order {order_id} ({amount} minor units)");
                Ok(intent)
            }
            Err(e) => {
                log::warn!("payment intent for order {order_id} failed: {e}");
                Err(e)
            }
        }
    }

    /// Marks a card order paid once the gateway reported success to the
    /// client. Confirming an already paid order is a no-op.
    pub fn confirm_card_payment(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
    ) -> Result<Order, DomainError> {
        let order = self.get_order(ctx, order_id)?;
        if order.payment_method != PaymentMethod::Card {
            return Err(DomainError::invalid("cash orders are settled on delivery"));
        }
        if order.payment_status == PaymentStatus::Paid {
            return Ok(order);
        }
        let order = self.transition_payment(&order, PaymentStatus::Paid)?;
        log::info!("payment confirmed for order {}", order.id);
        Ok(order)
    }

    /// Records a declined or errored client-side confirmation.
    pub fn fail_card_payment(
        &self,
        ctx: &RequestContext,
        order_id: Uuid,
    ) -> Result<Order, DomainError> {
        let order = self.get_order(ctx, order_id)?;
        if order.payment_method != PaymentMethod::Card {
            return Err(DomainError::invalid("cash orders are settled on delivery"));
        }
        if order.payment_status == PaymentStatus::Failed {
            return Ok(order);
        }
        let order = self.transition_payment(&order, PaymentStatus::Failed)?;
        log::info!("payment failed for order {}", order.id);
        Ok(order)
    }

    fn transition_payment(&self, order: &Order, next: PaymentStatus) -> Result<Order, DomainError> {
        if !order.payment_status.can_transition_to(next) {
            return Err(DomainError::invalid(format!(
                "payment cannot move from {} to {}",
                order.payment_status, next
            )));
        }
        self.orders
            .update_payment_status(order.id, next)?
            .ok_or(DomainError::NotFound("Order"))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::domain::cart::Cart;
    use crate::domain::catalog::{MenuItem, MenuItemUpdate, NewMenuItem, NewStation, NewTrain};
    use crate::domain::order::{FulfillmentStatus, OrderLineRequest};
    use crate::infrastructure::memory::{
        InMemoryCatalogRepository, InMemoryOrderRepository, RecordingGateway,
    };

    struct Fixture {
        workflow: OrderWorkflow,
        orders: Arc<InMemoryOrderRepository>,
        catalog: Arc<InMemoryCatalogRepository>,
        gateway: Arc<RecordingGateway>,
        train_id: i32,
        station_id: i32,
        rice: MenuItem,
        tea: MenuItem,
    }

    fn fixture_with(gateway: RecordingGateway) -> Fixture {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        let gateway = Arc::new(gateway);

        let train = catalog
            .create_train(NewTrain {
                name: "Udarata Menike".into(),
                train_type: "express".into(),
                departure_time: "08:30".into(),
                arrival_time: "17:45".into(),
                frequency: "daily".into(),
                is_active: true,
            })
            .unwrap();
        let station = catalog
            .create_station(NewStation {
                name: "Kandy".into(),
                sinhala_name: "මහනුවර".into(),
                distance_from_colombo: 120,
                sort_order: 4,
            })
            .unwrap();
        let rice = catalog.create_menu_item(menu("Rice & curry", 500)).unwrap();
        let tea = catalog.create_menu_item(menu("Milk tea", 200)).unwrap();

        let workflow = OrderWorkflow::new(orders.clone(), catalog.clone())
            .with_gateway(gateway.clone());
        Fixture {
            workflow,
            orders,
            catalog,
            gateway,
            train_id: train.id,
            station_id: station.id,
            rice,
            tea,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RecordingGateway::new())
    }

    fn menu(name: &str, price: i64) -> NewMenuItem {
        NewMenuItem {
            name: name.into(),
            description: String::new(),
            price: BigDecimal::from(price),
            category: "meals".into(),
            image_url: None,
            is_available: true,
        }
    }

    impl Fixture {
        fn checkout(&self, method: PaymentMethod) -> PlaceOrder {
            let mut cart = Cart::new();
            cart.add_item(&self.rice, 2);
            cart.add_item(&self.tea, 1);
            PlaceOrder {
                train_id: self.train_id,
                station_id: self.station_id,
                customer_phone: "+94771234567".into(),
                seat_info: Some("Coach B, seat 14".into()),
                payment_method: method,
                items: cart.to_order_lines(),
                expected_total: Some(cart.total()),
                expected_delivery_fee: Some(delivery_fee()),
            }
        }
    }

    const CUSTOMER: RequestContext = RequestContext {
        user_id: 7,
        role: crate::domain::context::Role::Customer,
    };

    #[test]
    fn cash_checkout_creates_pending_placed_order() {
        let f = fixture();
        let order = f
            .workflow
            .place_cash_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .expect("order placed");

        assert_eq!(order.total_amount, BigDecimal::from(1300));
        assert_eq!(order.delivery_fee, BigDecimal::from(100));
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.fulfillment_status, FulfillmentStatus::Placed);
        assert_eq!(order.items.len(), 2);
        assert_eq!(f.orders.find_by_id(order.id).unwrap().unwrap().user_id, 7);
    }

    #[test]
    fn empty_order_is_rejected() {
        let f = fixture();
        let mut req = f.checkout(PaymentMethod::Cash);
        req.items.clear();
        let err = f.workflow.place_order(&CUSTOMER, req).unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(f.orders.list_all().unwrap().is_empty());
    }

    #[test]
    fn unknown_references_and_bad_phone_are_rejected() {
        let f = fixture();

        let mut req = f.checkout(PaymentMethod::Cash);
        req.train_id = 999;
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));

        let mut req = f.checkout(PaymentMethod::Cash);
        req.station_id = 999;
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));

        let mut req = f.checkout(PaymentMethod::Cash);
        req.customer_phone = "call me".into();
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));

        let mut req = f.checkout(PaymentMethod::Cash);
        req.items.push(OrderLineRequest {
            menu_item_id: 12345,
            quantity: 1,
            unit_price: None,
        });
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));

        assert!(f.orders.list_all().unwrap().is_empty());
    }

    #[test]
    fn inactive_train_is_rejected() {
        let f = fixture();
        let parked = f
            .catalog
            .create_train(NewTrain {
                name: "Night Mail".into(),
                train_type: "mail".into(),
                departure_time: "20:00".into(),
                arrival_time: "05:00".into(),
                frequency: "daily".into(),
                is_active: false,
            })
            .unwrap();
        let mut req = f.checkout(PaymentMethod::Cash);
        req.train_id = parked.id;
        assert!(f.workflow.place_order(&CUSTOMER, req).is_err());
    }

    #[test]
    fn mismatched_total_or_stale_price_is_rejected() {
        let f = fixture();

        let mut req = f.checkout(PaymentMethod::Cash);
        req.expected_total = Some(BigDecimal::from(1200));
        assert!(f.workflow.place_order(&CUSTOMER, req).is_err());

        let req = f.checkout(PaymentMethod::Cash);
        f.catalog
            .update_menu_item(
                f.tea.id,
                MenuItemUpdate {
                    price: Some(BigDecimal::from(250)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(f.workflow.place_order(&CUSTOMER, req).is_err());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let f = fixture();
        let mut req = f.checkout(PaymentMethod::Cash);
        req.expected_total = None;
        req.items[0].quantity = 0;
        assert!(f.workflow.place_order(&CUSTOMER, req).is_err());
    }

    #[test]
    fn oversized_quantity_is_rejected_before_storage() {
        let f = fixture();
        let mut req = f.checkout(PaymentMethod::Cash);
        req.expected_total = None;
        req.items[0].quantity = i32::MAX;
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));

        let mut req = f.checkout(PaymentMethod::Cash);
        req.expected_total = None;
        req.items[0].quantity = MAX_LINE_QUANTITY;
        assert!(f.workflow.place_order(&CUSTOMER, req).is_ok());
    }

    #[test]
    fn total_beyond_column_range_is_rejected() {
        let f = fixture();
        let banquet = f
            .catalog
            .create_menu_item(menu("Wedding banquet", 99_999_999))
            .unwrap();
        let mut req = f.checkout(PaymentMethod::Cash);
        req.expected_total = None;
        req.items = vec![OrderLineRequest {
            menu_item_id: banquet.id,
            quantity: 2,
            unit_price: None,
        }];
        assert!(matches!(
            f.workflow.place_order(&CUSTOMER, req),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(f.orders.list_all().unwrap().is_empty());
    }

    #[test]
    fn line_prices_survive_menu_price_changes() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Cash))
            .unwrap();

        f.catalog
            .update_menu_item(
                f.rice.id,
                MenuItemUpdate {
                    price: Some(BigDecimal::from(900)),
                    ..Default::default()
                },
            )
            .unwrap();

        let stored = f.workflow.get_order(&CUSTOMER, order.id).unwrap();
        assert_eq!(stored.items[0].unit_price, BigDecimal::from(500));
        assert_eq!(stored.total_amount, BigDecimal::from(1300));
    }

    #[test]
    fn other_users_cannot_read_an_order() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Cash))
            .unwrap();

        let stranger = RequestContext::customer(8);
        assert!(matches!(
            f.workflow.get_order(&stranger, order.id),
            Err(DomainError::Forbidden)
        ));
        assert!(f.workflow.list_orders(&stranger).unwrap().is_empty());
        assert!(matches!(
            f.workflow.get_order(&CUSTOMER, Uuid::new_v4()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn card_checkout_creates_intent_then_confirms() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();

        let request = f
            .workflow
            .prepare_card_payment(&CUSTOMER, order.id, Some(BigDecimal::from(1300)))
            .unwrap();
        assert_eq!(request.amount_minor, 130_000);
        assert_eq!(request.currency, "lkr");
        assert_eq!(request.metadata["orderId"], order.id.to_string());

        let intent = f.workflow.initiate_card_payment(request).await.unwrap();
        assert!(intent.client_secret.starts_with("pi_"));
        assert_eq!(f.gateway.requests().len(), 1);

        let paid = f.workflow.confirm_card_payment(&CUSTOMER, order.id).unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn confirming_twice_is_a_no_op() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();

        f.workflow.confirm_card_payment(&CUSTOMER, order.id).unwrap();
        let again = f.workflow.confirm_card_payment(&CUSTOMER, order.id).unwrap();
        assert_eq!(again.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn failed_payment_cannot_be_confirmed() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();

        let failed = f.workflow.fail_card_payment(&CUSTOMER, order.id).unwrap();
        assert_eq!(failed.payment_status, PaymentStatus::Failed);
        assert!(matches!(
            f.workflow.confirm_card_payment(&CUSTOMER, order.id),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn cash_orders_are_not_confirmed_by_card_flow() {
        let f = fixture();
        let order = f
            .workflow
            .place_cash_order(&CUSTOMER, f.checkout(PaymentMethod::Cash))
            .unwrap();
        assert!(f.workflow.confirm_card_payment(&CUSTOMER, order.id).is_err());
        assert!(f
            .workflow
            .prepare_card_payment(&CUSTOMER, order.id, None)
            .is_err());
    }

    #[test]
    fn payment_requires_a_configured_gateway() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();
        let bare = OrderWorkflow::new(f.orders.clone(), f.catalog.clone());
        assert!(matches!(
            bare.prepare_card_payment(&CUSTOMER, order.id, None),
            Err(DomainError::PaymentNotConfigured)
        ));
    }

    #[test]
    fn wrong_amount_is_rejected() {
        let f = fixture();
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();
        let amount = BigDecimal::from_str("1299.99").unwrap();
        assert!(f
            .workflow
            .prepare_card_payment(&CUSTOMER, order.id, Some(amount))
            .is_err());
    }

    #[tokio::test]
    async fn gateway_failure_surfaces_without_touching_the_order() {
        let f = fixture_with(RecordingGateway::failing("card network unreachable"));
        let order = f
            .workflow
            .place_order(&CUSTOMER, f.checkout(PaymentMethod::Card))
            .unwrap();

        let request = f
            .workflow
            .prepare_card_payment(&CUSTOMER, order.id, None)
            .unwrap();
        let err = f.workflow.initiate_card_payment(request).await.unwrap_err();
        assert!(matches!(err, DomainError::PaymentGateway(_)));
        assert_eq!(f.gateway.requests().len(), 1);

        let stored = f.orders.find_by_id(order.id).unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
    }
}
