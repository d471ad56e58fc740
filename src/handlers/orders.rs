use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{money, parse_money};
use crate::application::order_workflow::OrderWorkflow;
use crate::domain::context::RequestContext;
use crate::domain::order::{LineItem, Order, OrderLineRequest, PaymentMethod, PlaceOrder};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub menu_item_id: i32,
    pub quantity: i32,
    /// Unit price the shopper saw, as a decimal string, e.g. "500.00"
    pub price: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub train_id: i32,
    pub station_id: i32,
    /// Client-computed total; rejected when it disagrees with the server.
    pub total_amount: Option<String>,
    pub delivery_fee: Option<String>,
    /// `card` or `cash`
    pub payment_method: String,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

impl CreateOrderRequest {
    fn into_domain(self) -> Result<PlaceOrder, AppError> {
        let payment_method: PaymentMethod = self.payment_method.parse()?;
        let items = self
            .items
            .into_iter()
            .map(|i| {
                Ok(OrderLineRequest {
                    menu_item_id: i.menu_item_id,
                    quantity: i.quantity,
                    unit_price: i.price.as_deref().map(|p| parse_money("price", p)).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(PlaceOrder {
            train_id: self.train_id,
            station_id: self.station_id,
            customer_phone: self.customer_phone,
            seat_info: self.seat_info,
            payment_method,
            items,
            expected_total: self
                .total_amount
                .as_deref()
                .map(|t| parse_money("totalAmount", t))
                .transpose()?,
            expected_delivery_fee: self
                .delivery_fee
                .as_deref()
                .map(|f| parse_money("deliveryFee", f))
                .transpose()?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub price: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: i32,
    pub train_id: i32,
    pub station_id: i32,
    pub total_amount: String,
    pub delivery_fee: String,
    pub payment_method: String,
    pub payment_status: String,
    pub order_status: String,
    pub customer_phone: String,
    pub seat_info: Option<String>,
    pub items: Vec<OrderItemResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&LineItem> for OrderItemResponse {
    fn from(item: &LineItem) -> Self {
        OrderItemResponse {
            menu_item_id: item.menu_item_id,
            name: item.name.clone(),
            quantity: item.quantity,
            price: money(&item.unit_price),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id,
            user_id: o.user_id,
            train_id: o.train_id,
            station_id: o.station_id,
            total_amount: money(&o.total_amount),
            delivery_fee: money(&o.delivery_fee),
            payment_method: o.payment_method.to_string(),
            payment_status: o.payment_status.to_string(),
            order_status: o.fulfillment_status.to_string(),
            customer_phone: o.customer_phone,
            seat_info: o.seat_info,
            items: o.items.iter().map(OrderItemResponse::from).collect(),
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

pub(crate) fn to_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(OrderResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order for the authenticated user. Prices are taken from the
/// current menu; the stored order is `placed` with payment `pending`.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_domain()?;

    let method = request.payment_method;
    let order = web::block(move || match method {
        PaymentMethod::Cash => workflow.place_cash_order(&ctx, request),
        PaymentMethod::Card => workflow.place_order(&ctx, request),
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// The caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Orders of the caller", body = Vec<OrderResponse>),
        (status = 401, description = "Authentication required"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let orders = web::block(move || workflow.list_orders(&ctx))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Order belongs to another user"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    workflow: web::Data<OrderWorkflow>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || workflow.get_order(&ctx, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
