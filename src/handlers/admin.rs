use actix_web::{web, HttpResponse};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::{MenuItemResponse, StationResponse, TrainResponse};
use super::orders::{to_responses, OrderResponse};
use super::{money, parse_money};
use crate::application::admin::{AdminConsole, DashboardStats, SalesReport};
use crate::domain::catalog::{MenuItemUpdate, NewMenuItem, NewStation, NewTrain};
use crate::domain::context::RequestContext;
use crate::domain::order::{FulfillmentStatus, PaymentStatus};
use crate::errors::AppError;

const DEFAULT_REPORT_DAYS: i64 = 7;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// placed, preparing, ready, delivered or cancelled
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusRequest {
    /// pending, paid or failed
    pub payment_status: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_orders: i64,
    pub by_status: Vec<StatusCount>,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        DashboardResponse {
            total_orders: stats.total_orders,
            by_status: stats
                .by_status
                .into_iter()
                .map(|(status, count)| StatusCount {
                    status: status.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PopularItemResponse {
    pub menu_item_id: i32,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesReportResponse {
    pub from: String,
    pub to: String,
    pub total_orders: usize,
    pub total_revenue: String,
    pub trains_used: usize,
    pub stations_covered: usize,
    pub popular_items: Vec<PopularItemResponse>,
}

impl From<SalesReport> for SalesReportResponse {
    fn from(r: SalesReport) -> Self {
        SalesReportResponse {
            from: r.from.to_string(),
            to: r.to.to_string(),
            total_orders: r.total_orders,
            total_revenue: money(&r.revenue),
            trains_used: r.trains_used,
            stations_covered: r.stations_covered,
            popular_items: r
                .popular_items
                .into_iter()
                .map(|p| PopularItemResponse {
                    menu_item_id: p.menu_item_id,
                    name: p.name,
                    quantity: p.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainRequest {
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStationRequest {
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Decimal price as a string, e.g. "450.00"
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
}

fn default_true() -> bool {
    true
}

// ── Orders ───────────────────────────────────────────────────────────────────

/// GET /admin/orders
///
/// Every order, newest first, optionally narrowed to one fulfillment status.
#[utoipa::path(
    get,
    operation_id = "admin_list_orders",
    path = "/admin/orders",
    params(("status" = Option<String>, Query, description = "Fulfillment status filter")),
    responses(
        (status = 200, description = "Matching orders", body = Vec<OrderResponse>),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    query: web::Query<OrderListParams>,
) -> Result<HttpResponse, AppError> {
    let status = query
        .into_inner()
        .status
        .map(|s| s.parse::<FulfillmentStatus>())
        .transpose()?;

    let orders = web::block(move || admin.list_orders(&ctx, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// PATCH /admin/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/admin/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OrderResponse),
        (status = 400, description = "Unknown status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn update_order_status(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status: FulfillmentStatus = body.into_inner().status.parse()?;

    let order = web::block(move || admin.set_fulfillment_status(&ctx, id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /admin/orders/{id}/payment
///
/// Manual payment override, e.g. cash collected on delivery.
#[utoipa::path(
    patch,
    path = "/admin/orders/{id}/payment",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = UpdatePaymentStatusRequest,
    responses(
        (status = 200, description = "Payment status updated", body = OrderResponse),
        (status = 400, description = "Unknown payment status"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Order not found"),
    ),
    tag = "admin"
)]
pub async fn update_payment_status(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePaymentStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status: PaymentStatus = body.into_inner().payment_status.parse()?;

    let order = web::block(move || admin.set_payment_status(&ctx, id, status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /admin/dashboard
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Order counts", body = DashboardResponse),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn dashboard(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let stats = web::block(move || admin.dashboard(&ctx))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(DashboardResponse::from(stats)))
}

/// GET /admin/reports
///
/// Sales between `from` and `to` (inclusive, `YYYY-MM-DD`). Defaults to the
/// last seven days.
#[utoipa::path(
    get,
    path = "/admin/reports",
    params(
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD"),
    ),
    responses(
        (status = 200, description = "Sales report", body = SalesReportResponse),
        (status = 400, description = "Invalid range"),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn sales_report(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    query: web::Query<ReportParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let to = params.to.unwrap_or_else(|| Utc::now().date_naive());
    let from = params
        .from
        .unwrap_or_else(|| to - Duration::days(DEFAULT_REPORT_DAYS));

    let report = web::block(move || admin.sales_report(&ctx, from, to))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(SalesReportResponse::from(report)))
}

// ── Reference data ───────────────────────────────────────────────────────────

/// GET /admin/trains
///
/// Every train, including those not currently running.
#[utoipa::path(
    get,
    operation_id = "admin_list_trains",
    path = "/admin/trains",
    responses(
        (status = 200, description = "All trains", body = Vec<TrainResponse>),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn list_trains(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let trains = web::block(move || admin.list_trains(&ctx))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<TrainResponse> = trains.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /admin/trains
#[utoipa::path(
    post,
    path = "/admin/trains",
    request_body = CreateTrainRequest,
    responses(
        (status = 201, description = "Train created", body = TrainResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn create_train(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    body: web::Json<CreateTrainRequest>,
) -> Result<HttpResponse, AppError> {
    let b = body.into_inner();
    let train = NewTrain {
        name: b.name,
        train_type: b.train_type,
        departure_time: b.departure_time,
        arrival_time: b.arrival_time,
        frequency: b.frequency,
        is_active: b.is_active,
    };

    let created = web::block(move || admin.create_train(&ctx, train))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(TrainResponse::from(created)))
}

/// POST /admin/stations
#[utoipa::path(
    post,
    path = "/admin/stations",
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = StationResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn create_station(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    body: web::Json<CreateStationRequest>,
) -> Result<HttpResponse, AppError> {
    let b = body.into_inner();
    let station = NewStation {
        name: b.name,
        sinhala_name: b.sinhala_name,
        distance_from_colombo: b.distance_from_colombo,
        sort_order: b.sort_order,
    };

    let created = web::block(move || admin.create_station(&ctx, station))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(StationResponse::from(created)))
}

/// GET /admin/menu
///
/// Every menu item, including unavailable ones.
#[utoipa::path(
    get,
    operation_id = "admin_list_menu_items",
    path = "/admin/menu",
    responses(
        (status = 200, description = "All menu items", body = Vec<MenuItemResponse>),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn list_menu_items(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
) -> Result<HttpResponse, AppError> {
    let items = web::block(move || admin.list_menu_items(&ctx))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<MenuItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /admin/menu
#[utoipa::path(
    post,
    path = "/admin/menu",
    request_body = CreateMenuItemRequest,
    responses(
        (status = 201, description = "Menu item created", body = MenuItemResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
    ),
    tag = "admin"
)]
pub async fn create_menu_item(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    body: web::Json<CreateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let b = body.into_inner();
    let item = NewMenuItem {
        price: parse_money("price", &b.price)?,
        name: b.name,
        description: b.description,
        category: b.category,
        image_url: b.image_url,
        is_available: b.is_available,
    };

    let created = web::block(move || admin.create_menu_item(&ctx, item))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(MenuItemResponse::from(created)))
}

/// PATCH /admin/menu/{id}
///
/// Existing orders keep the price they were placed with.
#[utoipa::path(
    patch,
    path = "/admin/menu/{id}",
    params(("id" = i32, Path, description = "Menu item id")),
    request_body = UpdateMenuItemRequest,
    responses(
        (status = 200, description = "Menu item updated", body = MenuItemResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "admin"
)]
pub async fn update_menu_item(
    admin: web::Data<AdminConsole>,
    ctx: RequestContext,
    path: web::Path<i32>,
    body: web::Json<UpdateMenuItemRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let b = body.into_inner();
    let update = MenuItemUpdate {
        price: b.price.as_deref().map(|p| parse_money("price", p)).transpose()?,
        name: b.name,
        description: b.description,
        category: b.category,
        image_url: b.image_url,
        is_available: b.is_available,
    };

    let updated = web::block(move || admin.update_menu_item(&ctx, id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MenuItemResponse::from(updated)))
}
