use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::money;
use crate::application::catalog::CatalogService;
use crate::domain::catalog::{MenuItem, Station, Train};
use crate::errors::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub id: i32,
    pub name: String,
    pub train_type: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub frequency: String,
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationResponse {
    pub id: i32,
    pub name: String,
    pub sinhala_name: String,
    pub distance_from_colombo: i32,
    pub sort_order: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: String,
}

impl From<Train> for TrainResponse {
    fn from(t: Train) -> Self {
        TrainResponse {
            id: t.id,
            name: t.name,
            train_type: t.train_type,
            departure_time: t.departure_time,
            arrival_time: t.arrival_time,
            frequency: t.frequency,
            is_active: t.is_active,
        }
    }
}

impl From<Station> for StationResponse {
    fn from(s: Station) -> Self {
        StationResponse {
            id: s.id,
            name: s.name,
            sinhala_name: s.sinhala_name,
            distance_from_colombo: s.distance_from_colombo,
            sort_order: s.sort_order,
        }
    }
}

impl From<MenuItem> for MenuItemResponse {
    fn from(m: MenuItem) -> Self {
        MenuItemResponse {
            id: m.id,
            name: m.name,
            description: m.description,
            price: money(&m.price),
            category: m.category,
            image_url: m.image_url,
            is_available: m.is_available,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuParams {
    pub category: Option<String>,
}

/// GET /trains
#[utoipa::path(
    get,
    path = "/trains",
    responses((status = 200, description = "Running trains", body = Vec<TrainResponse>)),
    tag = "catalog"
)]
pub async fn list_trains(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let trains = web::block(move || catalog.list_trains())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<TrainResponse> = trains.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /trains/{id}
#[utoipa::path(
    get,
    path = "/trains/{id}",
    params(("id" = i32, Path, description = "Train id")),
    responses(
        (status = 200, description = "Train found", body = TrainResponse),
        (status = 404, description = "Train not found"),
    ),
    tag = "catalog"
)]
pub async fn get_train(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let train = web::block(move || catalog.get_train(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(TrainResponse::from(train)))
}

/// GET /stations
///
/// Stations in route order.
#[utoipa::path(
    get,
    path = "/stations",
    responses((status = 200, description = "Stations", body = Vec<StationResponse>)),
    tag = "catalog"
)]
pub async fn list_stations(catalog: web::Data<CatalogService>) -> Result<HttpResponse, AppError> {
    let stations = web::block(move || catalog.list_stations())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<StationResponse> = stations.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /stations/{id}
#[utoipa::path(
    get,
    path = "/stations/{id}",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station found", body = StationResponse),
        (status = 404, description = "Station not found"),
    ),
    tag = "catalog"
)]
pub async fn get_station(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let station = web::block(move || catalog.get_station(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(StationResponse::from(station)))
}

/// GET /menu
///
/// Available menu items, optionally restricted to one `category`.
#[utoipa::path(
    get,
    path = "/menu",
    params(("category" = Option<String>, Query, description = "Menu category")),
    responses((status = 200, description = "Menu items", body = Vec<MenuItemResponse>)),
    tag = "catalog"
)]
pub async fn list_menu(
    catalog: web::Data<CatalogService>,
    query: web::Query<MenuParams>,
) -> Result<HttpResponse, AppError> {
    let category = query.into_inner().category;
    let items = web::block(move || catalog.list_menu(category.as_deref()))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<MenuItemResponse> = items.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /menu/{id}
#[utoipa::path(
    get,
    path = "/menu/{id}",
    params(("id" = i32, Path, description = "Menu item id")),
    responses(
        (status = 200, description = "Menu item found", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
    ),
    tag = "catalog"
)]
pub async fn get_menu_item(
    catalog: web::Data<CatalogService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let item = web::block(move || catalog.get_menu_item(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MenuItemResponse::from(item)))
}
