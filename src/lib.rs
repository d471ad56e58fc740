pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::admin::AdminConsole;
use application::catalog::CatalogService;
use application::order_workflow::OrderWorkflow;
use auth::JwtKeys;
use config::Config;
use domain::errors::DomainError;
use domain::ports::{CatalogRepository, OrderRepository, PaymentGateway};
use errors::AppError;
use infrastructure::catalog_repo::DieselCatalogRepository;
use infrastructure::order_repo::DieselOrderRepository;
use infrastructure::stripe::StripeGateway;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), DomainError> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DomainError::Persistence(format!("migrations failed: {e}")))?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::catalog::list_trains,
        handlers::catalog::get_train,
        handlers::catalog::list_stations,
        handlers::catalog::get_station,
        handlers::catalog::list_menu,
        handlers::catalog::get_menu_item,
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::payments::create_payment_intent,
        handlers::payments::payment_success,
        handlers::payments::payment_failure,
        handlers::admin::list_orders,
        handlers::admin::update_order_status,
        handlers::admin::update_payment_status,
        handlers::admin::dashboard,
        handlers::admin::sales_report,
        handlers::admin::list_trains,
        handlers::admin::create_train,
        handlers::admin::create_station,
        handlers::admin::list_menu_items,
        handlers::admin::create_menu_item,
        handlers::admin::update_menu_item,
    ),
    tags(
        (name = "catalog", description = "Trains, stations and the menu"),
        (name = "orders", description = "Customer orders"),
        (name = "payments", description = "Card payment flow"),
        (name = "admin", description = "Operator console")
    )
)]
pub struct ApiDoc;

/// Shared application services, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub workflow: web::Data<OrderWorkflow>,
    pub admin: web::Data<AdminConsole>,
    pub catalog: web::Data<CatalogService>,
    pub keys: web::Data<JwtKeys>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        currency: &str,
        keys: JwtKeys,
    ) -> Self {
        let mut workflow =
            OrderWorkflow::new(orders.clone(), catalog.clone()).with_currency(currency);
        if let Some(gateway) = gateway {
            workflow = workflow.with_gateway(gateway);
        }
        Self {
            workflow: web::Data::new(workflow),
            admin: web::Data::new(AdminConsole::new(orders, catalog.clone())),
            catalog: web::Data::new(CatalogService::new(catalog)),
            keys: web::Data::new(keys),
        }
    }

    /// Wires the Postgres repositories and, when a secret key is configured,
    /// the Stripe gateway.
    pub fn from_config(pool: DbPool, config: &Config) -> Result<Self, DomainError> {
        let gateway: Option<Arc<dyn PaymentGateway>> = match &config.stripe_secret_key {
            Some(key) => Some(Arc::new(StripeGateway::new(
                key.clone(),
                config.stripe_api_base.clone(),
            )?)),
            None => None,
        };
        Ok(Self::new(
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselCatalogRepository::new(pool)),
            gateway,
            &config.payment_currency,
            JwtKeys::from_secret(config.jwt_secret.as_bytes()),
        ))
    }
}

/// Registers every route plus the Swagger UI. Shared by the server and the
/// HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(state.workflow.clone())
        .app_data(state.admin.clone())
        .app_data(state.catalog.clone())
        .app_data(state.keys.clone())
        .app_data(json_config)
        .route("/trains", web::get().to(handlers::catalog::list_trains))
        .route("/trains/{id}", web::get().to(handlers::catalog::get_train))
        .route("/stations", web::get().to(handlers::catalog::list_stations))
        .route("/stations/{id}", web::get().to(handlers::catalog::get_station))
        .route("/menu", web::get().to(handlers::catalog::list_menu))
        .route("/menu/{id}", web::get().to(handlers::catalog::get_menu_item))
        .service(
            web::scope("/orders")
                .route("", web::post().to(handlers::orders::create_order))
                .route("", web::get().to(handlers::orders::list_orders))
                .route("/{id}", web::get().to(handlers::orders::get_order)),
        )
        .route(
            "/create-payment-intent",
            web::post().to(handlers::payments::create_payment_intent),
        )
        .route(
            "/payment-success",
            web::post().to(handlers::payments::payment_success),
        )
        .route(
            "/payment-failure",
            web::post().to(handlers::payments::payment_failure),
        )
        .service(
            web::scope("/admin")
                .route("/orders", web::get().to(handlers::admin::list_orders))
                .route(
                    "/orders/{id}/status",
                    web::patch().to(handlers::admin::update_order_status),
                )
                .route(
                    "/orders/{id}/payment",
                    web::patch().to(handlers::admin::update_payment_status),
                )
                .route("/dashboard", web::get().to(handlers::admin::dashboard))
                .route("/reports", web::get().to(handlers::admin::sales_report))
                .route("/trains", web::get().to(handlers::admin::list_trains))
                .route("/trains", web::post().to(handlers::admin::create_train))
                .route("/stations", web::post().to(handlers::admin::create_station))
                .route("/menu", web::get().to(handlers::admin::list_menu_items))
                .route("/menu", web::post().to(handlers::admin::create_menu_item))
                .route("/menu/{id}", web::patch().to(handlers::admin::update_menu_item)),
        )
        .service(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(|cfg| configure(cfg, &state))
    })
    .bind((host.to_string(), port))?
    .run())
}
