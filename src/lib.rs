pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use application::order_service::OrderService;
pub use config::Config;
pub use db::{create_pool, DbPool};

use domain::ports::IdentityResolver;
use infrastructure::identity::DieselIdentityResolver;
use infrastructure::order_repo::DieselOrderRepository;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type MigrationError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), MigrationError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Register the HTTP routes.
///
/// The app must also carry `web::Data<OrderService>` and
/// `web::Data<dyn IdentityResolver>`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(handlers::json_config())
        .app_data(handlers::query_config())
        .route("/ping", web::get().to(handlers::health::ping))
        .service(
            web::scope("/api/order")
                .route("/counts", web::get().to(handlers::orders::order_counts))
                .route("/list", web::get().to(handlers::orders::list_orders))
                .route("/create", web::post().to(handlers::orders::create_order))
                .route("/detail", web::get().to(handlers::orders::get_order))
                .route("/pay", web::post().to(handlers::orders::pay_order)),
        );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orders = web::Data::new(OrderService::new(DieselOrderRepository::new(pool.clone())));
    let identity: Arc<dyn IdentityResolver> = Arc::new(DieselIdentityResolver::new(pool));
    let identity = web::Data::from(identity);
    let openapi = openapi::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(orders.clone())
            .app_data(identity.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
