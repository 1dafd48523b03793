use actix_web::{web, App, HttpServer};
use campus_hub_service::{
    config::Config,
    db::{self, market_store::PgMarketStore},
    error::AppError,
    logging, routes,
    services::{
        payment_gateway::{PaymentGateway, StripeCheckout},
        purchase::PurchaseService,
    },
    state::AppState,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let config = Arc::new(Config::from_env()?);

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(|e| AppError::Internal(format!("db: {e}")))?;

    db::MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(format!("migrations: {e}")))?;

    let gateway: Option<Arc<dyn PaymentGateway>> = match &config.stripe {
        Some(stripe) => Some(Arc::new(StripeCheckout::new(stripe.secret_key.clone()))),
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, card checkout disabled");
            None
        }
    };

    let purchases = Arc::new(PurchaseService::new(
        Arc::new(PgMarketStore::new(pool.clone())),
        gateway,
        config.app_url.clone(),
    ));

    let state = AppState {
        db: pool,
        config: config.clone(),
        purchases,
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%bind_addr, "starting campus-hub-service");

    HttpServer::new(move || {
        // permissive() keeps credentials usable with any origin, which the
        // cookie-based session needs during local development
        let cors = actix_cors::Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .service(routes::health::health)
            .service(routes::auth::register)
            .service(routes::auth::login)
            .service(routes::auth::me)
            .service(routes::announcements::list_announcements)
            .service(routes::announcements::create_announcement)
            .service(routes::announcements::delete_announcement)
            .service(routes::chat::list_rooms)
            .service(routes::chat::toggle_pin)
            .service(routes::chat::list_messages)
            .service(routes::chat::send_message)
            // /listings/my must come before /listings/{id}
            .service(routes::listings::list_listings)
            .service(routes::listings::my_listings)
            .service(routes::listings::get_listing)
            .service(routes::listings::create_listing)
            .service(routes::listings::update_listing)
            .service(routes::listings::delete_listing)
            .service(routes::purchase::purchase)
            .service(routes::orders::my_orders)
            .service(routes::conversations::list_conversations)
            .service(routes::conversations::get_messages)
            .service(routes::conversations::send_message)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::Internal(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::Internal(format!("server: {e}")))?;

    Ok(())
}
