use crate::{config::Config, services::purchase::PurchaseService};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub purchases: Arc<PurchaseService>,
}
