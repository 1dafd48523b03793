use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{
    db::orders::{self, OrderSummary},
    error::Result,
    middleware::AuthenticatedStudent,
    state::AppState,
};

#[derive(Serialize)]
pub struct OrdersResponse {
    pub purchases: Vec<OrderSummary>,
    pub sales: Vec<OrderSummary>,
}

/// Read-only projections of the order ledger for the current student.
#[get("/api/marketplace/orders")]
pub async fn my_orders(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let purchases = orders::list_for_buyer(&state.db, student.id).await?;
    let sales = orders::list_for_seller(&state.db, student.id).await?;

    Ok(HttpResponse::Ok().json(OrdersResponse { purchases, sales }))
}
