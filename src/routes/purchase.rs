use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::Result,
    middleware::AuthenticatedStudent,
    models::PaymentMethod,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub listing_id: Uuid,
    /// Typed: anything outside card/in_person is rejected at
    /// deserialization with a 400.
    pub payment_method: PaymentMethod,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    pub order_id: Uuid,
    pub conversation_id: Uuid,
}

/// POST /api/marketplace/purchase
/// Card purchases respond with a hosted checkout URL; in-person purchases
/// go straight to the buyer–seller conversation.
#[post("/api/marketplace/purchase")]
pub async fn purchase(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    body: web::Json<PurchaseRequest>,
) -> Result<HttpResponse> {
    let outcome = state
        .purchases
        .purchase(student.id, body.listing_id, body.payment_method)
        .await?;

    Ok(HttpResponse::Ok().json(PurchaseResponse {
        checkout_url: outcome.checkout_url,
        order_id: outcome.order_id,
        conversation_id: outcome.conversation_id,
    }))
}
