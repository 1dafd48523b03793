use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::listings::{self, ListingUpdate, NewListing},
    error::{AppError, Result},
    middleware::AuthenticatedStudent,
    models::Listing,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListingFilters {
    pub category: Option<String>,
    pub campus: Option<String>,
}

#[derive(Serialize)]
pub struct ListingsResponse {
    pub listings: Vec<Listing>,
}

#[get("/api/marketplace/listings")]
pub async fn list_listings(
    state: web::Data<AppState>,
    filters: web::Query<ListingFilters>,
) -> Result<HttpResponse> {
    let listings = listings::list_active(
        &state.db,
        filters.category.as_deref(),
        filters.campus.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(ListingsResponse { listings }))
}

#[get("/api/marketplace/listings/my")]
pub async fn my_listings(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
) -> Result<HttpResponse> {
    let listings = listings::list_for_owner(&state.db, student.id).await?;
    Ok(HttpResponse::Ok().json(ListingsResponse { listings }))
}

#[get("/api/marketplace/listings/{id}")]
pub async fn get_listing(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let listing = listings::find_by_id(&state.db, id.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;

    Ok(HttpResponse::Ok().json(listing))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    pub title: String,
    pub description: String,
    pub price_cents: i32,
    pub category: String,
    pub condition: String,
    pub campus: String,
    pub image_url: Option<String>,
}

#[post("/api/marketplace/listings")]
pub async fn create_listing(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    body: web::Json<CreateListingRequest>,
) -> Result<HttpResponse> {
    if body.title.trim().is_empty() || body.description.trim().is_empty() {
        return Err(AppError::BadRequest("Title and description are required".into()));
    }
    if body.price_cents < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }

    let listing = listings::create(
        &state.db,
        student.id,
        NewListing {
            title: body.title.trim(),
            description: body.description.trim(),
            price_cents: body.price_cents,
            category: &body.category,
            condition: &body.condition,
            campus: &body.campus,
            image_url: body.image_url.as_deref(),
        },
    )
    .await?;

    Ok(HttpResponse::Created().json(listing))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i32>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub campus: Option<String>,
    pub image_url: Option<String>,
}

/// Owner-only partial update; sold listings are immutable.
#[patch("/api/marketplace/listings/{id}")]
pub async fn update_listing(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    id: web::Path<Uuid>,
    body: web::Json<UpdateListingRequest>,
) -> Result<HttpResponse> {
    if let Some(price) = body.price_cents {
        if price < 0 {
            return Err(AppError::BadRequest("Price cannot be negative".into()));
        }
    }

    let body = body.into_inner();
    let listing = listings::update(
        &state.db,
        id.into_inner(),
        student.id,
        ListingUpdate {
            title: body.title,
            description: body.description,
            price_cents: body.price_cents,
            category: body.category,
            condition: body.condition,
            campus: body.campus,
            image_url: body.image_url,
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Listing not found or not editable".into()))?;

    Ok(HttpResponse::Ok().json(listing))
}

#[delete("/api/marketplace/listings/{id}")]
pub async fn delete_listing(
    state: web::Data<AppState>,
    student: AuthenticatedStudent,
    id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deleted = listings::delete(&state.db, id.into_inner(), student.id).await?;
    if !deleted {
        return Err(AppError::NotFound("Listing not found or not removable".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
