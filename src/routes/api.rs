// Handlers for the /api/cars REST endpoints

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    catalog,
    error::{AppError, AppResult},
    filters::FilterState,
    models::{Listing, ListingPatch, MessageResponse, NewListing},
    store::ListingStore,
};

async fn find_listing(store: &dyn ListingStore, id: &str) -> AppResult<Listing> {
    match store.get(id).await? {
        Some(listing) => Ok(listing),
        None => {
            tracing::info!("[HANDLER] Listing {} not found.", id);
            Err(AppError::NotFound)
        }
    }
}

// GET /api/cars?<filters>
pub async fn list_cars(
    State(store): State<Arc<dyn ListingStore>>,
    RawQuery(query): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let state = FilterState::decode(query.as_deref().unwrap_or_default());
    tracing::info!("[HANDLER] GET /api/cars - query: {:?}", state.encode());

    let listings = store.list().await?;
    let response = catalog::search(listings, &state);
    tracing::info!("[HANDLER] GET /api/cars - returning {} cars.", response.cars.len());
    Ok(Json(response))
}

// GET /api/cars/:id
pub async fn get_car(
    State(store): State<Arc<dyn ListingStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] GET /api/cars/{}", id);
    let listing = find_listing(store.as_ref(), &id).await?;
    Ok(Json(listing))
}

// POST /api/cars
pub async fn create_car(
    State(store): State<Arc<dyn ListingStore>>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] POST /api/cars - Request received.");

    // Decode from a Value so shape errors come back as our 400 body
    let new_listing: NewListing = serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))?;
    let listing = new_listing.into_listing(String::new(), Utc::now());
    listing.validate().map_err(AppError::Validation)?;

    let created = store.insert(listing).await?;
    tracing::info!("[HANDLER] POST /api/cars - Created listing {}.", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/cars/:id
pub async fn update_car(
    State(store): State<Arc<dyn ListingStore>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] PATCH /api/cars/{}", id);
    let patch: ListingPatch = serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))?;

    let mut listing = find_listing(store.as_ref(), &id).await?;
    patch.apply(&mut listing);
    listing.validate().map_err(AppError::Validation)?;
    listing.updated_at = Some(Utc::now());

    match store.replace(listing).await? {
        Some(updated) => Ok(Json(updated)),
        // Deleted between the read and the write
        None => Err(AppError::NotFound),
    }
}

// DELETE /api/cars/:id
pub async fn delete_car(
    State(store): State<Arc<dyn ListingStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] DELETE /api/cars/{}", id);
    if !store.delete(&id).await? {
        return Err(AppError::NotFound);
    }
    Ok(Json(MessageResponse { message: "Car deleted successfully".to_string() }))
}

// GET /api/cars/:id/similar
pub async fn similar_cars(
    State(store): State<Arc<dyn ListingStore>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] GET /api/cars/{}/similar", id);
    let listing = find_listing(store.as_ref(), &id).await?;
    let candidates = store.list().await?;
    Ok(Json(catalog::similar(&listing, &candidates)))
}
