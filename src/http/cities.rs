//! City CRUD handlers.
//!
//! Everything under `/v1/city` runs behind `require_token`, so handlers can
//! rely on [`Claims`] being present in the request extensions.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::Claims;
use crate::city::{City, CityFilter, CityUpdate};
use crate::error::AppError;
use crate::http::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityResponse {
    pub city: City,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitiesResponse {
    pub cities: Vec<City>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted_id: i64,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Request body rejected");
        AppError::invalid("invalid request")
    })
}

/// `GET /`: every city, unauthenticated.
pub async fn list_cities(State(state): State<AppState>) -> Result<Json<CitiesResponse>, AppError> {
    let cities = state.cities.find_cities(&CityFilter::default())?;
    Ok(Json(CitiesResponse { cities }))
}

/// `POST /v1/city`
pub async fn create_city(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<City>, JsonRejection>,
) -> Result<Json<CityResponse>, AppError> {
    let city = state.cities.create_city(body(payload)?)?;
    tracing::info!(user_id = claims.subject_id, city_id = city.id, "City created");
    Ok(Json(CityResponse { city }))
}

/// `GET /v1/city/{name}`
pub async fn get_city(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CityResponse>, AppError> {
    let city = state
        .cities
        .find_cities(&CityFilter::by_name(name))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("city not found"))?;
    Ok(Json(CityResponse { city }))
}

/// `DELETE /v1/city/{name}`
pub async fn delete_city(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = state.cities.find_id_by_name(&name)?;
    state.cities.delete_city(id)?;
    tracing::info!(user_id = claims.subject_id, city_id = id, "City deleted");
    Ok(Json(DeletedResponse { deleted_id: id }))
}

/// `PATCH /v1/city/{name}`
pub async fn update_city(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
    payload: Result<Json<CityUpdate>, JsonRejection>,
) -> Result<Json<CityResponse>, AppError> {
    let id = state.cities.find_id_by_name(&name)?;
    let update = body(payload)?;
    let city = state.cities.update_city(id, &update)?;
    tracing::info!(user_id = claims.subject_id, city_id = id, "City updated");
    Ok(Json(CityResponse { city }))
}

/// `POST /v1/city/search`
pub async fn search_cities(
    State(state): State<AppState>,
    payload: Result<Json<CityFilter>, JsonRejection>,
) -> Result<Json<CitiesResponse>, AppError> {
    let cities = state.cities.find_cities(&body(payload)?)?;
    if cities.is_empty() {
        return Err(AppError::not_found("no matching cities"));
    }
    Ok(Json(CitiesResponse { cities }))
}
