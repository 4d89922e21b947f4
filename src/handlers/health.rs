use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

use crate::AppState;
use clickpunter::models::HealthResponse;

/// Health check endpoint
pub async fn health_check(state: web::Data<Arc<AppState>>) -> impl Responder {
    let saved_bets = state.history.lock().map(|h| h.len()).unwrap_or(0);
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        saved_bets,
    };

    HttpResponse::Ok().json(response)
}
