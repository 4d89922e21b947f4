use actix_web::{web, HttpResponse};
use std::sync::{Arc, MutexGuard};

use crate::AppState;
use clickpunter::error::AppError;
use clickpunter::models::{SaveBetRequest, SettleRequest};
use clickpunter::BetHistory;

fn lock_history(state: &AppState) -> Result<MutexGuard<'_, BetHistory>, AppError> {
    state
        .history
        .lock()
        .map_err(|_| AppError::InternalError("bet history lock poisoned".to_string()))
}

fn persist(state: &AppState, history: &BetHistory) -> Result<(), AppError> {
    if let Some(path) = &state.history_path {
        history.save(path)?;
    }
    Ok(())
}

/// List saved bets
pub async fn list_bets(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let history = lock_history(&state)?;
    let bets: Vec<_> = history.iter().collect();

    Ok(HttpResponse::Ok().json(bets))
}

/// Save a calculated bet
pub async fn save_bet(
    state: web::Data<Arc<AppState>>,
    req: web::Json<SaveBetRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let mut history = lock_history(&state)?;
    let record = history
        .record(req.race, req.selection, req.breakdown)?
        .clone();
    persist(&state, &history)?;

    Ok(HttpResponse::Created().json(record))
}

/// Record the result of a saved bet
pub async fn settle_bet(
    state: web::Data<Arc<AppState>>,
    path: web::Path<u64>,
    req: web::Json<SettleRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let mut history = lock_history(&state)?;
    let record = history.settle(id, req.into_inner())?.clone();
    persist(&state, &history)?;

    Ok(HttpResponse::Ok().json(record))
}

/// Hit rate, ROI and drawdown over settled bets
pub async fn bet_summary(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let history = lock_history(&state)?;

    Ok(HttpResponse::Ok().json(history.summary()))
}
