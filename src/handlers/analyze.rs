use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;
use clickpunter::core::odds::cents_to_dollars;
use clickpunter::core::{Strategy, StrategyKind};
use clickpunter::error::{validate_runner_count, AppError};
use clickpunter::models::{AnalyzeRequest, AnalyzeResponse, CalculateRequest, StrategySummary};

/// List strategy presets
pub async fn list_strategies() -> Result<HttpResponse, AppError> {
    let mut strategies = StrategyKind::PRESETS
        .iter()
        .map(|&kind| -> Result<StrategySummary, AppError> {
            let strategy = Strategy::preset(kind)?;
            Ok(StrategySummary {
                kind,
                budget: cents_to_dollars(strategy.budget_cents),
                description: strategy.description(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    strategies.push(StrategySummary {
        kind: StrategyKind::Custom,
        budget: 0.0,
        description: "Your budget split between trifecta and quinella flexi boxes".to_string(),
    });

    Ok(HttpResponse::Ok().json(strategies))
}

/// Classify a race, optionally calculating stakes for the selection
pub async fn analyze_race(
    state: web::Data<Arc<AppState>>,
    req: web::Json<AnalyzeRequest>,
) -> Result<HttpResponse, AppError> {
    validate_runner_count(req.runners.len())?;

    let mut analysis = state.classifier.analyze(&req.race, &req.runners)?;
    info!(
        "Analyzed {}: {} of 3 roles filled",
        analysis.race.label(),
        analysis.selection.filled_count()
    );

    let breakdown = match &req.strategy {
        Some(strategy_req) => {
            let strategy = Strategy::from_request(strategy_req)?;
            match state.calculator.calculate(&analysis.selection, &strategy) {
                Ok(b) => Some(b),
                Err(e) => {
                    // The analysis is still useful without stakes
                    warn!("No stakes for {}: {}", analysis.race.label(), e);
                    analysis.warnings.push(format!("Stakes not calculated: {}", e));
                    None
                }
            }
        }
        None => None,
    };

    Ok(HttpResponse::Ok().json(AnalyzeResponse {
        analysis,
        breakdown,
    }))
}

/// Calculate stakes for a selection
pub async fn calculate_stakes(
    state: web::Data<Arc<AppState>>,
    req: web::Json<CalculateRequest>,
) -> Result<HttpResponse, AppError> {
    let strategy = Strategy::from_request(&req.strategy)?;
    let breakdown = state.calculator.calculate(&req.selection, &strategy)?;

    Ok(HttpResponse::Ok().json(breakdown))
}
