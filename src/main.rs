use actix_web::{middleware, web, App, HttpServer};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod handlers;

use clickpunter::core::{RoleClassifier, StakeCalculator};
use clickpunter::{BetHistory, Settings};
use handlers::{analyze, bets, health};

/// Application state shared across handlers
pub struct AppState {
    pub classifier: RoleClassifier,
    pub calculator: StakeCalculator,
    pub history: Mutex<BetHistory>,
    pub history_path: Option<PathBuf>,
}

fn log_level() -> Level {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse().ok())
        .unwrap_or(Level::INFO)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let settings_path = std::env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let settings = match Settings::load_or_default(settings_path.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to load settings: {}. Using defaults.", e);
            Settings::default()
        }
    };

    let history_path = std::env::var("HISTORY_PATH").ok().map(PathBuf::from);
    let history = match &history_path {
        Some(path) => BetHistory::load(path)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        None => {
            info!("HISTORY_PATH not set, bets are kept in memory only");
            BetHistory::new()
        }
    };
    info!("Loaded {} saved bets", history.len());

    let app_state = Arc::new(AppState {
        classifier: settings.classifier(),
        calculator: settings.calculator(),
        history: Mutex::new(history),
        history_path,
    });

    info!("Starting ClickPunter API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/strategies", web::get().to(analyze::list_strategies))
            .route("/analyze", web::post().to(analyze::analyze_race))
            .route("/calculate", web::post().to(analyze::calculate_stakes))
            .route("/bets", web::get().to(bets::list_bets))
            .route("/bets", web::post().to(bets::save_bet))
            .route("/bets/summary", web::get().to(bets::bet_summary))
            .route("/bets/{id}/result", web::post().to(bets::settle_bet))
    })
    .bind(&addr)?
    .run()
    .await
}
