pub mod analyze;
pub mod bets;
pub mod health;
