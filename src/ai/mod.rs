//! Heuristic opponent and the pacing that drives it.

pub mod controller;
pub mod heuristic;

pub use controller::AiController;
pub use heuristic::{decide, AiAgent, AiDecision, AiError, GameAction};
