//! Tunable constants for matches and the AI opponent.

use serde::{Deserialize, Serialize};

const DEFAULT_HAND_SIZE: usize = 5;
const DEFAULT_FIELD_SIZE: usize = 5;
const DEFAULT_MOMENTUM_THRESHOLD: usize = 3;
const DEFAULT_WINNING_SCORE: u32 = 10;
const DEFAULT_LOG_CAPACITY: usize = 40;
const DEFAULT_STARTER_DECK_SIZE: usize = 20;

/// Rules of a single match. Stored inside the match state so a restored
/// snapshot keeps playing under the rules it was created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchConfig {
    pub hand_size: usize,
    pub field_size: usize,
    /// Flipped cards on one field that hand the other side an automatic goal.
    pub momentum_threshold: usize,
    pub winning_score: u32,
    pub log_capacity: usize,
    /// Size of the deck generated when `init_match` gets no player deck.
    pub starter_deck_size: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            hand_size: DEFAULT_HAND_SIZE,
            field_size: DEFAULT_FIELD_SIZE,
            momentum_threshold: DEFAULT_MOMENTUM_THRESHOLD,
            winning_score: DEFAULT_WINNING_SCORE,
            log_capacity: DEFAULT_LOG_CAPACITY,
            starter_deck_size: DEFAULT_STARTER_DECK_SIZE,
        }
    }
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Flipped count at which a side is one duel away from conceding.
    pub fn momentum_danger(&self) -> usize {
        self.momentum_threshold.saturating_sub(1)
    }
}

/// Heuristic weights and pacing for the AI opponent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// The snapshot must be stable this long before the AI reacts.
    pub debounce_ms: u64,
    /// Minimum gap between two AI actions.
    pub cooldown_ms: u64,
    /// After this long on an unchanged snapshot the AI reacts again.
    pub stall_retry_ms: u64,
    pub play_floor: i32,
    pub attack_floor: i32,
    pub defensive_urgency_bonus: i32,
    pub striker_counter_bonus: i32,
    pub synergy_bonus: i32,
    pub flipped_card_penalty: i32,
    pub endgame_conservation_penalty: i32,
    pub boost_reserve_penalty: i32,
    /// Deck size at or below which a leading side starts conserving.
    pub thin_deck: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            cooldown_ms: 1_000,
            stall_retry_ms: 4_000,
            play_floor: 10,
            attack_floor: 20,
            defensive_urgency_bonus: 100,
            striker_counter_bonus: 30,
            synergy_bonus: 15,
            flipped_card_penalty: 40,
            endgame_conservation_penalty: 25,
            boost_reserve_penalty: 20,
            thin_deck: 3,
        }
    }
}

impl AiConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
