//! Match engine: state, bonus engine, rules and combat resolution.

pub mod catalog;
pub mod combat;
pub mod effects;
pub mod rules;
pub mod state;

pub use effects::{compute_power, power_bonus, BonusSource, FieldView, PowerBonus, Role};
pub use rules::{RuleEngine, RuleError, RuleResolution};
pub use state::{
    Card, CardId, DuelOutcome, EffectTag, GoalReason, GoalRecord, InstanceId, IntegrityError,
    LogEntry, MatchEvent, MatchState, Phase, Position, Side, SideState, Winner,
};
