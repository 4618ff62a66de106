use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    catalog,
    combat,
    effects,
    state::{
        Card, GoalReason, InstanceId, IntegrityError, LogEntry, MatchEvent, MatchState, Phase,
        Side, Winner,
    },
};
use crate::config::MatchConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum RuleError {
    #[error("the match is over")]
    GameFinished,
    #[error("waiting for the presentation layer to resume")]
    Paused,
    #[error("nothing to resume")]
    NotPaused,
    #[error("it is not {side}'s turn")]
    NotSideTurn { side: Side },
    #[error("expected phase {expected:?}, found {actual:?}")]
    InvalidPhase { expected: Phase, actual: Phase },
    #[error("the principal action of this turn is already used")]
    ActionAlreadyUsed,
    #[error("no card at hand index {index}")]
    InvalidHandIndex { index: usize },
    #[error("no free field slot")]
    FieldFull,
    #[error("card {instance_id} not found")]
    CardNotFound { instance_id: InstanceId },
    #[error("card {instance_id} is flipped")]
    CardFlipped { instance_id: InstanceId },
    #[error("card {instance_id} has already acted")]
    CardSpent { instance_id: InstanceId },
    #[error("card {instance_id} is not a reinforcement")]
    NotABoost { instance_id: InstanceId },
    #[error("{side} deck is empty")]
    EmptyDeck { side: Side },
    #[error("invalid match config: {reason}")]
    InvalidConfig { reason: String },
    #[error("integrity violation: {error}")]
    IntegrityViolation { error: IntegrityError },
}

impl RuleError {
    /// Faults that leave the match unable to continue from where it stands.
    pub fn is_integrity(&self) -> bool {
        matches!(self, RuleError::IntegrityViolation { .. })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleResolution {
    /// Log entries produced by the action, oldest first.
    pub events: Vec<LogEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<RuleError>,
}

impl RuleResolution {
    pub fn new(state: &MatchState, events: Vec<LogEntry>) -> Self {
        Self {
            events,
            winner: state.winner,
            rejected: None,
        }
    }

    pub fn rejected(state: &MatchState, error: RuleError) -> Self {
        Self {
            events: Vec::new(),
            winner: state.winner,
            rejected: Some(error),
        }
    }

    pub fn is_applied(&self) -> bool {
        self.rejected.is_none()
    }
}

/// Turn, phase and zone transitions. Every handler validates before it touches
/// the state, so an `Err` always means nothing changed.
pub struct RuleEngine {
    rng: SmallRng,
    timestamp_ms: u64,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            timestamp_ms: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            timestamp_ms: 0,
        }
    }

    /// Wall-clock time recorded on goals produced by the next action.
    pub fn stamp(&mut self, timestamp_ms: u64) {
        self.timestamp_ms = timestamp_ms;
    }

    fn ensure_live(state: &MatchState) -> Result<(), RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if state.paused {
            return Err(RuleError::Paused);
        }
        Ok(())
    }

    fn ensure_phase(state: &MatchState, expected: Phase) -> Result<(), RuleError> {
        if state.phase != expected {
            return Err(RuleError::InvalidPhase {
                expected,
                actual: state.phase,
            });
        }
        Ok(())
    }

    fn ensure_turn_owner(state: &MatchState, side: Side) -> Result<(), RuleError> {
        if state.turn != side {
            return Err(RuleError::NotSideTurn { side });
        }
        Ok(())
    }

    fn ensure_action_available(state: &MatchState) -> Result<(), RuleError> {
        if state.has_action_used {
            return Err(RuleError::ActionAlreadyUsed);
        }
        Ok(())
    }

    fn ensure_integrity(state: &MatchState) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })
    }

    /// Entries recorded after `since`, oldest first.
    fn events_since(state: &MatchState, since: u64) -> Vec<LogEntry> {
        state
            .log
            .iter()
            .rev()
            .filter(|entry| entry.seq > since)
            .cloned()
            .collect()
    }

    pub fn init_match(
        &mut self,
        config: MatchConfig,
        opponent_deck: Vec<Card>,
        player_deck: Option<Vec<Card>>,
        player_name: &str,
        opponent_name: &str,
    ) -> Result<MatchState, RuleError> {
        if config.hand_size == 0 || config.field_size == 0 || config.momentum_threshold == 0 {
            return Err(RuleError::InvalidConfig {
                reason: "hand, field and momentum sizes must be positive".into(),
            });
        }
        if opponent_deck.is_empty() {
            return Err(RuleError::EmptyDeck {
                side: Side::Opponent,
            });
        }
        let player_deck = match player_deck {
            Some(deck) if deck.is_empty() => {
                return Err(RuleError::EmptyDeck { side: Side::Player })
            }
            Some(deck) => deck,
            None => catalog::starter_deck(&mut self.rng, config.starter_deck_size),
        };

        let mut state = MatchState::new(config, player_name, opponent_name);
        let mut next_instance: InstanceId = 1;
        for (side, deck) in [(Side::Player, player_deck), (Side::Opponent, opponent_deck)] {
            let mut cards: Vec<Card> = deck
                .into_iter()
                .map(|mut card| {
                    card.instance_id = next_instance;
                    card.is_flipped = false;
                    card.has_acted = false;
                    next_instance += 1;
                    card
                })
                .collect();
            cards.shuffle(&mut self.rng);
            state.side_mut(side).deck = cards;
        }

        let hand_size = state.config.hand_size;
        state.opponent.draw_up_to(hand_size);
        state.record(MatchEvent::MatchStarted {
            player: state.player.name.clone(),
            opponent: state.opponent.name.clone(),
        });
        log::info!(
            "match started: {} vs {}",
            state.player.name,
            state.opponent.name
        );
        Self::start_turn(&mut state, Side::Player);
        Ok(state)
    }

    pub fn play_card(
        &mut self,
        state: &mut MatchState,
        hand_index: usize,
        side: Side,
    ) -> Result<Vec<LogEntry>, RuleError> {
        Self::ensure_live(state)?;
        Self::ensure_phase(state, Phase::Main)?;
        Self::ensure_turn_owner(state, side)?;
        Self::ensure_action_available(state)?;

        let own = state.side(side);
        if hand_index >= own.hand.len() {
            return Err(RuleError::InvalidHandIndex { index: hand_index });
        }
        let slot = own.free_slot().ok_or(RuleError::FieldFull)?;

        let since = state.log_seq;
        let own = state.side_mut(side);
        let mut card = own.hand.remove(hand_index);
        card.is_flipped = false;
        card.has_acted = false;
        let instance_id = card.instance_id;
        let name = card.name.clone();
        own.field[slot] = Some(card);
        state.has_action_used = true;
        state.record(MatchEvent::CardPlayed {
            side,
            instance_id,
            name,
            slot,
        });

        if effects::on_card_played(state, side, instance_id).is_none() {
            Self::complete_exchange(state, side, side.other());
        }
        Ok(Self::events_since(state, since))
    }

    pub fn declare_attack(
        &mut self,
        state: &mut MatchState,
        instance_id: InstanceId,
        side: Side,
    ) -> Result<Vec<LogEntry>, RuleError> {
        Self::ensure_live(state)?;
        Self::ensure_phase(state, Phase::Main)?;
        Self::ensure_turn_owner(state, side)?;
        Self::ensure_action_available(state)?;

        let card = state
            .side(side)
            .find_on_field(instance_id)
            .ok_or(RuleError::CardNotFound { instance_id })?;
        if card.is_flipped {
            return Err(RuleError::CardFlipped { instance_id });
        }
        if card.has_acted {
            return Err(RuleError::CardSpent { instance_id });
        }

        let since = state.log_seq;
        if let Some(card) = state.side_mut(side).find_on_field_mut(instance_id) {
            card.has_acted = true;
        }
        state.has_action_used = true;
        let defenders = state.side(side.other()).visible_count();
        state.record(MatchEvent::AttackDeclared {
            side,
            instance_id,
            defenders,
        });

        if defenders == 0 {
            combat::resolve_goal(state, side, instance_id, GoalReason::OpenGoal, self.timestamp_ms);
            Self::complete_exchange(state, side, side.other());
        } else {
            state.attacker_instance_id = Some(instance_id);
            state.phase = Phase::AttackDeclared;
            state.turn = side.other();
        }
        Ok(Self::events_since(state, since))
    }

    pub fn choose_blocker(
        &mut self,
        state: &mut MatchState,
        instance_id: InstanceId,
        boost: Option<InstanceId>,
    ) -> Result<Vec<LogEntry>, RuleError> {
        Self::ensure_live(state)?;
        Self::ensure_phase(state, Phase::AttackDeclared)?;
        Self::ensure_integrity(state)?;

        let defender = state.turn;
        let since = state.log_seq;
        combat::resolve_block(state, defender, instance_id, boost, self.timestamp_ms)?;
        Self::complete_exchange(state, defender.other(), defender);
        Ok(Self::events_since(state, since))
    }

    /// Gives up the rest of the turn. A defender passing on a declared attack
    /// leaves the attacker unopposed.
    pub fn pass(&mut self, state: &mut MatchState, side: Side) -> Result<Vec<LogEntry>, RuleError> {
        Self::ensure_live(state)?;
        Self::ensure_turn_owner(state, side)?;

        let since = state.log_seq;
        match state.phase {
            Phase::Main => {
                state.record(MatchEvent::Passed { side });
                Self::complete_exchange(state, side, side.other());
            }
            Phase::AttackDeclared => {
                Self::ensure_integrity(state)?;
                let attacker_side = side.other();
                let attacker = state
                    .attacker_instance_id
                    .ok_or(RuleError::IntegrityViolation {
                        error: IntegrityError::DanglingAttacker { instance_id: None },
                    })?;
                state.record(MatchEvent::Passed { side });
                combat::resolve_goal(
                    state,
                    attacker_side,
                    attacker,
                    GoalReason::OpenGoal,
                    self.timestamp_ms,
                );
                Self::complete_exchange(state, attacker_side, side);
            }
            Phase::GameOver => return Err(RuleError::GameFinished),
        }
        Ok(Self::events_since(state, since))
    }

    /// Releases the gate raised by a goal and starts the pending turn.
    pub fn resume_game(&mut self, state: &mut MatchState) -> Result<Vec<LogEntry>, RuleError> {
        if !state.paused {
            return Err(RuleError::NotPaused);
        }
        let since = state.log_seq;
        state.paused = false;
        state.foul_marker = None;
        if state.is_finished() {
            return Ok(Vec::new());
        }
        if Self::check_match_over(state, false).is_none() {
            let next = state.turn;
            Self::start_turn(state, next);
        }
        Ok(Self::events_since(state, since))
    }

    pub fn force_end(&mut self, state: &mut MatchState) -> Result<Vec<LogEntry>, RuleError> {
        if state.is_finished() {
            return Err(RuleError::GameFinished);
        }
        let since = state.log_seq;
        Self::check_match_over(state, true);
        Ok(Self::events_since(state, since))
    }

    pub fn start_turn(state: &mut MatchState, side: Side) {
        state.turn = side;
        state.phase = Phase::Main;
        state.attacker_instance_id = None;
        state.has_action_used = false;
        state.meneur_active = false;
        state.foul_marker = None;
        state.turn_number += 1;

        let hand_size = state.config.hand_size;
        let own = state.side_mut(side);
        own.ready_field();
        let drawn = own.draw_up_to(hand_size);
        state.record(MatchEvent::TurnStarted { side, drawn });

        if state.side(side).out_of_resources() {
            let acting = side.other();
            if state.stoppage_time_action != Some(acting) {
                state.stoppage_time_action = Some(acting);
                state.record(MatchEvent::StoppageTime {
                    starved: side,
                    acting,
                });
                log::info!("stoppage time: {side} is out of cards, {acting} finishes the match");
            }
            Self::check_match_over(state, false);
        }
    }

    /// Ends the match when forced, when both sides are spent, or when a side
    /// reaches the winning score.
    pub fn check_match_over(state: &mut MatchState, forced: bool) -> Option<Winner> {
        if state.is_finished() {
            return state.winner;
        }
        let both_spent = state.player.out_of_resources() && state.opponent.out_of_resources();
        let winning_score = state.config.winning_score;
        let reached = state.player.score >= winning_score || state.opponent.score >= winning_score;
        if !(forced || both_spent || reached) {
            return None;
        }

        let winner = match state.player.score.cmp(&state.opponent.score) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Opponent,
            std::cmp::Ordering::Equal => Winner::Draw,
        };
        state.winner = Some(winner);
        state.phase = Phase::GameOver;
        state.attacker_instance_id = None;
        state.record(MatchEvent::MatchOver { winner, forced });
        log::info!(
            "match over ({:?}): {} {} - {} {}",
            winner,
            state.player.name,
            state.player.score,
            state.opponent.score,
            state.opponent.name
        );
        Some(winner)
    }

    /// Puts a match whose in-flight attack can no longer resolve back into a
    /// playable position: the side holding the turn starts afresh.
    pub fn recover_from_fault(state: &mut MatchState, reason: &str) -> Vec<LogEntry> {
        let since = state.log_seq;
        state.phase = Phase::Main;
        state.attacker_instance_id = None;
        state.record(MatchEvent::FaultRecovered {
            reason: reason.to_string(),
        });
        if !state.is_finished() && !state.paused {
            let next = state.turn;
            Self::start_turn(state, next);
        }
        Self::events_since(state, since)
    }

    fn complete_exchange(state: &mut MatchState, initiator: Side, next: Side) {
        if state.is_finished() {
            return;
        }
        if state.stoppage_time_action == Some(initiator) {
            Self::check_match_over(state, true);
            return;
        }
        if state.paused {
            return;
        }
        Self::start_turn(state, next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::fixtures::{blank_state, card, place};
    use crate::game::state::{EffectTag, Position};

    fn deck(prefix: u32, len: u32) -> Vec<Card> {
        (0..len)
            .map(|n| Card::new(prefix + n, format!("Card {n}"), Position::CM, 5 + (n % 5) as u8))
            .collect()
    }

    fn live_state() -> MatchState {
        let mut state = blank_state();
        state.turn_number = 1;
        state
    }

    #[test]
    fn init_match_deals_hands_and_numbers_instances() {
        let mut engine = RuleEngine::with_seed(7);
        let state = engine
            .init_match(MatchConfig::default(), deck(100, 12), Some(deck(200, 12)), "Home", "Away")
            .expect("init should succeed");

        assert_eq!(state.turn, Side::Player);
        assert_eq!(state.phase, Phase::Main);
        assert_eq!(state.player.hand.len(), 5);
        assert_eq!(state.opponent.hand.len(), 5);
        assert_eq!(state.player.total_cards(), 12);
        assert_eq!(state.opponent.total_cards(), 12);
        assert!(state.integrity_check().is_ok());
    }

    #[test]
    fn init_match_generates_a_player_deck_when_missing() {
        let mut engine = RuleEngine::with_seed(11);
        let config = MatchConfig::default();
        let state = engine
            .init_match(config.clone(), deck(100, 10), None, "Home", "Away")
            .expect("init should succeed");
        assert_eq!(state.player.total_cards(), config.starter_deck_size);
    }

    #[test]
    fn play_card_passes_the_turn() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        state.player.hand.push(card(1, Position::CB, 6));
        state.player.hand.push(card(2, Position::ST, 7));
        state.opponent.hand.push(card(3, Position::GK, 5));

        engine
            .play_card(&mut state, 0, Side::Player)
            .expect("play should succeed");
        assert_eq!(state.turn, Side::Opponent);
        assert_eq!(state.phase, Phase::Main);
        assert!(state.player.find_on_field(1).is_some());
        assert!(!state.has_action_used, "new turn resets the action flag");
    }

    #[test]
    fn play_card_rejects_stale_requests_without_changes() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        state.player.hand.push(card(1, Position::CB, 6));
        let before = state.clone();

        assert_eq!(
            engine.play_card(&mut state, 0, Side::Opponent),
            Err(RuleError::NotSideTurn {
                side: Side::Opponent
            })
        );
        assert_eq!(
            engine.play_card(&mut state, 3, Side::Player),
            Err(RuleError::InvalidHandIndex { index: 3 })
        );
        for n in 0..5 {
            place(&mut state, Side::Player, card(10 + n, Position::GK, 5));
        }
        assert_eq!(engine.play_card(&mut state, 0, Side::Player), Err(RuleError::FieldFull));
        state.player.field = before.player.field.clone();
        assert_eq!(state, before);
    }

    #[test]
    fn meneur_keeps_the_turn_for_the_forward() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        place(&mut state, Side::Player, card(1, Position::ST, 7));
        place(&mut state, Side::Opponent, card(5, Position::GK, 5));
        state
            .player
            .hand
            .push(card(2, Position::CAM, 6).with_effect(EffectTag::Meneur));

        engine
            .play_card(&mut state, 0, Side::Player)
            .expect("play should succeed");
        assert_eq!(state.turn, Side::Player);
        assert!(state.meneur_active);

        assert_eq!(
            engine.declare_attack(&mut state, 2, Side::Player),
            Err(RuleError::CardSpent { instance_id: 2 })
        );
        engine
            .declare_attack(&mut state, 1, Side::Player)
            .expect("forward may use the extra action");
        assert_eq!(state.phase, Phase::AttackDeclared);
        assert_eq!(state.turn, Side::Opponent);
    }

    #[test]
    fn attack_without_defenders_scores_immediately() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        place(&mut state, Side::Player, card(1, Position::ST, 7));
        state.player.hand.push(card(2, Position::CM, 6));
        state.opponent.hand.push(card(3, Position::GK, 5));
        let mut beaten = card(9, Position::CB, 6);
        beaten.is_flipped = true;
        place(&mut state, Side::Opponent, beaten);

        engine
            .declare_attack(&mut state, 1, Side::Player)
            .expect("attack should succeed");

        assert_eq!(state.player.score, 1);
        assert_eq!(state.goals.len(), 1);
        assert_eq!(state.goals[0].reason, GoalReason::OpenGoal);
        assert!(state.player.find_on_field(1).is_none());
        assert_eq!(state.player.discard.len(), 1);
        assert_eq!(state.opponent.flipped_count(), 0, "clean sheet reset");
        assert!(state.paused);
        assert_eq!(state.turn, Side::Opponent);
    }

    #[test]
    fn paused_match_rejects_actions_until_resumed() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        place(&mut state, Side::Player, card(1, Position::ST, 7));
        state.opponent.deck.push(card(20, Position::GK, 5));
        engine
            .declare_attack(&mut state, 1, Side::Player)
            .expect("attack should succeed");

        assert_eq!(engine.pass(&mut state, Side::Opponent), Err(RuleError::Paused));
        engine.resume_game(&mut state).expect("resume should succeed");
        assert!(!state.paused);
        assert_eq!(state.turn, Side::Opponent);
        assert_eq!(state.opponent.hand.len(), 1, "turn start draws");
        assert_eq!(engine.resume_game(&mut state), Err(RuleError::NotPaused));
    }

    #[test]
    fn defender_passing_concedes_the_goal() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        place(&mut state, Side::Player, card(1, Position::ST, 7));
        place(&mut state, Side::Opponent, card(9, Position::CB, 6));
        state.opponent.hand.push(card(10, Position::GK, 5));

        engine.declare_attack(&mut state, 1, Side::Player).expect("attack");
        engine.pass(&mut state, Side::Opponent).expect("pass");
        assert_eq!(state.player.score, 1);
        assert_eq!(state.phase, Phase::Main);
        assert_eq!(state.attacker_instance_id, None);
    }

    #[test]
    fn drawn_block_clears_both_cards_and_hands_over_the_turn() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        place(&mut state, Side::Player, card(1, Position::CM, 7));
        state.player.hand.push(card(2, Position::GK, 5));
        place(&mut state, Side::Opponent, card(9, Position::CB, 6));
        state.opponent.hand.push(card(10, Position::GK, 5));

        engine.declare_attack(&mut state, 1, Side::Player).expect("attack");
        assert_eq!(state.turn, Side::Opponent);
        let events = engine
            .choose_blocker(&mut state, 9, None)
            .expect("block should succeed");

        assert!(events.iter().any(|entry| matches!(
            entry.event,
            MatchEvent::Duel {
                attack_total: 7,
                defend_total: 7,
                outcome: crate::game::state::DuelOutcome::Draw,
                ..
            }
        )));
        assert!(state.player.find_on_field(1).is_none());
        assert!(state.opponent.find_on_field(9).is_none());
        assert_eq!(state.player.discard.len(), 1);
        assert_eq!(state.opponent.discard.len(), 1);
        assert_eq!(state.turn, Side::Opponent);
        assert_eq!(state.phase, Phase::Main);
        assert_eq!(state.attacker_instance_id, None);
        assert!(!state.is_finished());
    }

    #[test]
    fn starved_side_hands_stoppage_time_to_its_opponent() {
        let mut state = live_state();
        state.opponent.hand.push(card(10, Position::GK, 5));
        place(&mut state, Side::Opponent, card(11, Position::CB, 6));
        place(&mut state, Side::Player, card(1, Position::ST, 7));

        RuleEngine::start_turn(&mut state, Side::Player);
        assert_eq!(state.stoppage_time_action, Some(Side::Opponent));
        assert!(!state.is_finished());

        let mut engine = RuleEngine::with_seed(1);
        engine.pass(&mut state, Side::Player).expect("starved side may pass");
        assert_eq!(state.turn, Side::Opponent);
        engine.pass(&mut state, Side::Opponent).expect("acting side finishes");
        assert_eq!(state.winner, Some(Winner::Draw));
        assert_eq!(state.phase, Phase::GameOver);
    }

    #[test]
    fn both_sides_spent_ends_the_match() {
        let mut state = live_state();
        state.opponent.score = 2;
        RuleEngine::start_turn(&mut state, Side::Player);
        assert_eq!(state.winner, Some(Winner::Opponent));
    }

    #[test]
    fn reaching_the_winning_score_ends_the_match() {
        let mut engine = RuleEngine::with_seed(1);
        let mut state = live_state();
        state.player.score = 9;
        place(&mut state, Side::Player, card(1, Position::ST, 7));
        state.player.hand.push(card(2, Position::CB, 6));
        state.opponent.hand.push(card(3, Position::GK, 6));

        engine.declare_attack(&mut state, 1, Side::Player).expect("attack");
        assert_eq!(state.winner, Some(Winner::Player));
        assert!(!state.paused);
        assert_eq!(
            engine.pass(&mut state, Side::Opponent),
            Err(RuleError::GameFinished)
        );
    }

    #[test]
    fn recover_from_fault_returns_to_main() {
        let mut state = live_state();
        state.phase = Phase::AttackDeclared;
        state.turn = Side::Opponent;
        state.attacker_instance_id = Some(42);
        state.opponent.hand.push(card(3, Position::GK, 6));
        place(&mut state, Side::Opponent, card(4, Position::CB, 6));

        let mut engine = RuleEngine::with_seed(1);
        let error = engine
            .choose_blocker(&mut state, 4, None)
            .expect_err("missing attacker must be reported");
        assert!(error.is_integrity());

        RuleEngine::recover_from_fault(&mut state, &error.to_string());
        assert_eq!(state.phase, Phase::Main);
        assert_eq!(state.attacker_instance_id, None);
        assert_eq!(state.turn, Side::Opponent);
    }
}
