//! Pacing for an AI-driven side: reacts to published snapshots only once
//! they have settled, and never faster than the configured cooldown.

use std::sync::Arc;

use tokio::sync::watch;

use super::heuristic::{AiAgent, AiDecision, GameAction};
use crate::config::AiConfig;
use crate::game::{MatchState, Side};

#[derive(Debug, Clone)]
pub struct AiController {
    side: Side,
    agent: AiAgent,
    /// Fingerprint currently being debounced and when it was first seen.
    pending: Option<(u64, u64)>,
    acted_on: Option<u64>,
    last_action_ms: Option<u64>,
}

impl AiController {
    pub fn new(side: Side, config: AiConfig) -> Self {
        Self {
            side,
            agent: AiAgent::new(config),
            pending: None,
            acted_on: None,
            last_action_ms: None,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn agent(&self) -> &AiAgent {
        &self.agent
    }

    /// Returns a decision once `state` has been stable for the debounce
    /// window and the cooldown since the previous action has elapsed.
    pub fn poll(&mut self, state: &MatchState, now_ms: u64) -> Option<AiDecision> {
        if state.turn != self.side || state.paused || state.is_finished() {
            self.pending = None;
            return None;
        }

        let config = self.agent.config();
        let fingerprint = state.fingerprint();
        let first_seen = match self.pending {
            Some((pending, since)) if pending == fingerprint => since,
            _ => {
                self.pending = Some((fingerprint, now_ms));
                now_ms
            }
        };
        if now_ms.saturating_sub(first_seen) < config.debounce_ms {
            return None;
        }

        let since_last = self
            .last_action_ms
            .map(|last| now_ms.saturating_sub(last))
            .unwrap_or(u64::MAX);
        if since_last < config.cooldown_ms {
            return None;
        }

        let decision = if self.acted_on == Some(fingerprint) {
            // Our previous action left the snapshot untouched.
            if since_last < config.stall_retry_ms {
                return None;
            }
            log::warn!("ai {}: no progress after {since_last} ms, passing", self.side);
            AiDecision {
                side: self.side,
                action: GameAction::Pass,
                score: 0,
                reason: "stall recovery".to_string(),
            }
        } else {
            self.agent.decide(state, self.side)
        };

        self.acted_on = Some(fingerprint);
        self.last_action_ms = Some(now_ms);
        Some(decision)
    }

    /// Polls against the latest snapshot published on `receiver`.
    pub fn observe(
        &mut self,
        receiver: &mut watch::Receiver<Arc<MatchState>>,
        now_ms: u64,
    ) -> Option<AiDecision> {
        let snapshot: Arc<MatchState> = receiver.borrow_and_update().clone();
        self.poll(&snapshot, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::fixtures::{blank_state, card, place};
    use crate::game::Position;

    fn ai_turn() -> MatchState {
        let mut state = blank_state();
        state.turn = Side::Opponent;
        state.opponent.hand.push(card(1, Position::CM, 6));
        place(&mut state, Side::Player, card(10, Position::CB, 6));
        state
    }

    #[test]
    fn waits_for_the_debounce_window() {
        let state = ai_turn();
        let mut controller = AiController::new(Side::Opponent, AiConfig::default());
        assert!(controller.poll(&state, 1_000).is_none());
        assert!(controller.poll(&state, 1_499).is_none());
        let decision = controller.poll(&state, 1_500).expect("settled snapshot");
        assert_eq!(decision.action, GameAction::Play { hand_index: 0 });
    }

    #[test]
    fn a_changed_snapshot_restarts_the_debounce() {
        let mut state = ai_turn();
        let mut controller = AiController::new(Side::Opponent, AiConfig::default());
        assert!(controller.poll(&state, 0).is_none());
        state.opponent.hand.push(card(2, Position::ST, 7));
        assert!(controller.poll(&state, 400).is_none());
        assert!(controller.poll(&state, 600).is_none());
        assert!(controller.poll(&state, 900).is_some());
    }

    #[test]
    fn stays_idle_off_turn_and_while_paused() {
        let mut state = ai_turn();
        let mut controller = AiController::new(Side::Player, AiConfig::default());
        assert!(controller.poll(&state, 0).is_none());
        assert!(controller.poll(&state, 10_000).is_none());

        state.paused = true;
        let mut opponent = AiController::new(Side::Opponent, AiConfig::default());
        assert!(opponent.poll(&state, 0).is_none());
        assert!(opponent.poll(&state, 10_000).is_none());
    }

    #[test]
    fn cooldown_then_stall_recovery() {
        let config = AiConfig::default();
        let mut state = ai_turn();
        let mut controller = AiController::new(Side::Opponent, config.clone());
        controller.poll(&state, 0);
        assert!(controller.poll(&state, 500).is_some());

        // Same snapshot: nothing happened, so only the stall timer can fire.
        assert!(controller.poll(&state, 2_000).is_none());
        let retry = controller
            .poll(&state, 500 + config.stall_retry_ms)
            .expect("stall retry");
        assert_eq!(retry.action, GameAction::Pass);

        state.opponent.hand.push(card(3, Position::GK, 7));
        let now = 500 + config.stall_retry_ms;
        assert!(controller.poll(&state, now + 500).is_none(), "debounce");
        assert!(controller.poll(&state, now + 1_000).is_some());
    }

    #[test]
    fn observes_the_watch_channel() {
        let (tx, mut rx) = watch::channel(Arc::new(blank_state()));
        let mut controller = AiController::new(Side::Opponent, AiConfig::default());
        assert!(controller.observe(&mut rx, 0).is_none());

        tx.send_replace(Arc::new(ai_turn()));
        assert!(rx.has_changed().unwrap_or(false));
        assert!(controller.observe(&mut rx, 100).is_none());
        assert!(!rx.has_changed().unwrap_or(true));
        assert!(controller.observe(&mut rx, 600).is_some());
    }
}
