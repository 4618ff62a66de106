//! One match session. Actions run against a private copy of the current
//! snapshot; the copy replaces the snapshot only when the action succeeds, and
//! every replacement is published to subscribers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::ai::{AiDecision, GameAction};
use crate::config::MatchConfig;
use crate::game::{
    Card, InstanceId, LogEntry, MatchState, RuleEngine, RuleError, RuleResolution, Side,
};
use crate::utils;

pub struct MatchEngine {
    rules: RuleEngine,
    config: MatchConfig,
    state: Arc<MatchState>,
    publisher: watch::Sender<Arc<MatchState>>,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self::with_rules(config, RuleEngine::new())
    }

    /// Deterministic shuffles and starter decks.
    pub fn with_seed(config: MatchConfig, seed: u64) -> Self {
        Self::with_rules(config, RuleEngine::with_seed(seed))
    }

    fn with_rules(config: MatchConfig, rules: RuleEngine) -> Self {
        let state = Arc::new(MatchState::new(config.clone(), "Player", "Opponent"));
        let (publisher, _) = watch::channel(Arc::clone(&state));
        Self {
            rules,
            config,
            state,
            publisher,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Current snapshot. Cheap: the state is shared, never copied.
    pub fn snapshot(&self) -> Arc<MatchState> {
        Arc::clone(&self.state)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<MatchState>> {
        self.publisher.subscribe()
    }

    /// Starts a fresh match, replacing whatever was in progress. A missing
    /// player deck is filled from the starter catalog.
    pub fn init_match(
        &mut self,
        opponent_deck: Vec<Card>,
        player_deck: Option<Vec<Card>>,
        player_name: &str,
        opponent_name: &str,
    ) -> RuleResolution {
        match self.rules.init_match(
            self.config.clone(),
            opponent_deck,
            player_deck,
            player_name,
            opponent_name,
        ) {
            Ok(state) => {
                let events: Vec<LogEntry> = state.log.iter().rev().cloned().collect();
                self.publish(state);
                RuleResolution::new(&self.state, events)
            }
            Err(error) => {
                log::warn!("init_match rejected: {error}");
                RuleResolution::rejected(&self.state, error)
            }
        }
    }

    pub fn play_card(&mut self, hand_index: usize, side: Side) -> RuleResolution {
        self.apply("play_card", |rules, state| rules.play_card(state, hand_index, side))
    }

    pub fn declare_attack(&mut self, instance_id: InstanceId, side: Side) -> RuleResolution {
        self.apply("declare_attack", |rules, state| {
            rules.declare_attack(state, instance_id, side)
        })
    }

    pub fn choose_blocker(
        &mut self,
        instance_id: InstanceId,
        boost: Option<InstanceId>,
    ) -> RuleResolution {
        self.apply("choose_blocker", |rules, state| {
            rules.choose_blocker(state, instance_id, boost)
        })
    }

    pub fn pass(&mut self, side: Side) -> RuleResolution {
        self.apply("pass", |rules, state| rules.pass(state, side))
    }

    pub fn resume_game(&mut self) -> RuleResolution {
        self.apply("resume_game", |rules, state| rules.resume_game(state))
    }

    pub fn force_end(&mut self) -> RuleResolution {
        self.apply("force_end", |rules, state| rules.force_end(state))
    }

    /// Feeds an AI decision through the same entry points a human uses. A
    /// block decided for the wrong side is rejected like any other action.
    pub fn apply_decision(&mut self, decision: &AiDecision) -> RuleResolution {
        let side = decision.side;
        match decision.action {
            GameAction::Play { hand_index } => self.play_card(hand_index, side),
            GameAction::Attack { instance_id } => self.declare_attack(instance_id, side),
            GameAction::Block { instance_id, boost } => {
                if self.state.turn != side {
                    return RuleResolution::rejected(&self.state, RuleError::NotSideTurn { side });
                }
                self.choose_blocker(instance_id, boost)
            }
            GameAction::Pass => self.pass(side),
        }
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self.state.as_ref())
    }

    /// Replaces the session with a persisted snapshot. The snapshot's own
    /// config wins over the one the engine was built with.
    pub fn restore_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let state: MatchState = serde_json::from_str(json)?;
        self.config = state.config.clone();
        self.publish(state);
        Ok(())
    }

    fn apply<F>(&mut self, action: &str, handler: F) -> RuleResolution
    where
        F: FnOnce(&mut RuleEngine, &mut MatchState) -> Result<Vec<LogEntry>, RuleError>,
    {
        let mut next = MatchState::clone(&self.state);
        self.rules.stamp(utils::now_ms());
        match handler(&mut self.rules, &mut next) {
            Ok(events) => {
                self.publish(next);
                RuleResolution::new(&self.state, events)
            }
            Err(error) if error.is_integrity() => {
                log::warn!("{action}: {error}; restarting the turn");
                let mut recovered = MatchState::clone(&self.state);
                let events = RuleEngine::recover_from_fault(&mut recovered, &error.to_string());
                self.publish(recovered);
                RuleResolution {
                    rejected: Some(error),
                    ..RuleResolution::new(&self.state, events)
                }
            }
            Err(error) => {
                log::debug!("{action} ignored: {error}");
                RuleResolution::rejected(&self.state, error)
            }
        }
    }

    fn publish(&mut self, state: MatchState) {
        self.state = Arc::new(state);
        self.publisher.send_replace(Arc::clone(&self.state));
    }
}
