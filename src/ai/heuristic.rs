use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiConfig;
use crate::game::{
    compute_power, Card, EffectTag, InstanceId, MatchState, Phase, Position, Role, Side,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameAction {
    Play {
        hand_index: usize,
    },
    Attack {
        instance_id: InstanceId,
    },
    Block {
        instance_id: InstanceId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        boost: Option<InstanceId>,
    },
    Pass,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub side: Side,
    pub action: GameAction,
    pub score: i32,
    pub reason: String,
}

impl AiDecision {
    fn new(side: Side, action: GameAction, score: i32, reason: impl Into<String>) -> Self {
        Self {
            side,
            action,
            score,
            reason: reason.into(),
        }
    }

    fn pass(side: Side, reason: impl Into<String>) -> Self {
        Self::new(side, GameAction::Pass, 0, reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
    #[error("the match is over")]
    MatchFinished,
    #[error("the match is paused")]
    Paused,
    #[error("it is not {side}'s turn")]
    NotOurTurn { side: Side },
    #[error("declared attacker {instance_id:?} is not on the field")]
    MissingAttacker { instance_id: Option<InstanceId> },
}

/// Card a block candidate is judged by.
struct Blocker<'a> {
    card: &'a Card,
    total: u8,
}

#[derive(Debug, Clone)]
pub struct AiAgent {
    config: AiConfig,
}

impl Default for AiAgent {
    fn default() -> Self {
        Self::new(AiConfig::default())
    }
}

impl AiAgent {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// Picks one action for `side`. Never fails: internal errors degrade to a pass.
    pub fn decide(&self, state: &MatchState, side: Side) -> AiDecision {
        match self.try_decide(state, side) {
            Ok(decision) => {
                log::debug!("ai {side}: {:?} ({})", decision.action, decision.reason);
                decision
            }
            Err(error) => {
                log::warn!("ai {side} fell back to pass: {error}");
                AiDecision::pass(side, format!("AI fallback: {error}"))
            }
        }
    }

    fn try_decide(&self, state: &MatchState, side: Side) -> Result<AiDecision, AiError> {
        if state.is_finished() {
            return Err(AiError::MatchFinished);
        }
        if state.paused {
            return Err(AiError::Paused);
        }
        if state.turn != side {
            return Err(AiError::NotOurTurn { side });
        }
        match state.phase {
            Phase::AttackDeclared => self.decide_block(state, side),
            Phase::Main => Ok(self.decide_main(state, side)),
            Phase::GameOver => Err(AiError::MatchFinished),
        }
    }

    fn decide_main(&self, state: &MatchState, side: Side) -> AiDecision {
        if state.has_action_used {
            return AiDecision::pass(side, "action already used");
        }
        let own = state.side(side);
        let opponent = state.side(side.other());
        let danger = state.config.momentum_danger();

        if opponent.visible_count() == 0 {
            let cheapest = own
                .eligible_attackers()
                .min_by_key(|card| card.power)
                .map(|card| card.instance_id);
            if let Some(instance_id) = cheapest {
                let action = GameAction::Attack { instance_id };
                return AiDecision::new(side, action, 1_000, "open goal");
            }
        }

        if opponent.flipped_count() >= danger {
            let strongest = own
                .eligible_attackers()
                .max_by_key(|card| {
                    (self.attack_total(state, side, card), Reverse(card.instance_id))
                });
            if let (Some(card), Some(weakest)) = (strongest, self.weakest_defender(state, side)) {
                if self.attack_total(state, side, card) >= weakest {
                    return AiDecision::new(
                        side,
                        GameAction::Attack {
                            instance_id: card.instance_id,
                        },
                        500,
                        "momentum finish",
                    );
                }
            }
        }

        let playable = self.best_play(state, side);
        let play = playable.filter(|(_, score)| *score > self.config.play_floor);
        let attack = self
            .best_attack(state, side)
            .filter(|(_, score)| *score > self.config.attack_floor);
        match (play, attack) {
            (Some((_, play_score)), Some((instance_id, attack_score)))
                if attack_score > play_score =>
            {
                return AiDecision::new(
                    side,
                    GameAction::Attack { instance_id },
                    attack_score,
                    "attack beats play",
                );
            }
            (Some((hand_index, score)), _) => {
                let action = GameAction::Play { hand_index };
                return AiDecision::new(side, action, score, "best play");
            }
            (None, Some((instance_id, score))) => {
                let action = GameAction::Attack { instance_id };
                return AiDecision::new(side, action, score, "best attack");
            }
            (None, None) => {}
        }

        // Nothing to play (empty hand or full field): an attack is the only way forward.
        if playable.is_none() {
            if let Some((instance_id, score)) = self.best_attack(state, side) {
                let action = GameAction::Attack { instance_id };
                return AiDecision::new(side, action, score, "forced attack");
            }
            return AiDecision::pass(side, "no legal action");
        }

        AiDecision::pass(side, "holding: every option scores below its floor")
    }

    /// Highest-scoring hand card, if one can be played at all.
    pub fn best_play(&self, state: &MatchState, side: Side) -> Option<(usize, i32)> {
        let own = state.side(side);
        if own.is_field_full() {
            return None;
        }
        own.hand
            .iter()
            .enumerate()
            .map(|(index, card)| (index, self.score_play(state, side, card)))
            .fold(None, |best, candidate| match best {
                Some((_, score)) if score >= candidate.1 => best,
                _ => Some(candidate),
            })
    }

    pub fn score_play(&self, state: &MatchState, side: Side, card: &Card) -> i32 {
        let config = &self.config;
        let own = state.side(side);
        let opponent = state.side(side.other());
        let mut score = i32::from(card.power) * 2 + 50;

        if card.position.is_defensive() && own.flipped_count() >= state.config.momentum_danger() {
            score += config.defensive_urgency_bonus;
        }
        if card.position == Position::CB
            && opponent.visible_cards().any(|c| c.position == Position::ST)
            && !own.visible_cards().any(|c| c.position == Position::CB)
        {
            score += config.striker_counter_bonus;
        }
        let synergy = (card.position.is_midfielder()
            && own.visible_cards().any(|c| c.position == Position::CM))
            || (card.position == Position::CM
                && own.visible_cards().any(|c| c.position.is_midfielder()));
        if synergy {
            score += config.synergy_bonus;
        }
        if card.is_flipped {
            score -= config.flipped_card_penalty;
        }
        if own.score > opponent.score
            && own.deck.len() <= config.thin_deck
            && !card.position.is_defensive()
        {
            score -= config.endgame_conservation_penalty;
        }
        if card.boost_value().is_some() && own.hand.len() > 1 {
            score -= config.boost_reserve_penalty;
        }
        score
    }

    /// Highest-scoring attacker among cards that may still act.
    pub fn best_attack(&self, state: &MatchState, side: Side) -> Option<(InstanceId, i32)> {
        state
            .side(side)
            .eligible_attackers()
            .map(|card| (card.instance_id, self.score_attack(state, side, card)))
            .fold(None, |best, candidate| match best {
                Some((_, score)) if score >= candidate.1 => best,
                _ => Some(candidate),
            })
    }

    pub fn score_attack(&self, state: &MatchState, side: Side, attacker: &Card) -> i32 {
        let opponent = state.side(side.other());
        let total = self.attack_total(state, side, attacker);
        let mut defenders: Vec<(u8, &Card)> = opponent
            .visible_cards()
            .map(|card| (self.defend_total(state, side.other(), card), card))
            .collect();
        defenders.sort_by_key(|(defend, _)| *defend);
        let Some(&(weakest, weakest_card)) = defenders.first() else {
            return 1_000;
        };

        let flipped = i32::try_from(opponent.flipped_count()).unwrap_or(i32::MAX / 16);
        let mut score = if total > weakest {
            80 + 15 * flipped + i32::from(total - weakest).min(5)
        } else if total == weakest {
            if grants_synergy(weakest_card) {
                50
            } else {
                10
            }
        } else {
            -50
        };

        let keeper_stops_it = defenders
            .iter()
            .any(|(defend, card)| card.position == Position::GK && *defend >= total);
        if keeper_stops_it {
            score -= 20;
        }
        score
    }

    fn decide_block(&self, state: &MatchState, side: Side) -> Result<AiDecision, AiError> {
        let attacker_side = side.other();
        let attacker = state
            .attacker_instance_id
            .and_then(|id| state.side(attacker_side).find_on_field(id))
            .ok_or(AiError::MissingAttacker {
                instance_id: state.attacker_instance_id,
            })?;
        let threat = self.attack_total(state, attacker_side, attacker);

        let own = state.side(side);
        let opponent = state.side(attacker_side);
        let blockers: Vec<Blocker<'_>> = own
            .visible_cards()
            .map(|card| Blocker {
                card,
                total: self.defend_total(state, side, card),
            })
            .collect();
        if blockers.is_empty() {
            return Ok(AiDecision::pass(side, "no blocker available"));
        }

        let mut boosts: Vec<(InstanceId, u8)> = own
            .hand
            .iter()
            .filter_map(|card| card.boost_value().map(|value| (card.instance_id, value)))
            .collect();
        boosts.sort_by_key(|(_, value)| *value);

        let critical = own.flipped_count() >= state.config.momentum_danger();
        let under_pressure = critical || own.score < opponent.score;
        let block = |blocker: &Blocker<'_>, boost: Option<(InstanceId, u8)>, reason: &str| {
            let margin = i32::from(blocker.total) + i32::from(boost.map(|(_, v)| v).unwrap_or(0))
                - i32::from(threat);
            AiDecision::new(
                side,
                GameAction::Block {
                    instance_id: blocker.card.instance_id,
                    boost: boost.map(|(id, _)| id),
                },
                margin,
                reason,
            )
        };
        // Smallest reinforcement that lifts `blocker` to at least `needed`.
        let boost_for = |blocker: &Blocker<'_>, needed: u8| {
            boosts
                .iter()
                .copied()
                .find(|(_, value)| blocker.total.saturating_add(*value) >= needed)
        };

        if let Some(winner) = blockers
            .iter()
            .filter(|b| b.total > threat)
            .min_by_key(|b| (b.card.power, b.card.instance_id))
        {
            return Ok(block(winner, None, "cheapest winning block"));
        }

        let boosted_win = blockers
            .iter()
            .filter_map(|b| boost_for(b, threat.saturating_add(1)).map(|boost| (b, boost)))
            .min_by_key(|(b, (_, value))| (*value, b.card.power, b.card.instance_id));
        if let Some((winner, boost)) = boosted_win {
            return Ok(block(winner, Some(boost), "boosted winning block"));
        }

        let reckless = |b: &Blocker<'_>| b.card.has_effect(EffectTag::Agressif) && !under_pressure;
        if let Some(drawer) = blockers
            .iter()
            .filter(|b| b.total == threat)
            .min_by_key(|b| (reckless(*b), b.card.power, b.card.instance_id))
        {
            return Ok(block(drawer, None, "cheapest drawing block"));
        }

        let boosted_draw = blockers
            .iter()
            .filter_map(|b| {
                boost_for(b, threat)
                    .filter(|(_, value)| b.total.saturating_add(*value) == threat)
                    .map(|boost| (b, boost))
            })
            .min_by_key(|(b, (_, value))| (reckless(*b), *value, b.card.power, b.card.instance_id));
        if let Some((drawer, boost)) = boosted_draw {
            return Ok(block(drawer, Some(boost), "boosted drawing block"));
        }

        if critical {
            if let Some(strongest) = blockers
                .iter()
                .max_by_key(|b| (b.total, Reverse(b.card.instance_id)))
            {
                return Ok(block(strongest, None, "momentum critical: strongest sacrifice"));
            }
        }

        let cheapest = blockers
            .iter()
            .min_by_key(|b| (tactical_weight(b.card), b.card.instance_id))
            .ok_or(AiError::MissingAttacker {
                instance_id: state.attacker_instance_id,
            })?;
        Ok(block(cheapest, None, "minimal loss sacrifice"))
    }

    fn attack_total(&self, state: &MatchState, side: Side, card: &Card) -> u8 {
        compute_power(card, Role::Attacker, &state.field_view(side))
    }

    fn defend_total(&self, state: &MatchState, side: Side, card: &Card) -> u8 {
        compute_power(card, Role::Defender, &state.field_view(side))
    }

    /// Defend total of the opponent's softest visible card.
    fn weakest_defender(&self, state: &MatchState, side: Side) -> Option<u8> {
        let opponent_side = side.other();
        state
            .side(opponent_side)
            .visible_cards()
            .map(|card| self.defend_total(state, opponent_side, card))
            .min()
    }
}

/// Cards whose removal takes a multiplier off the opposing field.
fn grants_synergy(card: &Card) -> bool {
    card.position == Position::CM || card.has_effect(EffectTag::Meneur)
}

/// How much a side loses by sacrificing this card.
fn tactical_weight(card: &Card) -> i32 {
    let role = match card.position {
        Position::GK => 3,
        Position::CB => 2,
        Position::CDM | Position::CM | Position::CAM => 1,
        _ => 0,
    };
    i32::from(card.power) + role + 2 * card.effects.len() as i32
}

pub fn decide(state: &MatchState, side: Side, config: &AiConfig) -> AiDecision {
    AiAgent::new(config.clone()).decide(state, side)
}
