use std::collections::hash_map::DefaultHasher;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::effects::FieldView;
use crate::config::MatchConfig;

/// Template identity of a card; repeats across copies.
pub type CardId = u32;
/// Identity of one physical card inside a match.
pub type InstanceId = u32;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Opponent];

    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "player" | "home" => Ok(Side::Player),
            "opponent" | "away" | "ai" => Ok(Side::Opponent),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("player"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Position {
    GK,
    CB,
    LB,
    RB,
    LM,
    RM,
    CDM,
    CM,
    CAM,
    LW,
    RW,
    ST,
}

impl Position {
    pub fn is_defensive(self) -> bool {
        matches!(self, Position::GK | Position::CB)
    }

    pub fn is_midfielder(self) -> bool {
        matches!(
            self,
            Position::CDM | Position::CM | Position::CAM | Position::LM | Position::RM
        )
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Position::LW | Position::RW | Position::ST)
    }

    /// Full-backs and wide midfielders; these shut down wingers.
    pub fn covers_flank(self) -> bool {
        matches!(self, Position::LB | Position::RB | Position::LM | Position::RM)
    }
}

/// Keyword effects a card can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EffectTag {
    #[serde(rename = "AGRESSIF")]
    Agressif,
    #[serde(rename = "BOOST1")]
    Boost1,
    #[serde(rename = "BOOST2")]
    Boost2,
    #[serde(rename = "MENEUR", alias = "CAM")]
    Meneur,
}

impl EffectTag {
    pub fn boost_value(self) -> Option<u8> {
        match self {
            EffectTag::Boost1 => Some(1),
            EffectTag::Boost2 => Some(2),
            EffectTag::Agressif | EffectTag::Meneur => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: CardId,
    #[serde(default)]
    pub instance_id: InstanceId,
    pub name: String,
    pub position: Position,
    pub power: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectTag>,
    #[serde(default)]
    pub is_flipped: bool,
    #[serde(default)]
    pub has_acted: bool,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<String>, position: Position, power: u8) -> Self {
        Self {
            id,
            instance_id: 0,
            name: name.into(),
            position,
            power,
            effects: Vec::new(),
            is_flipped: false,
            has_acted: false,
        }
    }

    pub fn with_effect(mut self, effect: EffectTag) -> Self {
        if !self.effects.contains(&effect) {
            self.effects.push(effect);
        }
        self
    }

    pub fn with_instance(mut self, instance_id: InstanceId) -> Self {
        self.instance_id = instance_id;
        self
    }

    pub fn has_effect(&self, effect: EffectTag) -> bool {
        self.effects.contains(&effect)
    }

    /// Value added when this card is spent as a one-time reinforcement.
    pub fn boost_value(&self) -> Option<u8> {
        self.effects.iter().filter_map(|tag| tag.boost_value()).max()
    }

    pub fn is_visible(&self) -> bool {
        !self.is_flipped
    }

    pub fn can_attack(&self) -> bool {
        !self.is_flipped && !self.has_acted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideState {
    pub name: String,
    /// Draw pile; the front is drawn first.
    #[serde(default)]
    pub deck: Vec<Card>,
    #[serde(default)]
    pub hand: Vec<Card>,
    #[serde(default)]
    pub field: Vec<Option<Card>>,
    #[serde(default)]
    pub discard: Vec<Card>,
    #[serde(default)]
    pub score: u32,
}

impl SideState {
    pub fn new(name: impl Into<String>, field_size: usize) -> Self {
        Self {
            name: name.into(),
            deck: Vec::new(),
            hand: Vec::new(),
            field: vec![None; field_size],
            discard: Vec::new(),
            score: 0,
        }
    }

    pub fn field_cards(&self) -> impl Iterator<Item = &Card> {
        self.field.iter().flatten()
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.field_cards().filter(|card| card.is_visible())
    }

    pub fn visible_count(&self) -> usize {
        self.visible_cards().count()
    }

    pub fn flipped_count(&self) -> usize {
        self.field_cards().filter(|card| card.is_flipped).count()
    }

    pub fn eligible_attackers(&self) -> impl Iterator<Item = &Card> {
        self.field_cards().filter(|card| card.can_attack())
    }

    pub fn find_on_field(&self, instance_id: InstanceId) -> Option<&Card> {
        self.field_cards().find(|card| card.instance_id == instance_id)
    }

    pub fn find_on_field_mut(&mut self, instance_id: InstanceId) -> Option<&mut Card> {
        self.field
            .iter_mut()
            .flatten()
            .find(|card| card.instance_id == instance_id)
    }

    pub fn find_in_hand_index(&self, instance_id: InstanceId) -> Option<usize> {
        self.hand.iter().position(|card| card.instance_id == instance_id)
    }

    pub fn free_slot(&self) -> Option<usize> {
        self.field.iter().position(Option::is_none)
    }

    pub fn is_field_full(&self) -> bool {
        self.free_slot().is_none()
    }

    /// Moves a field card to the discard pile. Returns false if it was not on the field.
    pub fn discard_from_field(&mut self, instance_id: InstanceId) -> bool {
        let slot = self
            .field
            .iter_mut()
            .find(|slot| matches!(slot, Some(card) if card.instance_id == instance_id));
        match slot.and_then(Option::take) {
            Some(card) => {
                self.retire(card);
                true
            }
            None => false,
        }
    }

    pub fn discard_from_hand(&mut self, index: usize) -> Option<InstanceId> {
        if index >= self.hand.len() {
            return None;
        }
        let card = self.hand.remove(index);
        let instance_id = card.instance_id;
        self.retire(card);
        Some(instance_id)
    }

    /// Sends every flipped field card to the discard pile.
    pub fn clear_flipped(&mut self) -> Vec<InstanceId> {
        let mut cleared = Vec::new();
        for slot in &mut self.field {
            if matches!(slot, Some(card) if card.is_flipped) {
                if let Some(card) = slot.take() {
                    cleared.push(card.instance_id);
                    self.discard.push(Self::reset(card));
                }
            }
        }
        cleared
    }

    pub fn first_flipped(&self) -> Option<InstanceId> {
        self.field_cards()
            .find(|card| card.is_flipped)
            .map(|card| card.instance_id)
    }

    pub fn ready_field(&mut self) {
        for card in self.field.iter_mut().flatten() {
            card.has_acted = false;
        }
    }

    /// Draws from the front of the deck until the hand holds `limit` cards.
    pub fn draw_up_to(&mut self, limit: usize) -> usize {
        let mut drawn = 0;
        while self.hand.len() < limit && !self.deck.is_empty() {
            let card = self.deck.remove(0);
            self.hand.push(card);
            drawn += 1;
        }
        drawn
    }

    /// Nothing left to draw or play and at most one card still standing.
    pub fn out_of_resources(&self) -> bool {
        self.hand.is_empty() && self.deck.is_empty() && self.visible_count() <= 1
    }

    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.hand.len() + self.field_cards().count() + self.discard.len()
    }

    pub fn instance_ids(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.deck
            .iter()
            .chain(self.hand.iter())
            .chain(self.field_cards())
            .chain(self.discard.iter())
            .map(|card| card.instance_id)
    }

    fn retire(&mut self, card: Card) {
        self.discard.push(Self::reset(card));
    }

    fn reset(mut card: Card) -> Card {
        card.is_flipped = false;
        card.has_acted = false;
        card
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Main,
    AttackDeclared,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Opponent,
    Draw,
}

impl From<Side> for Winner {
    fn from(side: Side) -> Self {
        match side {
            Side::Player => Winner::Player,
            Side::Opponent => Winner::Opponent,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalReason {
    OpenGoal,
    MomentumPressure,
}

impl fmt::Display for GoalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalReason::OpenGoal => f.write_str("open goal"),
            GoalReason::MomentumPressure => f.write_str("momentum pressure"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalRecord {
    pub side: Side,
    pub scorer: String,
    pub scorer_instance: InstanceId,
    pub reason: GoalReason,
    pub turn_number: u32,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DuelOutcome {
    AttackerWins,
    DefenderWins,
    Draw,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MatchEvent {
    MatchStarted {
        player: String,
        opponent: String,
    },
    TurnStarted {
        side: Side,
        drawn: usize,
    },
    CardPlayed {
        side: Side,
        instance_id: InstanceId,
        name: String,
        slot: usize,
    },
    ExtraAction {
        side: Side,
        instance_id: InstanceId,
    },
    AttackDeclared {
        side: Side,
        instance_id: InstanceId,
        defenders: usize,
    },
    Duel {
        attacker_side: Side,
        attacker: InstanceId,
        defender: InstanceId,
        attack_total: u8,
        defend_total: u8,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attacker_labels: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        defender_labels: Vec<String>,
        boost: u8,
        outcome: DuelOutcome,
    },
    Foul {
        side: Side,
        victim_side: Side,
        victim: InstanceId,
    },
    Recovery {
        side: Side,
        instance_id: InstanceId,
    },
    Goal {
        side: Side,
        scorer: String,
        reason: GoalReason,
        player_score: u32,
        opponent_score: u32,
    },
    Passed {
        side: Side,
    },
    StoppageTime {
        starved: Side,
        acting: Side,
    },
    MatchOver {
        winner: Winner,
        forced: bool,
    },
    FaultRecovered {
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub seq: u64,
    pub turn_number: u32,
    pub event: MatchEvent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("instance {instance_id} appears more than once")]
    DuplicateInstance { instance_id: InstanceId },
    #[error("{side} hand holds {len} cards")]
    HandOverflow { side: Side, len: usize },
    #[error("{side} field has {len} slots")]
    FieldSlots { side: Side, len: usize },
    #[error("declared attacker {instance_id:?} is not an unflipped card on the attacking field")]
    DanglingAttacker { instance_id: Option<InstanceId> },
}

/// Full match snapshot; also the unit of persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchState {
    pub player: SideState,
    pub opponent: SideState,
    pub turn: Side,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attacker_instance_id: Option<InstanceId>,
    #[serde(default)]
    pub has_action_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoppage_time_action: Option<Side>,
    #[serde(default)]
    pub meneur_active: bool,
    /// Newest entry first.
    #[serde(default)]
    pub log: VecDeque<LogEntry>,
    #[serde(default)]
    pub goals: Vec<GoalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
    /// Held after a goal until the presentation layer calls `resume_game`.
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foul_marker: Option<InstanceId>,
    #[serde(default)]
    pub turn_number: u32,
    #[serde(default)]
    pub log_seq: u64,
    #[serde(default)]
    pub config: MatchConfig,
}

impl MatchState {
    pub fn new(
        config: MatchConfig,
        player_name: impl Into<String>,
        opponent_name: impl Into<String>,
    ) -> Self {
        Self {
            player: SideState::new(player_name, config.field_size),
            opponent: SideState::new(opponent_name, config.field_size),
            turn: Side::Player,
            phase: Phase::Main,
            attacker_instance_id: None,
            has_action_used: false,
            stoppage_time_action: None,
            meneur_active: false,
            log: VecDeque::new(),
            goals: Vec::new(),
            winner: None,
            paused: false,
            foul_marker: None,
            turn_number: 0,
            log_seq: 0,
            config,
        }
    }

    pub fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Player => &mut self.player,
            Side::Opponent => &mut self.opponent,
        }
    }

    /// Fields as seen by a card belonging to `side`.
    pub fn field_view(&self, side: Side) -> FieldView<'_> {
        FieldView::new(&self.side(side).field, &self.side(side.other()).field)
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    pub fn record(&mut self, event: MatchEvent) -> LogEntry {
        self.log_seq += 1;
        let entry = LogEntry {
            seq: self.log_seq,
            turn_number: self.turn_number,
            event,
        };
        log::debug!("match log #{}: {:?}", entry.seq, entry.event);
        self.log.push_front(entry.clone());
        self.log.truncate(self.config.log_capacity.max(1));
        entry
    }

    pub fn score_line(&self) -> (u32, u32) {
        (self.player.score, self.opponent.score)
    }

    /// Cheap identity of the parts of the state a decision depends on.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.turn.hash(&mut hasher);
        self.phase.hash(&mut hasher);
        self.attacker_instance_id.hash(&mut hasher);
        self.has_action_used.hash(&mut hasher);
        self.paused.hash(&mut hasher);
        self.log_seq.hash(&mut hasher);
        for side in Side::BOTH {
            let state = self.side(side);
            state.score.hash(&mut hasher);
            state.deck.len().hash(&mut hasher);
            state.hand.len().hash(&mut hasher);
            for slot in &state.field {
                slot.as_ref()
                    .map(|card| (card.instance_id, card.is_flipped, card.has_acted))
                    .hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        let mut seen = HashSet::new();
        for side in Side::BOTH {
            let state = self.side(side);
            if state.hand.len() > self.config.hand_size {
                return Err(IntegrityError::HandOverflow {
                    side,
                    len: state.hand.len(),
                });
            }
            if state.field.len() != self.config.field_size {
                return Err(IntegrityError::FieldSlots {
                    side,
                    len: state.field.len(),
                });
            }
            for instance_id in state.instance_ids() {
                if !seen.insert(instance_id) {
                    return Err(IntegrityError::DuplicateInstance { instance_id });
                }
            }
        }

        if self.phase == Phase::AttackDeclared {
            let valid = self
                .attacker_instance_id
                .and_then(|id| self.side(self.turn.other()).find_on_field(id))
                .map(|card| !card.is_flipped)
                .unwrap_or(false);
            if !valid {
                return Err(IntegrityError::DanglingAttacker {
                    instance_id: self.attacker_instance_id,
                });
            }
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn log_is_newest_first_and_capped() {
        let mut state = blank_state();
        state.config.log_capacity = 3;
        for _ in 0..5 {
            state.record(MatchEvent::Passed { side: Side::Player });
        }
        assert_eq!(state.log.len(), 3);
        assert_eq!(state.log.front().map(|entry| entry.seq), Some(5));
        assert_eq!(state.log.back().map(|entry| entry.seq), Some(3));
    }

    #[test]
    fn clear_flipped_keeps_visible_cards() {
        let mut state = blank_state();
        let mut flipped = card(1, Position::CB, 6);
        flipped.is_flipped = true;
        place(&mut state, Side::Player, flipped);
        place(&mut state, Side::Player, card(2, Position::ST, 7));

        let cleared = state.player.clear_flipped();
        assert_eq!(cleared, vec![1]);
        assert_eq!(state.player.visible_count(), 1);
        assert_eq!(state.player.discard.len(), 1);
        assert!(!state.player.discard[0].is_flipped, "discarded cards are reset");
    }

    #[test]
    fn out_of_resources_tolerates_one_standing_card() {
        let mut state = blank_state();
        place(&mut state, Side::Opponent, card(3, Position::GK, 5));
        assert!(state.opponent.out_of_resources());
        place(&mut state, Side::Opponent, card(4, Position::CB, 6));
        assert!(!state.opponent.out_of_resources());
    }

    #[test]
    fn integrity_rejects_duplicate_instances() {
        let mut state = blank_state();
        place(&mut state, Side::Player, card(7, Position::CM, 6));
        state.opponent.hand.push(card(7, Position::CM, 6));
        assert_eq!(
            state.integrity_check(),
            Err(IntegrityError::DuplicateInstance { instance_id: 7 })
        );
    }

    #[test]
    fn meneur_accepts_cam_alias() {
        let tag: EffectTag = serde_json::from_str("\"CAM\"").expect("alias should parse");
        assert_eq!(tag, EffectTag::Meneur);
        assert_eq!("AWAY".parse::<Side>(), Ok(Side::Opponent));
    }
}
