//! Situational power bonuses and the two triggered keyword effects.
//!
//! Bonuses are recomputed on every comparison; nothing here is cached because
//! the fields change between turns. Only `on_card_played` and `on_duel_lost`
//! mutate the match.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::state::{Card, EffectTag, InstanceId, MatchEvent, MatchState, Position, Side};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Attacker,
    Defender,
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "attacker" | "attack" => Ok(Role::Attacker),
            "defender" | "defend" | "block" => Ok(Role::Defender),
            _ => Err(()),
        }
    }
}

/// The two fields as seen from one card's side.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub own: &'a [Option<Card>],
    pub opposing: &'a [Option<Card>],
}

impl<'a> FieldView<'a> {
    pub fn new(own: &'a [Option<Card>], opposing: &'a [Option<Card>]) -> Self {
        Self { own, opposing }
    }

    fn visible(cards: &'a [Option<Card>]) -> impl Iterator<Item = &'a Card> {
        cards.iter().flatten().filter(|card| card.is_visible())
    }

    fn opposing_has(&self, predicate: impl Fn(Position) -> bool) -> bool {
        Self::visible(self.opposing).any(|card| predicate(card.position))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerBonus {
    pub bonus: u8,
    /// Labels of the sources that contributed, in evaluation order.
    pub labels: Vec<String>,
}

/// Every passive bonus a card can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusSource {
    Goalkeeper,
    BackLine,
    Overlap,
    Striker,
    Winger,
    MidfieldAura,
}

impl BonusSource {
    pub const ALL: [BonusSource; 6] = [
        BonusSource::Goalkeeper,
        BonusSource::BackLine,
        BonusSource::Overlap,
        BonusSource::Striker,
        BonusSource::Winger,
        BonusSource::MidfieldAura,
    ];

    fn evaluate(self, card: &Card, role: Role, view: &FieldView<'_>) -> u8 {
        match (self, role) {
            (BonusSource::Goalkeeper, Role::Defender) => u8::from(card.position == Position::GK),
            (BonusSource::BackLine, Role::Defender) => u8::from(matches!(
                card.position,
                Position::CB | Position::CDM | Position::LB | Position::RB
            )),
            (BonusSource::Overlap, Role::Attacker) => u8::from(card.position.covers_flank()),
            (BonusSource::Striker, Role::Attacker) if card.position == Position::ST => {
                if view.opposing_has(|position| position == Position::CB) {
                    1
                } else {
                    2
                }
            }
            (BonusSource::Winger, Role::Attacker)
                if matches!(card.position, Position::LW | Position::RW) =>
            {
                if view.opposing_has(Position::covers_flank) {
                    0
                } else {
                    2
                }
            }
            (BonusSource::MidfieldAura, Role::Defender) => {
                if !card.is_visible() || !card.position.is_midfielder() {
                    return 0;
                }
                let mut others = FieldView::visible(view.own)
                    .filter(|other| other.instance_id != card.instance_id);
                // A CM radiates to itself once any other midfielder stands with it.
                let receives = if card.position == Position::CM {
                    others.any(|other| other.position.is_midfielder())
                } else {
                    others.any(|other| other.position == Position::CM)
                };
                u8::from(receives)
            }
            _ => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BonusSource::Goalkeeper => "GK",
            BonusSource::BackLine => "back line",
            BonusSource::Overlap => "overlap",
            BonusSource::Striker => "striker",
            BonusSource::Winger => "winger",
            BonusSource::MidfieldAura => "CM synergy",
        }
    }
}

pub fn power_bonus(card: &Card, role: Role, view: &FieldView<'_>) -> PowerBonus {
    let mut result = PowerBonus::default();
    for source in BonusSource::ALL {
        let value = source.evaluate(card, role, view);
        if value > 0 {
            result.bonus = result.bonus.saturating_add(value);
            result.labels.push(format!("{} +{}", source.label(), value));
        }
    }
    result
}

/// Base power plus the situational bonus.
pub fn compute_power(card: &Card, role: Role, view: &FieldView<'_>) -> u8 {
    card.power.saturating_add(power_bonus(card, role, view).bonus)
}

/// MENEUR trigger: a playmaker arriving next to a ready forward buys one more
/// action this turn and spends itself.
pub fn on_card_played(
    state: &mut MatchState,
    side: Side,
    instance_id: InstanceId,
) -> Option<MatchEvent> {
    if state.meneur_active {
        return None;
    }
    let own = state.side(side);
    let played = own.find_on_field(instance_id)?;
    if !played.has_effect(EffectTag::Meneur) {
        return None;
    }
    let partner_ready = own.field_cards().any(|card| {
        card.instance_id != instance_id && card.can_attack() && card.position.is_forward()
    });
    if !partner_ready {
        return None;
    }

    if let Some(card) = state.side_mut(side).find_on_field_mut(instance_id) {
        card.has_acted = true;
    }
    state.has_action_used = false;
    state.meneur_active = true;
    let event = MatchEvent::ExtraAction { side, instance_id };
    state.record(event.clone());
    Some(event)
}

/// AGRESSIF trigger: a card that loses its duel takes its opponent down with a foul.
pub fn on_duel_lost(
    state: &mut MatchState,
    loser_side: Side,
    loser: &Card,
    opponent_instance: InstanceId,
) -> Option<MatchEvent> {
    if !loser.has_effect(EffectTag::Agressif) || state.is_finished() || state.paused {
        return None;
    }
    let victim_side = loser_side.other();
    if !state.side_mut(victim_side).discard_from_field(opponent_instance) {
        return None;
    }
    state.foul_marker = Some(opponent_instance);
    let event = MatchEvent::Foul {
        side: loser_side,
        victim_side,
        victim: opponent_instance,
    };
    state.record(event.clone());
    Some(event)
}
