//! Duel and goal resolution.

use super::effects::{self, power_bonus, Role};
use super::rules::{RuleEngine, RuleError};
use super::state::{
    DuelOutcome, GoalReason, GoalRecord, InstanceId, IntegrityError, MatchEvent, MatchState,
    Phase, Side,
};

/// Resolves the declared attack against `blocker`. All validation happens
/// before the first mutation.
pub fn resolve_block(
    state: &mut MatchState,
    defender_side: Side,
    blocker: InstanceId,
    boost: Option<InstanceId>,
    timestamp_ms: u64,
) -> Result<DuelOutcome, RuleError> {
    let attacker_side = defender_side.other();
    let dangling = || RuleError::IntegrityViolation {
        error: IntegrityError::DanglingAttacker {
            instance_id: state.attacker_instance_id,
        },
    };
    let attacker_id = state.attacker_instance_id.ok_or_else(dangling)?;
    let attacker = state
        .side(attacker_side)
        .find_on_field(attacker_id)
        .filter(|card| card.is_visible())
        .cloned()
        .ok_or_else(dangling)?;

    let defending = state.side(defender_side);
    let blocker_card = defending
        .find_on_field(blocker)
        .cloned()
        .ok_or(RuleError::CardNotFound {
            instance_id: blocker,
        })?;
    if blocker_card.is_flipped {
        return Err(RuleError::CardFlipped {
            instance_id: blocker,
        });
    }
    let boost_slot = match boost {
        Some(instance_id) => {
            let index = defending
                .find_in_hand_index(instance_id)
                .ok_or(RuleError::CardNotFound { instance_id })?;
            let value = defending.hand[index]
                .boost_value()
                .ok_or(RuleError::NotABoost { instance_id })?;
            Some((index, value))
        }
        None => None,
    };
    let boost_value = boost_slot.map(|(_, value)| value).unwrap_or(0);

    let attack = power_bonus(&attacker, Role::Attacker, &state.field_view(attacker_side));
    let defend = power_bonus(&blocker_card, Role::Defender, &state.field_view(defender_side));
    let attack_total = attacker.power.saturating_add(attack.bonus);
    let defend_total = blocker_card
        .power
        .saturating_add(defend.bonus)
        .saturating_add(boost_value);
    let outcome = match attack_total.cmp(&defend_total) {
        std::cmp::Ordering::Greater => DuelOutcome::AttackerWins,
        std::cmp::Ordering::Less => DuelOutcome::DefenderWins,
        std::cmp::Ordering::Equal => DuelOutcome::Draw,
    };

    state.record(MatchEvent::Duel {
        attacker_side,
        attacker: attacker_id,
        defender: blocker,
        attack_total,
        defend_total,
        attacker_labels: attack.labels,
        defender_labels: defend.labels,
        boost: boost_value,
        outcome,
    });
    log::debug!(
        "duel {} ({}) vs {} ({}): {:?}",
        attacker.name,
        attack_total,
        blocker_card.name,
        defend_total,
        outcome
    );

    if let Some((index, _)) = boost_slot {
        state.side_mut(defender_side).discard_from_hand(index);
    }
    state.phase = Phase::Main;
    state.attacker_instance_id = None;

    match outcome {
        DuelOutcome::AttackerWins => {
            if let Some(card) = state.side_mut(defender_side).find_on_field_mut(blocker) {
                card.is_flipped = true;
            }
            effects::on_duel_lost(state, defender_side, &blocker_card, attacker_id);
        }
        DuelOutcome::DefenderWins => {
            state.side_mut(attacker_side).discard_from_field(attacker_id);
            effects::on_duel_lost(state, attacker_side, &attacker, blocker);
            let defending = state.side_mut(defender_side);
            if let Some(recovered) = defending.first_flipped() {
                defending.discard_from_field(recovered);
                state.record(MatchEvent::Recovery {
                    side: defender_side,
                    instance_id: recovered,
                });
            }
        }
        DuelOutcome::Draw => {
            state.side_mut(attacker_side).discard_from_field(attacker_id);
            state.side_mut(defender_side).discard_from_field(blocker);
        }
    }

    check_momentum(state, defender_side, timestamp_ms);
    Ok(outcome)
}

/// Awards automatic goals against any side sitting on enough flipped cards.
/// `first` is examined before its opponent.
pub fn check_momentum(state: &mut MatchState, first: Side, timestamp_ms: u64) -> bool {
    let threshold = state.config.momentum_threshold;
    let mut scored = false;
    for conceding in [first, first.other()] {
        if state.is_finished() {
            break;
        }
        if state.side(conceding).flipped_count() < threshold {
            continue;
        }
        let scorer_side = conceding.other();
        let scorer = state
            .side(scorer_side)
            .visible_cards()
            .next()
            .map(|card| card.instance_id);
        if let Some(scorer) = scorer {
            resolve_goal(
                state,
                scorer_side,
                scorer,
                GoalReason::MomentumPressure,
                timestamp_ms,
            );
            scored = true;
        }
    }
    scored
}

/// Scores for `scorer_side`, sends the scorer and the conceding side's flipped
/// cards to discard, then either ends the match or raises the pause gate with
/// the turn handed to the conceding side (or the stoppage-time side).
pub fn resolve_goal(
    state: &mut MatchState,
    scorer_side: Side,
    scorer: InstanceId,
    reason: GoalReason,
    timestamp_ms: u64,
) {
    let conceding = scorer_side.other();
    let scorer_name = state
        .side(scorer_side)
        .find_on_field(scorer)
        .map(|card| card.name.clone())
        .unwrap_or_else(|| format!("#{scorer}"));

    let scoring = state.side_mut(scorer_side);
    scoring.score += 1;
    scoring.discard_from_field(scorer);
    state.side_mut(conceding).clear_flipped();
    state.goals.push(GoalRecord {
        side: scorer_side,
        scorer: scorer_name.clone(),
        scorer_instance: scorer,
        reason,
        turn_number: state.turn_number,
        timestamp_ms,
    });
    let (player_score, opponent_score) = state.score_line();
    state.record(MatchEvent::Goal {
        side: scorer_side,
        scorer: scorer_name,
        reason,
        player_score,
        opponent_score,
    });
    log::info!("goal for {scorer_side} ({reason}): {player_score} - {opponent_score}");

    if RuleEngine::check_match_over(state, false).is_some() {
        return;
    }
    state.phase = Phase::Main;
    state.attacker_instance_id = None;
    state.turn = state.stoppage_time_action.unwrap_or(conceding);
    state.paused = true;
}
