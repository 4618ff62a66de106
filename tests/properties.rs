//! Whole-match properties: AI-driven matches from random seeds keep every
//! card accounted for and never make an illegal move.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use pitch_duel::game::catalog;
use pitch_duel::{
    compute_power, AiAgent, Card, FieldView, MatchConfig, MatchEngine, Position, Role, Side,
};

const DECK_SIZE: usize = 20;
const MAX_ACTIONS: usize = 400;

const POSITIONS: [Position; 12] = [
    Position::GK,
    Position::CB,
    Position::LB,
    Position::RB,
    Position::LM,
    Position::RM,
    Position::CDM,
    Position::CM,
    Position::CAM,
    Position::LW,
    Position::RW,
    Position::ST,
];

fn started(seed: u64) -> MatchEngine {
    let mut engine = MatchEngine::with_seed(MatchConfig::default(), seed);
    let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);
    let opponent = catalog::starter_deck(&mut rng, DECK_SIZE);
    let player = catalog::starter_deck(&mut rng, DECK_SIZE);
    assert!(engine.init_match(opponent, Some(player), "Home", "Away").is_applied());
    engine
}

fn arb_card(instance_id: u32) -> impl Strategy<Value = Card> {
    (0..POSITIONS.len(), 5u8..=9, any::<bool>()).prop_map(move |(position, power, flipped)| {
        let mut card = Card::new(instance_id, "prop", POSITIONS[position], power)
            .with_instance(instance_id);
        card.is_flipped = flipped;
        card
    })
}

fn arb_field(first_id: u32) -> impl Strategy<Value = Vec<Option<Card>>> {
    prop::collection::vec(prop::option::of(arb_card(0)), 5).prop_map(move |slots| {
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.map(|card| card.with_instance(first_id + index as u32)))
            .collect()
    })
}

/// Plays AI against AI until the match ends by itself, returning the number
/// of actions taken, or `None` if `limit` is reached first.
fn play_until_finished(seed: u64, limit: usize) -> Option<usize> {
    let mut engine = started(seed);
    let agent = AiAgent::default();
    for actions in 0..limit {
        let state = engine.snapshot();
        if state.is_finished() {
            return Some(actions);
        }
        if state.paused {
            engine.resume_game();
            continue;
        }
        let decision = agent.decide(&state, state.turn);
        engine.apply_decision(&decision);
    }
    None
}

#[test]
fn ai_matches_finish_without_being_forced() {
    let seeds = (0..60).chain([67, 111, 175, 182]);
    for seed in seeds {
        assert!(
            play_until_finished(seed, 2_000).is_some(),
            "seed {seed} stalled before the match ended"
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// AI against AI: every decision is accepted, no card is created or lost,
    /// and the scoreboard matches the goal records.
    #[test]
    fn prop_ai_match_conserves_cards(seed in any::<u64>()) {
        let mut engine = started(seed);
        let agent = AiAgent::default();

        for _ in 0..MAX_ACTIONS {
            let state = engine.snapshot();
            if state.is_finished() {
                break;
            }
            if state.paused {
                prop_assert!(engine.resume_game().is_applied());
                continue;
            }
            let decision = agent.decide(&state, state.turn);
            let resolution = engine.apply_decision(&decision);
            prop_assert!(
                resolution.is_applied(),
                "{:?} rejected: {:?}",
                decision,
                resolution.rejected
            );

            let state = engine.snapshot();
            prop_assert!(state.integrity_check().is_ok());
            for side in Side::BOTH {
                prop_assert_eq!(state.side(side).total_cards(), DECK_SIZE);
                let goals = state.goals.iter().filter(|goal| goal.side == side).count();
                prop_assert_eq!(goals, state.side(side).score as usize);
            }
        }

        if !engine.snapshot().is_finished() {
            prop_assert!(engine.force_end().is_applied());
        }
        prop_assert!(engine.snapshot().winner.is_some());
    }

    /// Bonuses are pure and never add more than two points.
    #[test]
    fn prop_compute_power_is_bounded(
        card in arb_card(100),
        own in arb_field(1),
        opposing in arb_field(10),
        attacking in any::<bool>()
    ) {
        let role = if attacking { Role::Attacker } else { Role::Defender };
        let view = FieldView::new(&own, &opposing);
        let first = compute_power(&card, role, &view);
        prop_assert_eq!(first, compute_power(&card, role, &view));
        prop_assert!(first >= card.power);
        prop_assert!(first - card.power <= 2);
    }
}
