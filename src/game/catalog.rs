//! Built-in card pool used when a side arrives without a deck.

use rand::seq::SliceRandom;
use rand::Rng;

use super::state::{Card, CardId, EffectTag, Position};
use EffectTag::*;
use Position::*;

struct Template {
    id: CardId,
    name: &'static str,
    position: Position,
    power: u8,
    effects: &'static [EffectTag],
}

const POOL: &[Template] = &[
    template(1, "Safe Hands", GK, 6, &[]),
    template(2, "Shot Stopper", GK, 8, &[]),
    template(3, "Stopper", CB, 6, &[]),
    template(4, "Hard Man", CB, 7, &[Agressif]),
    template(5, "Overlapper", LB, 5, &[]),
    template(6, "Wing Back", RB, 6, &[]),
    template(7, "Shuttler", LM, 6, &[]),
    template(8, "Crosser", RM, 6, &[]),
    template(9, "Anchor", CDM, 7, &[]),
    template(10, "Enforcer", CDM, 6, &[Agressif]),
    template(11, "Metronome", CM, 6, &[]),
    template(12, "Box to Box", CM, 7, &[Boost1]),
    template(13, "Playmaker", CAM, 7, &[Meneur]),
    template(14, "Number Ten", CAM, 8, &[Boost2]),
    template(15, "Inside Forward", LW, 7, &[]),
    template(16, "Flyer", RW, 6, &[]),
    template(17, "Poacher", ST, 7, &[]),
    template(18, "Target Man", ST, 9, &[]),
];

const fn template(
    id: CardId,
    name: &'static str,
    position: Position,
    power: u8,
    effects: &'static [EffectTag],
) -> Template {
    Template {
        id,
        name,
        position,
        power,
        effects,
    }
}

impl Template {
    fn to_card(&self) -> Card {
        self.effects.iter().fold(
            Card::new(self.id, self.name, self.position, self.power),
            |card, effect| card.with_effect(*effect),
        )
    }
}

pub fn pool() -> Vec<Card> {
    POOL.iter().map(Template::to_card).collect()
}

/// Draws `size` templates from the pool with repetition. Instance ids are
/// assigned later by `init_match`.
pub fn starter_deck<R: Rng + ?Sized>(rng: &mut R, size: usize) -> Vec<Card> {
    (0..size)
        .filter_map(|_| POOL.choose(&mut *rng))
        .map(Template::to_card)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn starter_deck_has_requested_size_and_canonical_power() {
        let mut rng = SmallRng::seed_from_u64(3);
        let deck = starter_deck(&mut rng, 20);
        assert_eq!(deck.len(), 20);
        assert!(deck.iter().all(|card| (5..=9).contains(&card.power)));
    }

    #[test]
    fn pool_template_ids_are_unique() {
        let cards = pool();
        let mut ids: Vec<CardId> = cards.iter().map(|card| card.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), cards.len());
    }
}
