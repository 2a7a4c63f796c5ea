use super::*;

/// Generation strategy that builds the pair list from the config and shuffles it with a seeded RNG, the same seed
/// always gives the same layout.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckGenerator {
    seed: u64,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn generate(self, config: &GameConfig) -> Result<Deck> {
        use rand::{SeedableRng, rngs::SmallRng};

        let mut deck = OrderedDeckGenerator.generate(config)?;
        let mut rng = SmallRng::seed_from_u64(self.seed);
        deck.shuffle(&mut rng);
        log::debug!("shuffled {} tiles with seed {}", deck.len(), self.seed);
        Ok(deck)
    }
}
