use crate::*;
pub use random::*;

mod random;

pub trait DeckGenerator {
    fn generate(self, config: &GameConfig) -> Result<Deck>;
}

/// Builds the deck in pair-list order without shuffling, so tile `i` pairs with tile `i + pairs` at known positions.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OrderedDeckGenerator;

impl DeckGenerator for OrderedDeckGenerator {
    fn generate(self, config: &GameConfig) -> Result<Deck> {
        Deck::build(config.pairs, &config.symbols)
    }
}
