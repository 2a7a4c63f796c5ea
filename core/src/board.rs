use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// What the player may see of one tile, face-down tiles never expose their symbol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub state: FlipState,
    pub symbol: Option<String>,
}

/// Player-visible projection of a session in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardView {
    pub tiles: Vec<TileView>,
    pub phase: Phase,
    pub matched_pairs: PairCount,
    pub total_pairs: PairCount,
}

impl BoardView {
    pub fn from_session(session: &Session) -> Self {
        let deck = session.deck();
        let tiles = deck
            .tiles()
            .iter()
            .map(|tile| TileView {
                id: tile.id(),
                state: tile.state(),
                symbol: tile
                    .state()
                    .is_visible()
                    .then(|| deck.symbol(tile.face()))
                    .flatten()
                    .map(ToString::to_string),
            })
            .collect();

        Self {
            tiles,
            phase: session.phase(),
            matched_pairs: deck.matched_count() / 2,
            total_pairs: deck.pair_count(),
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.matched_pairs == self.total_pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_session_hides_face_down_symbols() {
        let deck = Deck::build(2, &["sun", "moon"]).unwrap();
        let mut session = Session::new(deck, 10);

        session.flip(0).unwrap();
        session.flip(2).unwrap();
        session.flip(1).unwrap();

        let view = BoardView::from_session(&session);

        assert_eq!(view.tiles[0].symbol.as_deref(), Some("sun"));
        assert_eq!(view.tiles[2].state, FlipState::Matched);
        assert_eq!(view.tiles[1].symbol.as_deref(), Some("moon"));
        assert_eq!(view.tiles[3].symbol, None);
        assert_eq!(view.matched_pairs, 1);
        assert!(!view.is_cleared());
    }
}
