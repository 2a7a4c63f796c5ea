use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::Index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Outcome of flipping a single tile
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlipChange {
    NoChange,
    Changed,
}

impl FlipChange {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Result of comparing the two face-up tiles
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Match,
    Mismatch,
}

/// Paired tiles in display order.
///
/// Every face value appears on exactly two tiles. Ids are assigned in the un-shuffled pair-list order, so tile `i` and
/// tile `i + pairs` always share a face, and shuffling only changes the positions.
///
/// Deserializing goes through the same checks as [`Deck::build`], the face-up and matched counters are recomputed
/// from the tile states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DeckLayout")]
pub struct Deck {
    tiles: Vec<Tile>,
    positions: Vec<usize>,
    symbols: Vec<String>,
    face_up: TileId,
    matched: TileId,
}

/// Serialized form of a [`Deck`], validated before it becomes one
#[derive(Deserialize)]
struct DeckLayout {
    tiles: Vec<Tile>,
    positions: Vec<usize>,
    symbols: Vec<String>,
}

impl TryFrom<DeckLayout> for Deck {
    type Error = GameError;

    fn try_from(layout: DeckLayout) -> Result<Self> {
        let pairs =
            PairCount::try_from(layout.symbols.len()).map_err(|_| GameError::TooManyPairs)?;
        let reference = Deck::build(pairs, &layout.symbols)?;
        if layout.tiles.len() != reference.len() || layout.positions.len() != reference.len() {
            return Err(GameError::MalformedDeck("tile count does not match the symbols"));
        }

        let mut face_up = 0;
        let mut matched = 0;
        for (position, tile) in layout.tiles.iter().enumerate() {
            let expected = reference
                .tile(tile.id())
                .ok_or(GameError::MalformedDeck("tile id out of range"))?;
            if tile.face() != expected.face() {
                return Err(GameError::MalformedDeck("tile does not show its pair's face"));
            }
            if layout.positions[usize::from(tile.id())] != position {
                return Err(GameError::MalformedDeck("positions do not match the tile order"));
            }
            match tile.state() {
                FlipState::FaceDown => {}
                FlipState::FaceUp => face_up += 1,
                FlipState::Matched => matched += 1,
            }
        }
        // every id now maps to exactly one position
        if face_up > 2 {
            return Err(GameError::MalformedDeck("more than two tiles face up"));
        }
        let resolved =
            |id: TileId| layout.tiles[layout.positions[usize::from(id)]].state().is_resolved();
        for id in 0..pairs {
            if resolved(id) != resolved(id + pairs) {
                return Err(GameError::MalformedDeck("pair is only half matched"));
            }
        }

        Ok(Self {
            tiles: layout.tiles,
            positions: layout.positions,
            symbols: reference.symbols,
            face_up,
            matched,
        })
    }
}

impl Deck {
    /// Run the validation of [`Deck::build`] without building the deck
    pub fn check_face_values<S: AsRef<str>>(pairs: PairCount, face_values: &[S]) -> Result<()> {
        if pairs == 0 {
            return Err(GameError::NoPairs);
        }
        if face_values.len() < usize::from(pairs) {
            return Err(GameError::NotEnoughFaceValues {
                pairs,
                available: face_values.len(),
            });
        }
        pairs.checked_mul(2).ok_or(GameError::TooManyPairs)?;

        let mut seen = BTreeSet::new();
        for value in &face_values[..usize::from(pairs)] {
            if !seen.insert(value.as_ref()) {
                return Err(GameError::DuplicateFaceValue(value.as_ref().to_string()));
            }
        }
        Ok(())
    }

    pub fn build<S: AsRef<str>>(pairs: PairCount, face_values: &[S]) -> Result<Self> {
        Self::check_face_values(pairs, face_values)?;
        let total = pairs * 2;

        let symbols: Vec<String> = face_values[..usize::from(pairs)]
            .iter()
            .map(|value| value.as_ref().to_string())
            .collect();

        let tiles = (0..total)
            .map(|id| Tile::new(id, FaceValue(id % pairs)))
            .collect();
        let positions = (0..usize::from(total)).collect();
        log::debug!("built deck with {} pairs", pairs);

        Ok(Self {
            tiles,
            positions,
            symbols,
            face_up: 0,
            matched: 0,
        })
    }

    /// Uniform-random permutation of the display order, tile identities are untouched
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        use rand::seq::SliceRandom;

        self.tiles.shuffle(rng);
        for (position, tile) in self.tiles.iter().enumerate() {
            self.positions[usize::from(tile.id())] = position;
        }
    }

    pub fn validate_id(&self, id: TileId) -> Result<TileId> {
        if usize::from(id) < self.tiles.len() {
            Ok(id)
        } else {
            Err(GameError::InvalidTile(id))
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        let position = *self.positions.get(usize::from(id))?;
        self.tiles.get(position)
    }

    /// Display index of a tile
    pub fn position(&self, id: TileId) -> Option<usize> {
        self.positions.get(usize::from(id)).copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn pair_count(&self) -> PairCount {
        // build guarantees the symbol count fits
        self.symbols.len() as PairCount
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn symbol(&self, face: FaceValue) -> Option<&str> {
        self.symbols.get(face.index()).map(String::as_str)
    }

    pub fn face_up_count(&self) -> TileId {
        self.face_up
    }

    pub fn matched_count(&self) -> TileId {
        self.matched
    }

    pub fn is_cleared(&self) -> bool {
        usize::from(self.matched) == self.tiles.len()
    }

    /// Turn a face-down tile up, refusing while two tiles already wait for evaluation
    pub fn flip(&mut self, id: TileId) -> Result<FlipChange> {
        use FlipChange::*;

        let id = self.validate_id(id)?;
        if self.face_up >= 2 {
            log::trace!("tile {} not flipped, two tiles already face up", id);
            return Ok(NoChange);
        }

        let tile = self.tile_mut(id);
        Ok(match tile.state() {
            FlipState::FaceDown => {
                tile.set_state(FlipState::FaceUp);
                self.face_up += 1;
                log::trace!("flipped tile {}", id);
                Changed
            }
            FlipState::FaceUp | FlipState::Matched => NoChange,
        })
    }

    /// Compare two face-up tiles, matching both when their faces are equal.
    ///
    /// # Panics
    ///
    /// When `a == b` or either tile is not face up, both mean the caller lost track of the selection.
    pub fn evaluate(&mut self, a: TileId, b: TileId) -> Evaluation {
        self.assert_pending_pair(a, b);

        if self[a].face() != self[b].face() {
            return Evaluation::Mismatch;
        }
        self.tile_mut(a).set_state(FlipState::Matched);
        self.tile_mut(b).set_state(FlipState::Matched);
        self.face_up -= 2;
        self.matched += 2;
        log::debug!("matched tiles {} and {}", a, b);
        Evaluation::Match
    }

    /// Turn a mismatched face-up pair back down.
    ///
    /// # Panics
    ///
    /// Same conditions as [`Deck::evaluate`].
    pub fn conceal(&mut self, a: TileId, b: TileId) {
        self.assert_pending_pair(a, b);

        self.tile_mut(a).set_state(FlipState::FaceDown);
        self.tile_mut(b).set_state(FlipState::FaceDown);
        self.face_up -= 2;
        log::trace!("concealed tiles {} and {}", a, b);
    }

    fn assert_pending_pair(&self, a: TileId, b: TileId) {
        assert_ne!(a, b, "tile {a} cannot be paired with itself");
        for id in [a, b] {
            assert!(
                self.tile(id).is_some_and(|tile| tile.state() == FlipState::FaceUp),
                "tile {id} is not face up"
            );
        }
    }

    fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        let position = self.positions[usize::from(id)];
        &mut self.tiles[position]
    }
}

impl Index<TileId> for Deck {
    type Output = Tile;

    fn index(&self, id: TileId) -> &Self::Output {
        &self.tiles[self.positions[usize::from(id)]]
    }
}
