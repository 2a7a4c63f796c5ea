use serde::{Deserialize, Serialize};

use crate::types::{FaceValue, TileId};

/// Player-visible state of a tile.
///
/// A tile only moves FaceDown -> FaceUp -> (FaceDown | Matched), and Matched is terminal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipState {
    #[default]
    FaceDown,
    FaceUp,
    Matched,
}

impl FlipState {
    /// Whether the face is shown, matched tiles stay visible.
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::FaceUp | Self::Matched)
    }

    pub const fn is_resolved(self) -> bool {
        matches!(self, Self::Matched)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    face: FaceValue,
    state: FlipState,
}

impl Tile {
    pub(crate) const fn new(id: TileId, face: FaceValue) -> Self {
        Self {
            id,
            face,
            state: FlipState::FaceDown,
        }
    }

    pub const fn id(&self) -> TileId {
        self.id
    }

    pub const fn face(&self) -> FaceValue {
        self.face
    }

    pub const fn state(&self) -> FlipState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: FlipState) {
        debug_assert!(
            !self.state.is_resolved(),
            "tile {} is matched and cannot change",
            self.id
        );
        self.state = state;
    }
}
