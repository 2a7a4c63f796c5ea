use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable tile identity within one deck.
pub type TileId = u16;

/// Count type used for pairs per deck.
pub type PairCount = u16;

/// Elapsed time in timer ticks.
pub type Ticks = u32;

/// Index into the symbol list a deck was built from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceValue(pub u16);

impl FaceValue {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub(crate) $inner);

        impl $name {
            pub const fn get(self) -> $inner {
                self.0
            }

            pub(crate) fn bump(&mut self) -> Self {
                let current = *self;
                self.0 = self.0.wrapping_add(1);
                current
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identity of one play-through, a new one is allocated on every reset.
    SessionId(u64),
    "session"
);

id_type!(
    /// Identity of an armed timer, never reused within a controller.
    TimerId(u32),
    "timer"
);

id_type!(
    /// Identity of one reward submission attempt.
    RequestId(u64),
    "request"
);
