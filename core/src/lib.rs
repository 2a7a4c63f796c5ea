#![no_std]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::time::Duration;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use capability::*;
pub use controller::*;
pub use deck::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use reward::*;
pub use tile::*;
pub use timer::*;
pub use types::*;

mod board;
mod capability;
mod controller;
mod deck;
mod engine;
mod error;
mod generator;
mod reward;
mod tile;
mod timer;
mod types;

/// Canonical eligibility window, the board must be cleared within this many ticks for the reward path to unlock.
pub const DEFAULT_TIME_BUDGET: Ticks = 60;

pub const DEFAULT_PAIRS: PairCount = 6;

pub const DEFAULT_TICK_PERIOD_MS: u32 = 1000;

/// How long a mismatched pair stays visible before turning back down.
pub const DEFAULT_REVEAL_DELAY_MS: u32 = 1000;

/// Pre-uploaded metadata the reward is minted with.
pub const DEFAULT_TOKEN_URI: &str =
    "ipfs://bafkreiam4hsd4gcca26pxcg226j52vo5l6clr2ovte2uppnvurpdmflg6m";

/// Eligibility classification of a won board, inclusive of the budget itself.
pub const fn within_budget(elapsed: Ticks, budget: Ticks) -> bool {
    elapsed <= budget
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub pairs: PairCount,
    pub symbols: Vec<String>,
    pub time_budget: Ticks,
    pub tick_period_ms: u32,
    pub reveal_delay_ms: u32,
    pub token_uri: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS,
            symbols: (1..=DEFAULT_PAIRS)
                .map(|i| alloc::format!("image-{:02}", i))
                .collect(),
            time_budget: DEFAULT_TIME_BUDGET,
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }
}

impl GameConfig {
    pub fn new<S: AsRef<str>>(symbols: &[S]) -> Self {
        let symbols: Vec<String> = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        Self {
            pairs: symbols.len().try_into().unwrap_or(PairCount::MAX),
            symbols,
            ..Self::default()
        }
    }

    pub fn with_time_budget(self, time_budget: Ticks) -> Self {
        Self {
            time_budget,
            ..self
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|err| GameError::InvalidConfigFile(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.time_budget == 0 {
            return Err(GameError::InvalidTimeBudget);
        }
        if self.tick_period_ms == 0 || self.reveal_delay_ms == 0 {
            return Err(GameError::InvalidDuration);
        }
        Deck::check_face_values(self.pairs, &self.symbols)
    }

    pub const fn total_tiles(&self) -> u32 {
        self.pairs as u32 * 2
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms.into())
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms.into())
    }

    pub const fn within_budget(&self, elapsed: Ticks) -> bool {
        within_budget(elapsed, self.time_budget)
    }
}
