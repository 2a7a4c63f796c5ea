use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Idle -> Running
/// - Running -> Evaluating
/// - Running -> Won
/// - Evaluating -> Running
///
/// A matching second flip is resolved immediately, so the session stays Running (or goes straight to Won on the last
/// pair). Evaluating only ever holds a mismatched pair until it is concealed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No tile flipped yet, timer not started
    #[default]
    Idle,
    /// Zero or one tile face up
    Running,
    /// A mismatched pair is held face up, flips are rejected until it is concealed
    Evaluating,
    /// Every pair matched, elapsed time is frozen
    Won,
}

impl Phase {
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether the clock should be counting
    pub const fn is_timed(self) -> bool {
        matches!(self, Self::Running | Self::Evaluating)
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[default]
    InProgress,
    /// Board cleared within the time budget
    Won,
    /// Board cleared, but too slowly for the reward, a retry is offered
    Lost,
}

impl Outcome {
    pub const fn is_cleared(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    pub const fn offers_retry(self) -> bool {
        matches!(self, Self::Lost)
    }

    pub const fn classify(elapsed: Ticks, budget: Ticks) -> Self {
        if within_budget(elapsed, budget) {
            Self::Won
        } else {
            Self::Lost
        }
    }
}

/// Outcome of a flip request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlipOutcome {
    /// Request rejected, tile already up or matched, a pair is held, or the board is cleared
    NoChange,
    /// First tile of a pair turned up
    Revealed,
    Matched,
    /// Second tile turned up and differs, the pair is held until concealed
    Mismatched,
    /// Last pair matched
    Cleared,
}

impl FlipOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use FlipOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Matched => true,
            Mismatched => true,
            Cleared => true,
        }
    }
}

/// Gameplay state of one play-through from the first flip to the cleared board.
///
/// This holds no timers, time only moves when [`Session::tick`] is called. Sessions are only ever started from a
/// built deck, so this serializes for hosts but is never read back.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Session {
    deck: Deck,
    selection: SmallVec<[TileId; 2]>,
    phase: Phase,
    elapsed: Ticks,
    time_budget: Ticks,
    outcome: Outcome,
}

impl Session {
    pub fn new(deck: Deck, time_budget: Ticks) -> Self {
        Self {
            deck,
            selection: SmallVec::new(),
            phase: Phase::default(),
            elapsed: 0,
            time_budget,
            outcome: Outcome::default(),
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn selection(&self) -> &[TileId] {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> Ticks {
        self.elapsed
    }

    pub fn time_budget(&self) -> Ticks {
        self.time_budget
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Tiles held face up after a mismatch
    pub fn pending_pair(&self) -> Option<(TileId, TileId)> {
        match (self.phase, self.selection.as_slice()) {
            (Phase::Evaluating, &[a, b]) => Some((a, b)),
            _ => None,
        }
    }

    pub fn flip(&mut self, id: TileId) -> Result<FlipOutcome> {
        use FlipOutcome::*;

        let id = self.deck.validate_id(id)?;
        if matches!(self.phase, Phase::Evaluating | Phase::Won) {
            log::trace!("flip of tile {} rejected in {:?}", id, self.phase);
            return Ok(NoChange);
        }
        if !self.deck.flip(id)?.has_update() {
            return Ok(NoChange);
        }

        self.mark_started();
        self.selection.push(id);
        let &[a, b] = self.selection.as_slice() else {
            return Ok(Revealed);
        };

        Ok(match self.deck.evaluate(a, b) {
            Evaluation::Match => {
                self.selection.clear();
                if self.deck.is_cleared() {
                    self.mark_won();
                    Cleared
                } else {
                    Matched
                }
            }
            Evaluation::Mismatch => {
                self.phase = Phase::Evaluating;
                Mismatched
            }
        })
    }

    /// Advance elapsed time by one tick, ignored before the first flip and after the board is cleared
    pub fn tick(&mut self) -> bool {
        if self.phase.is_timed() {
            self.elapsed = self.elapsed.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// End the reveal hold, turning the mismatched pair back down
    pub fn conceal(&mut self) -> bool {
        let Some((a, b)) = self.pending_pair() else {
            return false;
        };
        self.deck.conceal(a, b);
        self.selection.clear();
        self.phase = Phase::Running;
        true
    }

    fn mark_started(&mut self) {
        if self.phase.is_idle() {
            log::debug!("session started");
            self.phase = Phase::Running;
        }
    }

    fn mark_won(&mut self) {
        self.phase = Phase::Won;
        self.outcome = Outcome::classify(self.elapsed, self.time_budget);
        log::info!(
            "board cleared in {} ticks (budget {}): {:?}",
            self.elapsed,
            self.time_budget,
            self.outcome
        );
    }
}
