use alloc::boxed::Box;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything a UI needs to render the experience, emitted to listeners on every transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionId,
    pub outcome: Outcome,
    pub elapsed: Ticks,
    pub reward: RewardState,
}

/// Outcome of a timer event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerOutcome {
    /// Timer was cancelled or belongs to a replaced session
    Ignored,
    Ticked,
    Concealed,
}

impl TimerOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, PartialEq)]
pub enum ConfirmOutcome {
    /// Nothing to submit, either not eligible, already submitting, or already issued
    NoChange,
    /// Hand this ticket to the reward capability
    Submit(SubmissionTicket),
}

impl ConfirmOutcome {
    pub const fn has_update(&self) -> bool {
        matches!(self, Self::Submit(_))
    }

    pub fn into_ticket(self) -> Option<SubmissionTicket> {
        match self {
            Self::NoChange => None,
            Self::Submit(ticket) => Some(ticket),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Completion for a replaced session or a request no longer in flight, dropped
    Stale,
    Applied(RewardState),
}

impl CompletionOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

pub type Listener = Box<dyn FnMut(&SessionSnapshot)>;

struct Armed<G> {
    id: TimerId,
    _guard: G,
}

/// Drives one session at a time from player input to the reward submission.
///
/// All state changes go through `&mut self` and run to completion, the only asynchronous step is the reward
/// submission, which happens outside the controller through a [`SubmissionTicket`].
pub struct SessionController<S: Scheduler, A: AccountProvider> {
    config: GameConfig,
    scheduler: S,
    accounts: A,
    session: Session,
    session_id: SessionId,
    reward: RewardRequest,
    clock: Option<Armed<S::Guard>>,
    hold: Option<Armed<S::Guard>>,
    next_session: SessionId,
    next_timer: TimerId,
    next_request: RequestId,
    listeners: Vec<Listener>,
}

impl<S: Scheduler, A: AccountProvider> SessionController<S, A> {
    pub fn new(
        config: GameConfig,
        scheduler: S,
        accounts: A,
        generator: impl DeckGenerator,
    ) -> Result<Self> {
        config.validate()?;
        let deck = generator.generate(&config)?;
        let mut next_session = SessionId(0);
        let session_id = next_session.bump();
        log::debug!("starting {}", session_id);

        Ok(Self {
            session: Session::new(deck, config.time_budget),
            config,
            scheduler,
            accounts,
            session_id,
            reward: RewardRequest::new(),
            clock: None,
            hold: None,
            next_session,
            next_timer: TimerId(0),
            next_request: RequestId(0),
            listeners: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn reward(&self) -> &RewardRequest {
        &self.reward
    }

    pub fn board(&self) -> BoardView {
        BoardView::from_session(&self.session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session: self.session_id,
            outcome: self.session.outcome(),
            elapsed: self.session.elapsed(),
            reward: self.reward.state(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SessionSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the current session with a freshly generated deck.
    ///
    /// Pending timers are cancelled and the reward request is discarded, completions for the old session are ignored
    /// from now on.
    pub fn reset(&mut self, generator: impl DeckGenerator) -> Result<SessionId> {
        let deck = generator.generate(&self.config)?;
        self.clock = None;
        self.hold = None;
        self.session = Session::new(deck, self.config.time_budget);
        self.reward = RewardRequest::new();
        let previous = self.session_id;
        self.session_id = self.next_session.bump();
        log::debug!("replaced {} with {}", previous, self.session_id);
        self.emit();
        Ok(self.session_id)
    }

    pub fn flip(&mut self, id: TileId) -> Result<FlipOutcome> {
        use FlipOutcome::*;

        let was_idle = self.session.phase().is_idle();
        let outcome = self.session.flip(id)?;
        if !outcome.has_update() {
            return Ok(outcome);
        }

        if was_idle {
            self.start_clock();
        }
        match outcome {
            Mismatched => self.start_hold(),
            Cleared => self.finish(),
            NoChange | Revealed | Matched => {}
        }
        self.emit();
        Ok(outcome)
    }

    /// Deliver a fired timer, ids of cancelled timers are ignored
    pub fn on_timer(&mut self, id: TimerId) -> TimerOutcome {
        let outcome = if self.clock.as_ref().is_some_and(|armed| armed.id == id) {
            if self.session.tick() {
                log::trace!("tick {} of {}", self.session.elapsed(), self.session_id);
                TimerOutcome::Ticked
            } else {
                TimerOutcome::Ignored
            }
        } else if self.hold.as_ref().is_some_and(|armed| armed.id == id) {
            self.hold = None;
            if self.session.conceal() {
                TimerOutcome::Concealed
            } else {
                TimerOutcome::Ignored
            }
        } else {
            log::trace!("ignoring {}, not armed for {}", id, self.session_id);
            TimerOutcome::Ignored
        };

        if outcome.has_update() {
            self.emit();
        }
        outcome
    }

    /// Player confirmation of the reward.
    ///
    /// Hands out a ticket only on Eligible or Failed. Without an active account this returns
    /// [`GameError::AccountUnavailable`] and the reward state is left as it was.
    pub fn confirm(&mut self) -> Result<ConfirmOutcome> {
        if !self.reward.state().can_submit() {
            log::trace!("confirm ignored in {:?}", self.reward.state());
            return Ok(ConfirmOutcome::NoChange);
        }
        let Some(account) = self.accounts.active_account() else {
            log::warn!("confirm without an active account");
            return Err(GameError::AccountUnavailable);
        };

        let request = self.next_request.bump();
        let Some(payload) = self.reward.begin(request) else {
            return Ok(ConfirmOutcome::NoChange);
        };
        log::debug!("{} submitting {} for {}", self.session_id, request, account);
        self.emit();

        Ok(ConfirmOutcome::Submit(SubmissionTicket {
            session: self.session_id,
            request,
            account,
            payload,
        }))
    }

    /// Apply the result of a ticket if it still belongs to the current session
    pub fn complete(&mut self, completion: SubmissionCompletion) -> CompletionOutcome {
        let SubmissionCompletion {
            session,
            request,
            result,
        } = completion;

        if session != self.session_id {
            log::debug!("dropping {} for replaced {}", request, session);
            return CompletionOutcome::Stale;
        }
        if !self.reward.resolve(request, result).has_update() {
            log::debug!("dropping {}, not in flight", request);
            return CompletionOutcome::Stale;
        }
        self.emit();
        CompletionOutcome::Applied(self.reward.state())
    }

    fn start_clock(&mut self) {
        let id = self.next_timer.bump();
        log::debug!("{} clock started as {}", self.session_id, id);
        let guard = self.scheduler.every(id, self.config.tick_period());
        self.clock = Some(Armed { id, _guard: guard });
    }

    fn start_hold(&mut self) {
        let id = self.next_timer.bump();
        let guard = self.scheduler.after(id, self.config.reveal_delay());
        self.hold = Some(Armed { id, _guard: guard });
    }

    fn finish(&mut self) {
        self.clock = None;
        log::debug!(
            "{} clock stopped at {}",
            self.session_id,
            self.session.elapsed()
        );
        if self.session.outcome() == Outcome::Won {
            self.reward.mark_eligible(RewardPayload {
                session: self.session_id,
                elapsed: self.session.elapsed(),
                time_budget: self.session.time_budget(),
                token_uri: self.config.token_uri.clone(),
            });
        }
    }

    fn emit(&mut self) {
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    type Controller = SessionController<ManualScheduler, Option<AccountId>>;

    fn controller(budget: Ticks) -> (Controller, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let config = GameConfig::new(&["a", "b"]).with_time_budget(budget);
        let controller = SessionController::new(
            config,
            scheduler.clone(),
            Some(AccountId::new("0xabc")),
            OrderedDeckGenerator,
        )
        .unwrap();
        (controller, scheduler)
    }

    #[test]
    fn clock_arms_on_first_flip_and_stops_on_clear() {
        let (mut ctl, timers) = controller(5);
        assert_eq!(timers.interval(), None);

        ctl.flip(0).unwrap();
        let clock = timers.interval().unwrap();
        assert_eq!(ctl.on_timer(clock), TimerOutcome::Ticked);

        ctl.flip(2).unwrap();
        ctl.flip(1).unwrap();
        assert_eq!(ctl.flip(3).unwrap(), FlipOutcome::Cleared);
        assert!(timers.armed().is_empty());

        assert_eq!(ctl.on_timer(clock), TimerOutcome::Ignored);
        assert_eq!(ctl.snapshot().elapsed, 1);
        assert_eq!(ctl.snapshot().reward, RewardState::Eligible);
    }

    #[test]
    fn listeners_see_every_transition() {
        let (mut ctl, timers) = controller(5);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ctl.subscribe(move |snapshot| sink.borrow_mut().push(*snapshot));

        ctl.flip(0).unwrap();
        ctl.flip(0).unwrap();
        ctl.on_timer(timers.interval().unwrap());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].elapsed, 1);
    }

    #[test]
    fn reset_cancels_timers_and_rejects_old_ids() {
        let (mut ctl, timers) = controller(5);
        ctl.flip(0).unwrap();
        ctl.flip(1).unwrap();
        let clock = timers.interval().unwrap();
        let hold = timers.timeout().unwrap();

        let first = ctl.session_id();
        let second = ctl.reset(OrderedDeckGenerator).unwrap();
        assert_ne!(first, second);
        assert!(timers.armed().is_empty());
        assert_eq!(ctl.on_timer(clock), TimerOutcome::Ignored);
        assert_eq!(ctl.on_timer(hold), TimerOutcome::Ignored);
        assert!(ctl.session().phase().is_idle());
    }

    #[test]
    fn confirm_without_account_is_blocked() {
        let scheduler = ManualScheduler::new();
        let config = GameConfig::new(&["a"]);
        let mut ctl =
            SessionController::new(config, scheduler, None::<AccountId>, OrderedDeckGenerator)
                .unwrap();

        ctl.flip(0).unwrap();
        ctl.flip(1).unwrap();
        assert_eq!(ctl.confirm(), Err(GameError::AccountUnavailable));
        assert_eq!(ctl.reward().state(), RewardState::Eligible);
        assert_eq!(ctl.reward().attempts(), 0);
    }
}
