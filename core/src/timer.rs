//! Scheduling seam between the controller and whatever drives real time.
//!
//! The controller never sleeps. It asks a [`Scheduler`] to arm a timer under a [`TimerId`] and keeps the returned
//! guard, the host calls [`SessionController::on_timer`] with that id whenever the timer fires. Dropping the guard
//! cancels the timer, which is how the clock stops when the board is cleared or the session is replaced.

use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use crate::*;

pub trait Scheduler {
    /// Handle that cancels the timer when dropped
    type Guard;

    /// Fire `timer` repeatedly every `period` until the guard is dropped
    fn every(&mut self, timer: TimerId, period: Duration) -> Self::Guard;

    /// Fire `timer` once after `delay` unless the guard is dropped first
    fn after(&mut self, timer: TimerId, delay: Duration) -> Self::Guard;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Interval,
    Timeout,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    pub duration: Duration,
}

type ArmedList = RefCell<Vec<ArmedTimer>>;

/// Scheduler that only records which timers are armed.
///
/// Clones share the same record, so a host or test can keep one clone, hand the other to the controller, and fire
/// timers by reading [`ManualScheduler::interval`] or [`ManualScheduler::timeout`].
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    armed: Rc<ArmedList>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> Vec<ArmedTimer> {
        self.armed.borrow().clone()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.armed.borrow().iter().any(|timer| timer.id == id)
    }

    /// Most recently armed interval still running
    pub fn interval(&self) -> Option<TimerId> {
        self.latest(TimerKind::Interval)
    }

    /// Most recently armed timeout still pending
    pub fn timeout(&self) -> Option<TimerId> {
        self.latest(TimerKind::Timeout)
    }

    fn latest(&self, kind: TimerKind) -> Option<TimerId> {
        self.armed
            .borrow()
            .iter()
            .rev()
            .find(|timer| timer.kind == kind)
            .map(|timer| timer.id)
    }

    fn arm(&mut self, id: TimerId, kind: TimerKind, duration: Duration) -> ManualGuard {
        self.armed.borrow_mut().push(ArmedTimer { id, kind, duration });
        ManualGuard {
            id,
            armed: Rc::downgrade(&self.armed),
        }
    }
}

impl Scheduler for ManualScheduler {
    type Guard = ManualGuard;

    fn every(&mut self, timer: TimerId, period: Duration) -> Self::Guard {
        self.arm(timer, TimerKind::Interval, period)
    }

    fn after(&mut self, timer: TimerId, delay: Duration) -> Self::Guard {
        self.arm(timer, TimerKind::Timeout, delay)
    }
}

#[derive(Debug)]
pub struct ManualGuard {
    id: TimerId,
    armed: Weak<ArmedList>,
}

impl Drop for ManualGuard {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.upgrade() {
            armed.borrow_mut().retain(|timer| timer.id != self.id);
        }
    }
}
