use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Ineligible -> Eligible
/// - Eligible -> Submitting
/// - Submitting -> Succeeded
/// - Submitting -> Failed
/// - Failed -> Submitting
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardState {
    /// Board not cleared yet, or cleared too slowly
    #[default]
    Ineligible,
    Eligible,
    /// One submission in flight, further confirmations are ignored
    Submitting,
    Succeeded,
    /// Last submission failed, confirming again retries with the same payload
    Failed,
}

impl RewardState {
    pub const fn can_submit(self) -> bool {
        matches!(self, Self::Eligible | Self::Failed)
    }

    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// How a completion was applied to the request
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Not the request currently in flight
    Stale,
    Succeeded,
    Failed,
}

impl ResolveOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Stale)
    }
}

/// The reward request of one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RewardRequest {
    state: RewardState,
    payload: Option<RewardPayload>,
    in_flight: Option<RequestId>,
    attempts: u32,
    receipt: Option<ReceiptId>,
    last_error: Option<SubmissionError>,
}

impl RewardRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RewardState {
        self.state
    }

    pub fn payload(&self) -> Option<&RewardPayload> {
        self.payload.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Number of submissions started, including the one in flight
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn receipt(&self) -> Option<&ReceiptId> {
        self.receipt.as_ref()
    }

    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    /// Unlock the reward path, only the first call on an ineligible request has any effect
    pub(crate) fn mark_eligible(&mut self, payload: RewardPayload) -> bool {
        if self.state != RewardState::Ineligible || self.payload.is_some() {
            return false;
        }
        log::debug!("reward eligible for {}", payload.session);
        self.payload = Some(payload);
        self.state = RewardState::Eligible;
        true
    }

    /// Move to Submitting under `request`, returning the payload to submit
    pub(crate) fn begin(&mut self, request: RequestId) -> Option<RewardPayload> {
        if !self.state.can_submit() {
            return None;
        }
        let payload = self.payload.clone()?;
        self.state = RewardState::Submitting;
        self.in_flight = Some(request);
        self.attempts += 1;
        Some(payload)
    }

    pub(crate) fn resolve(
        &mut self,
        request: RequestId,
        result: core::result::Result<ReceiptId, SubmissionError>,
    ) -> ResolveOutcome {
        if self.in_flight != Some(request) {
            return ResolveOutcome::Stale;
        }
        self.in_flight = None;
        match result {
            Ok(receipt) => {
                log::info!("reward {} issued: {}", request, receipt.as_str());
                self.receipt = Some(receipt);
                self.last_error = None;
                self.state = RewardState::Succeeded;
                ResolveOutcome::Succeeded
            }
            Err(err) => {
                log::warn!("reward {} failed: {}", request, err);
                self.last_error = Some(err);
                self.state = RewardState::Failed;
                ResolveOutcome::Failed
            }
        }
    }
}
