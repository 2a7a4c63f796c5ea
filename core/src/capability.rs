//! Interfaces to the collaborators outside the core: who is playing, and how the reward is issued.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::future::Future;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proof of issuance reported by the reward capability, e.g. a transaction hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(String);

impl ReceiptId {
    pub fn new(receipt: impl Into<String>) -> Self {
        Self(receipt.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Reward contract not found")]
    ContractMissing,
    #[error("Submission rejected: {0}")]
    Rejected(String),
    #[error("Network failure: {0}")]
    Network(String),
}

pub trait AccountProvider {
    fn active_account(&self) -> Option<AccountId>;
}

impl<F: Fn() -> Option<AccountId>> AccountProvider for F {
    fn active_account(&self) -> Option<AccountId> {
        self()
    }
}

impl AccountProvider for Option<AccountId> {
    fn active_account(&self) -> Option<AccountId> {
        self.clone()
    }
}

pub trait RewardSubmitter {
    /// Issue the reward to `account`, one call per ticket, repeated identical calls are never deduplicated here
    fn submit(
        &self,
        account: &AccountId,
        payload: &RewardPayload,
    ) -> impl Future<Output = core::result::Result<ReceiptId, SubmissionError>>;
}

/// Reward metadata fixed when the session becomes eligible, every retry submits the same value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPayload {
    pub session: SessionId,
    pub elapsed: Ticks,
    pub time_budget: Ticks,
    pub token_uri: String,
}

impl RewardPayload {
    /// JSON encoding for capabilities that forward the payload as an opaque blob
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// Authorization for exactly one call to the reward capability.
///
/// Tickets are handed out by [`SessionController::confirm`] and cannot be cloned, submitting consumes them.
#[derive(Debug, PartialEq)]
pub struct SubmissionTicket {
    pub(crate) session: SessionId,
    pub(crate) request: RequestId,
    pub(crate) account: AccountId,
    pub(crate) payload: RewardPayload,
}

impl SubmissionTicket {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn payload(&self) -> &RewardPayload {
        &self.payload
    }

    pub async fn submit<R: RewardSubmitter>(self, submitter: &R) -> SubmissionCompletion {
        log::info!("submitting reward {} for {}", self.request, self.account);
        let result = submitter.submit(&self.account, &self.payload).await;
        self.complete(result)
    }

    /// Wrap a result obtained by calling the capability directly
    pub fn complete(
        self,
        result: core::result::Result<ReceiptId, SubmissionError>,
    ) -> SubmissionCompletion {
        SubmissionCompletion {
            session: self.session,
            request: self.request,
            result,
        }
    }
}

/// Result of a ticket, tagged so the controller can drop it if the session moved on.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmissionCompletion {
    pub(crate) session: SessionId,
    pub(crate) request: RequestId,
    pub(crate) result: core::result::Result<ReceiptId, SubmissionError>,
}

impl SubmissionCompletion {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn request(&self) -> RequestId {
        self.request
    }

    pub fn result(&self) -> core::result::Result<&ReceiptId, &SubmissionError> {
        self.result.as_ref()
    }
}
