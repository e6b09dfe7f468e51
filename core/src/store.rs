//! In-memory profile list with its loading and error state.
//!
//! # Design
//! `ProfileStore` holds no I/O. Every change goes through a transition
//! method: `begin_refresh` / `complete_refresh` for list fetches and
//! `record_failure` for failed mutations. The list is only ever replaced
//! wholesale by a successful refresh, never patched in place.
//!
//! Refreshes are tagged with a monotonic sequence number. When two fetches
//! overlap and resolve out of order, the older result is discarded instead
//! of overwriting the newer list.
//!
//! A new store reports `loading` until its first refresh completes, so a
//! list that was never fetched is not shown as empty.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::types::UserProfile;

/// Operations whose failure the store reports to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    /// Fixed user-facing message for a failure of this operation.
    pub fn failure_message(self) -> &'static str {
        match self {
            SyncOperation::Fetch => "Failed to fetch profiles",
            SyncOperation::Create => "Failed to create profile",
            SyncOperation::Update => "Failed to update profile",
            SyncOperation::Delete => "Failed to delete profile",
        }
    }
}

/// Handle for one in-flight refresh, returned by `begin_refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[must_use]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// What `complete_refresh` did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list was replaced.
    Applied,
    /// The fetch failed; the previous list is kept.
    Failed,
    /// A newer refresh already landed; the result was dropped.
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: Vec<UserProfile>,
    error: Option<String>,
    next_sequence: u64,
    last_applied: Option<u64>,
    in_flight: usize,
    settled: bool,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Profiles from the last successful fetch, in server order.
    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    /// True before the first refresh completes and while any refresh is
    /// outstanding.
    pub fn loading(&self) -> bool {
        !self.settled || self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&UserProfile> {
        self.profiles.iter().find(|profile| profile.id == id)
    }

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.next_sequence += 1;
        self.in_flight += 1;
        debug!(sequence = self.next_sequence, "refresh started");
        RefreshTicket(self.next_sequence)
    }

    /// Applies the result of the fetch started with `ticket`. Loading is
    /// cleared once no refresh remains outstanding, whatever the outcome.
    pub fn complete_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<UserProfile>, ApiError>,
    ) -> RefreshOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.settled = true;

        if self.last_applied.is_some_and(|last| ticket.0 < last) {
            debug!(sequence = ticket.0, "discarding stale refresh");
            return RefreshOutcome::Stale;
        }

        match result {
            Ok(profiles) => {
                debug!(sequence = ticket.0, count = profiles.len(), "refresh applied");
                self.profiles = profiles;
                self.error = None;
                self.last_applied = Some(ticket.0);
                RefreshOutcome::Applied
            }
            Err(err) => {
                self.record_failure(SyncOperation::Fetch, &err);
                RefreshOutcome::Failed
            }
        }
    }

    /// Sets the message for a failed operation. The list is left as is.
    pub fn record_failure(&mut self, operation: SyncOperation, err: &ApiError) {
        warn!(?operation, error = %err, "profile operation failed");
        self.error = Some(operation.failure_message().to_string());
    }
}
