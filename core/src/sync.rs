//! Dispatches profile mutations and keeps the store in step with the server.
//!
//! Every successful mutation is followed by exactly one full refresh through
//! `after_mutation`. Failures never propagate past this layer as anything
//! richer than the store's fixed message; the returned `Result` only tells
//! the caller whether the server accepted the change.

use tracing::debug;

use crate::api::ApiClient;
use crate::client::profile_path;
use crate::error::ApiError;
use crate::form::{ProfileForm, Submission};
use crate::store::{ProfileStore, RefreshOutcome, SyncOperation};
use crate::transport::Transport;
use crate::types::{CreateProfile, UpdateProfile, UserProfile};

/// Result of `ProfileSync::submit`.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Required fields were empty; nothing was sent.
    Dropped,
    Created(UserProfile),
    Updated(UserProfile),
    /// The server rejected the request; the form keeps its values.
    Failed(ApiError),
}

#[derive(Debug)]
pub struct ProfileSync<T> {
    api: ApiClient<T>,
    store: ProfileStore,
}

impl<T: Transport> ProfileSync<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            store: ProfileStore::new(),
        }
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Fetches the full list and applies it to the store.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        let ticket = self.store.begin_refresh();
        let result = self.api.get::<Vec<UserProfile>>("/profiles").await;
        self.store.complete_refresh(ticket, result)
    }

    pub async fn create(&mut self, input: &CreateProfile) -> Result<UserProfile, ApiError> {
        let result = self.api.post("/profiles", input).await;
        self.settle(SyncOperation::Create, result).await
    }

    pub async fn update(&mut self, id: &str, input: &UpdateProfile) -> Result<UserProfile, ApiError> {
        let result = self.api.patch(&profile_path(id), input).await;
        self.settle(SyncOperation::Update, result).await
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ApiError> {
        let result = self.api.delete(&profile_path(id)).await;
        self.settle(SyncOperation::Delete, result).await
    }

    /// Submits the form. On success the form is reset; on failure it keeps
    /// its values and mode so the user can retry.
    pub async fn submit(&mut self, form: &mut ProfileForm) -> SubmitOutcome {
        let submission = match form.submission() {
            Ok(submission) => submission,
            Err(reason) => {
                debug!(%reason, "dropping submission");
                return SubmitOutcome::Dropped;
            }
        };

        let outcome = match submission {
            Submission::Create(input) => match self.create(&input).await {
                Ok(profile) => SubmitOutcome::Created(profile),
                Err(err) => SubmitOutcome::Failed(err),
            },
            Submission::Update { id, changes } => match self.update(&id, &changes).await {
                Ok(profile) => SubmitOutcome::Updated(profile),
                Err(err) => SubmitOutcome::Failed(err),
            },
        };

        if !matches!(outcome, SubmitOutcome::Failed(_)) {
            form.reset();
        }
        outcome
    }

    /// Runs after every successful mutation.
    async fn after_mutation(&mut self) -> RefreshOutcome {
        self.refresh().await
    }

    async fn settle<R>(&mut self, operation: SyncOperation, result: Result<R, ApiError>) -> Result<R, ApiError> {
        match result {
            Ok(value) => {
                debug!(?operation, "mutation accepted");
                self.after_mutation().await;
                Ok(value)
            }
            Err(err) => {
                self.store.record_failure(operation, &err);
                Err(err)
            }
        }
    }
}
