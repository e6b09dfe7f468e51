//! Async facade pairing a `ProfileClient` with a `Transport`.
//!
//! Exposes the four generic verbs the rest of the crate talks through. Each
//! call is a single round-trip: build, execute, parse. Nothing is retried.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ProfileClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::UploadResponse;
use crate::upload::UploadFile;

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    client: ProfileClient,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client for the configured base URL over a fresh reqwest transport.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(ProfileClient::new(&config.base_url), ReqwestTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(client: ProfileClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &ProfileClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let request = self.client.build_get(path);
        let response = self.transport.execute(request).await?;
        self.client.parse_json(response)
    }

    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request = self.client.build_post(path, body)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_json(response)
    }

    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let request = self.client.build_patch(path, body)?;
        let response = self.transport.execute(request).await?;
        self.client.parse_json(response)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.client.build_delete(path);
        let response = self.transport.execute(request).await?;
        self.client.parse_empty(response)
    }

    /// Sends `file` to the upload endpoint without any local validation.
    /// `UploadAdapter` is the entry point that validates first.
    pub async fn upload(&self, file: &UploadFile) -> Result<UploadResponse, ApiError> {
        let request = self.client.build_upload(file);
        let response = self.transport.execute(request).await?;
        self.client.parse_upload(response)
    }
}
