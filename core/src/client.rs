//! Stateless HTTP request builder and response parser for the profile API.
//!
//! # Design
//! `ProfileClient` holds only the API root and carries no mutable state
//! between calls. Every operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The generic `build_get` / `build_post` / `build_patch` /
//! `build_delete` builders back the profile-specific ones.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartFile};
use crate::types::{CreateProfile, UpdateProfile, UploadResponse, UserProfile};
use crate::upload::UploadFile;

/// Name of the multipart field the upload endpoint reads.
pub const UPLOAD_FIELD: &str = "file";

/// Characters escaped in a single path segment (RFC 3986 `pchar` plus `%`).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path of one profile, relative to the API root. The id is escaped so it
/// always stays a single segment.
pub fn profile_path(id: &str) -> String {
    format!("/profiles/{}", utf8_percent_encode(id, PATH_SEGMENT))
}

/// Synchronous, stateless client for the profile API.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    api_root: String,
}

impl ProfileClient {
    /// `base_url` is the server origin; every path is resolved under
    /// `{base_url}/api`.
    pub fn new(base_url: &str) -> Self {
        Self {
            api_root: format!("{}/api", base_url.trim_end_matches('/')),
        }
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_root)
    }

    pub fn build_get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.build_json(HttpMethod::Post, path, body)
    }

    pub fn build_patch<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.build_json(HttpMethod::Patch, path, body)
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn build_json<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(HttpBody::Json(body)),
        })
    }

    pub fn build_list_profiles(&self) -> HttpRequest {
        self.build_get("/profiles")
    }

    pub fn build_create_profile(&self, input: &CreateProfile) -> Result<HttpRequest, ApiError> {
        self.build_post("/profiles", input)
    }

    pub fn build_update_profile(&self, id: &str, input: &UpdateProfile) -> Result<HttpRequest, ApiError> {
        self.build_patch(&profile_path(id), input)
    }

    pub fn build_delete_profile(&self, id: &str) -> HttpRequest {
        self.build_delete(&profile_path(id))
    }

    /// The multipart framing is produced by the transport, so no
    /// content-type header is set here.
    pub fn build_upload(&self, file: &UploadFile) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url("/upload"),
            headers: Vec::new(),
            body: Some(HttpBody::Multipart(MultipartFile {
                field: UPLOAD_FIELD.to_string(),
                file_name: file.file_name.clone(),
                content_type: file.content_type.clone(),
                bytes: file.bytes.clone(),
            })),
        }
    }

    pub fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_list_profiles(&self, response: HttpResponse) -> Result<Vec<UserProfile>, ApiError> {
        self.parse_json(response)
    }

    /// Parses the single profile returned by create and update.
    pub fn parse_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_upload(&self, response: HttpResponse) -> Result<UploadResponse, ApiError> {
        self.parse_json(response)
    }
}

/// Anything outside 200-299 is a failure; the body is not inspected.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::RequestFailed {
        status: response.status,
    })
}
