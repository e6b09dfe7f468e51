//! Headless client core for the user-profile service.
//!
//! # Overview
//! Everything a profile management page needs apart from rendering: the
//! REST client, the profile list with its loading and error state, the
//! create/edit form, and avatar uploads.
//!
//! # Design
//! - `ProfileClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `Transport` is the only I/O seam. `ReqwestTransport` implements it for
//!   real use; tests substitute scripted transports.
//! - `ProfileStore` is a plain state container with explicit transitions;
//!   `ProfileSync` drives it and re-fetches the whole list after every
//!   successful mutation.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;
pub mod upload;
pub mod view;

pub use api::ApiClient;
pub use client::{profile_path, ProfileClient};
pub use config::ClientConfig;
pub use error::{ApiError, UploadError, ValidationError};
pub use form::{FormMode, FormValues, ProfileForm, Submission};
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartFile};
pub use store::{ProfileStore, RefreshOutcome, RefreshTicket, SyncOperation};
pub use sync::{ProfileSync, SubmitOutcome};
pub use transport::{ReqwestTransport, Transport};
pub use types::{CreateProfile, UpdateProfile, UploadResponse, UserProfile, SUGGESTED_COUNTRIES};
pub use upload::{UploadAdapter, UploadFile, MAX_UPLOAD_BYTES};
pub use view::{form_title, list_view, ListView, ProfileRow};
