//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port. The wire-level test
//! executes the core's `HttpRequest` values with ureq, as a host without an
//! async runtime would. The sync-flow tests drive `ProfileSync` through
//! `ReqwestTransport`.

use profile_core::{
    ApiClient, ApiError, CreateProfile, HttpBody, HttpMethod, HttpResponse, ProfileClient,
    ProfileForm, ProfileSync, ReqwestTransport, SubmitOutcome, UpdateProfile, UploadAdapter,
    UploadFile,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the core
/// client handle status interpretation.
fn execute(req: profile_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(HttpBody::Json(body))) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, Some(HttpBody::Json(body))) => {
            agent.patch(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (method, body) => panic!("unsupported request in wire test: {method:?} {body:?}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

/// Binds the mock server on a random port in a background thread and
/// returns its origin.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn live_sync(base_url: &str) -> ProfileSync<ReqwestTransport> {
    ProfileSync::new(ApiClient::new(
        ProfileClient::new(base_url),
        ReqwestTransport::new(),
    ))
}

#[test]
fn wire_level_crud_lifecycle() {
    let client = ProfileClient::new(&spawn_server());

    // Step 1: list: should be empty.
    let req = client.build_list_profiles();
    let profiles = client.parse_list_profiles(execute(req)).unwrap();
    assert!(profiles.is_empty(), "expected empty list");

    // Step 2: create.
    let input = CreateProfile {
        full_name: "Integration test".to_string(),
        email: "it@example.com".to_string(),
        phone_number: Some("+44 20 7946 0000".to_string()),
        ..Default::default()
    };
    let req = client.build_create_profile(&input).unwrap();
    let created = client.parse_profile(execute(req)).unwrap();
    assert_eq!(created.full_name, "Integration test");
    assert!(created.is_active);
    let id = created.id.clone();

    // Step 3: partial update.
    let update = UpdateProfile {
        country: Some("Germany".to_string()),
        ..Default::default()
    };
    let req = client.build_update_profile(&id, &update).unwrap();
    let updated = client.parse_profile(execute(req)).unwrap();
    assert_eq!(updated.country.as_deref(), Some("Germany"));
    assert_eq!(updated.phone_number, created.phone_number);

    // Step 4: list: one item, matching the update.
    let req = client.build_list_profiles();
    let profiles = client.parse_list_profiles(execute(req)).unwrap();
    assert_eq!(profiles, vec![updated]);

    // Step 5: delete.
    let req = client.build_delete_profile(&id);
    client.parse_empty(execute(req)).unwrap();

    // Step 6: delete again, 404.
    let req = client.build_delete_profile(&id);
    let err = client.parse_empty(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::RequestFailed { status: 404 }));
}

#[tokio::test]
async fn create_then_refresh_contains_submitted_fields() {
    let mut sync = live_sync(&spawn_server());

    let input = CreateProfile {
        full_name: "Hedy Lamarr".to_string(),
        email: "hedy@example.com".to_string(),
        country: Some("Austria".to_string()),
        ..Default::default()
    };
    sync.create(&input).await.unwrap();

    let profiles = sync.store().profiles();
    assert_eq!(profiles.len(), 1);
    let stored = &profiles[0];
    assert_eq!(stored.full_name, "Hedy Lamarr");
    assert_eq!(stored.email, "hedy@example.com");
    assert_eq!(stored.country.as_deref(), Some("Austria"));
    assert!(stored.phone_number.is_none());
    assert!(stored.is_active);
    assert!(!stored.id.is_empty());
    assert!(!stored.created_at.is_empty());
}

#[tokio::test]
async fn partial_update_changes_only_given_field() {
    let mut sync = live_sync(&spawn_server());

    let input = CreateProfile {
        full_name: "Radia Perlman".to_string(),
        email: "radia@example.com".to_string(),
        phone_number: Some("555-0101".to_string()),
        country: Some("United States".to_string()),
        ..Default::default()
    };
    let created = sync.create(&input).await.unwrap();

    let changes = UpdateProfile {
        is_active: Some(false),
        ..Default::default()
    };
    sync.update(&created.id, &changes).await.unwrap();

    let after = sync.store().find(&created.id).unwrap();
    assert!(!after.is_active);
    assert_eq!(after.full_name, created.full_name);
    assert_eq!(after.email, created.email);
    assert_eq!(after.phone_number, created.phone_number);
    assert_eq!(after.country, created.country);
    assert_eq!(after.created_at, created.created_at);
}

#[tokio::test]
async fn remove_then_refresh_omits_id() {
    let mut sync = live_sync(&spawn_server());

    let keep = sync
        .create(&CreateProfile {
            full_name: "Keep".to_string(),
            email: "keep@example.com".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let gone = sync
        .create(&CreateProfile {
            full_name: "Gone".to_string(),
            email: "gone@example.com".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    sync.remove(&gone.id).await.unwrap();

    let ids: Vec<&str> = sync.store().profiles().iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec![keep.id.as_str()]);
    assert!(sync.store().error().is_none());
}

#[tokio::test]
async fn avatar_upload_flows_into_created_profile() {
    let mut sync = live_sync(&spawn_server());
    let mut adapter = UploadAdapter::new();

    let file = UploadFile::new("avatar.png", "image/png", vec![0x89; 1024 * 1024]);
    let url = adapter.upload(sync.api(), vec![file]).await.unwrap();
    assert!(url.contains("/uploads/"));

    let mut form = ProfileForm::new();
    form.values_mut().full_name = "Barbara Liskov".to_string();
    form.values_mut().email = "barbara@example.com".to_string();
    form.set_avatar_url(url.clone());

    let outcome = sync.submit(&mut form).await;
    assert!(matches!(outcome, SubmitOutcome::Created(_)));
    assert_eq!(
        sync.store().profiles()[0].avatar_url.as_deref(),
        Some(url.as_str())
    );

    let served = reqwest::get(&url).await.unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.unwrap().len(), 1024 * 1024);
}

#[tokio::test]
async fn removing_avatar_in_edit_mode_clears_it_on_the_server() {
    let mut sync = live_sync(&spawn_server());
    let mut adapter = UploadAdapter::new();

    let file = UploadFile::new("avatar.png", "image/png", vec![0x89; 512]);
    let url = adapter.upload(sync.api(), vec![file]).await.unwrap();

    let mut form = ProfileForm::new();
    form.values_mut().full_name = "Frances Allen".to_string();
    form.values_mut().email = "frances@example.com".to_string();
    form.set_avatar_url(url);
    let created = match sync.submit(&mut form).await {
        SubmitOutcome::Created(profile) => profile,
        other => panic!("expected create, got {other:?}"),
    };
    assert!(created.avatar_url.is_some());

    form.begin_edit(&created);
    form.remove_avatar();
    let outcome = sync.submit(&mut form).await;
    assert!(matches!(outcome, SubmitOutcome::Updated(_)));

    let after = sync.store().find(&created.id).unwrap();
    assert!(after.avatar_url.is_none());
    assert_eq!(after.full_name, "Frances Allen");
}

#[tokio::test]
async fn unreachable_server_reports_fetch_failure() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut sync = live_sync(&format!("http://{addr}"));

    sync.refresh().await;
    assert_eq!(sync.store().error(), Some("Failed to fetch profiles"));
    assert!(!sync.store().loading());
}
