// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock of the Garmin Connect endpoints.
//!
//! The server runs on its own thread with its own Tokio runtime so tests can
//! drive the blocking client from the test thread.

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use garmin_uploader::{Config, Session};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const USERNAME: &str = "fred";
pub const PASSWORD: &str = "hunter2";

/// One request as seen by the mock server.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub cookie: Option<String>,
}

/// One multipart upload as seen by the mock server.
#[derive(Debug, Clone, Default)]
#[allow(dead_code)]
pub struct RecordedUpload {
    pub extension: String,
    pub fields: Vec<String>,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

/// Mutable behavior and recorded traffic of the mock.
pub struct MockState {
    /// Value `/user/username` reports after a good login
    pub username: Mutex<String>,
    /// Body of the account endpoint
    pub account: Mutex<Value>,
    /// Status and body returned for uploads
    pub upload_response: Mutex<(StatusCode, String)>,
    /// Name echoed by rename; `None` echoes the requested name
    pub rename_echo: Mutex<Option<String>>,
    /// Search pages, indexed by `start / limit`
    pub pages: Mutex<Vec<Vec<Value>>>,
    /// Activities served by the by-id endpoint
    pub activities: Mutex<HashMap<u64, Value>>,

    pub requests: Mutex<Vec<RecordedRequest>>,
    pub login_forms: Mutex<Vec<HashMap<String, String>>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub renames: Mutex<Vec<(u64, String)>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            username: Mutex::new(USERNAME.to_string()),
            account: Mutex::new(json!({ "account": { "userId": "42", "username": USERNAME } })),
            upload_response: Mutex::new((StatusCode::OK, upload_success(123).to_string())),
            rename_echo: Mutex::new(None),
            pages: Mutex::new(Vec::new()),
            activities: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            login_forms: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            renames: Mutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl MockState {
    pub fn set_upload_response(&self, status: StatusCode, body: impl Into<String>) {
        *self.upload_response.lock().unwrap() = (status, body.into());
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }
}

/// A running mock server.
pub struct MockGarmin {
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockGarmin {
    pub fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = router(state.clone());

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        listener.set_nonblocking(true).unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("mock runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });

        Self { base_url, state }
    }

    pub fn config(&self) -> Config {
        Config::with_base_url(&self.base_url)
    }

    /// New unauthenticated session against this server.
    pub fn session(&self) -> Session {
        Session::new(self.config()).expect("session")
    }

    /// Session that has already signed in as the default user.
    pub fn signed_in_session(&self) -> Session {
        let mut session = self.session();
        assert!(session.sign_in(USERNAME, PASSWORD), "mock sign in failed");
        session
    }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/signin", get(signin_page).post(signin_submit))
        .route("/user/username", get(current_username))
        .route("/proxy/user-service-1.0/json/account", get(account))
        .route("/proxy/upload-service-1.1/json/upload/{ext}", post(upload))
        .route("/proxy/activity-service-1.3/json/name/{id}", post(rename))
        .route("/proxy/activity-service-1.3/json/activity/{id}", get(activity))
        .route(
            "/proxy/activity-search-service-1.2/json/activities",
            get(search),
        )
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        cookie: cookie_header(request.headers()),
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(request).await
}

fn cookie_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn has_cookie(headers: &HeaderMap, cookie: &str) -> bool {
    cookie_header(headers).is_some_and(|c| c.split("; ").any(|part| part == cookie))
}

async fn signin_page() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, "JSESSIONID=mock-session; Path=/")],
        "<html>sign in</html>",
    )
}

async fn signin_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let accepted = has_cookie(&headers, "JSESSIONID=mock-session")
        && form.get("login:loginUsernameField").map(String::as_str) == Some(USERNAME)
        && form.get("login:password").map(String::as_str) == Some(PASSWORD);
    state.login_forms.lock().unwrap().push(form);

    if accepted {
        ([(header::SET_COOKIE, "SSO=granted; Path=/")], "<html>welcome</html>").into_response()
    } else {
        (
            [(header::SET_COOKIE, "SSO=; Max-Age=0; Path=/")],
            "<html>try again</html>",
        )
            .into_response()
    }
}

async fn current_username(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Json<Value> {
    if has_cookie(&headers, "SSO=granted") {
        Json(json!({ "username": *state.username.lock().unwrap() }))
    } else {
        Json(json!({ "username": "" }))
    }
}

async fn account(State(state): State<Arc<MockState>>) -> Json<Value> {
    Json(state.account.lock().unwrap().clone())
}

async fn upload(
    State(state): State<Arc<MockState>>,
    Path(ext): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let mut recorded = RecordedUpload {
        extension: ext,
        ..RecordedUpload::default()
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "data" {
            recorded.file_name = field.file_name().map(str::to_string);
            recorded.data = field.bytes().await.unwrap().to_vec();
        }
        recorded.fields.push(name);
    }
    state.uploads.lock().unwrap().push(recorded);

    let (status, body) = state.upload_response.lock().unwrap().clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn rename(
    State(state): State<Arc<MockState>>,
    Path(id): Path<u64>,
    Form(form): Form<HashMap<String, String>>,
) -> Json<Value> {
    let requested = form.get("value").cloned().unwrap_or_default();
    state.renames.lock().unwrap().push((id, requested.clone()));
    let echoed = state.rename_echo.lock().unwrap().clone().unwrap_or(requested);
    Json(json!({ "display": { "value": echoed } }))
}

async fn activity(State(state): State<Arc<MockState>>, Path(id): Path<u64>) -> Response {
    match state.activities.lock().unwrap().get(&id) {
        Some(activity) => Json(json!({ "activity": activity })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, usize>>,
) -> Json<Value> {
    let limit = params.get("limit").copied().unwrap_or(50).max(1);
    let start = params.get("start").copied().unwrap_or(0);
    let page = state
        .pages
        .lock()
        .unwrap()
        .get(start / limit)
        .cloned()
        .unwrap_or_default();
    let activities: Vec<Value> = page.into_iter().map(|a| json!({ "activity": a })).collect();
    Json(json!({ "results": { "activities": activities } }))
}

// ─── Payload builders ────────────────────────────────────────────────────────

pub fn upload_success(internal_id: u64) -> Value {
    json!({
        "detailedImportResult": {
            "uploadId": 1,
            "successes": [{ "internalId": internal_id, "messages": null }],
            "failures": []
        }
    })
}

#[allow(dead_code)]
pub fn upload_failure(internal_id: Option<u64>, code: i64) -> Value {
    let mut failure = json!({ "messages": [{ "code": code, "content": "Mock failure." }] });
    if let Some(id) = internal_id {
        failure["internalId"] = json!(id);
    }
    json!({
        "detailedImportResult": {
            "uploadId": 1,
            "successes": [],
            "failures": [failure]
        }
    })
}

/// Activity object as the search and detail endpoints nest it.
#[allow(dead_code)]
pub fn activity_json(id: u64, name: &str) -> Value {
    json!({
        "activityId": id,
        "activityName": name,
        "activityType": { "key": "running" },
        "activitySummary": {
            "BeginTimestamp": { "value": "2013-05-04T16:20:01.000Z", "uom": "America/Los_Angeles" },
            "EndTimestamp": { "value": "2013-05-04T17:05:31.000Z", "uom": "America/Los_Angeles" },
            "BeginLatitude": { "value": "37.3861", "uom": "dd" },
            "BeginLongitude": { "value": "-122.0839", "uom": "dd" },
            "EndLatitude": { "value": "37.3900", "uom": "dd" },
            "EndLongitude": { "value": "-122.0800", "uom": "dd" },
            "SumDistance": { "value": format!("{}.5", id % 100), "uom": "kilometer" },
            "SumDuration": { "value": "2730.0", "uom": "second" }
        }
    })
}
