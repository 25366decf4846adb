//! Sign in, dashboard, meeting start and profile flows against a mock backend
//! (auth + tables) and mock room provider, both bound to a random local port.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use ubuntumeet::{
    app,
    config::{BaasConfig, ProviderConfig},
    AppState, Config,
};

const USER_ID: &str = "6f1c2a4e-9d3b-4c5a-8e7f-0a1b2c3d4e5f";
const PASSWORD: &str = "correct horse";

/// How the mock answers; tests flip these between requests.
struct Behavior {
    user: StatusCode,
    profile: StatusCode,
    meetings: StatusCode,
    insert: StatusCode,
    room: (StatusCode, Value),
}

impl Default for Behavior {
    fn default() -> Behavior {
        Behavior {
            user: StatusCode::OK,
            profile: StatusCode::OK,
            meetings: StatusCode::OK,
            insert: StatusCode::CREATED,
            room: (StatusCode::OK, json!({ "name": "standup-123", "url": "https://acme.daily.co/standup-123" })),
        }
    }
}

/// Method, path with query, and body of every request the mock saw.
#[derive(Clone, Default)]
struct Mock {
    behavior: Arc<Mutex<Behavior>>,
    seen: Arc<Mutex<Vec<(Method, String, String)>>>,
}

impl Mock {
    fn set(&self, change: impl FnOnce(&mut Behavior)) {
        change(&mut self.behavior.lock().unwrap());
    }

    fn calls(&self, method: Method, path: &str) -> Vec<String> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p, _)| *m == method && p.starts_with(path))
            .map(|(_, _, body)| body.clone())
            .collect()
    }
}

fn user() -> Value {
    json!({
        "id": USER_ID,
        "email": "ada@example.com",
        "user_metadata": { "full_name": "Ada Lovelace" },
    })
}

async fn record(State(mock): State<Mock>, method: Method, uri: Uri, body: String) -> Response {
    let path = uri.path_and_query().map(|pq| pq.as_str().to_owned()).unwrap_or_default();
    mock.seen.lock().unwrap().push((method.clone(), path, body.clone()));
    let behavior = mock.behavior.lock().unwrap();

    match (method, uri.path()) {
        (Method::POST, "/auth/v1/token") => {
            let credentials: Value = serde_json::from_str(&body).unwrap();
            if credentials["password"] == PASSWORD {
                Json(json!({ "access_token": "token-1", "refresh_token": "refresh-1", "expires_in": 3600, "user": user() }))
                    .into_response()
            } else {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" })))
                    .into_response()
            }
        }
        (Method::GET, "/auth/v1/user") if behavior.user.is_success() => Json(user()).into_response(),
        (Method::GET, "/auth/v1/user") => {
            (behavior.user, Json(json!({ "msg": "invalid JWT" }))).into_response()
        }
        (Method::PUT, "/auth/v1/user") => {
            let update: Value = serde_json::from_str(&body).unwrap();
            if update["password"].as_str().is_some_and(|p| p.len() >= 6) {
                Json(user()).into_response()
            } else {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "msg": "Password should be at least 6 characters" })))
                    .into_response()
            }
        }
        (Method::POST, "/auth/v1/logout") => StatusCode::NO_CONTENT.into_response(),
        (Method::GET, "/rest/v1/profiles") if behavior.profile.is_success() => Json(json!({
            "id": USER_ID,
            "display_name": "Countess",
            "full_name": "Ada Lovelace",
            "avatar_url": null,
            "created_at": "2024-03-05T10:00:00Z",
        }))
        .into_response(),
        (Method::GET, "/rest/v1/profiles") => {
            (behavior.profile, Json(json!({ "code": "PGRST116", "message": "no rows" }))).into_response()
        }
        (Method::PATCH, "/rest/v1/profiles") => StatusCode::NO_CONTENT.into_response(),
        (Method::GET, "/rest/v1/meetings") if behavior.meetings.is_success() => Json(json!([{
            "id": "0b7e1f2a-3c4d-4e5f-8a9b-1c2d3e4f5a6b",
            "room_name": "weekly-sync",
            "host_id": USER_ID,
            "started_at": "2024-04-01T09:30:00Z",
            "participant_count": 4,
        }]))
        .into_response(),
        (Method::GET, "/rest/v1/meetings") => {
            (behavior.meetings, Json(json!({ "message": "relation \"meetings\" does not exist" }))).into_response()
        }
        (Method::POST, "/rest/v1/meetings") => {
            (behavior.insert, Json(json!({ "message": "insert failed" }))).into_response()
        }
        (Method::POST, "/v1/rooms") => (behavior.room.0, Json(behavior.room.1.clone())).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

struct Harness {
    app: Router,
    mock: Mock,
    cookie: Option<String>,
}

impl Harness {
    async fn start(key_var: &str) -> Harness {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let mock = Mock::default();

        let backend = Router::new()
            .route("/auth/v1/token", post(record))
            .route("/auth/v1/user", get(record).put(record))
            .route("/auth/v1/logout", post(record))
            .route("/rest/v1/profiles", get(record).patch(record))
            .route("/rest/v1/meetings", get(record).post(record))
            .route("/v1/rooms", post(record))
            .with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, backend).await.unwrap();
        });

        unsafe { std::env::set_var(key_var, "test-secret") };
        let state = AppState::new(Config {
            bind_address: "127.0.0.1:0".to_owned(),
            provider: ProviderConfig::new(format!("http://{addr}/v1"), key_var),
            baas: BaasConfig { url: format!("http://{addr}"), anon_key: "anon".to_owned() },
            secure_cookies: false,
        })
        .unwrap();

        Harness { app: app(state), mock, cookie: None }
    }

    /// Sends a request carrying the current session cookie and keeps any new one.
    async fn send(&mut self, method: Method, uri: &str, form: Option<&str>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                request = request.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form.to_owned())
            }
            None => Body::empty(),
        };

        let response = self.app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap().to_owned();
            self.cookie = Some(pair);
        }
        response
    }

    async fn get(&mut self, uri: &str) -> Response {
        self.send(Method::GET, uri, None).await
    }

    async fn post(&mut self, uri: &str, form: &str) -> Response {
        self.send(Method::POST, uri, Some(form)).await
    }

    async fn sign_in(&mut self) {
        let response = self.post("/signin", "email=ada%40example.com&password=correct+horse").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn sign_in_stores_the_session_and_follows_return_url() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_SIGN_IN").await;

    harness.get("/signin?return_url=/profile").await;
    let response = harness.post("/signin", "email=+ada%40example.com+&password=correct+horse").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
    let credentials: Value = serde_json::from_str(&harness.mock.calls(Method::POST, "/auth/v1/token")[0]).unwrap();
    assert_eq!(credentials["email"], "ada@example.com");

    let response = harness.get("/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Welcome back, Countess!"));
}

#[tokio::test]
async fn sign_in_ignores_an_off_site_return_url() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_OFF_SITE").await;

    harness.get("/signin?return_url=/%5Cevil.example").await;
    let response = harness.post("/signin", "email=ada%40example.com&password=correct+horse").await;

    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn rejected_credentials_rerender_the_form() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_REJECTED").await;

    let response = harness.post("/signin", "email=ada%40example.com&password=nope").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid login credentials"));
    assert!(html.contains(r#"value="ada@example.com""#));
}

#[tokio::test]
async fn rejected_token_clears_the_session() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_EXPIRED").await;
    harness.sign_in().await;

    harness.mock.set(|b| b.user = StatusCode::UNAUTHORIZED);
    let response = harness.get("/dashboard").await;
    assert_eq!(location(&response), "/signin?return_url=/dashboard");

    harness.mock.set(|b| b.user = StatusCode::OK);
    let response = harness.get("/dashboard").await;
    assert_eq!(location(&response), "/signin?return_url=/dashboard");
    assert_eq!(harness.mock.calls(Method::GET, "/auth/v1/user").len(), 1);
}

#[tokio::test]
async fn dashboard_lists_recent_meetings() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_LIST").await;
    harness.sign_in().await;

    let html = body_text(harness.get("/dashboard").await).await;

    assert!(html.contains("<td>weekly-sync</td><td>2024-04-01</td><td>4</td>"));
    assert!(!html.contains("could not be loaded"));
    let reads = harness.mock.seen.lock().unwrap().iter()
        .filter(|(m, p, _)| *m == Method::GET && p.starts_with("/rest/v1/meetings"))
        .map(|(_, p, _)| p.clone())
        .collect::<Vec<_>>();
    assert!(reads[0].contains(&format!("host_id=eq.{USER_ID}")));
    assert!(reads[0].contains("order=started_at.desc"));
    assert!(reads[0].contains("limit=5"));
}

#[tokio::test]
async fn dashboard_falls_back_when_tables_are_unreadable() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_FALLBACK").await;
    harness.sign_in().await;
    harness.mock.set(|b| {
        b.profile = StatusCode::NOT_ACCEPTABLE;
        b.meetings = StatusCode::NOT_FOUND;
    });

    let response = harness.get("/dashboard").await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome back, Ada Lovelace!"));
    assert!(html.contains("your profile could not be loaded"));
    assert!(html.contains("No recent meetings found."));
}

#[tokio::test]
async fn start_meeting_records_it_and_opens_the_room() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_START").await;
    harness.sign_in().await;
    harness.mock.set(|b| b.insert = StatusCode::INTERNAL_SERVER_ERROR);

    let response = harness.post("/dashboard/start", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/meeting/standup-123?url=https%3A%2F%2Facme.daily.co%2Fstandup-123");
    let inserts = harness.mock.calls(Method::POST, "/rest/v1/meetings");
    assert_eq!(inserts.len(), 1);
    let row: Value = serde_json::from_str(&inserts[0]).unwrap();
    assert_eq!(row["room_name"], "standup-123");
    assert_eq!(row["host_id"], USER_ID);
}

#[tokio::test]
async fn failed_start_flashes_on_the_dashboard() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_START_FAILED").await;
    harness.sign_in().await;
    harness.mock.set(|b| b.room = (StatusCode::UNAUTHORIZED, json!({ "error": "authentication-error" })));

    let response = harness.post("/dashboard/start", "").await;
    assert_eq!(location(&response), "/dashboard");
    assert!(harness.mock.calls(Method::POST, "/rest/v1/meetings").is_empty());

    let html = body_text(harness.get("/dashboard").await).await;
    assert!(html.contains("Failed to start meeting. Please check your API keys."));
}

#[tokio::test]
async fn profile_update_trims_and_flashes() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_PROFILE").await;
    harness.sign_in().await;

    let response = harness.post("/profile", "display_name=+The+Countess+").await;
    assert_eq!(location(&response), "/profile");
    let patch: Value = serde_json::from_str(&harness.mock.calls(Method::PATCH, "/rest/v1/profiles")[0]).unwrap();
    assert_eq!(patch, json!({ "display_name": "The Countess" }));

    let html = body_text(harness.get("/profile").await).await;
    assert!(html.contains("Profile updated successfully!"));
    assert!(html.contains("Member since 2024-03-05"));
}

#[tokio::test]
async fn password_change_reports_backend_errors() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_PASSWORD").await;
    harness.sign_in().await;

    harness.post("/profile/password", "password=abc").await;
    let html = body_text(harness.get("/profile").await).await;
    assert!(html.contains("Error: Password should be at least 6 characters"));

    harness.post("/profile/password", "password=much+longer").await;
    let html = body_text(harness.get("/profile").await).await;
    assert!(html.contains("Password changed successfully!"));
}

#[tokio::test]
async fn delete_request_signs_out_and_flashes() {
    let mut harness = Harness::start("UBUNTUMEET_FLOW_KEY_DELETE").await;
    harness.sign_in().await;

    let response = harness.post("/profile/delete", "").await;
    assert_eq!(location(&response), "/");
    assert_eq!(harness.mock.calls(Method::POST, "/auth/v1/logout").len(), 1);

    let html = body_text(harness.get("/").await).await;
    assert!(html.contains("Account deletion request received. Please contact support to complete the process."));
    assert!(html.contains(r#"href="/signin""#));

    let response = harness.get("/dashboard").await;
    assert_eq!(location(&response), "/signin?return_url=/dashboard");
}
