use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use mood_diary::{
    create_router,
    emotion::{ClassificationError, EmotionClassifier},
    AppState, Config, UploadTracker,
};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test_secret";

/// Classifier double: answers every call with the same output and counts calls.
pub struct ScriptedClassifier {
    output: Option<Value>,
    fail_from_call: Option<usize>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedClassifier {
    pub fn returning(output: Value) -> Self {
        Self {
            output: Some(output),
            fail_from_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers the first `successes` calls, then goes unavailable.
    pub fn returning_then_failing(output: Value, successes: usize) -> Self {
        Self {
            output: Some(output),
            fail_from_call: Some(successes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Classifier that is always unavailable.
    pub fn failing() -> Self {
        Self {
            output: None,
            fail_from_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self, _text: &str) -> Result<Value, ClassificationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_from_call.is_some_and(|limit| call >= limit) {
            return Err(ClassificationError::Status(503));
        }
        self.output.clone().ok_or(ClassificationError::Status(503))
    }
}

pub fn joyful_output() -> Value {
    json!([[
        {"label": "joy", "score": 0.95},
        {"label": "surprise", "score": 0.03},
        {"label": "anger", "score": 0.02}
    ]])
}

#[allow(dead_code)]
pub fn sad_output() -> Value {
    json!([[
        {"label": "sadness", "score": 0.8},
        {"label": "fear", "score": 0.1},
        {"label": "joy", "score": 0.1}
    ]])
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub db: PgPool,
    pub state: Arc<AppState>,
    pub classifier: Arc<ScriptedClassifier>,
}

pub async fn spawn_app(pool: PgPool, classifier: ScriptedClassifier) -> Result<TestApp, String> {
    let redis_url =
        std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1/".to_string());
    let redis_client =
        redis::Client::open(redis_url.as_str()).map_err(|e| format!("Invalid Redis URL: {e}"))?;
    let redis = tokio::time::timeout(Duration::from_secs(3), redis_client.get_connection_manager())
        .await
        .map_err(|_| "Timed out connecting to Redis".to_string())?
        .map_err(|e| format!("Failed to connect to Redis: {e}"))?;

    let config = Config {
        database_url: "postgres://...".to_string(),
        redis_url,
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_hours: 24,
        server_address: "127.0.0.1:0".to_string(),
        classifier_url: "http://127.0.0.1:9/unused".to_string(),
        classifier_token: None,
        classifier_timeout_secs: 5,
        mood_utc_offset: mood_diary::config::parse_utc_offset(None),
        upload_max_bytes: 64 * 1024,
    };

    let classifier = Arc::new(classifier);

    let state = Arc::new(AppState {
        db: pool.clone(),
        redis,
        config,
        classifier: classifier.clone(),
        uploads: UploadTracker::new(),
    });

    let router = create_router(state.clone());

    Ok(TestApp {
        router,
        db: pool,
        state,
        classifier,
    })
}

pub async fn setup_test_app() -> Result<TestApp, String> {
    setup_test_app_with(ScriptedClassifier::returning(joyful_output())).await
}

pub async fn setup_test_app_with(classifier: ScriptedClassifier) -> Result<TestApp, String> {
    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "TEST_DATABASE_URL or DATABASE_URL must be set for integration tests".to_string())?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {e}"))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| format!("Failed to run migrations: {e}"))?;

    spawn_app(pool, classifier).await
}

/// Username that will not collide with earlier runs against the same database.
pub fn unique_name(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}", &suffix[..12])
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: uuid::Uuid,
    pub username: String,
    pub token: String,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn json_request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, bearer(token));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, bearer(token))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Registers a fresh user and logs them in.
    pub async fn signed_up_user(&self, prefix: &str) -> TestUser {
        let username = unique_name(prefix);
        let (status, registered) = self
            .json_request(
                "POST",
                "/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct-horse"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {registered}");

        let (status, login) = self
            .json_request(
                "POST",
                "/login",
                None,
                json!({ "username": username, "password": "correct-horse" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {login}");

        TestUser {
            id: registered["id"].as_str().unwrap().parse().unwrap(),
            username,
            token: login["token"].as_str().unwrap().to_string(),
        }
    }

    /// Creates an entry through the API and returns its JSON body.
    pub async fn create_entry(&self, user: &TestUser, title: &str, content: &str) -> Value {
        let (status, body) = self
            .json_request(
                "POST",
                "/diary",
                Some(&user.token),
                json!({ "title": title, "content": content }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        body
    }
}
