use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::spawn;
use tokio::sync::{Mutex, RwLock};

use dashboard_service::domain::{
    AuthResponse, Clock, CommentFilters, PostListQuery, PostPayload, Role, SessionStore,
    SessionStoreType, User, ACCESS_TOKEN_KEY, USER_KEY,
};
use dashboard_service::errors::{ApiError, AuthApiError, SavePostError};
use dashboard_service::services::{
    ApiClient, AuthBackend, CommentsService, MemorySessionStore, PostsService, SessionManager,
};

const NOW_MS: i64 = 1_700_000_000_000;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

#[derive(Serialize)]
struct Claims {
    sub: String,
    exp: i64,
}

fn mint_token(exp_seconds: i64) -> String {
    let claims = Claims {
        sub: "u-1".to_owned(),
        exp: exp_seconds,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

fn author() -> User {
    User {
        id: "u-1".to_owned(),
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        role: Role::Author,
    }
}

struct StubBackend {
    refresh_calls: AtomicUsize,
    script: Mutex<VecDeque<Result<AuthResponse, ()>>>,
}

impl StubBackend {
    fn new(script: Vec<Result<AuthResponse, ()>>) -> Arc<Self> {
        Arc::new(Self {
            refresh_calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
        })
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthBackend for StubBackend {
    async fn login(&self, _email: &str, _password: &str) -> Result<AuthResponse, AuthApiError> {
        Err(AuthApiError::Unauthorized)
    }

    async fn refresh(&self) -> Result<AuthResponse, AuthApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(())) => Err(AuthApiError::Unauthorized),
            None => Err(AuthApiError::Malformed),
        }
    }

    async fn logout(&self) -> Result<(), AuthApiError> {
        Ok(())
    }
}

/// Fake REST backend: serves canned post/comment payloads to bearers
/// of an accepted token, 401 to everyone else, and records traffic.
struct FakeApi {
    accepted: RwLock<HashSet<String>>,
    hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
    last_body: Mutex<Option<Value>>,
}

impl FakeApi {
    fn new(accepted: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            accepted: RwLock::new(accepted.into_iter().collect()),
            hits: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
            last_body: Mutex::new(None),
        })
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    async fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned);
        *self.last_authorization.lock().await = bearer.clone();

        match bearer {
            Some(token) if self.accepted.read().await.contains(&token) => Ok(()),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

fn sample_posts_page() -> Value {
    json!({
        "posts": [{
            "id": "p-1",
            "title": "Hello",
            "content": "<p>world</p>",
            "published": true,
            "createdAt": "2026-08-01T10:00:00Z",
            "updatedAt": "2026-08-02T10:00:00Z",
            "authorId": "u-1",
            "viewCount": 42,
            "_count": { "comments": 3 }
        }],
        "pagination": { "total": 1, "pages": 1, "currentPage": 1, "hasMore": false }
    })
}

fn sample_comments_page() -> Value {
    json!({
        "comments": [{
            "id": "c-1",
            "content": "Nice one",
            "createdAt": "2026-08-03T12:00:00Z",
            "author": { "id": "u-9", "name": "Reader" },
            "post": { "id": "p-1", "title": "Hello" }
        }],
        "pagination": { "total": 1, "pages": 1, "currentPage": 1, "hasMore": false }
    })
}

async fn list_posts(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> impl IntoResponse {
    match api.authorize(&headers).await {
        Ok(()) => Json(sample_posts_page()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn create_post(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    match api.authorize(&headers).await {
        Ok(()) => {
            *api.last_body.lock().await = Some(body.clone());
            let created = json!({
                "id": "p-2",
                "title": body["title"],
                "content": body["content"],
                "published": body["published"],
                "createdAt": "2026-08-04T09:00:00Z",
                "updatedAt": "2026-08-04T09:00:00Z",
                "authorId": "u-1",
                "viewCount": 0,
                "_count": { "comments": 0 }
            });
            Json(created).into_response()
        }
        Err(status) => status.into_response(),
    }
}

// Always fails once authorized; exercises the inline-error path.
async fn stats(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> impl IntoResponse {
    match api.authorize(&headers).await {
        Ok(()) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Err(status) => status.into_response(),
    }
}

async fn author_comments(State(api): State<Arc<FakeApi>>, headers: HeaderMap) -> impl IntoResponse {
    match api.authorize(&headers).await {
        Ok(()) => Json(sample_comments_page()).into_response(),
        Err(status) => status.into_response(),
    }
}

async fn bulk_delete(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    match api.authorize(&headers).await {
        Ok(()) => {
            *api.last_body.lock().await = Some(body);
            StatusCode::OK.into_response()
        }
        Err(status) => status.into_response(),
    }
}

async fn spawn_fake_api(api: Arc<FakeApi>) -> String {
    let router = Router::new()
        .route("/posts/my", get(list_posts).post(create_post))
        .route("/posts/my/dashboard-stats", get(stats))
        .route("/comments/author/all", get(author_comments))
        .route("/comments/bulk-delete", post(bulk_delete))
        .with_state(api);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed binding to an ephemeral port");
    let address = format!("http://127.0.0.1:{}", listener.local_addr().unwrap().port());

    let server = axum::serve(listener, router);
    spawn(async move {
        if let Err(e) = server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    address
}

struct Harness {
    api: Arc<ApiClient>,
    fake: Arc<FakeApi>,
    backend: Arc<StubBackend>,
    manager: Arc<SessionManager>,
    store: SessionStoreType,
}

async fn harness(
    stored_token: String,
    accepted: Vec<String>,
    script: Vec<Result<AuthResponse, ()>>,
) -> Harness {
    let store: SessionStoreType = Arc::new(RwLock::new(MemorySessionStore::new()));
    {
        let mut guard = store.write().await;
        guard
            .set(USER_KEY, serde_json::to_string(&author()).unwrap())
            .await;
        guard.set(ACCESS_TOKEN_KEY, stored_token).await;
    }

    let backend = StubBackend::new(script);
    let manager = Arc::new(SessionManager::new(
        store.clone(),
        backend.clone(),
        Arc::new(FixedClock(NOW_MS)),
    ));

    let fake = FakeApi::new(accepted);
    let address = spawn_fake_api(fake.clone()).await;
    let api = Arc::new(ApiClient::with_base_url(&address, manager.clone()).unwrap());

    Harness {
        api,
        fake,
        backend,
        manager,
        store,
    }
}

#[tokio::test]
async fn bearer_token_is_attached_and_the_page_decodes() {
    let token = mint_token(NOW_MS / 1000 + 900);
    let h = harness(token.clone(), vec![token.clone()], vec![]).await;

    let posts = PostsService::new(h.api.clone());
    let page = posts.list(&PostListQuery::default()).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].id, "p-1");
    assert_eq!(page.posts[0].count.comments, 3);
    assert!(!page.pagination.has_more);
    assert_eq!(
        h.fake.last_authorization.lock().await.as_deref(),
        Some(token.as_str())
    );
    assert_eq!(h.backend.refresh_calls(), 0);
}

#[tokio::test]
async fn expiring_token_is_refreshed_before_the_request() {
    // T1 expires in 30s; the server only accepts T2.
    let t1 = mint_token(NOW_MS / 1000 + 30);
    let t2 = mint_token(NOW_MS / 1000 + 900);
    let response = AuthResponse {
        user: author(),
        access_token: t2.clone(),
    };
    let h = harness(t1, vec![t2.clone()], vec![Ok(response)]).await;

    let posts = PostsService::new(h.api.clone());
    let page = posts.list(&PostListQuery::default()).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(h.fake.hits(), 1);
    assert_eq!(
        h.fake.last_authorization.lock().await.as_deref(),
        Some(t2.as_str())
    );
    assert_eq!(
        h.store.read().await.get(ACCESS_TOKEN_KEY).await,
        Some(t2)
    );
}

#[tokio::test]
async fn a_failed_proactive_refresh_falls_back_to_the_stale_token() {
    // The refresh endpoint is down but the server still honors the
    // not-quite-expired token; the request must go out rather than
    // block on the failed refresh.
    let t1 = mint_token(NOW_MS / 1000 + 30);
    let h = harness(t1.clone(), vec![t1.clone()], vec![Err(())]).await;

    let posts = PostsService::new(h.api.clone());
    let page = posts.list(&PostListQuery::default()).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(h.fake.hits(), 1);
    assert_eq!(
        h.fake.last_authorization.lock().await.as_deref(),
        Some(t1.as_str())
    );
}

#[tokio::test]
async fn a_401_on_the_stale_fallback_is_not_retried_without_credentials() {
    // Refresh failed and the server rejects the stale token too; with
    // no token left in storage a retry could only 401 again, so none
    // is sent.
    let t1 = mint_token(NOW_MS / 1000 + 30);
    let h = harness(t1, vec![], vec![Err(())]).await;

    let posts = PostsService::new(h.api.clone());
    let err = posts.list(&PostListQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(h.fake.hits(), 1);
    assert_eq!(h.backend.refresh_calls(), 1);
}

#[tokio::test]
async fn a_single_401_is_retried_once_with_a_refreshed_token() {
    // T1 is nowhere near expiry but the server has stopped accepting it.
    let t1 = mint_token(NOW_MS / 1000 + 900);
    let t2 = mint_token(NOW_MS / 1000 + 1800);
    let response = AuthResponse {
        user: author(),
        access_token: t2.clone(),
    };
    let h = harness(t1, vec![t2.clone()], vec![Ok(response)]).await;

    let posts = PostsService::new(h.api.clone());
    let page = posts.list(&PostListQuery::default()).await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(h.fake.hits(), 2);
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(
        h.fake.last_authorization.lock().await.as_deref(),
        Some(t2.as_str())
    );
}

#[tokio::test]
async fn a_second_401_is_terminal_and_clears_the_session() {
    // The server rejects every token; the refreshed retry must not be
    // followed by a third attempt.
    let t1 = mint_token(NOW_MS / 1000 + 900);
    let t2 = mint_token(NOW_MS / 1000 + 1800);
    let response = AuthResponse {
        user: author(),
        access_token: t2,
    };
    let h = harness(t1, vec![], vec![Ok(response)]).await;
    h.manager.init().await.unwrap();

    let posts = PostsService::new(h.api.clone());
    let err = posts.list(&PostListQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(h.fake.hits(), 2);
    assert_eq!(h.backend.refresh_calls(), 1);
    assert_eq!(h.manager.current_user().await, None);
    assert_eq!(h.store.read().await.get(ACCESS_TOKEN_KEY).await, None);
    assert_eq!(h.store.read().await.get(USER_KEY).await, None);
}

#[tokio::test]
async fn refresh_failure_after_a_401_clears_the_session() {
    let t1 = mint_token(NOW_MS / 1000 + 900);
    let h = harness(t1, vec![], vec![Err(())]).await;

    let posts = PostsService::new(h.api.clone());
    let err = posts.list(&PostListQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(h.fake.hits(), 1);
    assert_eq!(h.store.read().await.get(ACCESS_TOKEN_KEY).await, None);
}

#[tokio::test]
async fn non_auth_failures_surface_inline_and_keep_the_session() {
    let token = mint_token(NOW_MS / 1000 + 900);
    let h = harness(token.clone(), vec![token.clone()], vec![]).await;
    h.manager.init().await.unwrap();

    let posts = PostsService::new(h.api.clone());
    let err = posts.dashboard_stats().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)
    ));
    assert_eq!(h.manager.current_user().await, Some(author()));
    assert_eq!(
        h.store.read().await.get(ACCESS_TOKEN_KEY).await,
        Some(token)
    );
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_network() {
    let token = mint_token(NOW_MS / 1000 + 900);
    let h = harness(token.clone(), vec![token], vec![]).await;

    let posts = PostsService::new(h.api.clone());
    let payload = PostPayload {
        title: "ab".to_owned(),
        content: "<p>short</p>".to_owned(),
        published: false,
    };
    let err = posts.create(&payload).await.unwrap_err();

    assert!(matches!(err, SavePostError::Invalid(_)));
    assert_eq!(h.fake.hits(), 0);
}

#[tokio::test]
async fn valid_drafts_are_created() {
    let token = mint_token(NOW_MS / 1000 + 900);
    let h = harness(token.clone(), vec![token], vec![]).await;

    let posts = PostsService::new(h.api.clone());
    let payload = PostPayload {
        title: "A proper title".to_owned(),
        content: "<p>Content that easily clears the bar.</p>".to_owned(),
        published: true,
    };
    let created = posts.create(&payload).await.unwrap();

    assert_eq!(created.id, "p-2");
    assert_eq!(created.title, "A proper title");
    let body = h.fake.last_body.lock().await.clone().unwrap();
    assert_eq!(body["title"], "A proper title");
    assert_eq!(body["published"], true);
}

#[tokio::test]
async fn comment_listing_and_bulk_delete_use_the_expected_shapes() {
    let token = mint_token(NOW_MS / 1000 + 900);
    let h = harness(token.clone(), vec![token], vec![]).await;

    let comments = CommentsService::new(h.api.clone());
    let page = comments.list_all(&CommentFilters::default()).await.unwrap();
    assert_eq!(page.comments.len(), 1);
    assert_eq!(page.comments[0].post.title, "Hello");

    comments
        .delete_many(&["c-1".to_owned(), "c-2".to_owned()])
        .await
        .unwrap();
    let body = h.fake.last_body.lock().await.clone().unwrap();
    assert_eq!(body, json!({ "commentIds": ["c-1", "c-2"] }));
}
