//! Process-wide session state for the dashboard.
//!
//! The manager owns the persisted user + access token, detects expiry,
//! refreshes silently (proactively on a timer, reactively after a 401),
//! and invalidates the session on any irrecoverable auth failure.
//!
//! Concurrency: the timer tick, a request's proactive check, and a 401
//! retry can all race to refresh the same expiring token. Every refresh
//! funnels through one async mutex; the first caller performs the
//! network call and late joiners re-check the stored token after
//! acquiring the gate, so at most one refresh request is outstanding at
//! any time.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::domain::{
    Clock, Session, SessionStoreType, Theme, User, ACCESS_TOKEN_KEY, THEME_KEY, USER_KEY,
};
use crate::errors::{AuthApiError, SessionError};
use crate::services::AuthBackend;
use crate::utils::consts::REFRESH_TIMER_INTERVAL;
use crate::utils::token::is_expiring_soon;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Uninitialized,
    Loading,
    Authenticated(User),
    Unauthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was obtained (by this caller or a concurrent one).
    Refreshed,
    /// The stored token is still comfortably valid.
    NotNeeded,
}

pub struct SessionManager {
    store: SessionStoreType,
    backend: Arc<dyn AuthBackend>,
    clock: Arc<dyn Clock>,
    state: RwLock<AuthState>,
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(store: SessionStoreType, backend: Arc<dyn AuthBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            backend,
            clock,
            state: RwLock::new(AuthState::Uninitialized),
            refresh_gate: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.read().await {
            AuthState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub async fn access_token(&self) -> Option<String> {
        self.store.read().await.get(ACCESS_TOKEN_KEY).await
    }

    /// The full session view, when authenticated with a token present.
    pub async fn current_session(&self) -> Option<Session> {
        let user = self.current_user().await?;
        let (token, theme) = {
            let store = self.store.read().await;
            (store.get(ACCESS_TOKEN_KEY).await, store.get(THEME_KEY).await)
        };
        Some(Session {
            user,
            access_token: token?,
            theme: Theme::parse(theme.as_deref()),
        })
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Restore the session from persisted storage on process start.
    ///
    /// Absent user or token, an unparsable user, or a non-author role
    /// invalidates the session; an expiring token triggers one refresh
    /// before settling. The returned error is the caller's signal to
    /// navigate to the error route.
    pub async fn init(&self) -> Result<User, SessionError> {
        *self.state.write().await = AuthState::Loading;

        let (stored_user, token) = {
            let store = self.store.read().await;
            (store.get(USER_KEY).await, store.get(ACCESS_TOKEN_KEY).await)
        };

        let (Some(raw_user), Some(token)) = (stored_user, token) else {
            return Err(self.fail(SessionError::NoSession).await);
        };

        let user: User = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(_) => return Err(self.fail(SessionError::MalformedUser).await),
        };
        if !user.is_author() {
            return Err(self.fail(SessionError::ForbiddenRole).await);
        }

        *self.state.write().await = AuthState::Authenticated(user.clone());

        if is_expiring_soon(&token, self.clock.now_millis()) {
            self.refresh_if_needed().await?;
            if let Some(user) = self.current_user().await {
                return Ok(user);
            }
        }

        Ok(user)
    }

    /// Exchange credentials for a session. Used by the web app side of
    /// the platform; the dashboard itself normally arrives via transfer.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let response = self
            .backend
            .login(email, password)
            .await
            .map_err(|err| SessionError::LoginFailed(err.to_string()))?;

        if !response.user.is_author() {
            return Err(SessionError::ForbiddenRole);
        }

        self.persist(&response.user, &response.access_token).await;
        Ok(response.user)
    }

    /// Refresh the access token if it is absent or expiring soon.
    ///
    /// Concurrent callers coalesce: whoever wins the gate performs the
    /// network call, and everyone who was queued behind it finds a
    /// fresh token and returns `NotNeeded`.
    pub async fn refresh_if_needed(&self) -> Result<RefreshOutcome, SessionError> {
        let _gate = self.refresh_gate.lock().await;

        let token = self.access_token().await;
        let needs_refresh = match &token {
            Some(token) => is_expiring_soon(token, self.clock.now_millis()),
            None => true,
        };
        if !needs_refresh {
            return Ok(RefreshOutcome::NotNeeded);
        }

        self.perform_refresh().await
    }

    /// Reactive refresh after a request came back 401. Unconditional,
    /// except when a concurrent refresh already replaced `stale_token`,
    /// in which case that result is joined instead of refreshing again.
    /// No stored token at all means the session has already been torn
    /// down; a retry without credentials would only 401 again.
    pub async fn refresh_after_unauthorized(
        &self,
        stale_token: Option<&str>,
    ) -> Result<RefreshOutcome, SessionError> {
        let _gate = self.refresh_gate.lock().await;

        let Some(current) = self.access_token().await else {
            return Err(SessionError::NoSession);
        };
        if Some(current.as_str()) != stale_token {
            return Ok(RefreshOutcome::Refreshed);
        }

        self.perform_refresh().await
    }

    // Callers must hold the refresh gate.
    async fn perform_refresh(&self) -> Result<RefreshOutcome, SessionError> {
        let response = match self.backend.refresh().await {
            Ok(response) => response,
            Err(err) => {
                return Err(self
                    .fail(SessionError::RefreshFailed(err.to_string()))
                    .await)
            }
        };

        if !response.user.is_author() || response.access_token.is_empty() {
            return Err(self
                .fail(SessionError::RefreshFailed(
                    "refresh returned an unusable session".to_owned(),
                ))
                .await);
        }

        self.persist(&response.user, &response.access_token).await;
        log::info!("access token refreshed");
        Ok(RefreshOutcome::Refreshed)
    }

    /// Pure state + storage write after a profile-mutating action; no
    /// network call.
    pub async fn update_user(&self, user: User) {
        if let Ok(raw) = serde_json::to_string(&user) {
            self.store.write().await.set(USER_KEY, raw).await;
        }
        *self.state.write().await = AuthState::Authenticated(user);
    }

    /// Tear the session down: best-effort logout call, then clear all
    /// persisted state.
    pub async fn logout(&self) -> Result<(), AuthApiError> {
        let result = self.backend.logout().await;
        if let Err(err) = &result {
            log::warn!("logout request failed: {err}");
        }
        self.store.write().await.clear().await;
        *self.state.write().await = AuthState::Unauthenticated;
        result
    }

    /// Fatal-for-the-session failure from outside the manager (the REST
    /// client's terminal 401 path). Clears storage and state.
    pub async fn invalidate(&self, reason: SessionError) -> SessionError {
        self.fail(reason).await
    }

    /// While authenticated, re-check expiry every 14 minutes and
    /// refresh if needed.
    pub fn spawn_refresh_timer(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REFRESH_TIMER_INTERVAL);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if !matches!(*self.state.read().await, AuthState::Authenticated(_)) {
                    continue;
                }
                if let Err(err) = self.refresh_if_needed().await {
                    log::error!("background refresh failed: {err}");
                }
            }
        })
    }

    async fn persist(&self, user: &User, token: &str) {
        {
            let mut store = self.store.write().await;
            store.set(ACCESS_TOKEN_KEY, token.to_owned()).await;
            if let Ok(raw) = serde_json::to_string(user) {
                store.set(USER_KEY, raw).await;
            }
        }
        *self.state.write().await = AuthState::Authenticated(user.clone());
    }

    async fn fail(&self, err: SessionError) -> SessionError {
        {
            let mut store = self.store.write().await;
            store.remove(ACCESS_TOKEN_KEY).await;
            store.remove(USER_KEY).await;
        }
        *self.state.write().await = AuthState::Unauthenticated;
        log::error!("session invalidated: {err}");
        err
    }
}
