use std::sync::Arc;

use tokio::sync::RwLock;

// Storage keys, matching the layout the transfer document writes into
// the receiving origin's storage.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const USER_KEY: &str = "user";
pub const THEME_KEY: &str = "theme";

pub type SessionStoreType = Arc<RwLock<dyn SessionStore + Send + Sync>>;

/// Key/value persistence for the session (the process-wide stand-in for
/// the browser's local storage). Implementations are plain string maps;
/// typed reads and writes live in the session manager.
#[async_trait::async_trait]
pub trait SessionStore {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&mut self, key: &str, value: String);
    async fn remove(&mut self, key: &str);
    async fn clear(&mut self);
}
