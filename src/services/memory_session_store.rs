use std::collections::HashMap;

use crate::domain::SessionStore;

/// In-memory session storage, the process-wide stand-in for the
/// browser's local storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    async fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    async fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    async fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Role, User, ACCESS_TOKEN_KEY, USER_KEY};

    use super::*;

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let mut store = MemorySessionStore::new();
        store.set(ACCESS_TOKEN_KEY, "t1".to_owned()).await;
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.as_deref(), Some("t1"));

        store.remove(ACCESS_TOKEN_KEY).await;
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await, None);
    }

    #[tokio::test]
    async fn clear_empties_everything() {
        let mut store = MemorySessionStore::new();
        store.set(ACCESS_TOKEN_KEY, "t1".to_owned()).await;
        store.set(USER_KEY, "{}".to_owned()).await;
        store.clear().await;
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn user_round_trips_through_storage_json() {
        let user = User {
            id: "u-7".to_owned(),
            name: "Grace".to_owned(),
            email: "grace@example.com".to_owned(),
            role: Role::Author,
        };

        let mut store = MemorySessionStore::new();
        store
            .set(USER_KEY, serde_json::to_string(&user).unwrap())
            .await;

        let raw = store.get(USER_KEY).await.unwrap();
        let back: User = serde_json::from_str(&raw).unwrap();
        assert_eq!(user, back);
    }
}
