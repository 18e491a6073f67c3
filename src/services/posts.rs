use std::sync::Arc;

use crate::domain::{DashboardStats, IndividualPost, PaginatedPosts, Post, PostListQuery, PostPayload};
use crate::errors::{ApiError, SavePostError};
use crate::services::ApiClient;
use crate::validation::validate_post_form;

/// Typed wrapper over the author's post endpoints.
pub struct PostsService {
    api: Arc<ApiClient>,
}

impl PostsService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.api.get_json("/posts/my/dashboard-stats").await
    }

    pub async fn list(&self, query: &PostListQuery) -> Result<PaginatedPosts, ApiError> {
        self.api
            .get_json(&format!("/posts/my?{}", query.to_query_string()))
            .await
    }

    pub async fn get(&self, id: &str) -> Result<IndividualPost, ApiError> {
        self.api.get_json(&format!("/posts/my/{id}")).await
    }

    /// Create a post. Field validation runs first and a failing draft
    /// never reaches the network.
    pub async fn create(&self, payload: &PostPayload) -> Result<Post, SavePostError> {
        validate_post_form(&payload.title, &payload.content)?;
        Ok(self.api.post_json("/posts/my", payload).await?)
    }

    pub async fn update(&self, id: &str, payload: &PostPayload) -> Result<Post, SavePostError> {
        validate_post_form(&payload.title, &payload.content)?;
        Ok(self
            .api
            .put_json(&format!("/posts/my/{id}"), payload)
            .await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&format!("/posts/my/{id}")).await
    }
}
