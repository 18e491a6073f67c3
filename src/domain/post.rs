use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pagination envelope shared by the post and comment list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub pages: u32,
    pub current_page: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: String,
    pub view_count: u64,
    #[serde(rename = "_count")]
    pub count: PostCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCounts {
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: String,
    pub name: String,
}

/// A single post as returned by `GET /posts/my/:id`, with its author and
/// comment thread inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: String,
    pub view_count: u64,
    pub author: PostAuthor,
    pub comments: Vec<InlineComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineComment {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author: PostAuthor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedPosts {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostStatusFilter {
    #[default]
    All,
    Published,
    Draft,
}

impl PostStatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatusFilter::All => "all",
            PostStatusFilter::Published => "published",
            PostStatusFilter::Draft => "draft",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    Newest,
    Oldest,
}

impl PostSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostSort::Newest => "newest",
            PostSort::Oldest => "oldest",
        }
    }
}

/// Query for `GET /posts/my`. Every parameter is always sent; the
/// defaults mirror the list page's initial load.
#[derive(Debug, Clone, PartialEq)]
pub struct PostListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub status: PostStatusFilter,
    pub sort: PostSort,
}

impl Default for PostListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: String::new(),
            status: PostStatusFilter::default(),
            sort: PostSort::default(),
        }
    }
}

impl PostListQuery {
    pub fn to_query_string(&self) -> String {
        format!(
            "page={}&limit={}&search={}&status={}&sort={}",
            self.page,
            self.limit,
            self.search,
            self.status.as_str(),
            self.sort.as_str()
        )
    }
}

/// Payload for `POST /posts/my` and `PUT /posts/my/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostStats {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentStats {
    pub total: u64,
    pub recent: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewStats {
    pub total: u64,
    pub today: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPost {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub comments_count: u64,
    pub published: bool,
}

/// Aggregates for the dashboard landing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub posts: PostStats,
    pub comments: CommentStats,
    pub views: ViewStats,
    pub recent_posts: Vec<RecentPost>,
}
