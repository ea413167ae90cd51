use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Account as returned by the auth and profile endpoints.
pub struct User {
    /// User id.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Display name; falls back to the username.
    pub name: String,
    /// Normalized phone number, if any.
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether the phone passed OTP verification.
    #[serde(default)]
    pub phone_verified: bool,
    /// Explicit locale preference, e.g. `pt_BR`.
    #[serde(default)]
    pub preferred_locale: Option<String>,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Result of a successful register or login.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Authenticated user.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Public summary of a post author.
pub struct Author {
    /// User id.
    pub id: i64,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Avatar URL, if any.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A post with its denormalized counters.
pub struct Post {
    /// Post id.
    pub id: i64,
    /// Text body.
    pub content: String,
    /// `public`, `friends` or `private`.
    pub privacy: String,
    /// `text`, `image`, `video` or `mixed`.
    pub post_type: String,
    /// Attached media URLs.
    #[serde(default)]
    pub media_urls: Vec<String>,
    /// Number of likes.
    pub likes_count: i64,
    /// Number of comments, replies included.
    pub comments_count: i64,
    /// Number of shares.
    pub shares_count: i64,
    /// Number of views.
    pub views_count: i64,
    /// Whether the post was edited after creation.
    pub is_edited: bool,
    /// Author summary.
    pub author: Author,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
    /// Last update time (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One page of posts.
pub struct ListPostsResponse {
    /// Posts on this page, newest first.
    pub posts: Vec<Post>,
    /// Page size the server applied.
    pub limit: u32,
    /// Offset the server applied.
    pub offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Like state after a like toggle.
pub struct LikeResult {
    /// `liked` or `unliked`.
    pub action: String,
    /// Current like count of the post.
    pub likes_count: i64,
    /// Post id.
    pub post_id: i64,
}

impl LikeResult {
    /// Whether the caller now likes the post.
    pub fn is_liked(&self) -> bool {
        self.action == "liked"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A comment attached to a timeline post.
pub struct Comment {
    /// Comment id.
    pub id: i64,
    /// Text body.
    pub content: String,
    /// Parent comment for replies.
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
    /// Author summary.
    pub author: Author,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A post decorated for the viewer.
pub struct TimelinePost {
    /// The post itself.
    #[serde(flatten)]
    pub post: Post,
    /// Whether the viewer likes the post.
    pub liked: bool,
    /// Whether the viewer may edit the post.
    pub can_edit: bool,
    /// Whether the viewer may delete the post.
    pub can_delete: bool,
    /// Localized relative age, e.g. `5 minutes ago`.
    pub time_ago: String,
    /// Ranking score; only present for the smart algorithm.
    #[serde(default)]
    pub relevance_score: Option<f64>,
    /// Newest comments, at most three.
    #[serde(default)]
    pub recent_comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ranking weights reported by the smart algorithm.
pub struct RankingWeights {
    /// Weight of likes, comments and shares.
    pub engagement: f64,
    /// Weight of post age.
    pub recency: f64,
    /// Weight of the author signal.
    pub author: f64,
    /// Weight of the content type.
    pub content: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Paging and ranking details of a timeline page.
pub struct TimelineMetadata {
    /// Page size the server applied.
    pub limit: u32,
    /// Offset the server applied.
    pub offset: u32,
    /// Generation time (UTC).
    pub generated_at: DateTime<Utc>,
    /// Number of posts visible to the viewer.
    pub total_count: i64,
    /// Candidate window, e.g. `30_days`.
    #[serde(default)]
    pub time_range: Option<String>,
    /// Weights, for the smart algorithm.
    #[serde(default)]
    pub algorithm_weights: Option<RankingWeights>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A ranked timeline page.
pub struct Timeline {
    /// Posts in ranked order.
    pub posts: Vec<TimelinePost>,
    /// Algorithm that produced the page.
    pub algorithm: String,
    /// Paging and ranking details.
    pub metadata: TimelineMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A post in the trending feed.
pub struct TrendingPost {
    /// The post itself.
    #[serde(flatten)]
    pub post: Post,
    /// Engagement score inside the trending window.
    pub trending_score: f64,
    /// Localized relative age.
    pub time_ago: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// The trending feed.
pub struct Trending {
    /// Posts, highest score first.
    pub trending_posts: Vec<TrendingPost>,
    /// Generation time (UTC).
    pub generated_at: DateTime<Utc>,
    /// Window label, e.g. `24_hours`.
    pub time_window: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// A locale the server can answer in.
pub struct LocaleInfo {
    /// Locale code, e.g. `es_ES`.
    pub code: String,
    /// English name.
    pub name: String,
    /// Name in the locale itself.
    pub native_name: String,
    /// Flag emoji.
    pub flag: String,
    /// Default currency code.
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Locale negotiated for a request and the supported set.
pub struct I18nInfo {
    /// Locale the server used for this request.
    pub current_locale: String,
    /// Process-wide fallback locale.
    pub default_locale: String,
    /// Every supported locale.
    pub supported_locales: Vec<LocaleInfo>,
}
