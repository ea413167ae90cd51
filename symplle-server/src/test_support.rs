//! In-memory repositories for service and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::data::chat_repository::{ChatRepository, JoinOutcome, NewMessage, NewRoom};
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{
    LikeChange, LikeOutcome, NewPost, Pagination, PostPatch, PostRepository,
};
use crate::data::timeline_repository::{RankedPost, TimelineQuery, TimelineRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::chat::{ChatMessage, ChatRoom, RoomType};
use crate::domain::comment::{Comment, CommentThread};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostStats, Privacy};
use crate::domain::ranking;
use crate::domain::user::{AuthorSummary, User};

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    posts: Vec<StoredPost>,
    likes: HashSet<(i64, i64)>,
    comments: Vec<StoredComment>,
    rooms: Vec<ChatRoom>,
    /// `(room_id, user_id)`
    participants: Vec<(i64, i64)>,
    messages: Vec<ChatMessage>,
}

struct StoredPost {
    post: Post,
    is_deleted: bool,
}

struct StoredComment {
    comment: Comment,
    is_deleted: bool,
}

impl Tables {
    fn live_post_mut(&mut self, id: i64) -> Option<&mut Post> {
        self.posts
            .iter_mut()
            .find(|stored| stored.post.id == id && !stored.is_deleted)
            .map(|stored| &mut stored.post)
    }

    fn live_posts(&self) -> impl Iterator<Item = &Post> {
        self.posts
            .iter()
            .filter(|stored| !stored.is_deleted)
            .map(|stored| &stored.post)
    }

    fn author(&self, id: i64) -> Result<AuthorSummary, DomainError> {
        self.users
            .iter()
            .find(|creds| creds.user.id == id)
            .map(|creds| AuthorSummary::from(&creds.user))
            .ok_or_else(|| DomainError::NotFound("user".to_string()))
    }

    fn room(&self, id: i64) -> Option<ChatRoom> {
        self.rooms.iter().find(|room| room.id == id).cloned()
    }

    fn is_participant(&self, room_id: i64, user_id: i64) -> bool {
        self.participants.contains(&(room_id, user_id))
    }

    fn refresh_comment_counters(&mut self, post_id: i64, parent: Option<i64>) {
        let live = |comment: &&StoredComment| !comment.is_deleted;
        if let Some(parent) = parent {
            let replies = self
                .comments
                .iter()
                .filter(live)
                .filter(|stored| stored.comment.parent_comment_id == Some(parent))
                .count() as i64;
            if let Some(stored) = self.comments.iter_mut().find(|c| c.comment.id == parent) {
                stored.comment.replies_count = replies;
            }
        }
        let total = self
            .comments
            .iter()
            .filter(live)
            .filter(|stored| stored.comment.post_id == post_id)
            .count() as i64;
        if let Some(post) = self.live_post_mut(post_id) {
            post.stats.comments = total;
        }
    }
}

/// Shared in-memory backend; clones see the same tables.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("in-memory store mutex poisoned")
    }

    /// Inserts a user directly, bypassing password hashing.
    pub(crate) fn seed_user(&self, username: &str) -> User {
        let mut tables = self.tables();
        let id = tables.users.len() as i64 + 1;
        let user = User::new(id, username, format!("{username}@example.com"), Utc::now())
            .expect("seed user must be valid");
        tables.users.push(UserCredentials {
            user: user.clone(),
            password_hash: String::new(),
        });
        user
    }

    pub(crate) fn set_user_phone(&self, user_id: i64, phone: &str) {
        let mut tables = self.tables();
        if let Some(creds) = tables.users.iter_mut().find(|c| c.user.id == user_id) {
            creds.user.phone = Some(phone.to_string());
        }
    }

    pub(crate) fn user(&self, user_id: i64) -> Option<User> {
        self.tables()
            .users
            .iter()
            .find(|creds| creds.user.id == user_id)
            .map(|creds| creds.user.clone())
    }

    /// Inserts a public text post with the given age and counters.
    pub(crate) fn seed_post(
        &self,
        author_id: i64,
        content: &str,
        created_at: DateTime<Utc>,
        stats: PostStats,
    ) -> Post {
        let mut tables = self.tables();
        let author = tables.author(author_id).expect("seed post author must exist");
        let post = Post {
            id: tables.posts.len() as i64 + 1,
            author,
            content: content.to_string(),
            privacy: Privacy::Public,
            content_type: Default::default(),
            media_urls: Vec::new(),
            stats,
            is_edited: false,
            created_at,
            updated_at: created_at,
        };
        tables.posts.push(StoredPost {
            post: post.clone(),
            is_deleted: false,
        });
        post
    }

    pub(crate) fn post(&self, post_id: i64) -> Option<Post> {
        self.tables()
            .posts
            .iter()
            .find(|stored| stored.post.id == post_id)
            .map(|stored| stored.post.clone())
    }

    pub(crate) fn likes_for(&self, post_id: i64) -> usize {
        self.tables()
            .likes
            .iter()
            .filter(|(_, liked_post)| *liked_post == post_id)
            .count()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables();
        for creds in &tables.users {
            if creds.user.username == input.username {
                return Err(DomainError::AlreadyExists("username".to_string()));
            }
            if creds.user.email == input.email {
                return Err(DomainError::AlreadyExists("email".to_string()));
            }
            if input.phone.is_some() && creds.user.phone == input.phone {
                return Err(DomainError::AlreadyExists("phone".to_string()));
            }
        }

        let id = tables.users.len() as i64 + 1;
        let user = User {
            first_name: input.first_name,
            last_name: input.last_name,
            phone: input.phone,
            preferred_locale: input.preferred_locale,
            ..User::new(id, input.username, input.email, Utc::now())?
        };
        tables.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.user(id))
    }

    async fn phone_exists(&self, phone: &str) -> Result<bool, DomainError> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|creds| creds.user.phone.as_deref() == Some(phone)))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.tables().users.iter().any(|creds| creds.user.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        Ok(self
            .tables()
            .users
            .iter()
            .any(|creds| creds.user.username == username))
    }

    async fn mark_email_verified(&self, email: &str) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        Ok(tables
            .users
            .iter_mut()
            .find(|creds| creds.user.email == email)
            .map(|creds| creds.user.email_verified = true)
            .is_some())
    }

    async fn mark_phone_verified(&self, phone: &str) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let mut found = false;
        for creds in tables
            .users
            .iter_mut()
            .filter(|creds| creds.user.phone.as_deref() == Some(phone))
        {
            creds.user.phone_verified = true;
            found = true;
        }
        Ok(found)
    }

    async fn set_preferred_locale(
        &self,
        user_id: i64,
        locale: Option<&str>,
    ) -> Result<Option<User>, DomainError> {
        let mut tables = self.tables();
        Ok(tables
            .users
            .iter_mut()
            .find(|creds| creds.user.id == user_id)
            .map(|creds| {
                creds.user.preferred_locale = locale.map(str::to_string);
                creds.user.clone()
            }))
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut tables = self.tables();
        let author = tables.author(input.author_id)?;
        let now = Utc::now();
        let post = Post {
            id: tables.posts.len() as i64 + 1,
            author,
            content: input.content,
            privacy: input.privacy,
            content_type: input.content_type,
            media_urls: input.media_urls,
            stats: PostStats::default(),
            is_edited: false,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(StoredPost {
            post: post.clone(),
            is_deleted: false,
        });
        Ok(post)
    }

    async fn list_public_posts(&self, pagination: Pagination) -> Result<Vec<Post>, DomainError> {
        let tables = self.tables();
        let mut posts: Vec<Post> = tables
            .live_posts()
            .filter(|post| post.privacy == Privacy::Public)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(posts, pagination))
    }

    async fn find_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.tables().live_posts().find(|post| post.id == id).cloned())
    }

    async fn record_view(&self, id: i64, viewer_id: Option<i64>) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables();
        Ok(tables
            .live_post_mut(id)
            .filter(|post| post.is_visible_to(viewer_id))
            .map(|post| {
                post.stats.views += 1;
                post.clone()
            }))
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut tables = self.tables();
        Ok(tables
            .live_post_mut(post_id)
            .filter(|post| post.author.id == owner_id)
            .map(|post| {
                post.content = patch.content;
                if let Some(privacy) = patch.privacy {
                    post.privacy = privacy;
                }
                post.is_edited = true;
                post.updated_at = Utc::now();
                post.clone()
            }))
    }

    async fn soft_delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        match tables
            .posts
            .iter_mut()
            .find(|stored| stored.post.id == id && !stored.is_deleted)
        {
            Some(stored) => {
                stored.is_deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn change_like(
        &self,
        user_id: i64,
        post_id: i64,
        change: LikeChange,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tables = self.tables();
        if tables.live_post_mut(post_id).is_none() {
            return Ok(None);
        }

        let key = (user_id, post_id);
        let liked = match change {
            LikeChange::Toggle => !tables.likes.contains(&key),
            LikeChange::Like => true,
            LikeChange::Unlike => false,
        };
        if liked {
            tables.likes.insert(key);
        } else {
            tables.likes.remove(&key);
        }

        let likes_count = tables.likes.iter().filter(|(_, p)| *p == post_id).count() as i64;
        if let Some(post) = tables.live_post_mut(post_id) {
            post.stats.likes = likes_count;
        }
        Ok(Some(LikeOutcome { liked, likes_count }))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn post_exists(&self, post_id: i64) -> Result<bool, DomainError> {
        Ok(self.tables().live_posts().any(|post| post.id == post_id))
    }

    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut tables = self.tables();
        if tables.live_post_mut(input.post_id).is_none() {
            return Err(DomainError::NotFound("post".to_string()));
        }
        let author = tables.author(input.author_id)?;
        let now = Utc::now();
        let comment = Comment {
            id: tables.comments.len() as i64 + 1,
            post_id: input.post_id,
            author,
            content: input.content,
            parent_comment_id: input.parent_comment_id,
            likes_count: 0,
            replies_count: 0,
            is_edited: false,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(StoredComment {
            comment: comment.clone(),
            is_deleted: false,
        });
        tables.refresh_comment_counters(input.post_id, input.parent_comment_id);
        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .tables()
            .comments
            .iter()
            .find(|stored| stored.comment.id == id && !stored.is_deleted)
            .map(|stored| stored.comment.clone()))
    }

    async fn list_threads(
        &self,
        post_id: i64,
        pagination: Pagination,
    ) -> Result<Vec<CommentThread>, DomainError> {
        let tables = self.tables();
        let live: Vec<&Comment> = tables
            .comments
            .iter()
            .filter(|stored| !stored.is_deleted && stored.comment.post_id == post_id)
            .map(|stored| &stored.comment)
            .collect();

        let mut top_level: Vec<Comment> = live
            .iter()
            .filter(|comment| comment.parent_comment_id.is_none())
            .map(|comment| (*comment).clone())
            .collect();
        top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(page(top_level, pagination)
            .into_iter()
            .map(|comment| {
                let mut replies: Vec<Comment> = live
                    .iter()
                    .filter(|reply| reply.parent_comment_id == Some(comment.id))
                    .map(|reply| (*reply).clone())
                    .collect();
                replies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
                CommentThread { comment, replies }
            })
            .collect())
    }

    async fn soft_delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let Some(stored) = tables
            .comments
            .iter_mut()
            .find(|stored| stored.comment.id == id && !stored.is_deleted)
        else {
            return Ok(false);
        };
        stored.is_deleted = true;
        let (post_id, parent) = (stored.comment.post_id, stored.comment.parent_comment_id);
        tables.refresh_comment_counters(post_id, parent);
        Ok(true)
    }
}

#[async_trait]
impl TimelineRepository for InMemoryStore {
    async fn ranked_posts(&self, query: &TimelineQuery) -> Result<Vec<RankedPost>, DomainError> {
        let tables = self.tables();
        let since = query.since();
        let mut ranked: Vec<RankedPost> = tables
            .live_posts()
            .filter(|post| post.privacy == Privacy::Public)
            .filter(|post| since.is_none_or(|since| post.created_at >= since))
            .map(|post| RankedPost {
                score: ranking::score_post(query.algorithm, post, query.now, &query.weights),
                post: post.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .unwrap_or_default()
                .total_cmp(&a.score.unwrap_or_default())
                .then(b.post.created_at.cmp(&a.post.created_at))
                .then(b.post.id.cmp(&a.post.id))
        });
        Ok(page(ranked, query.pagination))
    }

    async fn count_posts(&self, since: Option<DateTime<Utc>>) -> Result<i64, DomainError> {
        Ok(self
            .tables()
            .live_posts()
            .filter(|post| post.privacy == Privacy::Public)
            .filter(|post| since.is_none_or(|since| post.created_at >= since))
            .count() as i64)
    }

    async fn trending_posts(
        &self,
        since: DateTime<Utc>,
        min_score: f64,
        limit: u32,
    ) -> Result<Vec<RankedPost>, DomainError> {
        let tables = self.tables();
        let mut ranked: Vec<RankedPost> = tables
            .live_posts()
            .filter(|post| post.privacy == Privacy::Public && post.created_at >= since)
            .map(|post| RankedPost {
                post: post.clone(),
                score: Some(ranking::trending_score(&post.stats)),
            })
            .filter(|ranked| ranked.score.is_some_and(|score| score > min_score))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .unwrap_or_default()
                .total_cmp(&a.score.unwrap_or_default())
                .then(b.post.created_at.cmp(&a.post.created_at))
        });
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn liked_post_ids(&self, user_id: i64, post_ids: &[i64]) -> Result<HashSet<i64>, DomainError> {
        Ok(self
            .tables()
            .likes
            .iter()
            .filter(|(user, post)| *user == user_id && post_ids.contains(post))
            .map(|(_, post)| *post)
            .collect())
    }

    async fn recent_comments(
        &self,
        post_ids: &[i64],
        per_post: u32,
    ) -> Result<HashMap<i64, Vec<Comment>>, DomainError> {
        let tables = self.tables();
        let mut by_post: HashMap<i64, Vec<Comment>> = HashMap::new();
        for stored in &tables.comments {
            let comment = &stored.comment;
            if !stored.is_deleted
                && comment.parent_comment_id.is_none()
                && post_ids.contains(&comment.post_id)
            {
                by_post.entry(comment.post_id).or_default().push(comment.clone());
            }
        }
        for comments in by_post.values_mut() {
            comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            comments.truncate(per_post as usize);
        }
        Ok(by_post)
    }
}

#[async_trait]
impl ChatRepository for InMemoryStore {
    async fn existing_user_ids(&self, ids: &[i64]) -> Result<HashSet<i64>, DomainError> {
        Ok(self
            .tables()
            .users
            .iter()
            .map(|creds| creds.user.id)
            .filter(|id| ids.contains(id))
            .collect())
    }

    async fn create_room(&self, input: NewRoom) -> Result<ChatRoom, DomainError> {
        let mut tables = self.tables();
        let now = Utc::now();
        let room = ChatRoom {
            id: tables.rooms.len() as i64 + 1,
            name: input.name,
            description: input.description,
            room_type: input.room_type,
            created_by: input.creator_id,
            is_public: input.is_public,
            max_participants: input.max_participants,
            participants_count: input.participant_ids.len() as i64 + 1,
            created_at: now,
            updated_at: now,
        };
        tables.participants.push((room.id, input.creator_id));
        for user_id in input.participant_ids {
            tables.participants.push((room.id, user_id));
        }
        tables.rooms.push(room.clone());
        Ok(room)
    }

    async fn find_room(&self, id: i64) -> Result<Option<ChatRoom>, DomainError> {
        Ok(self.tables().room(id))
    }

    async fn find_direct_room(&self, user_a: i64, user_b: i64) -> Result<Option<ChatRoom>, DomainError> {
        let tables = self.tables();
        Ok(tables
            .rooms
            .iter()
            .find(|room| {
                room.room_type == RoomType::Direct
                    && tables.is_participant(room.id, user_a)
                    && tables.is_participant(room.id, user_b)
            })
            .cloned())
    }

    async fn list_rooms_for(&self, user_id: i64, pagination: Pagination) -> Result<Vec<ChatRoom>, DomainError> {
        let tables = self.tables();
        let mut rooms: Vec<ChatRoom> = tables
            .rooms
            .iter()
            .filter(|room| tables.is_participant(room.id, user_id))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(page(rooms, pagination))
    }

    async fn count_rooms_for(&self, user_id: i64) -> Result<i64, DomainError> {
        Ok(self
            .tables()
            .participants
            .iter()
            .filter(|(_, member)| *member == user_id)
            .count() as i64)
    }

    async fn is_participant(&self, room_id: i64, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.tables().is_participant(room_id, user_id))
    }

    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<Option<JoinOutcome>, DomainError> {
        let mut tables = self.tables();
        let Some(room) = tables.room(room_id) else {
            return Ok(None);
        };
        if tables.is_participant(room_id, user_id) {
            return Ok(Some(JoinOutcome::AlreadyMember(room)));
        }
        if room.is_full() {
            return Ok(Some(JoinOutcome::RoomFull));
        }

        tables.participants.push((room_id, user_id));
        let Some(stored) = tables.rooms.iter_mut().find(|room| room.id == room_id) else {
            return Ok(None);
        };
        stored.participants_count += 1;
        Ok(Some(JoinOutcome::Joined(stored.clone())))
    }

    async fn create_message(&self, input: NewMessage) -> Result<ChatMessage, DomainError> {
        let mut tables = self.tables();
        let sender = tables.author(input.sender_id)?;
        let now = Utc::now();
        let Some(room) = tables.rooms.iter_mut().find(|room| room.id == input.room_id) else {
            return Err(DomainError::NotFound("chat room".to_string()));
        };
        room.updated_at = now;

        let message = ChatMessage {
            id: tables.messages.len() as i64 + 1,
            room_id: input.room_id,
            sender,
            content: input.content,
            message_type: input.message_type,
            reply_to_id: input.reply_to_id,
            is_edited: false,
            created_at: now,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn find_message(&self, id: i64) -> Result<Option<ChatMessage>, DomainError> {
        Ok(self
            .tables()
            .messages
            .iter()
            .find(|message| message.id == id)
            .cloned())
    }

    async fn list_messages(&self, room_id: i64, pagination: Pagination) -> Result<Vec<ChatMessage>, DomainError> {
        let mut messages: Vec<ChatMessage> = self
            .tables()
            .messages
            .iter()
            .filter(|message| message.room_id == room_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(page(messages, pagination))
    }

    async fn count_messages(&self, room_id: i64) -> Result<i64, DomainError> {
        Ok(self
            .tables()
            .messages
            .iter()
            .filter(|message| message.room_id == room_id)
            .count() as i64)
    }
}

fn page<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    items
        .into_iter()
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .collect()
}
