mod chat_repository;
mod comment_repository;
mod post_repository;
mod rows;
mod timeline_repository;
mod user_repository;

pub(crate) use chat_repository::PostgresChatRepository;
pub(crate) use comment_repository::PostgresCommentRepository;
pub(crate) use post_repository::PostgresPostRepository;
pub(crate) use timeline_repository::PostgresTimelineRepository;
pub(crate) use user_repository::PostgresUserRepository;
