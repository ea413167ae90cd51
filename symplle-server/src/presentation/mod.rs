use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::chat_service::ChatService;
use crate::application::comment_service::CommentService;
use crate::application::email_verification_service::{EmailSender, EmailVerificationService};
use crate::application::otp_service::{OtpSender, OtpService, OtpSettings};
use crate::application::post_service::PostService;
use crate::application::timeline_service::TimelineService;
use crate::application::user_service::UserService;
use crate::data::chat_repository::ChatRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::timeline_repository::TimelineRepository;
use crate::data::user_repository::UserRepository;
use crate::i18n::I18n;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod app_error;
pub(crate) mod envelope;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;


pub(crate) type DynUserRepository = Arc<dyn UserRepository>;
pub(crate) type DynPostRepository = Arc<dyn PostRepository>;
pub(crate) type DynCommentRepository = Arc<dyn CommentRepository>;
pub(crate) type DynTimelineRepository = Arc<dyn TimelineRepository>;
pub(crate) type DynChatRepository = Arc<dyn ChatRepository>;

/// Storage backends the services are wired to.
#[derive(Clone)]
pub(crate) struct Repositories {
    pub(crate) users: DynUserRepository,
    pub(crate) posts: DynPostRepository,
    pub(crate) comments: DynCommentRepository,
    pub(crate) timeline: DynTimelineRepository,
    pub(crate) chat: DynChatRepository,
}

/// Outbound channels for verification codes.
#[derive(Clone)]
pub(crate) struct Senders {
    pub(crate) otp: Arc<dyn OtpSender>,
    pub(crate) email: Arc<dyn EmailSender>,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<DynUserRepository>>,
    pub(crate) user_service: Arc<UserService<DynUserRepository>>,
    pub(crate) post_service: Arc<PostService<DynPostRepository>>,
    pub(crate) comment_service: Arc<CommentService<DynCommentRepository>>,
    pub(crate) timeline_service: Arc<TimelineService<DynTimelineRepository>>,
    pub(crate) otp_service: Arc<OtpService<DynUserRepository, Arc<dyn OtpSender>>>,
    pub(crate) email_verification_service:
        Arc<EmailVerificationService<DynUserRepository, Arc<dyn EmailSender>>>,
    pub(crate) chat_service: Arc<ChatService<DynChatRepository>>,
    pub(crate) i18n: Arc<I18n>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(
        repos: Repositories,
        senders: Senders,
        otp_settings: OtpSettings,
        jwt: JwtService,
        i18n: Arc<I18n>,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(
                repos.users.clone(),
                jwt.clone(),
                i18n.clone(),
            )),
            user_service: Arc::new(UserService::new(repos.users.clone(), i18n.clone())),
            post_service: Arc::new(PostService::new(repos.posts)),
            comment_service: Arc::new(CommentService::new(repos.comments)),
            timeline_service: Arc::new(TimelineService::new(repos.timeline)),
            otp_service: Arc::new(OtpService::new(
                repos.users.clone(),
                senders.otp,
                &otp_settings,
            )),
            email_verification_service: Arc::new(EmailVerificationService::new(
                repos.users,
                senders.email,
                &otp_settings,
            )),
            chat_service: Arc::new(ChatService::new(repos.chat)),
            i18n,
            jwt: Arc::new(jwt),
        }
    }
}
