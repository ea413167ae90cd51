use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::i18n::LocaleInfo;
use crate::presentation::envelope::Envelope;
use crate::presentation::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto};
use crate::presentation::handlers::chat::{
    ChatInfoDto, ChatMessageDto, ChatRoomDto, CreateRoomDto, ListMessagesResponseDto,
    ListRoomsResponseDto, MessagePaginationDto, SendMessageDto,
};
use crate::presentation::handlers::comments::{
    CommentDto, CommentThreadDto, CreateCommentDto, ListCommentsResponseDto,
};
use crate::presentation::handlers::email::{
    EmailCheckDto, EmailSentDto, EmailVerifiedDto, SendEmailVerificationDto, UsernameCheckDto,
    VerifyEmailDto,
};
use crate::presentation::handlers::i18n::{
    ChangeLocaleDto, ChangeLocaleResponseDto, CurrencySamplesDto, DateSamplesDto,
    DateTimeSamplesDto, FormatSamplesDto, I18nDemoDto, I18nInfoDto, PhoneSampleDto,
    RelativeTimeSamplesDto, TranslationSamplesDto,
};
use crate::presentation::handlers::otp::{
    OtpSentDto, OtpVerifiedDto, PhoneCheckDto, SendOtpDto, VerifyOtpDto,
};
use crate::presentation::handlers::posts::{
    CreatePostDto, LikeResponseDto, ListPostsResponseDto, PostDto, UpdatePostDto,
};
use crate::presentation::handlers::timeline::{
    AlgorithmDto, AlgorithmsResponseDto, TimelineMetadataDto, TimelinePostDto,
    TimelineResponseDto, TrendingPostDto, TrendingResponseDto, WeightsDto,
};
use crate::presentation::handlers::users::{UpdateLocaleDto, UserDto};
use crate::presentation::handlers::{AuthorDto, DeletedDto, PaginationQuery};

/// Every payload below is wrapped in [`Envelope`] as its `data` field.
#[derive(OpenApi)]
#[openapi(
    info(title = "Symplle API"),
    paths(
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::users::get_me,
        crate::presentation::handlers::users::update_locale,
        crate::presentation::handlers::posts::list_posts,
        crate::presentation::handlers::posts::get_post,
        crate::presentation::handlers::posts::create_post,
        crate::presentation::handlers::posts::update_post,
        crate::presentation::handlers::posts::delete_post,
        crate::presentation::handlers::posts::toggle_like,
        crate::presentation::handlers::posts::like_post,
        crate::presentation::handlers::posts::unlike_post,
        crate::presentation::handlers::comments::list_comments,
        crate::presentation::handlers::comments::create_comment,
        crate::presentation::handlers::comments::delete_comment,
        crate::presentation::handlers::timeline::get_timeline,
        crate::presentation::handlers::timeline::get_trending,
        crate::presentation::handlers::timeline::list_algorithms,
        crate::presentation::handlers::i18n::info,
        crate::presentation::handlers::i18n::demo_page,
        crate::presentation::handlers::i18n::change_locale,
        crate::presentation::handlers::otp::check_phone,
        crate::presentation::handlers::otp::send_otp,
        crate::presentation::handlers::otp::verify_otp,
        crate::presentation::handlers::email::check_email,
        crate::presentation::handlers::email::check_username,
        crate::presentation::handlers::email::send_email_verification,
        crate::presentation::handlers::email::verify_email,
        crate::presentation::handlers::chat::chat_info,
        crate::presentation::handlers::chat::list_rooms,
        crate::presentation::handlers::chat::create_room,
        crate::presentation::handlers::chat::get_room,
        crate::presentation::handlers::chat::join_room,
        crate::presentation::handlers::chat::list_messages,
        crate::presentation::handlers::chat::send_message
    ),
    components(
        schemas(
            Envelope,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            UpdateLocaleDto,
            AuthorDto,
            DeletedDto,
            PaginationQuery,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            ListPostsResponseDto,
            LikeResponseDto,
            CreateCommentDto,
            CommentDto,
            CommentThreadDto,
            ListCommentsResponseDto,
            TimelinePostDto,
            TimelineMetadataDto,
            TimelineResponseDto,
            WeightsDto,
            TrendingPostDto,
            TrendingResponseDto,
            AlgorithmDto,
            AlgorithmsResponseDto,
            LocaleInfo,
            I18nInfoDto,
            I18nDemoDto,
            FormatSamplesDto,
            DateSamplesDto,
            DateTimeSamplesDto,
            CurrencySamplesDto,
            RelativeTimeSamplesDto,
            TranslationSamplesDto,
            PhoneSampleDto,
            ChangeLocaleDto,
            ChangeLocaleResponseDto,
            SendOtpDto,
            VerifyOtpDto,
            PhoneCheckDto,
            OtpSentDto,
            OtpVerifiedDto,
            EmailCheckDto,
            UsernameCheckDto,
            SendEmailVerificationDto,
            VerifyEmailDto,
            EmailSentDto,
            EmailVerifiedDto,
            ChatInfoDto,
            CreateRoomDto,
            ChatRoomDto,
            ListRoomsResponseDto,
            SendMessageDto,
            ChatMessageDto,
            MessagePaginationDto,
            ListMessagesResponseDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Current user profile"),
        (name = "posts", description = "Posts and likes"),
        (name = "comments", description = "Threaded comments"),
        (name = "timeline", description = "Ranked feeds"),
        (name = "i18n", description = "Locale negotiation and formatting"),
        (name = "otp", description = "Phone verification"),
        (name = "email", description = "Signup availability checks and email verification"),
        (name = "chat", description = "Chat rooms and messages")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
