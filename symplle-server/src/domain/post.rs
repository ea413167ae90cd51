use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::user::AuthorSummary;

const MAX_CONTENT_CHARS: usize = 5000;
const MAX_MEDIA_URLS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Privacy {
    #[default]
    Public,
    Friends,
    Private,
}

impl Privacy {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Friends => "friends",
            Privacy::Private => "private",
        }
    }
}

impl FromStr for Privacy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Privacy::Public),
            "friends" => Ok(Privacy::Friends),
            "private" => Ok(Privacy::Private),
            _ => Err(DomainError::Validation {
                field: "privacy",
                message: "must be one of public, friends, private",
            }),
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ContentType {
    #[default]
    Text,
    Image,
    Video,
    Mixed,
}

impl ContentType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Video => "video",
            ContentType::Mixed => "mixed",
        }
    }

    /// Bonus fed into the smart ranking; media-rich posts score higher.
    pub(crate) fn ranking_bonus(self) -> f64 {
        match self {
            ContentType::Text => 10.0,
            ContentType::Image => 20.0,
            ContentType::Video => 25.0,
            ContentType::Mixed => 30.0,
        }
    }
}

impl FromStr for ContentType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ContentType::Text),
            "image" => Ok(ContentType::Image),
            "video" => Ok(ContentType::Video),
            "mixed" => Ok(ContentType::Mixed),
            _ => Err(DomainError::Validation {
                field: "post_type",
                message: "must be one of text, image, video, mixed",
            }),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PostStats {
    pub(crate) likes: i64,
    pub(crate) comments: i64,
    pub(crate) shares: i64,
    pub(crate) views: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) author: AuthorSummary,
    pub(crate) content: String,
    pub(crate) privacy: Privacy,
    pub(crate) content_type: ContentType,
    pub(crate) media_urls: Vec<String>,
    pub(crate) stats: PostStats,
    pub(crate) is_edited: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    pub(crate) fn is_visible_to(&self, viewer_id: Option<i64>) -> bool {
        self.privacy == Privacy::Public || viewer_id == Some(self.author.id)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) content: String,
    pub(crate) privacy: Option<Privacy>,
    pub(crate) content_type: Option<ContentType>,
    pub(crate) media_urls: Vec<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let media_urls = normalize_media_urls(self.media_urls)?;
        let content = normalize_content(&self.content, !media_urls.is_empty())?;
        let content_type = self
            .content_type
            .unwrap_or_else(|| infer_content_type(&media_urls));

        Ok(Self {
            content,
            privacy: Some(self.privacy.unwrap_or_default()),
            content_type: Some(content_type),
            media_urls,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdatePostRequest {
    pub(crate) content: String,
    pub(crate) privacy: Option<Privacy>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_content(&self.content, false)?,
            privacy: self.privacy,
        })
    }
}

fn normalize_content(content: &str, has_media: bool) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() && !has_media {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be at most 5000 chars",
        });
    }
    Ok(content.to_string())
}

fn normalize_media_urls(urls: Vec<String>) -> Result<Vec<String>, DomainError> {
    let urls: Vec<String> = urls
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .collect();

    if urls.len() > MAX_MEDIA_URLS {
        return Err(DomainError::Validation {
            field: "media_urls",
            message: "must contain at most 10 entries",
        });
    }
    Ok(urls)
}

fn infer_content_type(media_urls: &[String]) -> ContentType {
    if media_urls.is_empty() {
        return ContentType::Text;
    }
    let videos = media_urls.iter().filter(|url| is_video_url(url)).count();
    match videos {
        0 => ContentType::Image,
        n if n == media_urls.len() => ContentType::Video,
        _ => ContentType::Mixed,
    }
}

fn is_video_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    [".mp4", ".mov", ".webm", ".mkv", ".avi"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::{ContentType, CreatePostRequest, DomainError, Privacy, UpdatePostRequest};

    #[test]
    fn create_post_request_rejects_blank_content_without_media() {
        let req = create_request("   ", vec![]);
        let err = req.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn create_post_request_allows_media_only_posts() {
        let req = create_request("", vec!["https://cdn.example.com/a.jpg".to_string()]);
        let validated = req.validate().expect("media post must validate");
        assert_eq!(validated.content, "");
        assert_eq!(validated.content_type, Some(ContentType::Image));
    }

    #[test]
    fn create_post_request_defaults_privacy_and_type() {
        let validated = create_request("  Hello  ", vec![])
            .validate()
            .expect("must validate");
        assert_eq!(validated.content, "Hello");
        assert_eq!(validated.privacy, Some(Privacy::Public));
        assert_eq!(validated.content_type, Some(ContentType::Text));
    }

    #[test]
    fn content_type_is_inferred_from_media_extensions() {
        let video = create_request("v", vec!["clip.MP4?sig=1".to_string()])
            .validate()
            .expect("must validate");
        assert_eq!(video.content_type, Some(ContentType::Video));

        let mixed = create_request(
            "m",
            vec!["clip.webm".to_string(), "photo.png".to_string()],
        )
        .validate()
        .expect("must validate");
        assert_eq!(mixed.content_type, Some(ContentType::Mixed));
    }

    #[test]
    fn create_post_request_limits_media_count() {
        let urls = (0..11).map(|i| format!("{i}.jpg")).collect();
        let err = create_request("x", urls)
            .validate()
            .expect_err("too many media urls");
        assert_validation_field(err, "media_urls");
    }

    #[test]
    fn update_post_request_rejects_empty_content() {
        let req = UpdatePostRequest {
            content: "  ".to_string(),
            privacy: None,
        };
        let err = req.validate().expect_err("content must be rejected");
        assert_validation_field(err, "content");
    }

    #[test]
    fn privacy_and_content_type_parse_case_insensitively() {
        assert_eq!("PUBLIC".parse::<Privacy>().expect("valid"), Privacy::Public);
        assert_eq!(" mixed ".parse::<ContentType>().expect("valid"), ContentType::Mixed);
        assert!("everyone".parse::<Privacy>().is_err());
    }

    fn create_request(content: &str, media_urls: Vec<String>) -> CreatePostRequest {
        CreatePostRequest {
            content: content.to_string(),
            privacy: None,
            content_type: None,
            media_urls,
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
