use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{SymplleClientError, SymplleClientResult};
use crate::models::{
    AuthResponse, I18nInfo, LikeResult, ListPostsResponse, Post, Timeline, Trending,
};

const LOCALE_HEADER: &str = "X-Locale";

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreatePostRequestDto<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    privacy: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EmptyBody {}

/// Wire shape shared by every API response.
#[derive(Debug, Deserialize)]
struct EnvelopeDto<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> EnvelopeDto<T> {
    fn into_data(self) -> SymplleClientResult<T> {
        if !self.success {
            return Err(SymplleClientError::InvalidRequest(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        self.data.ok_or_else(|| {
            SymplleClientError::InvalidRequest("response envelope has no data".to_string())
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelopeDto {
    message: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    algorithm: Option<String>,
    limit: u32,
    offset: u32,
}

#[derive(Serialize)]
struct LimitQuery {
    limit: u32,
}

#[derive(Debug, Clone)]
/// HTTP transport for the Symplle REST API.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> SymplleClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        locale: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, self.endpoint(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(locale) = locale {
            request = request.header(LOCALE_HEADER, locale);
        }
        request
    }

    async fn decode_error(response: reqwest::Response) -> SymplleClientError {
        let status = response.status();
        let message = response
            .json::<ErrorEnvelopeDto>()
            .await
            .ok()
            .and_then(|body| body.message);
        SymplleClientError::from_http_status(status, message)
    }

    /// Sends the request and unwraps the envelope's `data`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SymplleClientResult<T> {
        let response = request
            .send()
            .await
            .map_err(SymplleClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response
            .json::<EnvelopeDto<T>>()
            .await
            .map_err(SymplleClientError::from_reqwest)?
            .into_data()
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        locale: Option<&str>,
    ) -> SymplleClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        self.send(
            self.request(Method::POST, "/api/auth/register", None, locale)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn login(
        &self,
        username: &str,
        password: &str,
        locale: Option<&str>,
    ) -> SymplleClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        self.send(
            self.request(Method::POST, "/api/auth/login", None, locale)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        locale: Option<&str>,
        content: &str,
        privacy: Option<&str>,
    ) -> SymplleClientResult<Post> {
        let payload = CreatePostRequestDto { content, privacy };
        self.send(
            self.request(Method::POST, "/api/posts", Some(token), locale)
                .json(&payload),
        )
        .await
    }

    pub(crate) async fn get_post(
        &self,
        token: Option<&str>,
        locale: Option<&str>,
        id: i64,
    ) -> SymplleClientResult<Post> {
        self.send(self.request(Method::GET, &format!("/api/posts/{id}"), token, locale))
            .await
    }

    pub(crate) async fn list_posts(
        &self,
        locale: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> SymplleClientResult<ListPostsResponse> {
        let query = PageQuery {
            algorithm: None,
            limit,
            offset,
        };
        self.send(
            self.request(Method::GET, "/api/posts", None, locale)
                .query(&query),
        )
        .await
    }

    pub(crate) async fn delete_post(
        &self,
        token: &str,
        locale: Option<&str>,
        id: i64,
    ) -> SymplleClientResult<()> {
        let _: serde_json::Value = self
            .send(self.request(
                Method::DELETE,
                &format!("/api/posts/{id}"),
                Some(token),
                locale,
            ))
            .await?;
        Ok(())
    }

    pub(crate) async fn toggle_like(
        &self,
        token: &str,
        locale: Option<&str>,
        id: i64,
    ) -> SymplleClientResult<LikeResult> {
        self.send(
            self.request(
                Method::POST,
                &format!("/api/posts/{id}/like"),
                Some(token),
                locale,
            )
            .json(&EmptyBody {}),
        )
        .await
    }

    pub(crate) async fn timeline(
        &self,
        token: &str,
        locale: Option<&str>,
        algorithm: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> SymplleClientResult<Timeline> {
        let query = PageQuery {
            algorithm: algorithm.map(str::to_string),
            limit,
            offset,
        };
        self.send(
            self.request(Method::GET, "/api/timeline", Some(token), locale)
                .query(&query),
        )
        .await
    }

    pub(crate) async fn trending(
        &self,
        token: &str,
        locale: Option<&str>,
        limit: u32,
    ) -> SymplleClientResult<Trending> {
        self.send(
            self.request(Method::GET, "/api/timeline/trending", Some(token), locale)
                .query(&LimitQuery { limit }),
        )
        .await
    }

    pub(crate) async fn i18n_info(
        &self,
        token: Option<&str>,
        locale: Option<&str>,
    ) -> SymplleClientResult<I18nInfo> {
        self.send(self.request(Method::GET, "/api/i18n/info", token, locale))
            .await
    }
}
