//! Typed client for the Symplle HTTP API.
//!
//! `SymplleClient` unwraps the server's `{success, data, message, locale}`
//! envelope and returns `data`. Failures keep the server's localized
//! `message`.
//!
//! The client stores the JWT returned by `register`/`login` and sends it on
//! protected operations. A locale pinned with [`SymplleClient::set_locale`]
//! travels as `X-Locale` on every request.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{SymplleClientError, SymplleClientResult};
pub use models::{
    AuthResponse, Author, Comment, I18nInfo, LikeResult, ListPostsResponse, LocaleInfo, Post,
    RankingWeights, Timeline, TimelineMetadata, TimelinePost, Trending, TrendingPost, User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Client for a Symplle server, e.g. `http://127.0.0.1:8080`.
pub struct SymplleClient {
    http: HttpClient,
    token: Option<String>,
    locale: Option<String>,
}

impl SymplleClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> SymplleClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
            locale: None,
        })
    }

    /// Sets the JWT manually.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Returns the current JWT, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Forgets the stored JWT.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Pins the response locale, e.g. `pt_BR`. `None` lets the server
    /// negotiate.
    pub fn set_locale(&mut self, locale: Option<impl Into<String>>) {
        self.locale = locale.map(Into::into);
    }

    /// Returns the pinned locale, if any.
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Registers a user and stores the returned JWT.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> SymplleClientResult<AuthResponse> {
        let result = self
            .http
            .register(username, email, password, self.locale())
            .await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Logs in and stores the returned JWT.
    pub async fn login(&mut self, username: &str, password: &str) -> SymplleClientResult<AuthResponse> {
        let result = self.http.login(username, password, self.locale()).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Creates a post. `privacy` defaults to `public` on the server.
    ///
    /// Requires a JWT.
    pub async fn create_post(&self, content: &str, privacy: Option<&str>) -> SymplleClientResult<Post> {
        let token = self.require_token()?;
        self.http
            .create_post(token, self.locale(), content, privacy)
            .await
    }

    /// Fetches a post by id. Non-public posts need the author's JWT.
    pub async fn get_post(&self, id: i64) -> SymplleClientResult<Post> {
        self.http.get_post(self.token(), self.locale(), id).await
    }

    /// Lists public posts, newest first.
    pub async fn list_posts(&self, limit: u32, offset: u32) -> SymplleClientResult<ListPostsResponse> {
        self.http.list_posts(self.locale(), limit, offset).await
    }

    /// Deletes a post by id.
    ///
    /// Requires the author's JWT.
    pub async fn delete_post(&self, id: i64) -> SymplleClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, self.locale(), id).await
    }

    /// Likes the post if the caller does not like it yet, otherwise unlikes it.
    ///
    /// Requires a JWT.
    pub async fn toggle_like(&self, id: i64) -> SymplleClientResult<LikeResult> {
        let token = self.require_token()?;
        self.http.toggle_like(token, self.locale(), id).await
    }

    /// Loads the caller's timeline. `algorithm` is `smart`, `chronological`
    /// or `popular`; the server picks `smart` when omitted.
    ///
    /// Requires a JWT.
    pub async fn timeline(
        &self,
        algorithm: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> SymplleClientResult<Timeline> {
        let token = self.require_token()?;
        self.http
            .timeline(token, self.locale(), algorithm, limit, offset)
            .await
    }

    /// Loads the trending feed of the last 24 hours.
    ///
    /// Requires a JWT.
    pub async fn trending(&self, limit: u32) -> SymplleClientResult<Trending> {
        let token = self.require_token()?;
        self.http.trending(token, self.locale(), limit).await
    }

    /// Reports the locale the server negotiated and the supported set.
    pub async fn i18n_info(&self) -> SymplleClientResult<I18nInfo> {
        self.http.i18n_info(self.token(), self.locale()).await
    }

    fn require_token(&self) -> SymplleClientResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(SymplleClientError::missing_token)
    }
}

#[cfg(test)]
mod tests {
    use super::{SymplleClient, SymplleClientError};

    #[tokio::test]
    async fn protected_operations_need_a_token() {
        let client = SymplleClient::new("http://127.0.0.1:9").expect("client");

        let result = client.toggle_like(1).await;

        assert!(matches!(result, Err(SymplleClientError::Unauthorized(_))));
    }

    #[test]
    fn token_and_locale_are_stored() {
        let mut client = SymplleClient::new("http://127.0.0.1:9").expect("client");
        client.set_token("jwt");
        client.set_locale(Some("es_ES"));
        assert_eq!(client.token(), Some("jwt"));
        assert_eq!(client.locale(), Some("es_ES"));

        client.clear_token();
        client.set_locale(None::<String>);
        assert_eq!(client.token(), None);
        assert_eq!(client.locale(), None);
    }
}
