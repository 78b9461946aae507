use crate::error::ApiError;
use crate::models::{NewQuote, NewUser, Quote, User, UserUpdate};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

const API_KEY_HEADER: &str = "x-api-key";

/// Operations the bot needs from the remote quotes service.
///
/// Every call except [`QuotesApi::add_quote`] authenticates with the
/// service-wide key. `add_quote` is attributed to the user whose personal
/// key is passed in.
pub trait QuotesApi: Send + Sync {
    /// Fails with [`ApiError::Conflict`] when a user already exists for `telegram_id`.
    fn create_user(
        &self,
        name: &str,
        telegram_id: u64,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn get_user(&self, telegram_id: u64) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn update_user(
        &self,
        update: &UserUpdate<'_>,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn delete_user(&self, telegram_id: u64) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Returns the user with a freshly issued API key.
    fn revoke_api_key(
        &self,
        telegram_id: u64,
    ) -> impl Future<Output = Result<User, ApiError>> + Send;

    fn quotes(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Quote>, ApiError>> + Send;

    fn add_quote(
        &self,
        text: &str,
        user_key: &str,
    ) -> impl Future<Output = Result<Quote, ApiError>> + Send;

    /// Public URL of a single quote, used for links in replies.
    fn quote_url(&self, quote_id: &str) -> Result<Url, ApiError>;
}

/// HTTP implementation of [`QuotesApi`].
///
/// The underlying HTTP session is opened on first use and shared by all
/// concurrent callers. After [`ApiClient::close`] the next call opens a new
/// one. There are no retries and no client-side timeout.
pub struct ApiClient {
    base: Url,
    service_key: String,
    session: Mutex<Option<Client>>,
    #[cfg(test)]
    sessions_opened: AtomicUsize,
}

impl ApiClient {
    /// Client for `https://{host}/`.
    pub fn new(host: &str, service_key: impl Into<String>) -> Result<Self, ApiError> {
        let raw = format!("https://{}/", host.trim_end_matches('/'));
        let base = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        Ok(Self::with_base_url(base, service_key))
    }

    pub fn with_base_url(mut base: Url, service_key: impl Into<String>) -> Self {
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            service_key: service_key.into(),
            session: Mutex::new(None),
            #[cfg(test)]
            sessions_opened: AtomicUsize::new(0),
        }
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Drops the shared session. In-flight requests keep their handle.
    pub fn close(&self) {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            tracing::debug!("HTTP session closed");
        }
    }

    fn session(&self) -> Result<Client, ApiError> {
        let mut guard = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder().build()?;
        tracing::debug!(base = %self.base, "HTTP session opened");
        #[cfg(test)]
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        *guard = Some(client.clone());
        Ok(client)
    }

    fn request(&self, method: Method, path: &str, key: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        tracing::debug!(%method, %url, "Quotes API request");
        Ok(self
            .session()?
            .request(method, url)
            .header(API_KEY_HEADER, key))
    }

    fn service_request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        self.request(method, path, &self.service_key)
    }
}

impl QuotesApi for ApiClient {
    async fn create_user(&self, name: &str, telegram_id: u64) -> Result<User, ApiError> {
        let response = self
            .service_request(Method::POST, "internal/users/")?
            .json(&NewUser { name, telegram_id })
            .send()
            .await?;

        match read_json(response).await {
            Err(ApiError::Status { status, body })
                if status == StatusCode::CONFLICT || status == StatusCode::BAD_REQUEST =>
            {
                Err(ApiError::Conflict(body))
            }
            other => other,
        }
    }

    async fn get_user(&self, telegram_id: u64) -> Result<User, ApiError> {
        let response = self
            .service_request(Method::GET, &format!("internal/users/{telegram_id}/"))?
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_user(&self, update: &UserUpdate<'_>) -> Result<User, ApiError> {
        let response = self
            .service_request(
                Method::PUT,
                &format!("internal/users/{}", update.telegram_id),
            )?
            .json(update)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_user(&self, telegram_id: u64) -> Result<(), ApiError> {
        let response = self
            .service_request(Method::DELETE, &format!("internal/users/{telegram_id}/"))?
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn revoke_api_key(&self, telegram_id: u64) -> Result<User, ApiError> {
        let response = self
            .service_request(
                Method::POST,
                &format!("internal/users/{telegram_id}/revoke-api-key/"),
            )?
            .send()
            .await?;
        read_json(response).await
    }

    async fn quotes(&self, offset: u32, limit: u32) -> Result<Vec<Quote>, ApiError> {
        let response = self
            .service_request(Method::GET, "quotes/")?
            .query(&[("offset", offset), ("limit", limit)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn add_quote(&self, text: &str, user_key: &str) -> Result<Quote, ApiError> {
        let response = self
            .request(Method::POST, "quotes/", user_key)?
            .json(&NewQuote { text })
            .send()
            .await?;
        read_json(response).await
    }

    fn quote_url(&self, quote_id: &str) -> Result<Url, ApiError> {
        self.url(&format!("quotes/{quote_id}/"))
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, body })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
