// --- File: crates/seatpick_common/src/http/client.rs ---
use once_cell::sync::Lazy;
use reqwest::{Client, Error as ReqwestError, Method, RequestBuilder};
use seatpick_config::ApiConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::ensure_success;
use crate::error::SeatpickError;
use crate::session::SessionContext;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A static HTTP client that can be reused across the application.
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    create_client(DEFAULT_TIMEOUT_SECS, true).unwrap_or_else(|_| Client::new())
});

/// Creates a new HTTP client with custom configuration.
///
/// # Arguments
///
/// * `timeout_secs` - The timeout in seconds for the client
/// * `follow_redirects` - Whether the client should follow redirects
pub fn create_client(timeout_secs: u64, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}

/// The single HTTP entry point to the reservation backend.
///
/// Every request carries `Authorization: Bearer <access credential>` when the session
/// holds one.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Arc<SessionContext>,
}

impl ApiClient {
    /// Creates a client on top of the shared [`HTTP_CLIENT`].
    pub fn new(base_url: impl Into<String>, session: Arc<SessionContext>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: HTTP_CLIENT.clone(),
            session,
        }
    }

    /// Creates a client with the timeout from the `[api]` config section.
    pub fn from_config(
        config: &ApiConfig,
        session: Arc<SessionContext>,
    ) -> Result<Self, SeatpickError> {
        let http = create_client(config.timeout_secs, true)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Absolute URL for an API path such as `/bookings/my`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match self.session.access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// `GET` a JSON document.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SeatpickError> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// `POST` a JSON body and decode the JSON answer.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SeatpickError> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// `POST` without a body, ignoring whatever the server answers on success.
    pub async fn post_empty(&self, path: &str) -> Result<(), SeatpickError> {
        let response = self.request(Method::POST, path).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
