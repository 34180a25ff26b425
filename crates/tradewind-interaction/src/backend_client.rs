//! reqwest implementation of `BackendApi`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tradewind_core::backend::{
    BackendApi, ChatReply, ChatRequest, DataEnvelope, Endpoint, LoginRequest, LoginResponse,
    ViewingKeysPayload,
};
use tradewind_core::chat::ChatMessage;
use tradewind_core::config::ClientConfig;
use tradewind_core::session::AuthToken;
use tradewind_core::user::UserProfile;
use tradewind_core::{Result, TradewindError};

/// Upper bound on how much of an error body is kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Backend client over HTTP.
///
/// Every request carries the client-wide timeout; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpBackendClient {
    client: Client,
    base_url: String,
}

impl HttpBackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TradewindError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.backend_url, config.request_timeout())
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn request(&self, endpoint: Endpoint, token: Option<&AuthToken>) -> RequestBuilder {
        let url = self.url(endpoint);
        let mut request = match endpoint.method() {
            "POST" => self.client.post(url),
            _ => self.client.get(url),
        };
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token.bearer());
        }
        request
    }

    async fn dispatch(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response> {
        tracing::debug!("[Backend] {}", endpoint);

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, &e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("[Backend] {} failed with status {}", endpoint, status);
            return Err(status_error(endpoint, status.as_u16(), &error_text));
        }

        Ok(response)
    }

    async fn data<T: DeserializeOwned>(endpoint: Endpoint, response: Response) -> Result<T> {
        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| decode_error(endpoint, &e.to_string()))?;
        Ok(envelope.data)
    }
}

/// Maps a non-success status to the error taxonomy.
///
/// The login endpoint reports any rejection as an authentication failure;
/// elsewhere a 401 means the session token is no longer accepted.
pub(crate) fn status_error(endpoint: Endpoint, status: u16, body: &str) -> TradewindError {
    let body = truncate(body.trim());
    match (endpoint, status) {
        (Endpoint::Login, _) => {
            TradewindError::auth_failure(format!("login rejected ({}): {}", status, body))
        }
        (_, 401) => TradewindError::AuthExpired,
        _ => TradewindError::network(endpoint, format!("status {}: {}", status, body)),
    }
}

fn transport_error(endpoint: Endpoint, err: &reqwest::Error) -> TradewindError {
    if err.is_timeout() {
        TradewindError::network(endpoint, "request timed out")
    } else {
        TradewindError::network(endpoint, err.to_string())
    }
}

fn decode_error(endpoint: Endpoint, message: &str) -> TradewindError {
    match endpoint {
        Endpoint::Login => {
            TradewindError::auth_failure(format!("malformed login response: {}", message))
        }
        _ => TradewindError::network(endpoint, format!("invalid response body: {}", message)),
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl BackendApi for HttpBackendClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let endpoint = Endpoint::Login;
        let response = self
            .dispatch(endpoint, self.request(endpoint, None).json(request))
            .await?;
        Self::data(endpoint, response).await
    }

    async fn user_info(&self, token: &AuthToken) -> Result<UserProfile> {
        let endpoint = Endpoint::UserInfo;
        let response = self
            .dispatch(endpoint, self.request(endpoint, Some(token)))
            .await?;
        Self::data(endpoint, response).await
    }

    async fn set_viewing_keys(&self, token: &AuthToken, keys: &ViewingKeysPayload) -> Result<()> {
        let endpoint = Endpoint::UserKeys;
        self.dispatch(endpoint, self.request(endpoint, Some(token)).json(keys))
            .await?;
        Ok(())
    }

    async fn authorize_spend(&self, token: &AuthToken) -> Result<()> {
        let endpoint = Endpoint::AuthorizeSpend;
        self.dispatch(endpoint, self.request(endpoint, Some(token)))
            .await?;
        Ok(())
    }

    async fn agent_address(&self, token: &AuthToken) -> Result<String> {
        let endpoint = Endpoint::AgentAddress;
        let response = self
            .dispatch(endpoint, self.request(endpoint, Some(token)))
            .await?;
        Self::data(endpoint, response).await
    }

    async fn chat_history(&self, token: &AuthToken) -> Result<Vec<ChatMessage>> {
        let endpoint = Endpoint::ChatHistory;
        let response = self
            .dispatch(endpoint, self.request(endpoint, Some(token)))
            .await?;
        Self::data(endpoint, response).await
    }

    async fn send_chat(&self, token: &AuthToken, message: &str) -> Result<String> {
        let endpoint = Endpoint::ChatSend;
        let body = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .dispatch(endpoint, self.request(endpoint, Some(token)).json(&body))
            .await?;
        let reply: ChatReply = Self::data(endpoint, response).await?;
        Ok(reply.response)
    }
}
