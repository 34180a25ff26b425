//! Backend service interface.
//!
//! Defines the endpoints the client talks to, their request/response bodies,
//! and the `BackendApi` trait the orchestration layer depends on.

use crate::chat::ChatMessage;
use crate::error::Result;
use crate::session::AuthToken;
use crate::user::UserProfile;
use crate::viewing_key::ViewingKeys;
use crate::asset::TrackedAsset;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend endpoints used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    UserInfo,
    UserKeys,
    AuthorizeSpend,
    AgentAddress,
    ChatHistory,
    ChatSend,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "/api/login",
            Endpoint::UserInfo => "/api/user/info",
            Endpoint::UserKeys => "/api/user/keys",
            Endpoint::AuthorizeSpend => "/api/user/authorize_spend",
            Endpoint::AgentAddress => "/api/agent/address",
            Endpoint::ChatHistory | Endpoint::ChatSend => "/api/chat",
        }
    }

    pub fn method(self) -> &'static str {
        match self {
            Endpoint::Login | Endpoint::UserKeys | Endpoint::ChatSend => "POST",
            _ => "GET",
        }
    }

    /// Whether the endpoint requires a bearer token.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Endpoint::Login)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

/// `{ "data": ... }` wrapper every backend response uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Signed login challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub wallet_address: String,
    /// Unix milliseconds embedded in the signed message
    pub timestamp: i64,
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: AuthToken,
}

/// Body of `POST /api/user/keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingKeysPayload {
    pub sscrt_key: String,
    pub susdc_key: String,
}

impl ViewingKeysPayload {
    /// Builds the payload; fails when either key is missing.
    pub fn from_keys(keys: &ViewingKeys) -> Result<Self> {
        Ok(Self {
            sscrt_key: keys.require(TrackedAsset::SScrt)?.to_string(),
            susdc_key: keys.require(TrackedAsset::SUsdc)?.to_string(),
        })
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// `data` of the `POST /api/chat` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub response: String,
}

/// The backend HTTP service.
///
/// Every method except `login` is authenticated with the given token.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    async fn user_info(&self, token: &AuthToken) -> Result<UserProfile>;

    async fn set_viewing_keys(&self, token: &AuthToken, keys: &ViewingKeysPayload) -> Result<()>;

    async fn authorize_spend(&self, token: &AuthToken) -> Result<()>;

    async fn agent_address(&self, token: &AuthToken) -> Result<String>;

    async fn chat_history(&self, token: &AuthToken) -> Result<Vec<ChatMessage>>;

    /// Sends one user message; returns the assistant's reply text.
    async fn send_chat(&self, token: &AuthToken, message: &str) -> Result<String>;
}
