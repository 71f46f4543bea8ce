use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traffic::ExchangeId;

/// Opaque identifier of a tracked flow, generated when the flow is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(Uuid);

impl FlowId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    AuthorizationCode,
    Implicit,
}

impl FlowType {
    /// Map one `response_type` token to a flow type.
    pub fn from_response_type(token: &str) -> Option<Self> {
        match token {
            "code" => Some(Self::AuthorizationCode),
            "token" => Some(Self::Implicit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::Implicit => "implicit",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected OAuth authorization attempt.
#[derive(Debug, Clone, Serialize)]
pub struct Flow {
    pub id: FlowId,
    /// Origin of the client application that started the flow, when known.
    pub client: Option<String>,
    pub client_id: String,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub redirect_uri: Option<String>,
    /// Every authorization-server origin the flow passed through.
    pub authorization_server: BTreeSet<String>,
    pub flow_type: FlowType,
    pub redirect_uri_request_id: Option<ExchangeId>,
    pub created_at: DateTime<Utc>,
}

impl Flow {
    /// Two flows are the same when `client_id`, `state` and `nonce` all agree,
    /// absent values included.
    pub fn is_same_flow(&self, other: &Flow) -> bool {
        self.client_id == other.client_id && self.state == other.state && self.nonce == other.nonce
    }

    /// Neither `state` nor `nonce` is present, so identity rests on `client_id` alone.
    pub fn is_anonymous(&self) -> bool {
        self.state.is_none() && self.nonce.is_none()
    }

    /// True when `origin` is one of the flow's authorization servers or its client.
    pub fn involves_origin(&self, origin: &str) -> bool {
        self.authorization_server.contains(origin) || self.client.as_deref() == Some(origin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthMessage {
    AuthorizationRequest,
    AuthorizationResponse,
    RedirectUriRequest,
    RedirectUriResponse,
    TokenRequest,
}

/// A request or response recognised as a protocol message of a tracked flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    pub message: OAuthMessage,
    pub flow_id: FlowId,
}
