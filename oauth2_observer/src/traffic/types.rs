use std::collections::HashMap;
use std::fmt;

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};

use super::parsed_url::ParsedUrl;

/// Host-assigned identifier of an exchange, stable across its redirect chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeId(String);

impl ExchangeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resource type of an exchange as reported by the browser.
///
/// Only top-level navigations and XHR/fetch calls take part in OAuth flow
/// detection; everything else is carried as `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeType {
    MainFrame,
    XmlHttpRequest,
    Other(String),
}

impl ExchangeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MainFrame => "main_frame",
            Self::XmlHttpRequest => "xmlhttprequest",
            Self::Other(kind) => kind,
        }
    }

    /// Whether the traffic source reports completion for this kind of exchange.
    pub fn is_analyzed(&self) -> bool {
        matches!(self, Self::MainFrame | Self::XmlHttpRequest)
    }
}

impl From<&str> for ExchangeType {
    fn from(kind: &str) -> Self {
        match kind {
            "main_frame" => Self::MainFrame,
            "xmlhttprequest" => Self::XmlHttpRequest,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExchangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadData {
    pub bytes: Option<Vec<u8>>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    FormData(HashMap<String, String>),
    Raw(Vec<UploadData>),
    Error(String),
}

impl RequestBody {
    pub fn form_data(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::FormData(fields) => Some(fields),
            _ => None,
        }
    }
}

/// One hop of an exchange's redirect chain.
///
/// `headers` may still be empty when the traffic source delivers a request
/// before its headers are known; a later delivery of the same hop supersedes it.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: ParsedUrl,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn new(method: Method, url: ParsedUrl) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn form_field(&self, name: &str) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(RequestBody::form_data)
            .and_then(|fields| fields.get(name))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub status_line: String,
    pub headers: HeaderMap,
}

impl Response {
    pub fn new(status_code: u16, status_line: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            status_code,
            status_line: status_line.into(),
            headers,
        }
    }

    pub fn is_redirect(&self) -> bool {
        self.status_code / 100 == 3
    }

    /// Header lookup by case-insensitive name; non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A logical network transaction including its redirect chain.
///
/// `requests` and `responses` hold one entry per hop, oldest first.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub id: ExchangeId,
    pub exchange_type: ExchangeType,
    pub tab_id: i64,
    pub initiator: Option<String>,
    pub requests: Vec<Request>,
    pub responses: Vec<Response>,
}

impl Exchange {
    pub fn new(
        id: ExchangeId,
        exchange_type: ExchangeType,
        tab_id: i64,
        initiator: Option<String>,
    ) -> Self {
        Self {
            id,
            exchange_type,
            tab_id,
            initiator,
            requests: Vec::new(),
            responses: Vec::new(),
        }
    }

    pub fn latest_request(&self) -> Option<&Request> {
        self.requests.last()
    }

    /// Origin of the most recent hop, i.e. the server that produced the latest response.
    pub fn latest_origin(&self) -> Option<&str> {
        self.latest_request().map(|r| r.url.origin.as_str())
    }

    /// The origin that caused the latest hop.
    ///
    /// For a single request this is the exchange initiator. After a redirect
    /// it is the origin of the previous hop, which served the redirect and may
    /// differ from the page that started the exchange.
    pub fn request_initiator(&self) -> Option<&str> {
        match self.requests.len() {
            0 | 1 => self.initiator.as_deref(),
            n => Some(self.requests[n - 2].url.origin.as_str()),
        }
    }
}
