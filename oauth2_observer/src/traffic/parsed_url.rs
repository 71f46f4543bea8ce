use std::collections::HashMap;
use std::fmt;

use url::{Url, form_urlencoded};

use super::errors::TrafficError;

/// A URL decomposed into the parts the flow correlator and the observers look at.
///
/// The shape mirrors what a browser exposes for `window.location`: `protocol`
/// keeps its trailing colon, `port` is empty for the scheme default, and
/// `fragment` excludes the leading `#`. Query parameters are decoded and
/// collapsed into a map where the last occurrence of a key wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub protocol: String,
    pub hostname: String,
    pub path: String,
    pub port: String,
    pub query: HashMap<String, String>,
    pub fragment: String,
    pub href: String,
    pub origin: String,
}

impl ParsedUrl {
    /// Parse `input`, resolving it against `base` when one is given.
    ///
    /// An absolute `input` ignores the base, like the WHATWG `URL` constructor.
    pub fn parse(input: &str, base: Option<&str>) -> Result<Self, TrafficError> {
        let parsed = match base {
            Some(base) => Url::parse(base)
                .map_err(|e| TrafficError::InvalidUrl(format!("base {base}: {e}")))?
                .join(input),
            None => Url::parse(input),
        }
        .map_err(|e| TrafficError::InvalidUrl(format!("{input}: {e}")))?;

        Ok(Self::from(parsed))
    }

    pub fn is_https(&self) -> bool {
        self.protocol == "https:"
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    /// Look up a parameter in the fragment, read as `application/x-www-form-urlencoded`.
    pub fn fragment_param(&self, name: &str) -> Option<String> {
        form_urlencoded::parse(self.fragment.as_bytes())
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .last()
    }

    /// True when the fragment has the shape of an implicit-grant authorization response.
    pub fn carries_access_token(&self) -> bool {
        self.fragment.contains("access_token=") && self.fragment.contains("token_type=")
    }
}

impl From<Url> for ParsedUrl {
    fn from(url: Url) -> Self {
        let query = url.query_pairs().into_owned().collect::<HashMap<_, _>>();

        Self {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            path: url.path().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
            query,
            fragment: url.fragment().unwrap_or_default().to_string(),
            origin: url.origin().ascii_serialization(),
            href: url.into(),
        }
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}
