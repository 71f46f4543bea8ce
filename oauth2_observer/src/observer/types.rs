use std::fmt;

use serde::Serialize;

use crate::traffic::{Exchange, Request, Response};

use super::errors::ObserverError;

/// Outcome of one check for one flow.
///
/// `Unknown` is the only non-terminal value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ThreatStatus {
    #[default]
    Unknown,
    PotentiallyProtected,
    Protected,
    PotentiallyVulnerable,
    Vulnerable,
}

impl ThreatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::PotentiallyProtected => "PotentiallyProtected",
            Self::Protected => "Protected",
            Self::PotentiallyVulnerable => "PotentiallyVulnerable",
            Self::Vulnerable => "Vulnerable",
        }
    }

    pub fn is_concluded(&self) -> bool {
        *self != Self::Unknown
    }

    /// Whether the user should be told about this outcome.
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Self::Vulnerable | Self::PotentiallyVulnerable)
    }
}

impl fmt::Display for ThreatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and explanation shared by every observer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserverState {
    status: ThreatStatus,
    message: Option<String>,
}

impl ObserverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> ThreatStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_concluded(&self) -> bool {
        self.status.is_concluded()
    }

    /// Record a verdict. Only the first conclusion sticks.
    ///
    /// Returns false, leaving the state untouched, when a verdict was already
    /// recorded or when `status` is `Unknown`.
    pub fn conclude(&mut self, status: ThreatStatus, message: impl Into<String>) -> bool {
        if self.is_concluded() || !status.is_concluded() {
            return false;
        }

        self.status = status;
        self.message = Some(message.into());
        true
    }
}

/// Read-only projection of an observer's current verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub threat: &'static str,
    pub status: ThreatStatus,
    pub message: Option<String>,
}

impl Assessment {
    /// The `"Threat: {name}\n{message}"` line used in notifications.
    pub fn summary(&self) -> String {
        format!(
            "Threat: {}\n{}",
            self.threat,
            self.message.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Threat: {}\nStatus: {}", self.threat, self.status)?;
        if let Some(message) = &self.message {
            write!(f, "\n{message}")?;
        }
        Ok(())
    }
}

/// One security check, instantiated per flow.
///
/// Handlers default to no-ops. Raw handlers see every request or response
/// routed to the flow that was not classified; the classified handlers see
/// the protocol messages of the flow they were created for. Once the state
/// has concluded, further events must not change it.
pub trait ThreatObserver: Send {
    fn threat_name(&self) -> &'static str;

    fn state(&self) -> &ObserverState;

    fn on_request(&mut self, _exchange: &Exchange, _request: &Request) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_response(
        &mut self,
        _exchange: &Exchange,
        _response: &Response,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_authorization_request(
        &mut self,
        _exchange: &Exchange,
        _request: &Request,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_authorization_response(
        &mut self,
        _exchange: &Exchange,
        _response: &Response,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_redirect_uri_request(
        &mut self,
        _exchange: &Exchange,
        _request: &Request,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_redirect_uri_response(
        &mut self,
        _exchange: &Exchange,
        _response: &Response,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_token_request(
        &mut self,
        _exchange: &Exchange,
        _request: &Request,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    fn status(&self) -> ThreatStatus {
        self.state().status()
    }

    fn assessment(&self) -> Assessment {
        let state = self.state();
        Assessment {
            threat: self.threat_name(),
            status: state.status(),
            message: state.message().map(str::to_string),
        }
    }
}
