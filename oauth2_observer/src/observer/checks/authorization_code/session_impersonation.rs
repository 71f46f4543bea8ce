use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Request};

/// A redirect-uri served over plain HTTP lets an attacker on the path take
/// over the session the client establishes there.
pub(crate) struct SessionImpersonationObserver {
    state: ObserverState,
}

impl SessionImpersonationObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for SessionImpersonationObserver {
    fn threat_name(&self) -> &'static str {
        "User Session Impersonation"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_redirect_uri_request(
        &mut self,
        _exchange: &Exchange,
        request: &Request,
    ) -> Result<(), ObserverError> {
        let url = &request.url;
        let (status, verb) = if url.is_https() {
            (ThreatStatus::Protected, "is")
        } else {
            (ThreatStatus::Vulnerable, "is not")
        };

        self.state.conclude(
            status,
            format!("The session of redirect_uri {} {verb} protected by https", url.origin),
        );
        Ok(())
    }
}
