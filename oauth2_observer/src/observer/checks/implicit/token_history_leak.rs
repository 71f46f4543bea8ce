use crate::observer::checks::redirect_location;
use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Response};

/// Access tokens in the redirect-uri fragment must not stay in the browser history.
pub(crate) struct TokenHistoryLeakObserver {
    state: ObserverState,
}

impl TokenHistoryLeakObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for TokenHistoryLeakObserver {
    fn threat_name(&self) -> &'static str {
        "Access Token Leak in Browser History"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_redirect_uri_response(
        &mut self,
        exchange: &Exchange,
        response: &Response,
    ) -> Result<(), ObserverError> {
        if self.state.is_concluded() {
            return Ok(());
        }

        if !response.is_redirect() {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                "The redirect-uri page is rendered directly, leaving the access token in the browser history",
            );
            return Ok(());
        }

        let target = redirect_location(exchange, response)?;
        if target.fragment.is_empty() {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                format!(
                    "The redirect-uri redirects to {} without replacing the fragment, the access token is carried along",
                    target.href
                ),
            );
        } else {
            self.state.conclude(
                ThreatStatus::Protected,
                "The redirect-uri replaces the fragment holding the access token",
            );
        }

        Ok(())
    }
}
