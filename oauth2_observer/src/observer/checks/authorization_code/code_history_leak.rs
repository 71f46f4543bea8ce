use crate::observer::checks::redirect_location;
use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Response};

/// The redirect-uri page must not stay in the browser history with the code in its URL.
///
/// A client that answers the redirect-uri request with a redirect to a clean
/// URL keeps the code out of the history.
pub(crate) struct CodeHistoryLeakObserver {
    state: ObserverState,
}

impl CodeHistoryLeakObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for CodeHistoryLeakObserver {
    fn threat_name(&self) -> &'static str {
        "Leaking Authorization \"codes\" in the browser history"
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
                "The redirect-uri page is rendered directly, leaving the authorization code in the browser history",
            );
            return Ok(());
        }

        let target = redirect_location(exchange, response)?;
        if target.has_query_param("code") {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                format!(
                    "The redirect-uri forwards the authorization code to {}",
                    target.href
                ),
            );
        } else {
            self.state.conclude(
                ThreatStatus::Protected,
                "The redirect-uri redirects away without forwarding the authorization code",
            );
        }

        Ok(())
    }
}
