use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Response};

/// The implicit authorization response carries the token; its hop must use TLS.
pub(crate) struct TokenTransportLeakObserver {
    state: ObserverState,
}

impl TokenTransportLeakObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for TokenTransportLeakObserver {
    fn threat_name(&self) -> &'static str {
        "Access Token Leak in Transport/Endpoints"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_authorization_response(
        &mut self,
        exchange: &Exchange,
        _response: &Response,
    ) -> Result<(), ObserverError> {
        let Some(request) = exchange.latest_request() else {
            return Ok(());
        };

        if request.url.is_https() {
            self.state.conclude(
                ThreatStatus::Protected,
                "The authorization response is using https",
            );
        } else {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                "The authorization response is not using https",
            );
        }

        Ok(())
    }
}
