use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Request};

/// Access tokens returned by a token endpoint reached over plain HTTP can be sniffed.
pub(crate) struct EavesdroppingObserver {
    state: ObserverState,
}

impl EavesdroppingObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for EavesdroppingObserver {
    fn threat_name(&self) -> &'static str {
        "Eavesdropping Access Tokens"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_token_request(
        &mut self,
        _exchange: &Exchange,
        request: &Request,
    ) -> Result<(), ObserverError> {
        let url = &request.url;

        if url.is_https() {
            self.state.conclude(
                ThreatStatus::Protected,
                format!("The token endpoint {} is using https", url.href),
            );
        } else {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                format!("The token endpoint {} is not using https", url.href),
            );
        }

        Ok(())
    }
}
