use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Request};

/// Authorization codes delivered to a redirect-uri without TLS can be phished.
pub(crate) struct CodePhishingObserver {
    state: ObserverState,
}

impl CodePhishingObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for CodePhishingObserver {
    fn threat_name(&self) -> &'static str {
        "Authorization \"code\" Phishing"
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

        if url.is_https() {
            self.state.conclude(
                ThreatStatus::Protected,
                format!("The redirect_uri {} is using https", url.href),
            );
        } else {
            self.state.conclude(
                ThreatStatus::Vulnerable,
                format!("The redirect_uri {} is not using https", url.href),
            );
        }

        Ok(())
    }
}
