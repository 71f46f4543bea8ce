use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, ExchangeId, Request, Response};

const ALLOWED_DIRECTIVES: [&str; 2] = ["deny", "sameorigin"];

/// Framing protection of the authorization page.
///
/// The first non-redirect response of the authorization request's exchange
/// is the page the user interacts with; it must forbid cross-origin framing.
pub(crate) struct ClickjackingObserver {
    state: ObserverState,
    authorization_exchange: Option<ExchangeId>,
}

impl ClickjackingObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
            authorization_exchange: None,
        }
    }
}

impl ThreatObserver for ClickjackingObserver {
    fn threat_name(&self) -> &'static str {
        "Clickjacking Attack against Authorization"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_authorization_request(
        &mut self,
        exchange: &Exchange,
        _request: &Request,
    ) -> Result<(), ObserverError> {
        self.authorization_exchange = Some(exchange.id.clone());
        Ok(())
    }

    fn on_response(&mut self, exchange: &Exchange, response: &Response) -> Result<(), ObserverError> {
        if self.state.is_concluded()
            || self.authorization_exchange.as_ref() != Some(&exchange.id)
            || response.is_redirect()
        {
            return Ok(());
        }

        match response.header("x-frame-options").map(str::trim) {
            Some(directive)
                if ALLOWED_DIRECTIVES
                    .iter()
                    .any(|allowed| directive.eq_ignore_ascii_case(allowed)) =>
            {
                self.state.conclude(
                    ThreatStatus::Protected,
                    format!("The authorization page response sets X-Frame-Options: {directive}"),
                );
            }
            _ => {
                self.state.conclude(
                    ThreatStatus::Vulnerable,
                    "The authorization page response does not correctly set the X-Frame-Options header",
                );
            }
        }

        Ok(())
    }
}
