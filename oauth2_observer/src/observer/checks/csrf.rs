use crate::observer::errors::ObserverError;
use crate::observer::state_history::{StateComparison, dice_coefficient};
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, ParsedUrl, Request};

const STATE_MISSING_FROM_REQUEST: &str =
    "The authorization request does not contain the state parameter";
const STATE_MISSING_FROM_RESPONSE: &str =
    "The authorization response does not contain the state parameter";
const STATE_MISMATCH: &str = "The state parameter in the authorization response does not match the state parameter in the authorization request";
const STATE_REUSED: &str = "The state parameter is potentially being reused";
const STATE_MATCH: &str =
    "The state parameter in the authorization response matches the authorization request";

/// CSRF against the redirect-uri, judged by the `state` round trip.
pub(crate) struct CsrfObserver {
    state: ObserverState,
    comparison: StateComparison,
    sent_state: Option<String>,
}

impl CsrfObserver {
    pub(crate) fn new(comparison: StateComparison) -> Self {
        Self {
            state: ObserverState::new(),
            comparison,
            sent_state: None,
        }
    }
}

/// `state` from the query, else from the fragment. Empty counts as absent.
fn returned_state(url: &ParsedUrl) -> Option<String> {
    url.query_param("state")
        .map(str::to_string)
        .or_else(|| url.fragment_param("state"))
        .filter(|state| !state.is_empty())
}

impl ThreatObserver for CsrfObserver {
    fn threat_name(&self) -> &'static str {
        "CSRF Attack against redirect-uri"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_authorization_request(
        &mut self,
        _exchange: &Exchange,
        request: &Request,
    ) -> Result<(), ObserverError> {
        if self.state.is_concluded() {
            return Ok(());
        }

        let Some(sent) = request.url.query_param("state").filter(|s| !s.is_empty()) else {
            self.state
                .conclude(ThreatStatus::PotentiallyVulnerable, STATE_MISSING_FROM_REQUEST);
            return Ok(());
        };
        self.sent_state = Some(sent.to_string());

        if let StateComparison::ReuseDetection {
            prior_states,
            threshold,
        } = &self.comparison
        {
            let reused = prior_states
                .iter()
                .map(|prior| dice_coefficient(prior, sent))
                .find(|similarity| similarity >= threshold);

            if let Some(similarity) = reused {
                tracing::debug!(similarity, threshold, "State similar to a previously used one");
                self.state.conclude(ThreatStatus::Vulnerable, STATE_REUSED);
            }
        }

        Ok(())
    }

    fn on_redirect_uri_request(
        &mut self,
        _exchange: &Exchange,
        request: &Request,
    ) -> Result<(), ObserverError> {
        if self.state.is_concluded() {
            return Ok(());
        }

        match returned_state(&request.url) {
            None => {
                self.state
                    .conclude(ThreatStatus::Vulnerable, STATE_MISSING_FROM_RESPONSE);
            }
            Some(returned) if self.sent_state.as_deref() != Some(returned.as_str()) => {
                tracing::debug!(sent = ?self.sent_state, returned = %returned, "State parameter mismatch");
                self.state.conclude(ThreatStatus::Vulnerable, STATE_MISMATCH);
            }
            Some(_) => {
                self.state.conclude(ThreatStatus::Protected, STATE_MATCH);
            }
        }

        Ok(())
    }
}
