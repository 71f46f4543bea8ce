use crate::observer::errors::ObserverError;
use crate::observer::types::{ObserverState, ThreatObserver, ThreatStatus};
use crate::traffic::{Exchange, Request, Response};

/// Every token a browser accepts in `Referrer-Policy`.
const KNOWN_POLICIES: [&str; 8] = [
    "no-referrer",
    "no-referrer-when-downgrade",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
    "unsafe-url",
];

/// Policies that keep the code-carrying redirect-uri out of outgoing `Referer` headers.
const SAFE_POLICIES: [&str; 6] = [
    "no-referrer",
    "origin",
    "origin-when-cross-origin",
    "same-origin",
    "strict-origin",
    "strict-origin-when-cross-origin",
];

/// The policy a browser enforces: the last recognised token of the comma list.
fn effective_policy(header: &str) -> Option<String> {
    header
        .rsplit(',')
        .map(|token| token.trim().to_ascii_lowercase())
        .find(|token| KNOWN_POLICIES.contains(&token.as_str()))
}

/// Authorization codes leaking from the redirect-uri page through the `Referer` header.
pub(crate) struct ReferrerLeakObserver {
    state: ObserverState,
}

impl ReferrerLeakObserver {
    pub(crate) fn new() -> Self {
        Self {
            state: ObserverState::new(),
        }
    }
}

impl ThreatObserver for ReferrerLeakObserver {
    fn threat_name(&self) -> &'static str {
        "Credential Leakage via Referrer Headers"
    }

    fn state(&self) -> &ObserverState {
        &self.state
    }

    fn on_authorization_request(
        &mut self,
        _exchange: &Exchange,
        request: &Request,
    ) -> Result<(), ObserverError> {
        if request.url.has_query_param("code_challenge") {
            self.state.conclude(
                ThreatStatus::Protected,
                "PKCE code_challenge is used, a leaked code cannot be redeemed",
            );
        }
        Ok(())
    }

    fn on_redirect_uri_response(
        &mut self,
        _exchange: &Exchange,
        response: &Response,
    ) -> Result<(), ObserverError> {
        if self.state.is_concluded() {
            return Ok(());
        }

        if response.is_redirect() {
            self.state.conclude(
                ThreatStatus::Protected,
                "The redirect-uri redirects away before any page can emit a Referer",
            );
            return Ok(());
        }

        match response.header("referrer-policy").and_then(effective_policy) {
            Some(policy) if SAFE_POLICIES.contains(&policy.as_str()) => {
                self.state.conclude(
                    ThreatStatus::Protected,
                    format!("The redirect-uri page sets Referrer-Policy: {policy}"),
                );
            }
            policy => {
                self.state.conclude(
                    ThreatStatus::PotentiallyVulnerable,
                    format!(
                        "The redirect-uri page may leak the authorization code via the Referer header (Referrer-Policy: {})",
                        policy.as_deref().unwrap_or("not set")
                    ),
                );
            }
        }

        Ok(())
    }
}
