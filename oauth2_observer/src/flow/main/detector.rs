use std::collections::BTreeSet;

use chrono::Utc;
use tokio::time::Instant;

use crate::flow::config::DetectorSettings;
use crate::flow::types::{Classified, Flow, FlowId, FlowType, OAuthMessage};
use crate::traffic::{Exchange, ExchangeType, ParsedUrl, Request, Response};

use super::classify::{
    authorization_flow_type, authorization_response_location, is_redirect_uri_request,
    is_token_request,
};
use super::schedule::EvictionSchedule;

/// Classifies requests and responses into OAuth protocol messages and binds
/// them to tracked flows.
///
/// The detector owns flow lifecycle: creation on an authorization request,
/// merging of duplicate authorization requests, and eviction once a flow's
/// deadline passes. Evicted flows are queued in an outbox that the owner
/// drains with [`FlowDetector::drain_completed`]; each flow enters it exactly
/// once.
///
/// All entry points take `now` explicitly. The caller serializes calls.
#[derive(Debug)]
pub struct FlowDetector {
    settings: DetectorSettings,
    flows: Vec<Flow>,
    schedule: EvictionSchedule,
    completed: Vec<Flow>,
}

impl FlowDetector {
    pub fn new(settings: DetectorSettings) -> Self {
        tracing::debug!(?settings, "Creating flow detector");
        Self {
            settings,
            flows: Vec::new(),
            schedule: EvictionSchedule::new(),
            completed: Vec::new(),
        }
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    /// Tracked flows, oldest first.
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter()
    }

    pub fn flow(&self, id: &FlowId) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id == *id)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// When the next tracked flow is due for eviction.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.schedule.next_deadline()
    }

    pub fn eviction_deadline(&self, id: &FlowId) -> Option<Instant> {
        self.schedule.deadline(id)
    }

    pub fn on_request(
        &mut self,
        exchange: &Exchange,
        request: &Request,
        now: Instant,
    ) -> Option<Classified> {
        match exchange.exchange_type {
            ExchangeType::MainFrame => {
                let initiator = exchange.request_initiator();

                if let Some(flow_type) = authorization_flow_type(initiator, request) {
                    return self.on_authorization_request(initiator, request, flow_type, now);
                }

                if is_redirect_uri_request(request) {
                    return self.on_redirect_uri_request(exchange, request);
                }

                None
            }
            ExchangeType::XmlHttpRequest if is_token_request(request) => {
                self.on_token_request(exchange, request)
            }
            _ => None,
        }
    }

    pub fn on_response(
        &mut self,
        exchange: &Exchange,
        response: &Response,
        now: Instant,
    ) -> Option<Classified> {
        if exchange.exchange_type != ExchangeType::MainFrame {
            return None;
        }

        if let Some(classified) = self.on_authorization_response(exchange, response) {
            return Some(classified);
        }

        self.on_redirect_uri_response(exchange, now)
    }

    /// Evict every flow whose deadline has passed. Returns how many were evicted.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        for id in self.schedule.take_due(now) {
            if self.remove_flow(&id) {
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::debug!(evicted, pending = self.schedule.len(), "Expired flows evicted");
        }
        evicted
    }

    /// Finish a flow ahead of its timer. A no-op for flows no longer tracked.
    pub fn complete_flow(&mut self, id: &FlowId) -> bool {
        self.remove_flow(id)
    }

    /// Take the flows removed since the last call.
    pub fn drain_completed(&mut self) -> Vec<Flow> {
        std::mem::take(&mut self.completed)
    }

    fn on_authorization_request(
        &mut self,
        initiator: Option<&str>,
        request: &Request,
        flow_type: FlowType,
        now: Instant,
    ) -> Option<Classified> {
        let url = &request.url;
        let candidate = Flow {
            id: FlowId::generate(),
            client: initiator.map(str::to_string),
            client_id: url.query_param("client_id").unwrap_or_default().to_string(),
            state: url.query_param("state").map(str::to_string),
            nonce: url.query_param("nonce").map(str::to_string),
            redirect_uri: url.query_param("redirect_uri").map(str::to_string),
            authorization_server: BTreeSet::from([url.origin.clone()]),
            flow_type,
            redirect_uri_request_id: None,
            created_at: Utc::now(),
        };

        let merge_anonymous = self.settings.merge_anonymous_flows;
        if let Some(existing) = self.flows.iter_mut().find(|f| {
            f.is_same_flow(&candidate) && (merge_anonymous || !candidate.is_anonymous())
        }) {
            let added = existing.authorization_server.insert(url.origin.clone());
            tracing::info!(
                flow = %existing.id,
                origin = %url.origin,
                added,
                "Authorization request belongs to an existing flow"
            );
            return None;
        }

        self.make_room();

        let id = candidate.id;
        tracing::info!(
            flow = %id,
            client = ?candidate.client,
            client_id = %candidate.client_id,
            flow_type = %flow_type,
            authorization_server = %url.origin,
            "Authorization request detected"
        );

        self.schedule
            .schedule(id, now + self.settings.authorization_keep_alive);
        self.flows.push(candidate);

        Some(Classified {
            message: OAuthMessage::AuthorizationRequest,
            flow_id: id,
        })
    }

    fn on_redirect_uri_request(
        &mut self,
        exchange: &Exchange,
        request: &Request,
    ) -> Option<Classified> {
        let url = &request.url;
        let returned_state = returned_state(url);

        let position = self
            .flows
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                f.client.as_deref() == Some(url.origin.as_str())
                    || f
                        .redirect_uri
                        .as_deref()
                        .is_some_and(|uri| !uri.is_empty() && url.href.contains(uri))
            })
            .min_by_key(|(_, f)| {
                (
                    !state_matches(f, returned_state.as_deref()),
                    f.redirect_uri_request_id
                        .as_ref()
                        .is_some_and(|bound| *bound != exchange.id),
                )
            })
            .map(|(index, _)| index);

        let Some(index) = position else {
            tracing::warn!(
                origin = %url.origin,
                url = %url.href,
                "Redirect-uri request without a tracked flow, possible CSRF"
            );
            return None;
        };

        let flow = &mut self.flows[index];
        flow.redirect_uri_request_id = Some(exchange.id.clone());

        tracing::info!(
            flow = %flow.id,
            exchange = %exchange.id,
            client = ?flow.client,
            "Redirect-uri request detected"
        );

        Some(Classified {
            message: OAuthMessage::RedirectUriRequest,
            flow_id: flow.id,
        })
    }

    fn on_token_request(&mut self, exchange: &Exchange, request: &Request) -> Option<Classified> {
        let initiator = exchange.request_initiator();

        let flow = self
            .flows
            .iter()
            .filter(|f| initiator.is_some() && f.client.as_deref() == initiator)
            .min_by_key(|f| {
                (
                    f.flow_type != FlowType::AuthorizationCode,
                    f.redirect_uri_request_id.is_none(),
                )
            });

        let Some(flow) = flow else {
            tracing::warn!(
                initiator = ?initiator,
                url = %request.url.href,
                "Access token request without active flow"
            );
            return None;
        };

        tracing::info!(flow = %flow.id, endpoint = %request.url.href, "Access token request detected");

        Some(Classified {
            message: OAuthMessage::TokenRequest,
            flow_id: flow.id,
        })
    }

    fn on_authorization_response(
        &self,
        exchange: &Exchange,
        response: &Response,
    ) -> Option<Classified> {
        let origin = exchange.latest_origin()?;
        if !self
            .flows
            .iter()
            .any(|f| f.authorization_server.contains(origin))
        {
            return None;
        }

        let target = authorization_response_location(exchange, response)?;
        let returned_state = returned_state(&target);

        let flow = self
            .flows
            .iter()
            .filter(|f| f.authorization_server.contains(origin))
            .min_by_key(|f| {
                (
                    !state_matches(f, returned_state.as_deref()),
                    f.redirect_uri_request_id.is_some(),
                )
            })?;

        tracing::info!(
            flow = %flow.id,
            exchange = %exchange.id,
            status = response.status_code,
            "Authorization response detected"
        );

        Some(Classified {
            message: OAuthMessage::AuthorizationResponse,
            flow_id: flow.id,
        })
    }

    fn on_redirect_uri_response(&mut self, exchange: &Exchange, now: Instant) -> Option<Classified> {
        let id = self
            .flows
            .iter()
            .find(|f| f.redirect_uri_request_id.as_ref() == Some(&exchange.id))
            .map(|f| f.id)?;

        tracing::info!(flow = %id, exchange = %exchange.id, "Redirect-uri response detected");

        self.schedule
            .schedule(id, now + self.settings.redirect_uri_keep_alive);

        Some(Classified {
            message: OAuthMessage::RedirectUriResponse,
            flow_id: id,
        })
    }

    /// Evict flows closest to expiry until there is room for one more.
    fn make_room(&mut self) {
        let limit = self.settings.max_tracked_flows.max(1);

        while self.flows.len() >= limit {
            let Some(victim) = self
                .schedule
                .earliest()
                .or_else(|| self.flows.first().map(|f| f.id))
            else {
                break;
            };

            tracing::warn!(flow = %victim, limit, "Tracked flow limit reached, evicting");
            self.remove_flow(&victim);
        }
    }

    fn remove_flow(&mut self, id: &FlowId) -> bool {
        self.schedule.cancel(id);

        let Some(index) = self.flows.iter().position(|f| f.id == *id) else {
            tracing::debug!(flow = %id, "Flow already removed");
            return false;
        };

        let flow = self.flows.remove(index);
        tracing::info!(flow = %flow.id, client = ?flow.client, "Flow completed");
        self.completed.push(flow);
        true
    }
}

/// `state` echoed back in a redirect, from the query or, for implicit responses, the fragment.
fn returned_state(url: &ParsedUrl) -> Option<String> {
    url.query_param("state")
        .map(str::to_string)
        .or_else(|| url.fragment_param("state"))
}

fn state_matches(flow: &Flow, returned: Option<&str>) -> bool {
    returned.is_some() && flow.state.as_deref() == returned
}
