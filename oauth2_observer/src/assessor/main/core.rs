use std::collections::HashMap;

use tokio::time::Instant;

use crate::assessor::config::AssessorSettings;
use crate::assessor::types::{Notification, TrafficEvent};
use crate::flow::{FlowDetector, FlowId, OAuthMessage};
use crate::observer::{
    Assessment, CsrfSettings, ObserverError, StateComparison, StateHistory, ThreatObserver,
    observers_for,
};
use crate::traffic::{Exchange, Request, Response};

/// Passive assessment of the OAuth clients seen in browser traffic.
///
/// Feeds every event to the [`FlowDetector`], keeps one observer set per
/// tracked flow and routes protocol messages and raw pass-through traffic to
/// it. Observers that reach a verdict are retired; vulnerable verdicts of one
/// dispatch are batched into a single [`Notification`].
///
/// Calls must be serialized by the caller. [`spawn_assessor`](super::spawn_assessor)
/// does this with a single task.
pub struct OAuthClientAssessor {
    detector: FlowDetector,
    observers: HashMap<FlowId, Vec<Box<dyn ThreatObserver>>>,
    state_history: StateHistory,
    csrf: CsrfSettings,
    notification_title: String,
}

impl OAuthClientAssessor {
    pub fn new(settings: AssessorSettings) -> Self {
        let AssessorSettings {
            detector,
            csrf,
            notification_title,
        } = settings;

        Self {
            detector: FlowDetector::new(detector),
            observers: HashMap::new(),
            state_history: StateHistory::new(csrf.history_per_client),
            csrf,
            notification_title,
        }
    }

    pub fn detector(&self) -> &FlowDetector {
        &self.detector
    }

    /// When the next tracked flow expires, for driving a timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.detector.next_deadline()
    }

    /// Current projections of the observers still waiting for a verdict on `flow_id`.
    pub fn assessments(&self, flow_id: &FlowId) -> Vec<Assessment> {
        self.observers
            .get(flow_id)
            .map(|observers| observers.iter().map(|o| o.assessment()).collect())
            .unwrap_or_default()
    }

    pub fn handle_event(&mut self, event: &TrafficEvent, now: Instant) -> Vec<Notification> {
        match event {
            TrafficEvent::Request { exchange, request } => self.on_request(exchange, request, now),
            TrafficEvent::Response { exchange, response } => {
                self.on_response(exchange, response, now)
            }
            TrafficEvent::ExchangeCompleted { exchange } => {
                self.on_exchange_completed(exchange, now)
            }
        }
    }

    pub fn on_request(
        &mut self,
        exchange: &Exchange,
        request: &Request,
        now: Instant,
    ) -> Vec<Notification> {
        self.evict_expired(now);

        let classified = self.detector.on_request(exchange, request, now);
        self.discard_completed();

        let Some(classified) = classified else {
            let origin = request.url.origin.as_str();
            return self.pass_through(origin, "on_request", |o| o.on_request(exchange, request));
        };

        let flow_id = classified.flow_id;
        match classified.message {
            OAuthMessage::AuthorizationRequest => {
                self.start_assessment(&flow_id);
                self.dispatch(&flow_id, "on_authorization_request", |o| {
                    o.on_authorization_request(exchange, request)
                });
            }
            OAuthMessage::RedirectUriRequest => {
                self.dispatch(&flow_id, "on_redirect_uri_request", |o| {
                    o.on_redirect_uri_request(exchange, request)
                });
            }
            OAuthMessage::TokenRequest => {
                self.dispatch(&flow_id, "on_token_request", |o| {
                    o.on_token_request(exchange, request)
                });
            }
            message => {
                tracing::debug!(?message, "Response message classified from a request");
            }
        }

        self.sweep(&flow_id).into_iter().collect()
    }

    pub fn on_response(
        &mut self,
        exchange: &Exchange,
        response: &Response,
        now: Instant,
    ) -> Vec<Notification> {
        self.evict_expired(now);

        let Some(classified) = self.detector.on_response(exchange, response, now) else {
            let Some(origin) = exchange.latest_origin() else {
                return Vec::new();
            };
            return self.pass_through(origin, "on_response", |o| {
                o.on_response(exchange, response)
            });
        };

        let flow_id = classified.flow_id;
        match classified.message {
            OAuthMessage::AuthorizationResponse => {
                self.dispatch(&flow_id, "on_authorization_response", |o| {
                    o.on_authorization_response(exchange, response)
                });
            }
            OAuthMessage::RedirectUriResponse => {
                self.dispatch(&flow_id, "on_redirect_uri_response", |o| {
                    o.on_redirect_uri_response(exchange, response)
                });
            }
            message => {
                tracing::debug!(?message, "Request message classified from a response");
            }
        }

        self.sweep(&flow_id).into_iter().collect()
    }

    pub fn on_exchange_completed(&mut self, exchange: &Exchange, now: Instant) -> Vec<Notification> {
        self.evict_expired(now);

        let bound = self
            .detector
            .flows()
            .filter(|f| f.redirect_uri_request_id.as_ref() == Some(&exchange.id))
            .map(|f| f.id)
            .collect::<Vec<_>>();

        for flow_id in bound {
            let pending = self
                .assessments(&flow_id)
                .into_iter()
                .map(|a| a.threat)
                .collect::<Vec<_>>();
            tracing::debug!(
                flow = %flow_id,
                exchange = %exchange.id,
                ?pending,
                "Redirect-uri exchange completed"
            );
        }

        Vec::new()
    }

    /// Evict expired flows and drop their observers. Returns how many flows went.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let evicted = self.detector.evict_expired(now);
        self.discard_completed();
        evicted
    }

    /// Finish a flow ahead of its timer, dropping its observers.
    pub fn complete_flow(&mut self, flow_id: &FlowId) -> bool {
        let completed = self.detector.complete_flow(flow_id);
        self.discard_completed();
        completed
    }

    fn start_assessment(&mut self, flow_id: &FlowId) {
        let Some(flow) = self.detector.flow(flow_id) else {
            return;
        };

        let comparison = match (&flow.client, &flow.state) {
            (Some(client), Some(state)) if self.csrf.reuse_detection => {
                let prior_states = self.state_history.prior_states(client);
                self.state_history.record(client, state);
                StateComparison::ReuseDetection {
                    prior_states,
                    threshold: self.csrf.similarity_threshold,
                }
            }
            _ => StateComparison::Exact,
        };

        let observers = observers_for(flow, comparison);
        tracing::info!(
            flow = %flow_id,
            flow_type = %flow.flow_type,
            observers = observers.len(),
            "Assessment started"
        );
        self.observers.insert(*flow_id, observers);
    }

    /// Deliver one handler to every live observer of a flow.
    ///
    /// An observer whose handler fails is retired without a verdict.
    fn dispatch<F>(&mut self, flow_id: &FlowId, handler: &'static str, mut deliver: F)
    where
        F: FnMut(&mut dyn ThreatObserver) -> Result<(), ObserverError>,
    {
        let Some(observers) = self.observers.get_mut(flow_id) else {
            tracing::debug!(flow = %flow_id, handler, "No observers for flow");
            return;
        };

        observers.retain_mut(|observer| match deliver(observer.as_mut()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    flow = %flow_id,
                    threat = observer.threat_name(),
                    handler,
                    error = %e,
                    "Observer failed, retiring it without a verdict"
                );
                false
            }
        });
    }

    /// Route unclassified traffic to every flow that involves `origin`.
    fn pass_through<F>(&mut self, origin: &str, handler: &'static str, mut deliver: F) -> Vec<Notification>
    where
        F: FnMut(&mut dyn ThreatObserver) -> Result<(), ObserverError>,
    {
        let targets = self
            .detector
            .flows()
            .filter(|f| f.involves_origin(origin))
            .map(|f| f.id)
            .collect::<Vec<_>>();

        let mut notifications = Vec::new();
        for flow_id in targets {
            self.dispatch(&flow_id, handler, &mut deliver);
            notifications.extend(self.sweep(&flow_id));
        }
        notifications
    }

    /// Retire observers that reached a verdict and batch the vulnerable ones.
    fn sweep(&mut self, flow_id: &FlowId) -> Option<Notification> {
        let observers = self.observers.get_mut(flow_id)?;

        let mut concluded = Vec::new();
        observers.retain(|observer| {
            if observer.status().is_concluded() {
                concluded.push(observer.assessment());
                false
            } else {
                true
            }
        });

        for assessment in &concluded {
            tracing::info!(
                flow = %flow_id,
                threat = assessment.threat,
                status = %assessment.status,
                "Threat assessed"
            );
        }

        let findings = concluded
            .into_iter()
            .filter(|a| a.status.is_vulnerable())
            .collect::<Vec<_>>();
        if findings.is_empty() {
            return None;
        }

        let body = findings
            .iter()
            .map(Assessment::summary)
            .collect::<Vec<_>>()
            .join("\n");

        Some(Notification {
            flow_id: *flow_id,
            title: self.notification_title.clone(),
            body,
            findings,
        })
    }

    fn discard_completed(&mut self) {
        for flow in self.detector.drain_completed() {
            if let Some(observers) = self.observers.remove(&flow.id) {
                tracing::debug!(
                    flow = %flow.id,
                    pending = observers.len(),
                    "Discarding observers of completed flow"
                );
            }
        }
    }
}
