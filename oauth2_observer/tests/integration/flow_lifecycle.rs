/// Flow correlation and lifecycle
///
/// Exercises the flow detector on its own: message classification, merging of
/// duplicate authorization requests, redirect-uri binding and eviction.
use std::time::Duration;

use oauth2_observer::{
    Exchange, ExchangeId, ExchangeType, FlowDetector, OAuthMessage, Request,
};
use tokio::time::Instant;

use crate::common::{AUTHORIZE, CALLBACK, CLIENT, IDP, get, redirect, response, settings};

fn detector() -> FlowDetector {
    FlowDetector::new(settings().detector)
}

fn main_frame(id: &str, initiator: Option<&str>, urls: &[&str]) -> (Exchange, Request) {
    let mut exchange = Exchange::new(
        ExchangeId::new(id),
        ExchangeType::MainFrame,
        7,
        initiator.map(str::to_string),
    );
    exchange.requests = urls.iter().map(|url| get(url)).collect();
    let request = exchange
        .latest_request()
        .cloned()
        .expect("at least one url");
    (exchange, request)
}

#[test]
fn test_message_sequence_of_a_code_flow() {
    // Given a detector and a client navigation to the IdP
    let mut detector = detector();
    let now = Instant::now();
    let (exchange, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE]);

    // When the whole exchange plays out
    let authorization = detector.on_request(&exchange, &request, now).unwrap();
    let auth_response = detector
        .on_response(&exchange, &redirect(302, CALLBACK), now)
        .unwrap();
    let (chained, callback) = main_frame("1", Some(CLIENT), &[AUTHORIZE, CALLBACK]);
    let redirect_request = detector.on_request(&chained, &callback, now).unwrap();
    let redirect_response = detector
        .on_response(&chained, &response(200, &[]), now)
        .unwrap();

    // Then every protocol message is attributed to the same flow
    assert_eq!(
        [
            authorization.message,
            auth_response.message,
            redirect_request.message,
            redirect_response.message,
        ],
        [
            OAuthMessage::AuthorizationRequest,
            OAuthMessage::AuthorizationResponse,
            OAuthMessage::RedirectUriRequest,
            OAuthMessage::RedirectUriResponse,
        ]
    );
    assert!(
        [auth_response, redirect_request, redirect_response]
            .iter()
            .all(|c| c.flow_id == authorization.flow_id)
    );
}

#[test]
fn test_federated_redirect_merges_into_one_flow() {
    // Given a flow that the first IdP forwards to a second one
    let mut detector = detector();
    let now = Instant::now();
    let (exchange, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE]);
    detector.on_request(&exchange, &request, now).unwrap();

    let forwarded = AUTHORIZE.replace(IDP, "https://partner.example");
    let (chained, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE, &forwarded]);

    // When the forwarded authorization request is observed
    let classified = detector.on_request(&chained, &request, now);

    // Then it joins the existing flow silently
    assert!(classified.is_none());
    assert_eq!(detector.len(), 1);
    let flow = detector.flows().next().unwrap();
    assert!(flow.authorization_server.contains(IDP));
    assert!(flow.authorization_server.contains("https://partner.example"));

    // And a code from the partner is attributed to the flow
    assert!(
        detector
            .on_response(&chained, &redirect(302, CALLBACK), now)
            .is_some()
    );
}

#[test]
fn test_unsolicited_callback_is_not_attributed() {
    let mut detector = detector();
    let (exchange, request) = main_frame(
        "1",
        Some("https://attacker.example"),
        &["https://client.example/cb?code=stolen"],
    );

    assert!(detector.on_request(&exchange, &request, Instant::now()).is_none());
    assert!(detector.is_empty());
}

#[test]
fn test_abandoned_flow_is_evicted_once() {
    // Given a flow whose user never returns to the client
    let mut detector = detector();
    let now = Instant::now();
    let (exchange, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE]);
    let flow_id = detector.on_request(&exchange, &request, now).unwrap().flow_id;

    // When time passes in several sweeps
    let mut completed = Vec::new();
    for seconds in [60, 120, 179, 180, 240, 600] {
        detector.evict_expired(now + Duration::from_secs(seconds));
        completed.extend(detector.drain_completed());
    }

    // Then the completion was reported exactly once
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, flow_id);
}

#[test]
fn test_redirect_uri_response_requires_bound_exchange() {
    // Given a flow bound to redirect-uri exchange "2"
    let mut detector = detector();
    let now = Instant::now();
    let (exchange, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE]);
    detector.on_request(&exchange, &request, now).unwrap();
    let (bound, callback) = main_frame("2", Some(IDP), &[CALLBACK]);
    detector.on_request(&bound, &callback, now).unwrap();

    // When a different exchange to the same callback gets a response
    let (other, _) = main_frame("3", Some(IDP), &[CALLBACK]);

    // Then only the bound exchange's response counts
    assert!(detector.on_response(&other, &response(200, &[]), now).is_none());
    assert_eq!(
        detector
            .on_response(&bound, &response(200, &[]), now)
            .map(|c| c.message),
        Some(OAuthMessage::RedirectUriResponse)
    );
}

#[test]
fn test_non_302_authorization_response_is_accepted() {
    let mut detector = detector();
    let now = Instant::now();
    let (exchange, request) = main_frame("1", Some(CLIENT), &[AUTHORIZE]);
    detector.on_request(&exchange, &request, now).unwrap();

    let classified = detector.on_response(&exchange, &redirect(303, CALLBACK), now);

    assert_eq!(
        classified.map(|c| c.message),
        Some(OAuthMessage::AuthorizationResponse)
    );
}
