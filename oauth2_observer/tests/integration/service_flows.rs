/// Assessor service
///
/// Runs the assessor on its own task and feeds it through the channel, the
/// way a browser integration with several event sources would.
use std::time::Duration;

use oauth2_observer::{
    ChannelNotifier, Exchange, ExchangeId, ExchangeType, OAuthClientAssessor, Response,
    ServiceError, TrafficEvent, spawn_assessor,
};

use crate::common::{AUTHORIZE, CALLBACK, CLIENT, get, redirect, response, settings};

fn navigation(id: &str, initiator: &str, urls: &[&str]) -> Exchange {
    let mut exchange = Exchange::new(
        ExchangeId::new(id),
        ExchangeType::MainFrame,
        3,
        Some(initiator.to_string()),
    );
    exchange.requests = urls.iter().map(|url| get(url)).collect();
    exchange
}

fn response_event(exchange: &mut Exchange, response: Response) -> TrafficEvent {
    exchange.responses.push(response.clone());
    TrafficEvent::Response {
        exchange: exchange.clone(),
        response,
    }
}

fn request_event(exchange: &Exchange) -> TrafficEvent {
    TrafficEvent::Request {
        exchange: exchange.clone(),
        request: exchange.latest_request().cloned().expect("request"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_code_flow_through_service() {
    // Given a running service
    let (notifier, mut messages) = ChannelNotifier::new();
    let handle = spawn_assessor(OAuthClientAssessor::new(settings()), notifier);

    // When a code flow with a rendered callback is replayed
    let mut exchange = navigation("1", CLIENT, &[AUTHORIZE]);
    handle.send(request_event(&exchange)).unwrap();
    handle
        .send(response_event(&mut exchange, redirect(302, CALLBACK)))
        .unwrap();
    exchange.requests.push(get(CALLBACK));
    handle.send(request_event(&exchange)).unwrap();
    let page = response(200, &[("Referrer-Policy", "strict-origin")]);
    handle.send(response_event(&mut exchange, page)).unwrap();
    handle
        .send(TrafficEvent::ExchangeCompleted { exchange })
        .unwrap();

    // Then the code history leak is delivered
    let message = messages.recv().await.expect("notification");
    assert_eq!(
        message.body,
        "Threat: Leaking Authorization \"codes\" in the browser history\n\
         The redirect-uri page is rendered directly, leaving the authorization code in the browser history"
    );

    // And the flow is gone once the grace period passes without traffic
    tokio::time::sleep(Duration::from_millis(3_001)).await;
    let assessor = handle.shutdown().await.unwrap();
    assert!(assessor.detector().is_empty());
}

#[tokio::test]
async fn test_multiple_sources_share_one_service() {
    // Given two traffic sources on one service
    let (notifier, _messages) = ChannelNotifier::new();
    let handle = spawn_assessor(OAuthClientAssessor::new(settings()), notifier);
    let first = handle.sender();
    let second = handle.sender();

    // When both report the same authorization request
    let auth = navigation("1", CLIENT, &[AUTHORIZE]);
    first.send(request_event(&auth)).unwrap();
    second.send(request_event(&auth)).unwrap();

    // Then one flow is tracked
    let assessor = handle.shutdown().await.unwrap();
    assert_eq!(assessor.detector().len(), 1);

    // And the senders are closed afterwards
    assert_eq!(first.send(request_event(&auth)), Err(ServiceError::Closed));
}
