/// Property tests for flow identity
use std::collections::BTreeSet;

use oauth2_observer::{Exchange, ExchangeId, ExchangeType, FlowDetector};
use proptest::prelude::*;
use tokio::time::Instant;

use crate::common::{CLIENT, get, settings};

fn authorization_url(origin: &str, client_id: &str, state: &Option<String>, nonce: &Option<String>) -> String {
    let mut url = format!("{origin}/authorize?client_id={client_id}&response_type=code");
    if let Some(state) = state {
        url.push_str(&format!("&state={state}"));
    }
    if let Some(nonce) = nonce {
        url.push_str(&format!("&nonce={nonce}"));
    }
    url
}

fn observe(detector: &mut FlowDetector, id: &str, url: &str) {
    let request = get(url);
    let mut exchange = Exchange::new(
        ExchangeId::new(id),
        ExchangeType::MainFrame,
        1,
        Some(CLIENT.to_string()),
    );
    exchange.requests.push(request.clone());
    detector.on_request(&exchange, &request, Instant::now());
}

proptest! {
    #[test]
    fn prop_equal_identity_yields_one_flow_with_union_of_origins(
        client_id in "[a-z0-9]{1,12}",
        state in proptest::option::of("[A-Za-z0-9]{1,16}"),
        nonce in proptest::option::of("[A-Za-z0-9]{1,16}"),
        first_host in "idp-[a-z]{1,8}",
        second_host in "idp-[a-z]{1,8}",
    ) {
        let first = format!("https://{first_host}.example");
        let second = format!("https://{second_host}.example");
        let mut detector = FlowDetector::new(settings().detector);

        observe(&mut detector, "1", &authorization_url(&first, &client_id, &state, &nonce));
        observe(&mut detector, "2", &authorization_url(&second, &client_id, &state, &nonce));

        prop_assert_eq!(detector.len(), 1);
        let flow = detector.flows().next().unwrap();
        prop_assert_eq!(
            flow.authorization_server.clone(),
            BTreeSet::from([first, second])
        );
    }

    #[test]
    fn prop_different_state_yields_separate_flows(
        client_id in "[a-z0-9]{1,12}",
        first_state in "[a-z]{1,8}",
        second_state in "[0-9]{1,8}",
    ) {
        let mut detector = FlowDetector::new(settings().detector);

        let state = Some(first_state);
        observe(&mut detector, "1", &authorization_url("https://idp.example", &client_id, &state, &None));
        let state = Some(second_state);
        observe(&mut detector, "2", &authorization_url("https://idp.example", &client_id, &state, &None));

        prop_assert_eq!(detector.len(), 2);
    }
}
