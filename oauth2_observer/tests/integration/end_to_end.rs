/// End-to-end assessment scenarios
///
/// Each test replays the browser traffic of one complete OAuth flow through
/// the assessor and checks the findings reported to the user.
use std::time::Duration;

use oauth2_observer::{ExchangeType, FlowType, ThreatStatus};

use crate::common::{
    AUTHORIZE, CALLBACK, CLIENT, IDP, MockBrowser, redirect, response, settings, token_request,
};

#[test]
fn test_authorization_code_flow_with_rendered_callback() {
    // Given a client starting an authorization-code flow
    let mut browser = MockBrowser::new(settings());
    let mut exchange = browser.navigate(Some(CLIENT), AUTHORIZE);

    let flow = browser
        .assessor
        .detector()
        .flows()
        .next()
        .cloned()
        .expect("flow created");
    assert_eq!(flow.flow_type, FlowType::AuthorizationCode);
    assert_eq!(
        flow.authorization_server
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
        vec![IDP]
    );

    // When the IdP redirects back with a code and the browser follows
    browser.receive(&mut exchange, redirect(302, CALLBACK));
    browser.follow(&mut exchange, CALLBACK);

    let bound = browser.assessor.detector().flow(&flow.id).cloned().unwrap();
    assert_eq!(bound.redirect_uri_request_id, Some(exchange.id.clone()));
    assert!(browser.notifications.is_empty());

    // And the client renders the callback page directly
    browser.receive(&mut exchange, response(200, &[]));

    // Then the code history leak and the referrer exposure are reported together
    assert_eq!(browser.notifications.len(), 1);
    let notification = &browser.notifications[0];
    assert_eq!(notification.flow_id, flow.id);
    assert_eq!(notification.title, "OAuth vulnerability detected");
    assert_eq!(
        notification.body,
        "Threat: Leaking Authorization \"codes\" in the browser history\n\
         The redirect-uri page is rendered directly, leaving the authorization code in the browser history\n\
         Threat: Credential Leakage via Referrer Headers\n\
         The redirect-uri page may leak the authorization code via the Referer header (Referrer-Policy: not set)"
    );
    assert_eq!(notification.findings[0].status, ThreatStatus::Vulnerable);
    assert_eq!(
        notification.findings[1].status,
        ThreatStatus::PotentiallyVulnerable
    );

    // And the flow finishes after the grace period
    browser.advance(Duration::from_millis(3_000));
    assert_eq!(browser.tick(), 1);
    assert!(browser.assessor.assessments(&flow.id).is_empty());
}

#[test]
fn test_well_protected_client_reports_nothing() {
    // Given a client that uses PKCE and redirects away from its callback
    let mut browser = MockBrowser::new(settings());
    let pkce = format!("{AUTHORIZE}&code_challenge=abc&code_challenge_method=S256");
    let mut exchange = browser.navigate(Some(CLIENT), &pkce);

    // When the login page, the callback and the token request are observed
    browser.receive(
        &mut exchange,
        response(200, &[("X-Frame-Options", "DENY")]),
    );
    let mut callback = browser.navigate(Some(IDP), CALLBACK);
    browser.receive(&mut callback, redirect(302, "/dashboard"));
    let mut token = browser.open(ExchangeType::XmlHttpRequest, Some(CLIENT));
    browser.send(&mut token, token_request("https://idp.example/token"));

    // Then no vulnerability is reported
    assert!(browser.notifications.is_empty());
}

#[test]
fn test_clickjacking_on_login_page_after_internal_redirect() {
    // Given an authorization request the IdP forwards to its login page
    let mut browser = MockBrowser::new(settings());
    let mut exchange = browser.navigate(Some(CLIENT), AUTHORIZE);
    browser.receive(&mut exchange, redirect(302, "https://idp.example/login"));
    browser.follow(&mut exchange, "https://idp.example/login");

    // When the login page lacks framing protection
    browser.receive(&mut exchange, response(200, &[]));

    // Then clickjacking is reported
    assert_eq!(
        browser.reported_threats(),
        vec!["Clickjacking Attack against Authorization"]
    );
}

#[test]
fn test_plain_http_client_reports_transport_threats() {
    // Given a client whose redirect-uri and token endpoint use plain HTTP
    let mut browser = MockBrowser::new(settings());
    let authorize = "https://idp.example/authorize?client_id=abc&response_type=code&state=s&redirect_uri=http%3A%2F%2Fapp.example%2Fcb";
    browser.navigate(Some("http://app.example"), authorize);

    // When the callback and the token request arrive
    browser.navigate(Some(IDP), "http://app.example/cb?code=1&state=s");
    let mut token = browser.open(ExchangeType::XmlHttpRequest, Some("http://app.example"));
    browser.send(&mut token, token_request("http://idp.example/token"));

    // Then phishing, session impersonation and eavesdropping are reported
    assert_eq!(
        browser.reported_threats(),
        vec![
            "Authorization \"code\" Phishing",
            "User Session Impersonation",
            "Eavesdropping Access Tokens",
        ]
    );
}

#[test]
fn test_implicit_flow_token_left_in_history() {
    // Given an implicit flow
    let mut browser = MockBrowser::new(settings());
    let authorize = "https://idp.example/authorize?client_id=abc&response_type=token&state=s";
    let mut exchange = browser.navigate(Some(CLIENT), authorize);
    let flow = browser.assessor.detector().flows().next().cloned().unwrap();
    assert_eq!(flow.flow_type, FlowType::Implicit);
    assert_eq!(browser.assessor.assessments(&flow.id).len(), 4);

    // When the token comes back in the fragment and the page renders directly
    let callback = "https://client.example/cb#access_token=t&token_type=bearer&state=s";
    browser.receive(&mut exchange, redirect(302, callback));
    browser.follow(&mut exchange, callback);
    browser.receive(&mut exchange, response(200, &[]));

    // Then only the history leak is reported
    assert_eq!(
        browser.reported_threats(),
        vec!["Access Token Leak in Browser History"]
    );
}

#[test]
fn test_csrf_state_mismatch_reported() {
    let mut browser = MockBrowser::new(settings());
    browser.navigate(Some(CLIENT), AUTHORIZE);

    browser.navigate(Some(IDP), "https://client.example/cb?code=1&state=abc");

    assert_eq!(
        browser.reported_threats(),
        vec!["CSRF Attack against redirect-uri"]
    );
    assert_eq!(
        browser.notifications[0].findings[0].status,
        ThreatStatus::Vulnerable
    );
}

#[test]
fn test_notification_serializes_for_reporting() {
    // Given a flow without a state parameter
    let mut browser = MockBrowser::new(settings());
    let without_state = AUTHORIZE.replace("&state=xyz", "");
    browser.navigate(Some(CLIENT), &without_state);

    // When the notification is serialized
    let notification = browser.notifications.first().expect("notification");
    let json = serde_json::to_value(notification).unwrap();

    // Then the findings carry threat name, status and message
    assert_eq!(json["title"], "OAuth vulnerability detected");
    assert_eq!(json["flow_id"], notification.flow_id.to_string());
    assert_eq!(json["findings"][0]["threat"], "CSRF Attack against redirect-uri");
    assert_eq!(json["findings"][0]["status"], "PotentiallyVulnerable");
    assert!(json["findings"][0]["message"].is_string());
}
