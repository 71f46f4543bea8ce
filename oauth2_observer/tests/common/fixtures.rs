use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use oauth2_observer::{
    AssessorSettings, CsrfSettings, DetectorSettings, ParsedUrl, Request, RequestBody, Response,
};

pub const CLIENT: &str = "https://client.example";
pub const IDP: &str = "https://idp.example";
pub const AUTHORIZE: &str = "https://idp.example/authorize?client_id=abc&response_type=code&state=xyz&redirect_uri=https%3A%2F%2Fclient.example%2Fcb";
pub const CALLBACK: &str = "https://client.example/cb?code=123&state=xyz";

/// Settings with the stock timings, independent of the environment.
pub fn settings() -> AssessorSettings {
    AssessorSettings {
        detector: DetectorSettings {
            authorization_keep_alive: Duration::from_millis(180_000),
            redirect_uri_keep_alive: Duration::from_millis(3_000),
            max_tracked_flows: 256,
            merge_anonymous_flows: true,
        },
        csrf: CsrfSettings {
            reuse_detection: false,
            similarity_threshold: 0.95,
            history_per_client: 32,
        },
        notification_title: "OAuth vulnerability detected".to_string(),
    }
}

pub fn get(url: &str) -> Request {
    Request::new(
        Method::GET,
        ParsedUrl::parse(url, None).expect("fixture url must be valid"),
    )
}

pub fn token_request(url: &str) -> Request {
    let fields = [("grant_type", "authorization_code"), ("code", "123")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Request::new(
        Method::POST,
        ParsedUrl::parse(url, None).expect("fixture url must be valid"),
    )
    .with_body(RequestBody::FormData(fields))
}

pub fn response(status: u16, headers: &[(&str, &str)]) -> Response {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).expect("fixture header name"),
            HeaderValue::from_str(value).expect("fixture header value"),
        );
    }
    Response::new(status, format!("HTTP/1.1 {status}"), map)
}

pub fn redirect(status: u16, location: &str) -> Response {
    response(status, &[("Location", location)])
}
