//! Shape predicates for OAuth protocol messages.
//!
//! These look at a single request or response in isolation. Binding a match to
//! a tracked flow is the detector's job.

use http::Method;

use crate::flow::types::FlowType;
use crate::traffic::{Exchange, ParsedUrl, Request, Response};

/// Flow type of an authorization request, or `None` when `request` is not one.
///
/// `initiator` is the exchange's request-initiator origin. A request whose
/// initiator is its own origin is assumed to be an identity provider
/// continuing its own authorization page rather than a client starting a flow.
pub(super) fn authorization_flow_type(
    initiator: Option<&str>,
    request: &Request,
) -> Option<FlowType> {
    if request.method != Method::GET {
        return None;
    }

    let url = &request.url;
    let response_type = match (url.query_param("client_id"), url.query_param("response_type")) {
        (Some(_), Some(response_type)) => response_type,
        _ => return None,
    };

    if initiator == Some(url.origin.as_str()) {
        tracing::debug!(
            origin = %url.origin,
            "Authorization-shaped request initiated by its own origin, not treated as a new flow"
        );
        return None;
    }

    let flow_type = response_type
        .split(' ')
        .find_map(FlowType::from_response_type);

    if flow_type.is_none() {
        tracing::warn!(
            response_type,
            url = %url.href,
            "Unknown response_type encountered, ignoring request"
        );
    }

    flow_type
}

/// A GET carrying an authorization code in the query or an access token in the fragment.
pub(super) fn is_redirect_uri_request(request: &Request) -> bool {
    request.method == Method::GET
        && (request.url.has_query_param("code") || request.url.carries_access_token())
}

/// A form-encoded POST exchanging an authorization code.
pub(super) fn is_token_request(request: &Request) -> bool {
    request.method == Method::POST
        && request.form_field("grant_type") == Some("authorization_code")
        && request.form_field("code").is_some()
}

/// The redirect target of an authorization response, if `response` has that shape.
///
/// `location` is resolved against the origin of the exchange's latest hop.
/// Parse failures fail closed.
pub(super) fn authorization_response_location(
    exchange: &Exchange,
    response: &Response,
) -> Option<ParsedUrl> {
    if !response.is_redirect() {
        return None;
    }

    let origin = exchange.latest_origin()?;
    let location = response.header("location")?;

    let target = match ParsedUrl::parse(location, Some(origin)) {
        Ok(target) => target,
        Err(e) => {
            tracing::debug!(location, error = %e, "Unparseable redirect location");
            return None;
        }
    };

    if !target.has_query_param("code") && !target.carries_access_token() {
        return None;
    }

    if response.status_code != 302 {
        tracing::warn!(
            status = response.status_code,
            exchange = %exchange.id,
            "Authorization response detected with status code different from 302"
        );
    }

    Some(target)
}
