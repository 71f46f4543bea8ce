mod authorization_code;
mod clickjacking;
mod csrf;
mod implicit;

pub(super) use authorization_code::{
    CodeHistoryLeakObserver, CodePhishingObserver, EavesdroppingObserver, ReferrerLeakObserver,
    SessionImpersonationObserver,
};
pub(super) use clickjacking::ClickjackingObserver;
pub(super) use csrf::CsrfObserver;
pub(super) use implicit::{TokenHistoryLeakObserver, TokenTransportLeakObserver};

use crate::traffic::{Exchange, ParsedUrl, Response};

use super::errors::ObserverError;

/// Target of a redirect response, resolved against the hop that received it.
fn redirect_location(exchange: &Exchange, response: &Response) -> Result<ParsedUrl, ObserverError> {
    let location = response
        .header("location")
        .ok_or(ObserverError::MissingHeader("location"))?;
    let base = exchange.latest_request().map(|r| r.url.href.as_str());

    Ok(ParsedUrl::parse(location, base)?)
}
