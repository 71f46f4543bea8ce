use std::collections::HashMap;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use oauth2_observer::{
    Exchange, ExchangeId, ExchangeType, ParsedUrl, Request, RequestBody, Response, TrafficEvent,
    UploadData,
};

use crate::errors::ReplayError;
use crate::records::{Record, RecordedBody, RecordedHeader};

/// Builds exchanges from `webRequest` events the way a browser extension
/// background page does.
///
/// A request is appended per hop and delivered once its headers are known;
/// responses are appended and delivered as they arrive. Completion is only
/// reported for navigations and XHR/fetch calls.
#[derive(Debug, Default)]
pub(crate) struct ExchangeAssembler {
    partial: HashMap<String, Exchange>,
}

impl ExchangeAssembler {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Apply one record; returns the event to deliver, if any.
    pub(crate) fn apply(&mut self, record: Record) -> Result<Option<TrafficEvent>, ReplayError> {
        match record {
            Record::BeforeRequest {
                request_id,
                url,
                method,
                kind,
                tab_id,
                initiator,
                request_body,
            } => {
                let method = Method::from_bytes(method.as_bytes())
                    .map_err(|_| ReplayError::InvalidMethod(method.clone()))?;
                let mut request = Request::new(method, ParsedUrl::parse(&url, None)?);
                request.body = request_body.map(request_body_from);

                self.partial
                    .entry(request_id.clone())
                    .or_insert_with(|| {
                        Exchange::new(
                            ExchangeId::new(request_id),
                            ExchangeType::from(kind.as_str()),
                            tab_id,
                            initiator,
                        )
                    })
                    .requests
                    .push(request);
                Ok(None)
            }
            Record::BeforeSendHeaders {
                request_id,
                request_headers,
            } => {
                let exchange = self.exchange_mut(&request_id)?;
                let headers = header_map(request_headers)?;
                let request = exchange
                    .requests
                    .last_mut()
                    .ok_or_else(|| ReplayError::UnknownExchange(request_id.clone()))?;
                request.headers = headers;
                let request = request.clone();

                Ok(Some(TrafficEvent::Request {
                    exchange: exchange.clone(),
                    request,
                }))
            }
            Record::ResponseHeaders {
                request_id,
                status_code,
                status_line,
                response_headers,
            } => {
                let exchange = self.exchange_mut(&request_id)?;
                let response = Response::new(status_code, status_line, header_map(response_headers)?);
                exchange.responses.push(response.clone());

                Ok(Some(TrafficEvent::Response {
                    exchange: exchange.clone(),
                    response,
                }))
            }
            Record::Completed { request_id } => {
                let Some(exchange) = self.partial.remove(&request_id) else {
                    return Ok(None);
                };
                if !exchange.exchange_type.is_analyzed() {
                    return Ok(None);
                }
                Ok(Some(TrafficEvent::ExchangeCompleted { exchange }))
            }
        }
    }

    fn exchange_mut(&mut self, request_id: &str) -> Result<&mut Exchange, ReplayError> {
        self.partial
            .get_mut(request_id)
            .ok_or_else(|| ReplayError::UnknownExchange(request_id.to_string()))
    }
}

/// Headers without a value are dropped.
fn header_map(headers: Vec<RecordedHeader>) -> Result<HeaderMap, ReplayError> {
    let mut map = HeaderMap::new();
    for RecordedHeader { name, value } in headers {
        let Some(value) = value else {
            continue;
        };
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ReplayError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(&value).map_err(|_| ReplayError::InvalidHeader(name))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

/// Form fields keep their first value.
fn request_body_from(body: RecordedBody) -> RequestBody {
    if let Some(form_data) = body.form_data {
        let fields = form_data
            .into_iter()
            .filter_map(|(key, values)| values.into_iter().next().map(|value| (key, value)))
            .collect();
        return RequestBody::FormData(fields);
    }
    if let Some(raw) = body.raw {
        let uploads = raw
            .into_iter()
            .map(|upload| UploadData {
                bytes: upload.bytes,
                file: upload.file,
            })
            .collect();
        return RequestBody::Raw(uploads);
    }
    RequestBody::Error(body.error.unwrap_or_default())
}
