use serde::Serialize;

use crate::flow::FlowId;
use crate::observer::Assessment;
use crate::traffic::{Exchange, Request, Response};

/// Findings of one flow worth telling the user about, batched per dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub flow_id: FlowId,
    pub title: String,
    /// `"Threat: {name}\n{message}"` per finding, joined by newlines.
    pub body: String,
    pub findings: Vec<Assessment>,
}

/// One event delivered by a traffic source.
#[derive(Debug, Clone)]
pub enum TrafficEvent {
    Request { exchange: Exchange, request: Request },
    Response { exchange: Exchange, response: Response },
    ExchangeCompleted { exchange: Exchange },
}

impl TrafficEvent {
    pub fn exchange(&self) -> &Exchange {
        match self {
            Self::Request { exchange, .. }
            | Self::Response { exchange, .. }
            | Self::ExchangeCompleted { exchange } => exchange,
        }
    }
}
