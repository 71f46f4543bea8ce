//! oauth2_observer - Passive OAuth 2.0 flow correlation and client assessment
//!
//! This crate watches browser traffic, recognises the messages of OAuth 2.0
//! authorization-code and implicit flows, correlates them into flows and runs
//! a catalog of threat checks against each flow. Findings are reported as
//! advisory notifications; traffic is never blocked or modified.

mod assessor;
mod config;
mod flow;
mod observer;
mod traffic;


pub use assessor::{
    AssessorHandle, AssessorSettings, ChannelNotifier, DeliveredMessage, Notification,
    OAuthClientAssessor, ServiceError, TracingNotifier, TrafficEvent, TrafficSender, UserNotifier,
    spawn_assessor,
};

pub use config::NOTIFICATION_TITLE;

pub use flow::{Classified, DetectorSettings, Flow, FlowDetector, FlowId, FlowType, OAuthMessage};

pub use observer::{
    Assessment, CsrfSettings, ObserverError, ObserverState, StateComparison, StateHistory,
    ThreatObserver, ThreatStatus, dice_coefficient, observers_for,
};

pub use traffic::{
    Exchange, ExchangeId, ExchangeType, ParsedUrl, Request, RequestBody, Response, TrafficError,
    UploadData,
};
