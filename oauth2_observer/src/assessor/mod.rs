mod config;
mod errors;
mod main;
mod types;

pub use config::AssessorSettings;
pub use errors::ServiceError;
pub use main::{
    AssessorHandle, ChannelNotifier, DeliveredMessage, OAuthClientAssessor, TracingNotifier,
    TrafficSender, UserNotifier, spawn_assessor,
};
pub use types::{Notification, TrafficEvent};
