mod core;
mod notifier;
mod service;

pub use core::OAuthClientAssessor;
pub use notifier::{ChannelNotifier, DeliveredMessage, TracingNotifier, UserNotifier};
pub use service::{AssessorHandle, TrafficSender, spawn_assessor};
