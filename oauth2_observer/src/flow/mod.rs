mod config;
mod main;
mod types;

pub use config::DetectorSettings;
pub use main::FlowDetector;
pub use types::{Classified, Flow, FlowId, FlowType, OAuthMessage};
