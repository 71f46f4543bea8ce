mod catalog;
mod checks;
mod config;
mod errors;
mod state_history;
mod types;

pub use catalog::observers_for;
pub use config::CsrfSettings;
pub use errors::ObserverError;
pub use state_history::{StateComparison, StateHistory, dice_coefficient};
pub use types::{Assessment, ObserverState, ThreatObserver, ThreatStatus};
