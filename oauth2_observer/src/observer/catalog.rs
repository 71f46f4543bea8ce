use crate::flow::{Flow, FlowType};

use super::checks::{
    ClickjackingObserver, CodeHistoryLeakObserver, CodePhishingObserver, CsrfObserver,
    EavesdroppingObserver, ReferrerLeakObserver, SessionImpersonationObserver,
    TokenHistoryLeakObserver, TokenTransportLeakObserver,
};
use super::state_history::StateComparison;
use super::types::ThreatObserver;

/// Fresh observers for `flow`, chosen by its flow type.
pub fn observers_for(flow: &Flow, comparison: StateComparison) -> Vec<Box<dyn ThreatObserver>> {
    match flow.flow_type {
        FlowType::AuthorizationCode => vec![
            Box::new(CsrfObserver::new(comparison)),
            Box::new(ClickjackingObserver::new()),
            Box::new(CodePhishingObserver::new()),
            Box::new(CodeHistoryLeakObserver::new()),
            Box::new(ReferrerLeakObserver::new()),
            Box::new(EavesdroppingObserver::new()),
            Box::new(SessionImpersonationObserver::new()),
        ],
        FlowType::Implicit => vec![
            Box::new(CsrfObserver::new(comparison)),
            Box::new(ClickjackingObserver::new()),
            Box::new(TokenHistoryLeakObserver::new()),
            Box::new(TokenTransportLeakObserver::new()),
        ],
    }
}
