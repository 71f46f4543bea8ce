mod token_history_leak;
mod token_transport_leak;

pub(crate) use token_history_leak::TokenHistoryLeakObserver;
pub(crate) use token_transport_leak::TokenTransportLeakObserver;
