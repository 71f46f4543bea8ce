mod code_history_leak;
mod code_phishing;
mod eavesdropping;
mod referrer_leak;
mod session_impersonation;

pub(crate) use code_history_leak::CodeHistoryLeakObserver;
pub(crate) use code_phishing::CodePhishingObserver;
pub(crate) use eavesdropping::EavesdroppingObserver;
pub(crate) use referrer_leak::ReferrerLeakObserver;
pub(crate) use session_impersonation::SessionImpersonationObserver;
