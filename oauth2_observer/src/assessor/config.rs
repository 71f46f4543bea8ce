use crate::config::NOTIFICATION_TITLE;
use crate::flow::DetectorSettings;
use crate::observer::CsrfSettings;

/// Everything an [`OAuthClientAssessor`](super::OAuthClientAssessor) is built from.
///
/// `Default` reads the environment once through the module statics.
#[derive(Debug, Clone)]
pub struct AssessorSettings {
    pub detector: DetectorSettings,
    pub csrf: CsrfSettings,
    pub notification_title: String,
}

impl Default for AssessorSettings {
    fn default() -> Self {
        Self {
            detector: DetectorSettings::default(),
            csrf: CsrfSettings::default(),
            notification_title: NOTIFICATION_TITLE.clone(),
        }
    }
}
