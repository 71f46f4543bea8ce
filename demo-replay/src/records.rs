use std::collections::HashMap;

use serde::Deserialize;

use crate::errors::ReplayError;

/// One recorded browser `webRequest` event.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum Record {
    BeforeRequest {
        request_id: String,
        url: String,
        method: String,
        #[serde(rename = "type")]
        kind: String,
        #[serde(default)]
        tab_id: i64,
        #[serde(default)]
        initiator: Option<String>,
        #[serde(default)]
        request_body: Option<RecordedBody>,
    },
    BeforeSendHeaders {
        request_id: String,
        #[serde(default)]
        request_headers: Vec<RecordedHeader>,
    },
    /// `onBeforeRedirect` and `onResponseStarted` both carry the response of
    /// one hop; `onHeadersReceived` would repeat it and is not accepted.
    #[serde(rename = "before_redirect", alias = "response_started")]
    ResponseHeaders {
        request_id: String,
        status_code: u16,
        #[serde(default)]
        status_line: String,
        #[serde(default)]
        response_headers: Vec<RecordedHeader>,
    },
    Completed {
        request_id: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordedHeader {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RecordedBody {
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) form_data: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub(crate) raw: Option<Vec<RecordedUpload>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordedUpload {
    #[serde(default)]
    pub(crate) bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub(crate) file: Option<String>,
}

/// Parse a JSON lines recording. Blank lines are skipped.
pub(crate) fn parse_lines(contents: &str) -> Result<Vec<Record>, ReplayError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| ReplayError::Json {
                line: index + 1,
                source,
            })
        })
        .collect()
}
