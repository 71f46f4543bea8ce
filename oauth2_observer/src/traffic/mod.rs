mod errors;
mod parsed_url;
mod types;

pub use errors::TrafficError;
pub use parsed_url::ParsedUrl;
pub use types::{Exchange, ExchangeId, ExchangeType, Request, RequestBody, Response, UploadData};
