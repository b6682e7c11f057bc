use serde::Serialize;

pub mod service;
pub mod user;
pub mod version;

/// Envelope for successful JSON bodies: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
