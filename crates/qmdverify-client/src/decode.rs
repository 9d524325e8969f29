use crate::transport::RawResponse;
use crate::{Error, Result};
use qmdverify_types::{
    BatchComparisonResponse, ComparisonResponse, ErrorBody, JobEnvelope, JobStatus,
};
use serde::de::DeserializeOwned;

/// A result type a job can finish with.
///
/// The server may answer a status poll with the bare result object or with a
/// `{status, results, ...}` envelope. `has_data` tells the two apart: a body
/// that decodes as the bare type but carries nothing is treated as an
/// envelope.
pub trait JobPayload: DeserializeOwned {
    fn has_data(&self) -> bool;
}

impl JobPayload for ComparisonResponse {
    fn has_data(&self) -> bool {
        ComparisonResponse::has_data(self)
    }
}

impl JobPayload for BatchComparisonResponse {
    fn has_data(&self) -> bool {
        !self.is_empty()
    }
}

/// One decoded status poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub status: JobStatus,
    pub result: Option<T>,
    pub message: Option<String>,
}

impl<T> Decoded<T> {
    fn running() -> Self {
        Self {
            status: JobStatus::Running,
            result: None,
            message: None,
        }
    }
}

/// Decode a reply to `GET /api/results/{id}`.
pub fn decode_poll<T: JobPayload>(response: &RawResponse) -> Result<Decoded<T>> {
    if response.is_accepted() {
        return Ok(Decoded::running());
    }
    if !response.is_success() {
        return Err(error_from_status(response));
    }
    decode_body(&response.body)
}

/// Decode a 2xx status body, bare result first, envelope second.
pub fn decode_body<T: JobPayload>(body: &[u8]) -> Result<Decoded<T>> {
    if let Ok(direct) = serde_json::from_slice::<T>(body)
        && direct.has_data()
    {
        return Ok(Decoded {
            status: JobStatus::Success,
            result: Some(direct),
            message: None,
        });
    }

    let envelope: JobEnvelope<T> = serde_json::from_slice(body)?;
    let status = envelope.job_status();
    let message = envelope.failure_message().map(str::to_string);
    Ok(Decoded {
        status,
        result: envelope.results,
        message,
    })
}

/// Error for a non-2xx reply: the server's `error` text when the body has
/// one, the bare status otherwise.
pub fn error_from_status(response: &RawResponse) -> Error {
    match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) if !body.error.is_empty() => Error::Server(body.error),
        _ => Error::Http {
            status: response.status,
        },
    }
}
