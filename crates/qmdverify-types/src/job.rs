use crate::nullable::null_as_default;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque server-side job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for JobHandle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of a comparison job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Error,
    /// Anything the server sends that is not one of the above.
    Unknown(String),
}

impl JobStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "pending" => JobStatus::Pending,
            "running" => JobStatus::Running,
            "success" => JobStatus::Success,
            "error" => JobStatus::Error,
            other => JobStatus::Unknown(other.to_string()),
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Unknown(status) => write!(f, "{}", status),
        }
    }
}

/// Reply to `POST /api/compare`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    #[serde(rename = "jobId", default, deserialize_with = "null_as_default")]
    pub job_id: String,
}

/// Wrapped job-status reply to `GET /api/results/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub results: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> JobEnvelope<T> {
    pub fn job_status(&self) -> JobStatus {
        JobStatus::parse(self.status.as_deref().unwrap_or_default())
    }

    /// Server-supplied failure text: `error` first, then `message`.
    pub fn failure_message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|msg| !msg.is_empty())
    }
}

/// Body the server sends alongside non-2xx statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "null_as_default")]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComparisonResponse;

    #[test]
    fn test_status_parse() {
        assert_eq!(JobStatus::parse("running"), JobStatus::Running);
        assert_eq!(JobStatus::parse("success"), JobStatus::Success);
        assert_eq!(
            JobStatus::parse("queued"),
            JobStatus::Unknown("queued".to_string())
        );
        assert!(JobStatus::Pending.is_in_progress());
        assert!(!JobStatus::Error.is_in_progress());
    }

    #[test]
    fn test_envelope_without_results() {
        let envelope: JobEnvelope<ComparisonResponse> =
            serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(envelope.job_status(), JobStatus::Pending);
        assert!(envelope.results.is_none());
    }

    #[test]
    fn test_envelope_missing_status_is_unknown() {
        let envelope: JobEnvelope<ComparisonResponse> = serde_json::from_str("{}").unwrap();
        assert_eq!(envelope.job_status(), JobStatus::Unknown(String::new()));
    }

    #[test]
    fn test_failure_message_prefers_error() {
        let envelope: JobEnvelope<ComparisonResponse> = serde_json::from_str(
            r#"{"status": "error", "error": "bad qmd", "message": "ignored"}"#,
        )
        .unwrap();
        assert_eq!(envelope.failure_message(), Some("bad qmd"));

        let envelope: JobEnvelope<ComparisonResponse> =
            serde_json::from_str(r#"{"status": "error", "error": "", "message": "fallback"}"#)
                .unwrap();
        assert_eq!(envelope.failure_message(), Some("fallback"));
    }

    #[test]
    fn test_submit_response_job_id() {
        let reply: SubmitJobResponse = serde_json::from_str(r#"{"jobId": "abc-123"}"#).unwrap();
        assert_eq!(reply.job_id, "abc-123");
    }
}
