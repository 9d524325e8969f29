use crate::decode::{JobPayload, decode_poll, error_from_status};
use crate::poll::{Clock, PollPolicy, SystemClock};
use crate::transport::{HttpTransport, Transport};
use crate::upload::{QmdFile, Upload};
use crate::{Error, Result};
use qmdverify_types::{
    BatchComparisonResponse, ComparisonResponse, HashtablesResponse, JobHandle, JobStatus,
    SubmitJobResponse, TreesResponse, VersionResponse,
};
use serde::de::DeserializeOwned;
use std::path::Path;

const COMPARE_PATH: &str = "/api/compare";
const RESULTS_PATH: &str = "/api/results";
const HASHTABLES_PATH: &str = "/api/hashtables";
const TREES_PATH: &str = "/api/trees";
const VERSION_PATH: &str = "/api/version";

/// Client for the qmd-check server.
///
/// Comparisons run as asynchronous jobs: the upload returns a job id, and
/// the result is fetched by polling until the job leaves its in-progress
/// states or the poll deadline passes.
pub struct Client<T = HttpTransport, C = SystemClock> {
    transport: T,
    clock: C,
    policy: PollPolicy,
}

impl Client {
    /// HTTP client for the server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self::with_transport(
            HttpTransport::new(base_url)?,
            SystemClock::new(),
        ))
    }
}

impl<T: Transport, C: Clock> Client<T, C> {
    pub fn with_transport(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Upload and return the server-assigned job id.
    pub fn submit(&self, upload: &Upload) -> Result<JobHandle> {
        let response = self.transport.post_multipart(COMPARE_PATH, upload)?;
        if !response.is_success() {
            return Err(error_from_status(&response));
        }

        let submitted: SubmitJobResponse = serde_json::from_slice(&response.body)
            .map_err(|e| Error::protocol(format!("failed to decode job response: {}", e)))?;
        if submitted.job_id.is_empty() {
            return Err(Error::protocol("server returned empty job ID"));
        }

        let handle = JobHandle::new(submitted.job_id);
        tracing::info!(job = %handle, files = upload.files().len(), "comparison job submitted");
        Ok(handle)
    }

    /// Poll a job until it succeeds, fails, or the deadline passes.
    pub fn await_result<P: JobPayload>(&self, handle: &JobHandle) -> Result<P> {
        let path = format!("{}/{}", RESULTS_PATH, handle);
        let started = self.clock.now();
        let mut polls = 0u32;

        loop {
            let elapsed = self.clock.now().saturating_sub(started);
            if self.policy.is_expired(elapsed) {
                tracing::warn!(job = %handle, polls, "gave up waiting for job");
                return Err(Error::Timeout(self.policy.deadline));
            }

            let decoded = decode_poll::<P>(&self.transport.get(&path)?)?;
            polls += 1;

            match decoded.status {
                JobStatus::Success => {
                    tracing::debug!(job = %handle, polls, "job finished");
                    return decoded
                        .result
                        .ok_or_else(|| Error::protocol("job succeeded but no results returned"));
                }
                JobStatus::Error => {
                    return Err(Error::JobFailed(
                        decoded.message.unwrap_or_else(|| "unknown error".to_string()),
                    ));
                }
                status @ (JobStatus::Pending | JobStatus::Running) => {
                    let elapsed = self.clock.now().saturating_sub(started);
                    let interval = self.policy.interval_at(elapsed);
                    tracing::debug!(job = %handle, %status, ?interval, "job in progress");
                    self.clock.sleep(interval);
                }
                JobStatus::Unknown(status) => {
                    return Err(Error::protocol(format!("unknown job status: {}", status)));
                }
            }
        }
    }

    /// Compare one file against every hashtable on the server.
    pub fn compare_file(&self, path: &Path) -> Result<ComparisonResponse> {
        let upload = Upload::single(path)?;
        let handle = self.submit(&upload)?;
        self.await_result(&handle)
    }

    /// Compare several files in one job. The server resolves imports between
    /// them and keys the result by each file's relative path.
    pub fn compare_files(&self, files: &[QmdFile]) -> Result<BatchComparisonResponse> {
        let upload = Upload::batch(files)?;
        let handle = self.submit(&upload)?;
        self.await_result(&handle)
    }

    pub fn list_hashtables(&self) -> Result<HashtablesResponse> {
        self.get_json(HASHTABLES_PATH)
    }

    pub fn list_trees(&self) -> Result<TreesResponse> {
        self.get_json(TREES_PATH)
    }

    pub fn server_version(&self) -> Result<VersionResponse> {
        self.get_json(VERSION_PATH)
    }

    fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let response = self.transport.get(path)?;
        if !response.is_success() {
            return Err(error_from_status(&response));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::RawResponse;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::time::Duration;

    const RESULT: &str = r#"{"compatible":[{"os_version":"3.22.4.2","device":"rmpp","compatible":true}],"incompatible":[],"total_checked":1}"#;

    /// Scripted transport: one submit reply, a queue of poll replies. The
    /// last poll reply repeats once the queue is drained.
    struct MockTransport {
        submit: RawResponse,
        polls: RefCell<VecDeque<RawResponse>>,
        requested: RefCell<Vec<String>>,
    }

    impl MockTransport {
        fn new(submit: RawResponse, polls: Vec<RawResponse>) -> Self {
            Self {
                submit,
                polls: RefCell::new(polls.into()),
                requested: RefCell::new(Vec::new()),
            }
        }

        fn accepting(polls: Vec<&str>) -> Self {
            Self::new(
                RawResponse::new(200, r#"{"jobId":"job-1"}"#),
                polls.into_iter().map(|b| RawResponse::new(200, b)).collect(),
            )
        }

        fn poll_count(&self) -> usize {
            self.requested.borrow().len()
        }
    }

    impl Transport for MockTransport {
        fn post_multipart(&self, _path: &str, _upload: &Upload) -> Result<RawResponse> {
            Ok(self.submit.clone())
        }

        fn get(&self, path: &str) -> Result<RawResponse> {
            self.requested.borrow_mut().push(path.to_string());
            let mut polls = self.polls.borrow_mut();
            let reply = if polls.len() > 1 {
                polls.pop_front()
            } else {
                polls.front().cloned()
            };
            Ok(reply.unwrap_or_else(|| RawResponse::new(500, "")))
        }
    }

    #[derive(Default)]
    struct FakeClock {
        now: Cell<Duration>,
        sleeps: RefCell<Vec<Duration>>,
    }

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.now.set(self.now.get() + duration);
            self.sleeps.borrow_mut().push(duration);
        }
    }

    fn client(transport: MockTransport) -> Client<MockTransport, FakeClock> {
        Client::with_transport(transport, FakeClock::default())
    }

    fn handle() -> JobHandle {
        JobHandle::new("job-1")
    }

    fn upload() -> Upload {
        Upload::Single(crate::upload::UploadFile {
            file_name: "test.qmd".to_string(),
            path_field: "test.qmd".to_string(),
            content: b"x".to_vec(),
        })
    }

    #[test]
    fn test_submit_returns_handle() {
        let client = client(MockTransport::accepting(vec![]));
        assert_eq!(client.submit(&upload()).unwrap().as_str(), "job-1");
    }

    #[test]
    fn test_submit_rejects_empty_job_id() {
        let transport = MockTransport::new(RawResponse::new(200, r#"{"jobId":""}"#), vec![]);
        let err = client(transport).submit(&upload()).unwrap_err();
        assert_eq!(err.to_string(), "protocol error: server returned empty job ID");
    }

    #[test]
    fn test_submit_surfaces_server_error() {
        let transport = MockTransport::new(
            RawResponse::new(400, r#"{"error":"no file uploaded"}"#),
            vec![],
        );
        let err = client(transport).submit(&upload()).unwrap_err();
        assert!(matches!(err, Error::Server(ref msg) if msg == "no file uploaded"));
    }

    #[test]
    fn test_three_running_polls_then_success() {
        let success = format!(r#"{{"status":"success","results":{RESULT}}}"#);
        let running = r#"{"status":"running"}"#;
        let client = client(MockTransport::accepting(vec![
            running,
            running,
            running,
            success.as_str(),
        ]));

        let result: ComparisonResponse = client.await_result(&handle()).unwrap();
        assert_eq!(result.total_checked, 1);
        assert_eq!(
            *client.clock.sleeps.borrow(),
            vec![Duration::from_millis(500); 3]
        );
        assert_eq!(client.transport.poll_count(), 4);
        assert_eq!(client.transport.requested.borrow()[0], "/api/results/job-1");
    }

    #[test]
    fn test_bare_result_on_first_poll() {
        let client = client(MockTransport::accepting(vec![RESULT]));
        let result: ComparisonResponse = client.await_result(&handle()).unwrap();
        assert!(result.is_passing());
        assert!(client.clock.sleeps.borrow().is_empty());
    }

    #[test]
    fn test_accepted_counts_as_running() {
        let transport = MockTransport::new(
            RawResponse::new(200, r#"{"jobId":"job-1"}"#),
            vec![RawResponse::new(202, ""), RawResponse::new(200, RESULT)],
        );
        let client = client(transport);
        let _: ComparisonResponse = client.await_result(&handle()).unwrap();
        assert_eq!(client.clock.sleeps.borrow().len(), 1);
    }

    #[test]
    fn test_polling_slows_down_then_times_out() {
        let client = client(MockTransport::accepting(vec![r#"{"status":"pending"}"#]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert!(err.is_timeout());

        let sleeps = client.clock.sleeps.borrow();
        assert_eq!(sleeps[0], Duration::from_millis(500));
        assert_eq!(*sleeps.last().unwrap(), Duration::from_secs(1));
        // 20 fast polls cover the first 10s, then one per second until 60s.
        assert_eq!(client.transport.poll_count(), 71);
        assert!(client.clock.now() > Duration::from_secs(60));
    }

    #[test]
    fn test_job_error_uses_server_message() {
        let client = client(MockTransport::accepting(vec![
            r#"{"status":"error","error":"hashtable load failed"}"#,
        ]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert!(matches!(err, Error::JobFailed(ref msg) if msg == "hashtable load failed"));
    }

    #[test]
    fn test_job_error_without_message() {
        let client = client(MockTransport::accepting(vec![r#"{"status":"error"}"#]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert_eq!(err.to_string(), "unknown error");
    }

    #[test]
    fn test_success_without_results() {
        let client = client(MockTransport::accepting(vec![
            r#"{"status":"success","results":null}"#,
        ]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "protocol error: job succeeded but no results returned"
        );
    }

    #[test]
    fn test_unknown_status_is_fatal() {
        let client = client(MockTransport::accepting(vec![r#"{"status":"queued"}"#]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert_eq!(err.to_string(), "protocol error: unknown job status: queued");
    }

    #[test]
    fn test_malformed_poll_is_not_retried() {
        let client = client(MockTransport::accepting(vec!["not json"]));
        let err = client.await_result::<ComparisonResponse>(&handle()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(client.transport.poll_count(), 1);
    }

    #[test]
    fn test_batch_result() {
        let batch = format!(r#"{{"status":"success","results":{{"a.qmd":{RESULT}}}}}"#);
        let client = client(MockTransport::accepting(vec![batch.as_str()]));
        let result: BatchComparisonResponse = client.await_result(&handle()).unwrap();
        assert!(result.contains("a.qmd"));
    }

    #[test]
    fn test_catalog_endpoints() {
        let transport = MockTransport::new(
            RawResponse::new(200, ""),
            vec![RawResponse::new(
                200,
                r#"{"version":"1.4.0","commit":"abc123","build_time":"2024-01-01"}"#,
            )],
        );
        let client = client(transport);
        let version = client.server_version().unwrap();
        assert_eq!(version.version, "1.4.0");
        assert_eq!(client.transport.requested.borrow()[0], "/api/version");
    }
}
