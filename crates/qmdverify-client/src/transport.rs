use crate::poll::REQUEST_TIMEOUT;
use crate::upload::Upload;
use crate::{Error, Result};
use reqwest::blocking::multipart::{Form, Part};

/// Status code and body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `202 Accepted`: the job exists but has no result yet.
    pub fn is_accepted(&self) -> bool {
        self.status == 202
    }
}

/// The two HTTP operations the job protocol needs.
///
/// Paths are relative to the server base address, e.g. `/api/compare`.
pub trait Transport {
    fn post_multipart(&self, path: &str, upload: &Upload) -> Result<RawResponse>;
    fn get(&self, path: &str) -> Result<RawResponse>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// `base_url` must already have its trailing slash stripped.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();

        let mut builder = reqwest::blocking::Client::builder().timeout(REQUEST_TIMEOUT);
        if is_loopback(&base_url) {
            builder = builder.no_proxy();
        }

        Ok(Self {
            base_url,
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn post_multipart(&self, path: &str, upload: &Upload) -> Result<RawResponse> {
        let url = self.url(path);
        tracing::debug!(%url, bytes = upload.total_bytes(), "POST multipart");

        let response = self.http.post(&url).multipart(multipart_form(upload)).send()?;
        read_response(response)
    }

    fn get(&self, path: &str) -> Result<RawResponse> {
        let url = self.url(path);
        tracing::trace!(%url, "GET");

        let response = self.http.get(&url).send()?;
        read_response(response)
    }
}

fn read_response(response: reqwest::blocking::Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let body = response.bytes().map_err(Error::Transport)?.to_vec();
    Ok(RawResponse { status, body })
}

fn multipart_form(upload: &Upload) -> Form {
    match upload {
        Upload::Single(file) => Form::new().part("file", file_part(file)),
        Upload::Batch(files) => files.iter().fold(Form::new(), |form, file| {
            form.part("files", file_part(file))
                .text("paths", file.path_field.clone())
        }),
    }
}

fn file_part(file: &crate::upload::UploadFile) -> Part {
    Part::bytes(file.content.clone()).file_name(file.file_name.clone())
}

fn is_loopback(base_url: &str) -> bool {
    reqwest::Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .is_some_and(|host| matches!(host.as_str(), "localhost" | "127.0.0.1" | "[::1]" | "::1"))
}
