//! Client side of the qmd-check job protocol.
//!
//! Uploads QMD files, polls the resulting comparison job, and decodes the
//! server's replies into `qmdverify_types` values.

pub mod client;
pub mod decode;
pub mod error;
pub mod poll;
pub mod transport;
pub mod upload;

pub use client::Client;
pub use decode::{Decoded, JobPayload, decode_body, decode_poll};
pub use error::{Error, Result};
pub use poll::{Clock, PollPolicy, REQUEST_TIMEOUT, SystemClock};
pub use transport::{HttpTransport, RawResponse, Transport};
pub use upload::{QmdFile, Upload, UploadFile};
