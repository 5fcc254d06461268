pub mod complete;
pub mod upload;

pub use complete::{CompleteSummaryBody, CompleteSummaryCommand, CompleteSummaryError};
pub use upload::{UploadCoverCommand, UploadCoverError, UploadCoverResponse};
