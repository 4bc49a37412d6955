use std::fmt;

use thiserror::Error;

use crate::codec::{CodecError, Dimensions};
use crate::fetch::FetchError;

/// Pipeline step a request was in when it was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Fetching,
    Transforming,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Every way a request can end up serving the original response.
///
/// None of these are surfaced to the viewer; the handler logs the rejection
/// and hands CloudFront back the response it was given.
#[derive(Error, Debug, PartialEq)]
pub enum Rejection {
    #[error("no resizing parameters")]
    NoResizeRequested,
    #[error("unsupported image type: {0:?}")]
    UnsupportedType(String),
    #[error("gif format without format conversion")]
    GifWithoutConversion,
    #[error("invalid {param} value {value}")]
    InvalidDimension { param: &'static str, value: i64 },
    #[error("failed to fetch original image: {0}")]
    FetchFailed(String),
    #[error("requested size {requested} is larger than the original image {original}")]
    UpscaleRejected {
        requested: String,
        original: Dimensions,
    },
    #[error("image transform failed: {0}")]
    TransformFailed(String),
    #[error("response image is {encoded_len} bytes as base64, limit is {limit}")]
    OutputTooLarge { encoded_len: usize, limit: usize },
}

impl Rejection {
    pub fn stage(&self) -> Stage {
        match self {
            Rejection::NoResizeRequested
            | Rejection::UnsupportedType(_)
            | Rejection::GifWithoutConversion
            | Rejection::InvalidDimension { .. } => Stage::Validating,
            Rejection::FetchFailed(_) => Stage::Fetching,
            Rejection::UpscaleRejected { .. }
            | Rejection::TransformFailed(_)
            | Rejection::OutputTooLarge { .. } => Stage::Transforming,
        }
    }
}

impl From<FetchError> for Rejection {
    fn from(err: FetchError) -> Self {
        Rejection::FetchFailed(err.to_string())
    }
}

impl From<CodecError> for Rejection {
    fn from(err: CodecError) -> Self {
        Rejection::TransformFailed(err.to_string())
    }
}
