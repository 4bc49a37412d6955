use base64::prelude::*;
use tracing::{info, warn};

use crate::codec::ImageCodec;
use crate::config::Config;
use crate::events::{BodyEncoding, EdgeRequest, EdgeResponse};
use crate::fetch::{object_key_from_uri, ObjectStore};
use crate::query::{self, ImageType};
use crate::rejection::{Rejection, Stage};
use crate::transform::resize_image;

/// Result of a request that made it through every stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub format: ImageType,
}

impl ResizedImage {
    /// Origin response with the resized image as its base64 body.
    pub fn into_response(self, mut response: EdgeResponse) -> EdgeResponse {
        response.body = Some(BASE64_STANDARD.encode(&self.bytes));
        response.body_encoding = Some(BodyEncoding::Base64);
        response.set_header("Content-Type", self.format.content_type());
        response
    }
}

/// Validate, fetch, transform. The first failing stage ends the run.
pub async fn resize_from_origin<S, C>(
    store: &S,
    codec: &C,
    config: &Config,
    request: &EdgeRequest,
) -> Result<ResizedImage, Rejection>
where
    S: ObjectStore + ?Sized,
    C: ImageCodec + ?Sized,
{
    let params = query::validate(&request.uri, &request.querystring)?;
    info!(
        uri = %request.uri,
        w = ?params.width,
        h = ?params.height,
        q = params.quality,
        f = %params.format,
        "resizing image"
    );

    let key = object_key_from_uri(&request.uri)?;
    let original = store.get_object(&config.bucket, &key).await?;

    let bytes = resize_image(codec, &original, &params, config.max_response_bytes)?;

    Ok(ResizedImage {
        bytes,
        format: params.format,
    })
}

/// Runs the pipeline for one origin response. Always returns a response:
/// the resized image on success, `response` untouched otherwise.
pub async fn origin_response<S, C>(
    store: &S,
    codec: &C,
    config: &Config,
    request: &EdgeRequest,
    response: EdgeResponse,
) -> EdgeResponse
where
    S: ObjectStore + ?Sized,
    C: ImageCodec + ?Sized,
{
    match resize_from_origin(store, codec, config, request).await {
        Ok(resized) => {
            info!(
                uri = %request.uri,
                size = resized.bytes.len(),
                "Success resizing image"
            );
            resized.into_response(response)
        }
        Err(rejection) => {
            match rejection.stage() {
                Stage::Validating => {
                    info!(uri = %request.uri, %rejection, "serving original image")
                }
                stage => {
                    warn!(uri = %request.uri, %stage, %rejection, "serving original image")
                }
            }
            response
        }
    }
}
