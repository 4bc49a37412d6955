use tracing::debug;

use crate::codec::ImageCodec;
use crate::query::TransformParams;
use crate::rejection::Rejection;

/// Applies `params` to `original` through `codec`, refusing to upscale and
/// refusing results that would not fit in an edge response once base64
/// encoded.
pub fn resize_image<C>(
    codec: &C,
    original: &[u8],
    params: &TransformParams,
    max_response_bytes: usize,
) -> Result<Vec<u8>, Rejection>
where
    C: ImageCodec + ?Sized,
{
    let original_size = codec.dimensions(original)?;
    debug!(%original_size, requested = %params.requested_size(), "probed original image");

    // a single requested side scales the other by the same ratio, so only
    // the requested sides need checking
    let too_wide = params.width.is_some_and(|w| w > original_size.width);
    let too_tall = params.height.is_some_and(|h| h > original_size.height);
    if too_wide || too_tall {
        return Err(Rejection::UpscaleRejected {
            requested: params.requested_size(),
            original: original_size,
        });
    }

    let resized = codec.transform(original, params)?;

    let encoded_len = base64::encoded_len(resized.len(), true).unwrap_or(usize::MAX);
    if encoded_len >= max_response_bytes {
        return Err(Rejection::OutputTooLarge {
            encoded_len,
            limit: max_response_bytes,
        });
    }

    Ok(resized)
}
