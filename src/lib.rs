use lambda_runtime::{Error, LambdaEvent};
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::codec::ImageCodec;
use crate::config::Config;
use crate::events::{CloudFrontEvent, CloudFrontPayload, EdgeResponse};
use crate::fetch::ObjectStore;

pub mod clients;
pub mod codec;
pub mod config;
pub mod events;
pub mod fetch;
pub mod process;
pub mod query;
pub mod rejection;
pub mod transform;

pub fn set_up_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();
}

// lambda handler
pub async fn function_handler<S, C>(
    store: &S,
    codec: &C,
    config: &Config,
    evt: LambdaEvent<CloudFrontEvent>,
) -> Result<EdgeResponse, Error>
where
    S: ObjectStore + ?Sized,
    C: ImageCodec + ?Sized,
{
    info!("Handling lambda invocation");
    debug!("Handling event payload: {:?}", evt.payload);

    let CloudFrontPayload {
        request, response, ..
    } = handle_cloudfront_event(evt.payload)?;

    Ok(process::origin_response(store, codec, config, &request, response).await)
}

/// CloudFront delivers exactly one record per Lambda@Edge invocation.
pub fn handle_cloudfront_event(event: CloudFrontEvent) -> Result<CloudFrontPayload, Error> {
    let record = event
        .records
        .into_iter()
        .next()
        .ok_or("CloudFront event contains no records")?;
    Ok(record.cf)
}
