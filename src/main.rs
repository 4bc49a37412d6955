use aws_config::{BehaviorVersion, Region};
use edge_image_resizer::clients::AwsClients;
use edge_image_resizer::codec::RasterCodec;
use edge_image_resizer::config::Config;
use edge_image_resizer::events::CloudFrontEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    edge_image_resizer::set_up_logging();

    info!(
        "Initializing {} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load_from_build()?;
    info!(bucket = %config.bucket, region = %config.region, "loaded configuration");

    let aws_config = aws_config::defaults(BehaviorVersion::v2023_11_09())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    let clients = AwsClients::new(&aws_config);
    let codec = RasterCodec::default();

    run(service_fn(|request: LambdaEvent<CloudFrontEvent>| {
        edge_image_resizer::function_handler(&clients.s3, &codec, &config, request)
    }))
    .await
}
