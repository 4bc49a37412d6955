use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;

/// AWS clients the function needs, built once per execution environment and
/// shared by every invocation.
#[derive(Clone)]
pub struct AwsClients {
    pub s3: S3Client,
}

impl AwsClients {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        AwsClients {
            s3: S3Client::new(sdk_config),
        }
    }
}
