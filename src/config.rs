use thiserror::Error;

/// Region the origin bucket lives in when the build does not override it.
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// Lambda@Edge caps a generated origin-response body at 1MB.
pub const MAX_RESPONSE_BYTES: usize = 1_048_576;

/// Marker left in the bucket name when the CI substitution step did not run.
const BUCKET_PLACEHOLDER: &str = "BUCKET_NAME_PLACEHOLDER";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BUCKET_NAME was not set when this function was built")]
    MissingBucket,
    #[error("BUCKET_NAME still holds the unreplaced placeholder {0}")]
    PlaceholderBucket(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub region: String,
    pub max_response_bytes: usize,
}

impl Config {
    pub fn new(bucket: impl Into<String>) -> Self {
        Config {
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            max_response_bytes: MAX_RESPONSE_BYTES,
        }
    }

    /// Edge functions get no runtime environment, so the bucket and region
    /// are baked in by the build (`BUCKET_NAME`, `BUCKET_REGION`).
    pub fn load_from_build() -> Result<Config, ConfigError> {
        Self::from_values(option_env!("BUCKET_NAME"), option_env!("BUCKET_REGION"))
    }

    fn from_values(bucket: Option<&str>, region: Option<&str>) -> Result<Config, ConfigError> {
        let bucket = bucket
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(ConfigError::MissingBucket)?;

        if bucket.contains(BUCKET_PLACEHOLDER) {
            return Err(ConfigError::PlaceholderBucket(bucket.to_string()));
        }

        let mut config = Config::new(bucket);
        if let Some(region) = region.map(str::trim).filter(|r| !r.is_empty()) {
            config.region = region.to_string();
        }

        Ok(config)
    }
}
