use async_trait::async_trait;
use image::DynamicImage;
use log::debug;
use rand::Rng;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::core::config::ImageConfig;

/// Longest prompt placed in the request path.
pub const MAX_PROMPT_CHARS: usize = 400;
const SEED_RANGE: std::ops::Range<u32> = 0..1_000_000;

#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("invalid image endpoint: {0}")]
    Endpoint(String),

    #[error("image request timed out after {0:?}")]
    Timeout(Duration),

    #[error("image transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("image service returned HTTP {0}")]
    Status(u16),

    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Fetches one generated image per call. Implementations do not retry.
#[async_trait]
pub trait ImageSource: Send + Sync + Debug {
    async fn fetch(&self, prompt: &str, style: &str) -> Result<DynamicImage, ImageFetchError>;
}

#[derive(Debug)]
pub struct PollinationsClient {
    base_url: String,
    width: u32,
    height: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl PollinationsClient {
    pub fn new(config: &ImageConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: &ImageConfig, client: reqwest::Client) -> Self {
        Self {
            base_url: config.base_url.clone(),
            width: config.width,
            height: config.height,
            timeout: config.timeout(),
            client,
        }
    }

    /// Request URL for one fetch, with a fresh random seed.
    pub fn request_url(&self, prompt: &str, style: &str) -> Result<Url, ImageFetchError> {
        let seed = rand::rng().random_range(SEED_RANGE);
        self.request_url_with_seed(prompt, style, seed)
    }

    fn request_url_with_seed(&self, prompt: &str, style: &str, seed: u32) -> Result<Url, ImageFetchError> {
        let truncated: String = prompt.chars().take(MAX_PROMPT_CHARS).collect();

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ImageFetchError::Endpoint(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ImageFetchError::Endpoint(self.base_url.clone()))?
            .pop_if_empty()
            .push("prompt")
            .push(&truncated);
        url.query_pairs_mut()
            .append_pair("width", &self.width.to_string())
            .append_pair("height", &self.height.to_string())
            .append_pair("model", style)
            .append_pair("nologo", "true")
            .append_pair("seed", &seed.to_string())
            .append_pair("enhance", "false");
        Ok(url)
    }
}

#[async_trait]
impl ImageSource for PollinationsClient {
    async fn fetch(&self, prompt: &str, style: &str) -> Result<DynamicImage, ImageFetchError> {
        let url = self.request_url(prompt, style)?;
        debug!("GET {}", url);

        let timeout = self.timeout;
        let classify = |e: reqwest::Error| {
            if e.is_timeout() {
                ImageFetchError::Timeout(timeout)
            } else {
                ImageFetchError::Transport(e)
            }
        };

        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await.map_err(classify)?;
        Ok(image::load_from_memory(&bytes)?)
    }
}
